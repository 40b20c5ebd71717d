//! Starter Korean decks inserted into an empty database.
use super::db;
use crate::error::Result;
use crate::models::Card;
use chrono::{DateTime, TimeZone};
use log::info;
use rusqlite::Connection;
use uuid::Uuid;

pub const BEGINNER_DECK: &str = "Beginner Vocabulary";
pub const INTERMEDIATE_DECK: &str = "Intermediate Grammar";

/// (hangul, meaning, romanization, example in Korean, example in English, tags)
type SeedCard = (&'static str, &'static str, &'static str, &'static str, &'static str, &'static [&'static str]);

const BEGINNER_CARDS: &[SeedCard] = &[
    ("안녕하세요", "Hello (formal)", "annyeonghaseyo", "안녕하세요! 반갑습니다.", "Hello! Nice to meet you.", &["greetings"]),
    ("감사합니다", "Thank you (formal)", "gamsahamnida", "도와주셔서 감사합니다.", "Thank you for your help.", &["greetings"]),
    ("네", "Yes", "ne", "", "", &["basics"]),
    ("아니요", "No", "aniyo", "", "", &["basics"]),
    ("물", "Water", "mul", "물 좀 주세요.", "Please give me some water.", &["food"]),
    ("밥", "Cooked rice / meal", "bap", "밥 먹었어요?", "Did you eat?", &["food"]),
    ("사랑", "Love", "sarang", "", "", &["feelings"]),
    ("학교", "School", "hakgyo", "학교에 가요.", "I go to school.", &["places"]),
    ("친구", "Friend", "chingu", "친구를 만나요.", "I meet a friend.", &["people"]),
    ("가족", "Family", "gajok", "", "", &["people"]),
    ("저는 학생이에요", "I am a student", "jeoneun haksaeng-ieyo", "저는 학생이에요.", "I am a student.", &["intro"]),
    ("어디에요?", "Where is it?", "eodieyo?", "", "", &["travel"]),
    ("얼마에요?", "How much is it?", "eolmaeyo?", "", "", &["shopping"]),
    ("오늘", "Today", "oneul", "", "", &["time"]),
    ("내일", "Tomorrow", "naeil", "", "", &["time"]),
    ("어제", "Yesterday", "eoje", "", "", &["time"]),
    ("좋아요", "It’s good / I like it", "joayo", "정말 좋아요!", "I really like it!", &["feelings"]),
    ("싫어요", "I don’t like it", "silheoyo", "", "", &["feelings"]),
    ("알겠습니다", "Understood / Got it", "algesseumnida", "", "", &["polite"]),
    ("잠시만요", "Just a moment", "jamsimanyo", "", "", &["polite"]),
    ("죄송합니다", "Sorry (formal)", "joesonghamnida", "정말 죄송합니다.", "I am truly sorry.", &["polite"]),
    ("맛있어요", "It’s delicious", "masisseoyo", "이 음식 맛있어요.", "This food is delicious.", &["food"]),
    ("괜찮아요", "It’s okay / No problem", "gwaenchanayo", "", "", &["polite"]),
    ("병원", "Hospital", "byeongwon", "", "", &["places"]),
    ("약국", "Pharmacy", "yakguk", "", "", &["places"]),
    ("지하철", "Subway", "jihacheol", "지하철을 타요.", "I take the subway.", &["transport"]),
    ("버스", "Bus", "beoseu", "", "", &["transport"]),
    ("택시", "Taxi", "taegsi", "", "", &["transport"]),
    ("시장", "Market", "sijang", "", "", &["places"]),
    ("은행", "Bank", "eunhaeng", "", "", &["places"]),
];

const INTERMEDIATE_CARDS: &[SeedCard] = &[
    ("저는 학생이에요.", "I am a student.", "jeoneun haksaeng-ieyo", "저는 학생이에요.", "I am a student.", &["intro", "grammar"]),
    ("저는 한국 사람이에요.", "I am Korean.", "jeoneun hanguk saram-ieyo", "", "", &["intro"]),
    ("저는 미국에서 왔어요.", "I came from the USA.", "jeoneun migug-eseo wasseoyo", "", "", &["travel", "intro"]),
    ("이것은 책이에요.", "This is a book.", "igeoseun chaeg-ieyo", "", "", &["grammar", "demonstratives"]),
    ("저는 밥을 먹어요.", "I eat (rice)/I eat a meal.", "jeoneun babeul meogeoyo", "", "", &["verbs"]),
    ("저는 친구를 만나요.", "I meet a friend.", "jeoneun chingureul mannayo", "", "", &["verbs"]),
    ("저는 영화를 봐요.", "I watch a movie.", "jeoneun yeonghwareul bwayo", "", "", &["verbs"]),
    ("날씨가 좋아요.", "The weather is nice.", "nalssiga joayo", "", "", &["adjectives"]),
    ("비가 와요.", "It is raining.", "biga wayo", "", "", &["weather"]),
    ("학교에 가요.", "I go to school.", "hakgyoe gayo", "", "", &["location"]),
    ("저는 커피를 마셔요.", "I drink coffee.", "jeoneun keopireul masyeoyo", "", "", &["verbs", "food"]),
    ("저는 음악을 들어요.", "I listen to music.", "jeoneun eumageul deureoyo", "", "", &["verbs"]),
    ("책을 읽어요.", "I read a book.", "chaegeul ilgeoyo", "", "", &["verbs"]),
    ("운동을 해요.", "I exercise.", "undongeul haeyo", "", "", &["verbs", "health"]),
    ("저는 요리를 해요.", "I cook.", "jeoneun yorireul haeyo", "", "", &["verbs", "food"]),
    ("산에 가요.", "I go to the mountain.", "sane gayo", "", "", &["location", "nature"]),
    ("바다에 가요.", "I go to the sea.", "badae gayo", "", "", &["location", "nature"]),
    ("저는 여행을 해요.", "I travel.", "jeoneun yeohaengeul haeyo", "", "", &["travel"]),
    ("한국어를 공부해요.", "I study Korean.", "hangug-eoreul gongbuhaeyo", "", "", &["study"]),
    ("저는 쉬어요.", "I rest.", "jeoneun swi-eoyo", "", "", &["health"]),
];

fn ensure_deck<Tz: TimeZone>(name: &str, now: &DateTime<Tz>, conn: &Connection) -> Result<Uuid> {
    match db::find_deck_by_name(name, conn)? {
        Some(deck) => Ok(deck.id),
        None => Ok(db::new_deck(name, now, conn)?.id),
    }
}

fn seed_card<Tz: TimeZone>(deck_id: Uuid, seed: &SeedCard, now: &DateTime<Tz>) -> Card {
    let (hangul, meaning, romanization, example_ko, example_en, tags) = *seed;
    Card::new(deck_id, hangul, meaning, now)
        .with_romanization(romanization)
        .with_examples(example_ko, example_en)
        .with_tags(tags)
}

/// Makes sure both starter decks exist and fills them when the database has no cards.
///
/// Returns the number of cards inserted.
pub fn seed_if_empty<Tz: TimeZone>(now: &DateTime<Tz>, conn: &Connection) -> Result<usize> {
    let beginner = ensure_deck(BEGINNER_DECK, now, conn)?;
    let intermediate = ensure_deck(INTERMEDIATE_DECK, now, conn)?;

    if db::count_cards(conn)? > 0 {
        info!("Cards already present, skipping seed");
        return Ok(0);
    }

    let cards = BEGINNER_CARDS
        .iter()
        .map(|seed| seed_card(beginner, seed, now))
        .chain(INTERMEDIATE_CARDS.iter().map(|seed| seed_card(intermediate, seed, now)));

    let mut inserted = 0;
    for card in cards {
        db::add_card(&card, conn)?;
        inserted += 1;
    }
    info!("Seeded {} cards", inserted);
    Ok(inserted)
}
