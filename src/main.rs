mod app;
use korean_srs::*;

use app::MyApp;
use chrono::Local;
use database::{db, seed};
use log::{error, info};

fn main() -> eframe::Result<()> {
    let config = AppConfig::from_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_filter))
        .init();

    let conn = match db::init_database(&config.database_path) {
        Ok(conn) => conn,
        Err(e) => {
            error!(
                "Failed to open database at {}: {}",
                config.database_path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    if config.seed_on_empty {
        if let Err(e) = seed::seed_if_empty(&Local::now(), &conn) {
            error!("Seeding starter decks failed: {}", e);
        }
    }

    match db::get_all_decks(&conn) {
        Ok(decks) => {
            info!("Loaded {} decks from database", decks.len());
            for deck in &decks {
                info!("  - {}", deck.name);
            }
        }
        Err(e) => error!("Failed to load decks: {}", e),
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([520.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Korean SRS",
        options,
        Box::new(move |_cc| Ok(Box::new(MyApp::new(conn, config)))),
    )
}
