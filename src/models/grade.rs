//! User-facing recall grades and their SM-2 quality scores.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grade chosen after revealing a card, ordered by increasing quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    /// Quality score on the 0-5 SM-2 scale. Scores 0 and 2 are never produced.
    pub fn quality(self) -> u8 {
        match self {
            Grade::Again => 1,
            Grade::Hard => 3,
            Grade::Good => 4,
            Grade::Easy => 5,
        }
    }

    /// Failing grades reset the learning progress.
    pub fn is_failure(self) -> bool {
        self.quality() < 3
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGradeError(pub String);

impl fmt::Display for ParseGradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown grade '{}'", self.0)
    }
}

impl std::error::Error for ParseGradeError {}

impl FromStr for Grade {
    type Err = ParseGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "again" => Ok(Grade::Again),
            "hard" => Ok(Grade::Hard),
            "good" => Ok(Grade::Good),
            "easy" => Ok(Grade::Easy),
            other => Err(ParseGradeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_table() {
        let scores: Vec<u8> = Grade::ALL.iter().map(|g| g.quality()).collect();
        assert_eq!(scores, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_only_again_fails() {
        assert!(Grade::Again.is_failure());
        assert!(!Grade::Hard.is_failure());
        assert!(!Grade::Good.is_failure());
        assert!(!Grade::Easy.is_failure());
    }

    #[test]
    fn test_ordering_follows_quality() {
        assert!(Grade::Again < Grade::Hard);
        assert!(Grade::Hard < Grade::Good);
        assert!(Grade::Good < Grade::Easy);
    }

    #[test]
    fn test_parse_and_display() {
        for grade in Grade::ALL {
            assert_eq!(grade.to_string().parse::<Grade>(), Ok(grade));
        }
        assert!("perfect".parse::<Grade>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Grade::Easy).unwrap(), "\"easy\"");
        let g: Grade = serde_json::from_str("\"again\"").unwrap();
        assert_eq!(g, Grade::Again);
    }
}
