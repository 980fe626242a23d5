use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review outcome reported by the Practicum API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Approved => "approved",
            ReviewStatus::Reviewing => "reviewing",
            ReviewStatus::Rejected => "rejected",
        }
    }

    /// Human-readable verdict sent to the chat.
    pub fn verdict(&self) -> &'static str {
        match self {
            ReviewStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            ReviewStatus::Reviewing => "Работа взята на проверку ревьюером.",
            ReviewStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(ReviewStatus::Approved),
            "reviewing" => Ok(ReviewStatus::Reviewing),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomeworkRecord {
    pub homework_name: String,
    pub status: ReviewStatus,
}

/// Last notified subject and message, compared by value to suppress duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportState {
    pub name: Option<String>,
    pub output: String,
}
