use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::model::{HomeworkRecord, ReviewStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("homework record has no `{0}` field")]
    MissingField(&'static str),
    #[error("unknown homework review status: {0}")]
    UnknownStatus(String),
}

impl HomeworkRecord {
    /// Build a record from one raw element of the `homeworks` list.
    pub fn from_value(value: &Value) -> Result<Self, StatusError> {
        let homework_name = value
            .get("homework_name")
            .and_then(Value::as_str)
            .ok_or(StatusError::MissingField("homework_name"))?;
        let code = value
            .get("status")
            .ok_or(StatusError::MissingField("status"))?;
        let code = match code.as_str() {
            Some(s) => s.to_string(),
            None => code.to_string(),
        };
        debug!(status = %code, "homework review status");
        let status = code
            .parse::<ReviewStatus>()
            .map_err(StatusError::UnknownStatus)?;
        Ok(Self {
            homework_name: homework_name.to_string(),
            status,
        })
    }

    pub fn message(&self) -> String {
        format!(
            "Изменился статус проверки работы \"{}\". {}",
            self.homework_name,
            self.status.verdict()
        )
    }
}

/// Render a raw homework element into the chat notification.
pub fn parse_status(homework: &Value) -> Result<String, StatusError> {
    HomeworkRecord::from_value(homework).map(|rec| rec.message())
}
