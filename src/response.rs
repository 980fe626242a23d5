use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("API response is not a JSON object")]
    NotAMapping,
    #[error("API response has no `{key}` key")]
    Empty { key: &'static str },
    #[error("`homeworks` in API response is not a list")]
    HomeworksNotList,
}

/// Check the payload shape and return the `homeworks` list unchanged.
pub fn check_response(response: &Value) -> Result<Vec<Value>, ResponseError> {
    let map = response.as_object().ok_or(ResponseError::NotAMapping)?;
    let homeworks = map
        .get("homeworks")
        .ok_or(ResponseError::Empty { key: "homeworks" })?;
    if !map.contains_key("current_date") {
        return Err(ResponseError::Empty {
            key: "current_date",
        });
    }
    match homeworks {
        Value::Array(list) => Ok(list.clone()),
        _ => Err(ResponseError::HomeworksNotList),
    }
}
