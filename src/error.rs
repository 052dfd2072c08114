use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Row index {0} is out of range")]
    RowIndex(usize),

    #[error("SB cannot be greater than STB: requested {requested}, cap is {cap}")]
    QuantityExceedsCap { requested: i64, cap: i64 },

    #[error("Invalid {field} tag: {value}")]
    InvalidTag { field: &'static str, value: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for JournalError {
    fn from(err: rusqlite::Error) -> Self {
        JournalError::Database(err.to_string())
    }
}

impl From<csv::Error> for JournalError {
    fn from(err: csv::Error) -> Self {
        JournalError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(err: serde_json::Error) -> Self {
        JournalError::Serialization(err.to_string())
    }
}
