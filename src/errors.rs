use thiserror::Error;

/// Main error type for the Pokemon quiz
#[derive(Debug, Error)]
pub enum GameError {
    /// Error related to question generation or grading
    #[error("Quiz error: {0}")]
    Quiz(#[from] QuizError),
    /// Error talking to the creature data API
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    /// Error reading or writing saved progress
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// Error loading settings
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to the quiz itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// No multiplication table was selected
    #[error("select at least one table")]
    EmptySelection,
    /// The table has no difficulty tier
    #[error("table {0} is not offered")]
    UnknownTable(u32),
    /// An answer was submitted with no question on screen
    #[error("no question is active")]
    NoActiveQuestion,
}

/// Errors related to creature data requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request could not be sent or the connection failed
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    /// The server answered with a non-success status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    /// The body was not the expected JSON
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Errors related to saved progress
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode progress: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors related to the settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Type alias for Results using GameError
pub type GameResult<T> = Result<T, GameError>;

/// Type alias for Results using QuizError
pub type QuizResult<T> = Result<T, QuizError>;

/// Type alias for Results using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

/// Type alias for Results using StorageError
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(QuizError::UnknownTable(13).to_string(), "table 13 is not offered");

        let err: GameError = ApiError::Status {
            url: "https://pokeapi.co/api/v2/pokemon/999999".to_string(),
            status: 404,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "API error: https://pokeapi.co/api/v2/pokemon/999999 returned status 404"
        );
    }
}
