use thiserror::Error as ThisError;

use crate::libs::result_code::ResultCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, ThisError)]
pub enum Error {
    /// A field type has no storage class.
    #[error("the type {type_name} can not be mapped to a sqlite storage class")]
    UnsupportedType { type_name: String },

    #[error("database is not connected")]
    NotConnected,

    /// The engine rejected or failed a statement.
    #[error("execution failed ({code:?})")]
    Database {
        code: Option<ResultCode>,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<sqlx::Error> for Error {
    fn from(source: sqlx::Error) -> Self {
        if let sqlx::Error::Configuration(err) = &source {
            return Error::Config(err.to_string());
        }
        let code = match &source {
            sqlx::Error::Database(db) => db
                .code()
                .and_then(|c| c.parse::<i32>().ok())
                .and_then(ResultCode::from_code),
            _ => None,
        };
        Error::Database { code, source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Engine result code, when the failure came from the engine.
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Error::Database { code, .. } => *code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_message_leaves_source_to_the_chain() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), "execution failed (None)");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source, Some(sqlx::Error::RowNotFound.to_string()));
    }

    #[test]
    fn bad_connect_options_are_config_errors() {
        let err = Error::from(sqlx::Error::Configuration("unknown query parameter".into()));
        assert!(matches!(err, Error::Config(msg) if msg.contains("unknown query parameter")));
        assert_eq!(
            Error::from(sqlx::Error::Configuration("x".into())).result_code(),
            None
        );
    }
}
