use platform_api::ApiError;
use sea_orm::DbErr;
use thiserror::Error;

pub type MarketResult<T> = Result<T, MarketError>;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl MarketError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

impl From<MarketError> for ApiError {
    fn from(value: MarketError) -> Self {
        match value {
            MarketError::NotFound { .. } => ApiError::not_found(value.to_string()),
            MarketError::InvalidArgument(msg) => ApiError::InvalidArgument(msg),
            MarketError::Conflict(msg) => ApiError::Conflict(msg),
            MarketError::Forbidden(msg) => ApiError::Forbidden(msg),
            MarketError::Db(err) => ApiError::internal(err),
        }
    }
}
