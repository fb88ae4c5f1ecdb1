use ingest::IngestError;
use rates::RateError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("external rate source: {0}")]
    ExternalSource(String),
    #[error("{0}")]
    NotFound(String),
    #[error("gap fill failed: {0}")]
    GapFill(String),
    #[error("db error: {0}")]
    Db(#[from] ggr_db::DbError),
    #[error("ingest error: {0}")]
    Ingest(IngestError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::Db(err) => Self::Db(err),
            other => Self::ExternalSource(other.to_string()),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        if err.is_validation() {
            return Self::Validation(err.to_string());
        }
        match err {
            IngestError::Rates(err) => err.into(),
            IngestError::Db(err) => Self::Db(err),
            other => Self::Ingest(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match err {
            AppError::Validation(_) => (400, Some("validation".to_string())),
            AppError::NotFound(_) => (404, Some("not_found".to_string())),
            AppError::ExternalSource(_) => (502, Some("external_source".to_string())),
            AppError::GapFill(_) => (500, Some("gap_fill".to_string())),
            AppError::Db(_)
            | AppError::Ingest(_)
            | AppError::Io(_)
            | AppError::Serde(_)
            | AppError::Csv(_) => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err: AppError = IngestError::NoFiles.into();
        let api = ApiError::from(err);
        assert_eq!(api.status, 400);
        assert_eq!(api.code.as_deref(), Some("validation"));
    }

    #[test]
    fn rate_failures_map_to_bad_gateway() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let err: AppError = IngestError::Rates(RateError::Unsuccessful {
            date,
            detail: "invalid_access_key".to_string(),
        })
        .into();
        assert!(matches!(err, AppError::ExternalSource(_)));
        assert_eq!(ApiError::from(err).status, 502);
    }

    #[test]
    fn not_found_keeps_message() {
        let api = ApiError::from(AppError::NotFound("no data for 2024-06-01".to_string()));
        assert_eq!(api.status, 404);
        assert_eq!(api.message, "no data for 2024-06-01");
    }
}
