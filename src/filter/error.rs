use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),
}

impl FilterError {
    /// Name of the query parameter that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::InvalidLimit(_) => "limit",
            FilterError::InvalidOffset(_) => "offset",
        }
    }
}
