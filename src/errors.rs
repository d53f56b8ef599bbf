use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PortalError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(quarters::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(quarters::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(quarters::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(quarters::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("{0} not found")]
    #[diagnostic(code(quarters::not_found))]
    NotFound(&'static str),

    #[error("Validation failed: {0}")]
    #[diagnostic(code(quarters::validation))]
    Validation(String),

    #[error("Not authorized: {0}")]
    #[diagnostic(code(quarters::forbidden))]
    Forbidden(&'static str),

    #[error("Could not validate credentials")]
    #[diagnostic(code(quarters::unauthorized))]
    Unauthorized,

    /// Persistence-layer invariant rejection. Unreachable when the
    /// validation layer runs first; reported to callers the same way a
    /// validation failure is.
    #[error("Constraint violated: {0}")]
    #[diagnostic(code(quarters::constraint))]
    Constraint(String),

    #[error("Dependency failure: {0}")]
    #[diagnostic(code(quarters::dependency))]
    Dependency(String),
}

impl PortalError {
    /// Classify a database error: check-constraint rejections surface
    /// as `Constraint`, everything else stays a raw `Db` error.
    pub fn from_db(err: sea_orm::DbErr) -> Self {
        let text = err.to_string();
        if text.contains("CHECK constraint") || text.contains("check constraint") {
            PortalError::Constraint(text)
        } else {
            PortalError::Db(err)
        }
    }
}
