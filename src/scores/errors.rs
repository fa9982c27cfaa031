use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persist error: {0}")]
    Persist(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
