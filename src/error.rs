use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoseError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Meal has no items to commit")]
    EmptyMeal,

    #[error("Invalid nutrition data: {0}")]
    InvalidNutrition(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<figment::Error> for DoseError {
    fn from(err: figment::Error) -> Self {
        DoseError::Config(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, DoseError>;
