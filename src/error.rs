use thiserror::Error;

#[derive(Error, Debug)]
pub enum FundError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Invalid credentials")]
    Auth,

    #[error("Please log in first (run `fundbook login`)")]
    SessionRequired,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),
}

impl FundError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// True for failures the operator can't fix by changing their input.
    pub fn is_internal(&self) -> bool {
        match self {
            Self::Store(_) | Self::Io(_) | Self::Csv(_) | Self::Settings(_) => true,
            #[cfg(feature = "pdf")]
            Self::Pdf(_) => true,
            _ => false,
        }
    }

    /// Status line shown to the operator.
    pub fn user_message(&self) -> String {
        if self.is_internal() {
            "Something went wrong while saving or loading records. Please try again.".to_string()
        } else {
            self.to_string()
        }
    }
}

pub type Result<T> = std::result::Result<T, FundError>;
