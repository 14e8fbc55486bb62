use thiserror::Error;

/// Failures of a single pipeline pass (load → fit → forecast).
///
/// `DataLoad` and `EmptyData` are fatal to a session: nothing can render
/// without a series. `FitDivergence` and `Forecast` are recoverable by
/// changing the parameters and running the pass again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("failed to load price data: {0}")]
    DataLoad(String),

    #[error("no price data: {0}")]
    EmptyData(String),

    #[error("SARIMA fit diverged: {0}")]
    FitDivergence(String),

    #[error("forecast failed: {0}")]
    Forecast(String),
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::DataLoad(_) => 2,
            PipelineError::EmptyData(_) => 3,
            PipelineError::FitDivergence(_) => 4,
            PipelineError::Forecast(_) => 5,
        }
    }
}

/// Exit code for terminal and logging failures.
pub const EXIT_TERMINAL: u8 = 6;

/// Exit code for a failed `--export` write.
pub const EXIT_EXPORT: u8 = 7;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(EXIT_TERMINAL, message)
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::new(EXIT_EXPORT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
