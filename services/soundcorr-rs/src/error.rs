use thiserror::Error;

pub type Result<T> = std::result::Result<T, SoundChangeError>;

#[derive(Error, Debug)]
pub enum SoundChangeError {
    /// Required input is absent; nothing was computed and state is untouched.
    #[error("Missing input: {0}")]
    InputMissing(String),

    #[error("No analysis has been run yet")]
    NoAnalysis,

    #[error("{0} oracle is not available")]
    OracleUnavailable(&'static str),

    /// Input is present but malformed, e.g. a non-numeric row id.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Wordlist parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Oracle(#[from] soundcorr_phonetic::OracleError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
