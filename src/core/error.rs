use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search service returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Query is empty")]
    EmptyQuery,

    #[error("Search request ended without a response")]
    Aborted,
}

pub type Result<T> = std::result::Result<T, Error>;
