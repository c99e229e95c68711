use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScholarError>;

#[derive(Debug, Error)]
pub enum ScholarError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error (status {status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("failed to parse {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
