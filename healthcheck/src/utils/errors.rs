use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Invalid port '{value}': {message}")]
    InvalidPort { value: String, message: String },
    #[error("Invalid health path '{value}': {message}")]
    InvalidPath { value: String, message: String },
    #[error("Invalid timeout: {message}")]
    InvalidTimeout { message: String },
    #[error("Invalid healthcheck policy: {message}")]
    InvalidPolicy { message: String },
    #[error("Client Init Error: {message}")]
    ClientInitError { message: String },
}
