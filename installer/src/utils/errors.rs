use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Unsupported architecture '{reported}', expected one of: {supported}")]
    UnsupportedArchitecture { reported: String, supported: String },
    #[error("Architecture Detection Error: {message}")]
    ArchitectureDetectionError { message: String },
    #[error("Invalid url template '{template}': {message}")]
    InvalidUrlTemplate { template: String, message: String },
    #[error("Fetch Error: {message}, Url: {url}")]
    FetchError { url: String, message: String },
    #[error("Verification Error: {message}")]
    VerificationError { message: String },
    #[error("Write Error: {message}, Path: {path:?}")]
    WriteError { path: PathBuf, message: String },
}
