use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackagingError {
    #[error("Invalid Recipe: {message}")]
    InvalidRecipe { message: String },
    #[error("Render Error: {message}")]
    RenderError { message: String },
}
