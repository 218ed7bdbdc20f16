#[derive(thiserror::Error, Debug)]
pub enum DetError {
    #[error("Invalid input shape: {0}")]
    InvalidInputShape(String),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Invalid original image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}
