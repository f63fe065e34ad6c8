use thiserror::Error;

pub const NO_FILE_NOTICE: &str = "No file uploaded. Please upload an image.";

/// Failures on the `/predict` path. Each maps to a fixed message for the result page;
/// the wrapped detail only goes to the log.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("no image field in upload")]
    MissingFile,

    #[error("failed to read multipart upload: {0}")]
    Upload(String),

    #[error("failed to store upload: {0}")]
    Storage(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("inference failed: {0}")]
    Inference(String),
}

impl PredictError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PredictError::MissingFile => NO_FILE_NOTICE,
            PredictError::Upload(_) => "Error: The upload could not be read.",
            PredictError::Storage(_) => "Error: The uploaded file could not be saved.",
            PredictError::Decode(_) => "Error: The uploaded file is not a supported image.",
            PredictError::Inference(_) => "Error: The model could not classify this image.",
        }
    }
}

/// Startup failures while loading the classifier artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model from {path}: {reason}")]
    Load { path: String, reason: String },
}

impl From<ModelError> for std::io::Error {
    fn from(err: ModelError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
