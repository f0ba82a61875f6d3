use thiserror::Error;

pub type MapResult<T> = Result<T, MapError>;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid gradient bounds: lower={lower}, upper={upper}")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("overlay `{manager}` failed: {message}")]
    Overlay {
        manager: &'static str,
        message: String,
    },
}
