use thiserror::Error;

use crate::raster::PixelEncoding;

pub type Result<T> = std::result::Result<T, ResampleError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ResampleError {
    #[error("Geo transform is uninvertible: {gt:?}")]
    DegenerateTransform { gt: [f64; 6] },
    #[error("Projection unavailable: {0}")]
    ProjectionUnavailable(String),
    #[error("Unable to transform coordinates from '{from}' to '{to}'{}", msg.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    InvalidCoordinateRange {
        from: String,
        to: String,
        msg: Option<String>,
    },
    #[error("Dataset read error: {0}")]
    DatasetRead(String),
    #[error("Unsupported encoding: source '{src}', destination '{dst}'")]
    UnsupportedEncoding {
        src: PixelEncoding,
        dst: PixelEncoding,
    },
    #[error("Bad argument: {0}")]
    BadArgument(String),
}
