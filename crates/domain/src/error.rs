use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("image {0} has an empty payload")]
    EmptyImage(String),
    #[error("raster buffer of {width}x{height} does not match {actual} bytes")]
    RasterSize {
        width: u32,
        height: u32,
        actual: usize,
    },
    #[error("malformed report: {0}")]
    MalformedReport(String),
}
