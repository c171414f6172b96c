use std::io::Cursor;

use crashlens_application::{ApplicationError, ImageEncoder};
use crashlens_domain::RasterFrame;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder as _, ImageReader};

#[derive(Debug, Default)]
pub struct ImageCrateJpegEncoder;

impl ImageEncoder for ImageCrateJpegEncoder {
    fn encode_jpeg(&self, frame: &RasterFrame, quality: u8) -> Result<Vec<u8>, ApplicationError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(ApplicationError::Encode(
                "cannot encode an empty frame".to_string(),
            ));
        }
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
            .write_image(
                frame.pixels(),
                frame.width(),
                frame.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|error| ApplicationError::Encode(error.to_string()))?;
        Ok(out)
    }
}

/// Decodes any supported still (JPEG, PNG, WebP) into RGB8.
pub fn decode_rgb(bytes: &[u8]) -> Result<RasterFrame, ApplicationError> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?
        .decode()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?
        .into_rgb8();
    let (width, height) = image.dimensions();
    Ok(RasterFrame::new(width, height, image.into_raw())?)
}

/// Like [`decode_rgb`] but shrunk to fit `max_side`, for thumbnails.
pub fn decode_thumbnail(bytes: &[u8], max_side: u32) -> Result<RasterFrame, ApplicationError> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?
        .decode()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?
        .thumbnail(max_side, max_side)
        .into_rgb8();
    let (width, height) = image.dimensions();
    Ok(RasterFrame::new(width, height, image.into_raw())?)
}
