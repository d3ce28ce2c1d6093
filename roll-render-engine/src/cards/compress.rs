use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("image has no pixels")]
    Empty,
}

/// Scales an uploaded image to `width` pixels wide, keeping its aspect
/// ratio, and returns it as a JPEG data URL.
pub fn compress_image(bytes: &[u8], width: u32, quality: u8) -> Result<String, CompressError> {
    let image = image::load_from_memory(bytes).map_err(CompressError::Decode)?;
    if image.width() == 0 || image.height() == 0 || width == 0 {
        return Err(CompressError::Empty);
    }

    let height = ((u64::from(image.height()) * u64::from(width) + u64::from(image.width()) / 2)
        / u64::from(image.width()))
    .max(1) as u32;
    let resized = image
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgb8();

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality)
        .encode_image(&resized)
        .map_err(CompressError::Encode)?;

    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(encoded)))
}
