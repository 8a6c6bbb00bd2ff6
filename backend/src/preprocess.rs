use image::imageops::FilterType;

use crate::error::ScanError;

pub const INPUT_SIZE: u32 = 224;
pub const INPUT_CHANNELS: usize = 3;
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, INPUT_CHANNELS];

/// Batch of one RGB image in NHWC layout, pixels scaled to [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
}

impl InputTensor {
    pub fn shape(&self) -> &'static [usize] {
        &INPUT_SHAPE
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

pub fn preprocess(bytes: &[u8]) -> Result<InputTensor, ScanError> {
    if bytes.is_empty() {
        return Err(ScanError::Preprocessing("empty image upload".to_string()));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| ScanError::Preprocessing(format!("cannot decode image: {}", e)))?;
    let rgb = img
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
        .to_rgb8();

    let data = rgb
        .pixels()
        .flat_map(|p| p.0.into_iter().map(scale_pixel))
        .collect();

    Ok(InputTensor { data })
}

// MobileNetV2 convention.
fn scale_pixel(value: u8) -> f32 {
    f32::from(value) / 127.5 - 1.0
}
