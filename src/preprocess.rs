use crate::config::INPUT_SIDE;
use crate::error::PredictError;
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use std::path::Path;

pub const CHANNELS: usize = 3;

/// NHWC batch of one image, raw 0-255 RGB values.
#[derive(Debug, Clone)]
pub struct PreprocessedTensor {
    pub data: Array4<f32>,
}

impl PreprocessedTensor {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

pub fn load_image(path: &Path) -> Result<PreprocessedTensor, PredictError> {
    // content decides the format, not the extension
    let img = image::io::Reader::open(path)?
        .with_guessed_format()?
        .decode()?;
    Ok(to_tensor(&img))
}

pub fn to_tensor(img: &DynamicImage) -> PreprocessedTensor {
    let side = INPUT_SIDE as usize;
    // stretch, no crop or padding
    let resized = img
        .resize_exact(INPUT_SIDE, INPUT_SIDE, FilterType::Nearest)
        .to_rgb8();

    let mut data = Array4::<f32>::zeros((1, side, side, CHANNELS));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..CHANNELS {
            data[[0, y as usize, x as usize, c]] = pixel[c] as f32;
        }
    }

    PreprocessedTensor { data }
}
