use super::error::TileError;
use image::{DynamicImage, ImageBuffer, Luma};
use imageproc::filter::filter3x3;
use ndarray::{Array2, ArrayView3};
use std::num::TryFromIntError;

/// 每個像素一個非負的細節強度值
pub type DetailMap = Array2<f32>;

type GrayF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// BT.2020 亮度權重
const LUMA_WEIGHTS: [f32; 3] = [0.2627, 0.6780, 0.0593];

const LAPLACIAN_KERNEL: [f32; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];

pub fn build_detail_map(image: &DynamicImage) -> Result<DetailMap, TileError> {
    let rgb = image.to_rgb32f();
    let (width, height) = rgb.dimensions();
    let shape = (height as usize, width as usize, 3);
    let samples = ArrayView3::from_shape(shape, rgb.as_raw().as_slice())
        .map_err(|e| TileError::InvalidImage(e.to_string()))?;

    detail_map_from_samples(samples)
}

/// H×W×C 浮點樣本 → |Laplacian(luma)|
pub fn detail_map_from_samples(samples: ArrayView3<'_, f32>) -> Result<DetailMap, TileError> {
    let (height, width, channels) = samples.dim();
    if channels != 3 {
        return Err(TileError::InvalidImage(format!(
            "預期 3 個通道，實際為 {channels}"
        )));
    }
    if height == 0 || width == 0 {
        return Err(TileError::InvalidImage(format!(
            "圖片尺寸為空: {height}x{width}"
        )));
    }

    let gray = luminance(samples);
    let edges = laplacian(gray, width, height)?;
    let magnitudes: Vec<f32> = edges.into_iter().map(f32::abs).collect();
    // 非有限值會讓積分圖整片變成 NaN
    if let Some(index) = magnitudes.iter().position(|v| !v.is_finite()) {
        return Err(TileError::InvalidImage(format!(
            "細節值非有限數，位置 ({}, {})",
            index / width,
            index % width
        )));
    }

    Array2::from_shape_vec((height, width), magnitudes)
        .map_err(|e| TileError::InvalidImage(e.to_string()))
}

/// 以列優先順序輸出灰階值
fn luminance(samples: ArrayView3<'_, f32>) -> Vec<f32> {
    let (height, width, _) = samples.dim();
    let mut gray = Vec::with_capacity(height * width);
    for y in 0..height {
        for x in 0..width {
            gray.push(
                LUMA_WEIGHTS[0] * samples[[y, x, 0]]
                    + LUMA_WEIGHTS[1] * samples[[y, x, 1]]
                    + LUMA_WEIGHTS[2] * samples[[y, x, 2]],
            );
        }
    }
    gray
}

fn laplacian(gray: Vec<f32>, width: usize, height: usize) -> Result<Vec<f32>, TileError> {
    let too_large =
        |_: TryFromIntError| TileError::InvalidImage(format!("圖片尺寸過大: {height}x{width}"));
    let buffer_width = u32::try_from(width).map_err(too_large)?;
    let buffer_height = u32::try_from(height).map_err(too_large)?;

    let gray = GrayF32::from_raw(buffer_width, buffer_height, gray)
        .ok_or_else(|| TileError::InvalidImage("灰階緩衝區大小不符".to_string()))?;
    let edges: GrayF32 = filter3x3(&gray, &LAPLACIAN_KERNEL);

    Ok(edges.into_raw())
}
