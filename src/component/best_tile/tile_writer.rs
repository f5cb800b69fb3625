use super::window_search::Coordinate;
use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// 依圖片尺寸決定處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// 任一邊小於 tile：不輸出
    Skip,
    /// 任一邊剛好等於 tile：原檔直接複製
    PassThrough,
    Search,
}

#[must_use]
pub const fn size_policy(width: usize, height: usize, tile_size: usize) -> SizePolicy {
    if height < tile_size || width < tile_size {
        SizePolicy::Skip
    } else if height == tile_size || width == tile_size {
        SizePolicy::PassThrough
    } else {
        SizePolicy::Search
    }
}

/// `<原檔名去除副檔名>.png`
#[must_use]
pub fn tile_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "tile".to_string(), |s| s.to_string_lossy().to_string());
    output_dir.join(format!("{stem}.png"))
}

/// 將座標夾回 [0, H−T] × [0, W−T]，確保裁切範圍完整落在圖片內
///
/// T 無法被縮放倍率整除時，放大回原解析度的座標可能超出範圍。
/// 此時輸出仍是完整的 T×T，起點往左上移動，而不是從原座標切出較小的 tile。
#[must_use]
pub fn clamp_coordinate(
    coordinate: Coordinate,
    width: usize,
    height: usize,
    tile_size: usize,
) -> Coordinate {
    Coordinate::new(
        coordinate.row.min(height.saturating_sub(tile_size)),
        coordinate.col.min(width.saturating_sub(tile_size)),
    )
}

/// 原檔以原檔名複製到輸出資料夾，內容不做任何變更
pub fn copy_original(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("無法取得檔案名稱: {}", input.display()))?;
    let destination = output_dir.join(file_name);

    fs::copy(input, &destination).with_context(|| {
        format!(
            "無法複製檔案: {} -> {}",
            input.display(),
            destination.display()
        )
    })?;

    Ok(destination)
}

/// 裁切 tile_size×tile_size 並以 PNG 寫出，已存在的同名檔案會被覆寫
pub fn write_tile(
    image: &DynamicImage,
    coordinate: Coordinate,
    tile_size: usize,
    destination: &Path,
) -> Result<()> {
    let to_u32 = |value: usize| u32::try_from(value).context("裁切範圍超出 u32");
    let tile = image.crop_imm(
        to_u32(coordinate.col)?,
        to_u32(coordinate.row)?,
        to_u32(tile_size)?,
        to_u32(tile_size)?,
    );

    // PNG 不支援浮點樣本
    let tile = match tile {
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(tile.to_rgb16()),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(tile.to_rgba16()),
        other => other,
    };

    tile.save_with_format(destination, ImageFormat::Png)
        .with_context(|| format!("無法寫出 tile: {}", destination.display()))?;

    debug!(
        "已寫出 tile ({}, {}) -> {}",
        coordinate.row,
        coordinate.col,
        destination.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, Rgb32FImage, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_size_policy() {
        assert_eq!(size_policy(100, 40, 64), SizePolicy::Skip);
        assert_eq!(size_policy(40, 100, 64), SizePolicy::Skip);
        assert_eq!(size_policy(64, 100, 64), SizePolicy::PassThrough);
        assert_eq!(size_policy(100, 64, 64), SizePolicy::PassThrough);
        assert_eq!(size_policy(64, 64, 64), SizePolicy::PassThrough);
        assert_eq!(size_policy(65, 100, 64), SizePolicy::Search);
        // 一邊過小優先於另一邊相等
        assert_eq!(size_policy(64, 63, 64), SizePolicy::Skip);
    }

    #[test]
    fn test_tile_output_path() {
        let output_dir = Path::new("/out");
        assert_eq!(
            tile_output_path(Path::new("/in/photo.final.jpg"), output_dir),
            PathBuf::from("/out/photo.final.png")
        );
        assert_eq!(
            tile_output_path(Path::new("/in/raw"), output_dir),
            PathBuf::from("/out/raw.png")
        );
    }

    #[test]
    fn test_clamp_coordinate() {
        let clamped = clamp_coordinate(Coordinate::new(6, 2), 10, 10, 5);
        assert_eq!(clamped, Coordinate::new(5, 2));

        // 10×10、T=5、S=2 的放大座標 (6, 6) 仍輸出完整 5×5
        let drifted = clamp_coordinate(Coordinate::new(6, 6), 10, 10, 5);
        assert_eq!(drifted, Coordinate::new(5, 5));

        let untouched = clamp_coordinate(Coordinate::new(3, 4), 10, 10, 5);
        assert_eq!(untouched, Coordinate::new(3, 4));
    }

    #[test]
    fn test_write_tile_crops_expected_region() {
        let temp_dir = TempDir::new().unwrap();
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(10, 8, |x, y| {
            Rgb([x as u8 * 10, y as u8 * 10, 0])
        }));
        let destination = temp_dir.path().join("tile.png");

        write_tile(&image, Coordinate::new(2, 5), 3, &destination).unwrap();

        let tile = image::open(&destination).unwrap();
        assert_eq!(tile.dimensions(), (3, 3));
        let rgb = tile.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([50, 20, 0]));
        assert_eq!(rgb.get_pixel(2, 2), &Rgb([70, 40, 0]));
    }

    #[test]
    fn test_write_tile_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("tile.png");
        fs::write(&destination, b"stale").unwrap();

        let image = DynamicImage::ImageRgb8(RgbImage::new(6, 6));
        write_tile(&image, Coordinate::new(0, 0), 4, &destination).unwrap();

        assert_eq!(image::open(&destination).unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn test_write_float_image_as_png() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("hdr.png");
        let image = DynamicImage::ImageRgb32F(Rgb32FImage::from_pixel(6, 6, Rgb([0.5, 0.25, 1.0])));

        write_tile(&image, Coordinate::new(1, 1), 4, &destination).unwrap();

        assert_eq!(image::open(&destination).unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn test_copy_original_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("source.jpeg");
        let output_dir = temp_dir.path().join("out");
        fs::create_dir(&output_dir).unwrap();
        fs::write(&input, b"not really a jpeg").unwrap();

        let destination = copy_original(&input, &output_dir).unwrap();

        assert_eq!(destination, output_dir.join("source.jpeg"));
        assert_eq!(fs::read(&destination).unwrap(), b"not really a jpeg");
    }
}
