use std::fmt;

/// 選圖演算法的錯誤類型
#[derive(Debug)]
pub enum TileError {
    /// 解碼失敗，或通道數、尺寸不符合預期
    InvalidImage(String),
    /// tile 尺寸（或縮小後的尺寸）為 0 或超過 detail map
    InvalidTileSize {
        tile_size: usize,
        height: usize,
        width: usize,
    },
    InvalidScaleFactor(usize),
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImage(msg) => write!(f, "無效的圖片: {msg}"),
            Self::InvalidTileSize {
                tile_size,
                height,
                width,
            } => write!(
                f,
                "無效的 tile 尺寸 {tile_size}（detail map 為 {height}x{width}）"
            ),
            Self::InvalidScaleFactor(factor) => write!(f, "無效的縮放倍率: {factor}"),
        }
    }
}

impl std::error::Error for TileError {}

impl From<image::ImageError> for TileError {
    fn from(err: image::ImageError) -> Self {
        Self::InvalidImage(err.to_string())
    }
}
