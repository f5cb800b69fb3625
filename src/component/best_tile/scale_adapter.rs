use super::detail_map::DetailMap;
use super::error::TileError;
use super::window_search::{TileMatch, best_tile, check_tile_size};
use ndarray::{Array2, ArrayView2, s};

/// 以 factor×factor 區塊平均縮小，輸出尺寸為 (h/factor, w/factor)，捨去不足一區塊的邊緣
#[must_use]
pub fn box_downsample(detail: ArrayView2<'_, f32>, factor: usize) -> DetailMap {
    let (height, width) = detail.dim();

    Array2::from_shape_fn((height / factor, width / factor), |(y, x)| {
        detail
            .slice(s![
                y * factor..(y + 1) * factor,
                x * factor..(x + 1) * factor
            ])
            .mean()
            .unwrap_or(0.0)
    })
}

/// 在縮小 `scale_factor` 倍的 detail map 上搜尋，再將座標放大回原解析度
///
/// `tile_size` 無法被整除時，實際搜尋的視窗為 (tile_size / scale_factor) * scale_factor，
/// 比 tile_size 略小；回傳的座標不做修正。`energy` 為縮小後 map 上的總和。
pub fn locate_tile(
    detail: ArrayView2<'_, f32>,
    tile_size: usize,
    scale_factor: usize,
) -> Result<TileMatch, TileError> {
    match scale_factor {
        0 => Err(TileError::InvalidScaleFactor(scale_factor)),
        1 => best_tile(detail, tile_size),
        _ => {
            let (height, width) = detail.dim();
            check_tile_size(tile_size, height, width)?;

            let reduced_tile = tile_size / scale_factor;
            let reduced = box_downsample(detail, scale_factor);
            let (reduced_height, reduced_width) = reduced.dim();
            check_tile_size(reduced_tile, reduced_height, reduced_width)?;

            let found = best_tile(reduced.view(), reduced_tile)?;
            Ok(TileMatch {
                coordinate: found.coordinate.scaled(scale_factor),
                energy: found.energy,
            })
        }
    }
}
