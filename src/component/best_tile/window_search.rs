//! 以積分圖（summed-area table）搜尋總和最大的 tile 視窗
//!
//! 建表 O(h·w)，每個候選位置的視窗總和 O(1)，整體 O(h·w)

use super::error::TileError;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// tile 左上角座標
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

impl Coordinate {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn scaled(self, factor: usize) -> Self {
        Self {
            row: self.row * factor,
            col: self.col * factor,
        }
    }
}

/// 搜尋結果：座標與該視窗的細節總和
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileMatch {
    pub coordinate: Coordinate,
    pub energy: f64,
}

/// 建立 (h+1)×(w+1) 的積分圖，第 0 列與第 0 行皆為 0
#[must_use]
pub fn integral_map(detail: ArrayView2<'_, f32>) -> Array2<f64> {
    let (height, width) = detail.dim();
    let mut integral = Array2::<f64>::zeros((height + 1, width + 1));

    for y in 1..=height {
        for x in 1..=width {
            integral[[y, x]] = integral[[y - 1, x]] + integral[[y, x - 1]]
                - integral[[y - 1, x - 1]]
                + f64::from(detail[[y - 1, x - 1]]);
        }
    }

    integral
}

#[inline]
fn window_sum(integral: &Array2<f64>, row: usize, col: usize, tile_size: usize) -> f64 {
    integral[[row + tile_size, col + tile_size]]
        - integral[[row, col + tile_size]]
        - integral[[row + tile_size, col]]
        + integral[[row, col]]
}

pub(crate) fn check_tile_size(
    tile_size: usize,
    height: usize,
    width: usize,
) -> Result<(), TileError> {
    if tile_size == 0 || tile_size > height || tile_size > width {
        return Err(TileError::InvalidTileSize {
            tile_size,
            height,
            width,
        });
    }
    Ok(())
}

/// 找出細節總和最大的 tile_size×tile_size 視窗
///
/// 以列優先順序掃描，總和相同時保留最先出現的座標
pub fn best_tile(detail: ArrayView2<'_, f32>, tile_size: usize) -> Result<TileMatch, TileError> {
    let (height, width) = detail.dim();
    check_tile_size(tile_size, height, width)?;

    let integral = integral_map(detail);
    let mut best = TileMatch {
        coordinate: Coordinate::new(0, 0),
        energy: f64::NEG_INFINITY,
    };

    for row in 0..=height - tile_size {
        for col in 0..=width - tile_size {
            let energy = window_sum(&integral, row, col, tile_size);
            if energy > best.energy {
                best = TileMatch {
                    coordinate: Coordinate::new(row, col),
                    energy,
                };
            }
        }
    }

    Ok(best)
}
