//! 最佳 tile 擷取元件
//!
//! 每張圖片的處理流程：
//! A. 轉為 detail map（BT.2020 灰階 → Laplacian → 絕對值）
//! B. 視需要縮小 detail map
//! C. 以積分圖搜尋總和最大的視窗
//! D. 在原解析度裁切並寫出
//!
//! 批次可循序、多執行緒或多程序執行，單一任務失敗不影響其他任務。

mod detail_map;
mod error;
mod executor;
mod job;
mod main;
mod scale_adapter;
mod tile_writer;
mod window_search;
pub mod worker;

pub use detail_map::{DetailMap, build_detail_map, detail_map_from_samples};
pub use error::TileError;
pub use executor::{ExecutionStrategy, default_worker_count};
pub use job::{JobOutcome, JobReport, TileJob, load_image, process_image, run_job};
pub use main::{BatchSummary, BestTile};
pub use scale_adapter::{box_downsample, locate_tile};
pub use tile_writer::{SizePolicy, clamp_coordinate, size_policy, tile_output_path};
pub use window_search::{Coordinate, TileMatch, best_tile, integral_map};
