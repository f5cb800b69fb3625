use super::detail_map::build_detail_map;
use super::error::TileError;
use super::scale_adapter::locate_tile;
use super::tile_writer::{
    SizePolicy, clamp_coordinate, copy_original, size_policy, tile_output_path, write_tile,
};
use super::window_search::Coordinate;
use anyhow::Result;
use image::{DynamicImage, GenericImageView};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// 單一圖片的處理任務，可序列化以跨越程序邊界
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileJob {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub tile_size: usize,
    pub scale_factor: usize,
}

/// 單一任務的結果，失敗也是一種結果而非錯誤
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Cropped { coordinate: Coordinate },
    PassedThrough,
    Skipped { width: usize, height: usize },
    Failed { reason: String },
}

impl JobOutcome {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub input: PathBuf,
    pub outcome: JobOutcome,
}

pub fn load_image(path: &Path) -> Result<DynamicImage, TileError> {
    let image = image::ImageReader::open(path)
        .map_err(|e| TileError::InvalidImage(format!("{}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| TileError::InvalidImage(format!("{}: {e}", path.display())))?
        .decode()?;
    Ok(image)
}

/// 讀圖 → 尺寸判斷 → detail map → 搜尋 → 裁切寫出
pub fn process_image(job: &TileJob) -> Result<JobOutcome> {
    let image = load_image(&job.input)?;
    let (width, height) = image.dimensions();
    let (width, height) = (width as usize, height as usize);

    match size_policy(width, height, job.tile_size) {
        SizePolicy::Skip => {
            info!(
                "圖片小於 tile 尺寸，跳過: {} ({width}x{height})",
                job.input.display()
            );
            Ok(JobOutcome::Skipped { width, height })
        }
        SizePolicy::PassThrough => {
            let destination = copy_original(&job.input, &job.output_dir)?;
            info!(
                "圖片邊長等於 tile 尺寸，直接複製: {}",
                destination.display()
            );
            Ok(JobOutcome::PassedThrough)
        }
        SizePolicy::Search => {
            let detail = build_detail_map(&image)?;
            let found = locate_tile(detail.view(), job.tile_size, job.scale_factor)?;
            let coordinate = clamp_coordinate(found.coordinate, width, height, job.tile_size);
            if coordinate != found.coordinate {
                debug!(
                    "座標 ({}, {}) 超出範圍，夾回 ({}, {})",
                    found.coordinate.row, found.coordinate.col, coordinate.row, coordinate.col
                );
            }

            let destination = tile_output_path(&job.input, &job.output_dir);
            write_tile(&image, coordinate, job.tile_size, &destination)?;
            debug!(
                "{}: tile ({}, {}) energy {:.4}",
                job.input.display(),
                coordinate.row,
                coordinate.col,
                found.energy
            );

            Ok(JobOutcome::Cropped { coordinate })
        }
    }
}

/// 執行單一任務並隔離錯誤與 panic，任何情況下都回傳結果
#[must_use]
pub fn run_job(job: &TileJob) -> JobOutcome {
    run_isolated(job, process_image)
}

/// 以 `process` 處理任務，錯誤與 panic 都轉為 [`JobOutcome::Failed`]
pub(crate) fn run_isolated<F>(job: &TileJob, process: F) -> JobOutcome
where
    F: FnOnce(&TileJob) -> Result<JobOutcome>,
{
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| process(job))) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => JobOutcome::Failed {
            reason: format!("{e:#}"),
        },
        Err(payload) => JobOutcome::Failed {
            reason: panic_message(payload.as_ref()),
        },
    };

    if let JobOutcome::Failed { reason } = &outcome {
        error!("處理圖片失敗 {}: {reason}", job.input.display());
    }

    outcome
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map_or_else(|| "處理時發生 panic".to_string(), |msg| format!("panic: {msg}"))
}
