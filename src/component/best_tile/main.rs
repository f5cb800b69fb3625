use super::executor::ExecutionStrategy;
use super::job::{JobOutcome, JobReport, TileJob};
use crate::config::Config;
use crate::tools::{Progress, ensure_directory_exists, scan_input_files, validate_directory_exists};
use anyhow::Result;
use console::style;
use log::info;
use std::path::PathBuf;

/// 批次處理結果統計
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub cropped: usize,
    pub passed_through: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 進度計數器的最終值
    pub completed: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    #[must_use]
    pub fn from_reports(reports: &[JobReport], completed: usize) -> Self {
        let mut summary = Self {
            total: reports.len(),
            completed,
            ..Self::default()
        };

        for report in reports {
            match &report.outcome {
                JobOutcome::Cropped { .. } => summary.cropped += 1,
                JobOutcome::PassedThrough => summary.passed_through += 1,
                JobOutcome::Skipped { .. } => summary.skipped += 1,
                JobOutcome::Failed { reason } => {
                    summary.failed += 1;
                    summary.failures.push((report.input.clone(), reason.clone()));
                }
            }
        }

        summary
    }

    #[must_use]
    pub const fn succeeded(&self) -> usize {
        self.cropped + self.passed_through
    }
}

/// 最佳 tile 擷取器
///
/// 對輸入資料夾中的每張圖片找出細節最多的 tile 並寫到輸出資料夾：
/// 1. 掃描輸入檔案（一次性快照）
/// 2. 建立輸出資料夾
/// 3. 依執行策略處理所有任務
/// 4. 彙整結果
pub struct BestTile {
    input_dir: PathBuf,
    output_dir: PathBuf,
    tile_size: usize,
    scale_factor: usize,
    strategy: ExecutionStrategy,
    show_progress: bool,
}

impl BestTile {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            input_dir: config.input_path.clone(),
            output_dir: config.output_path.clone(),
            tile_size: config.tile_size,
            scale_factor: config.scale_factor,
            strategy: ExecutionStrategy::from_mode(config.execution_mode, config.workers)?,
            show_progress: true,
        })
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// 不顯示進度條
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn run(&self) -> Result<BatchSummary> {
        validate_directory_exists(&self.input_dir)?;
        ensure_directory_exists(&self.output_dir)?;

        let jobs: Vec<TileJob> = scan_input_files(&self.input_dir)?
            .into_iter()
            .map(|input| TileJob {
                input,
                output_dir: self.output_dir.clone(),
                tile_size: self.tile_size,
                scale_factor: self.scale_factor,
            })
            .collect();

        info!(
            "開始處理 {} 張圖片: tile {}，縮放倍率 {}，策略 {:?}",
            jobs.len(),
            self.tile_size,
            self.scale_factor,
            self.strategy
        );

        let progress = if self.show_progress {
            Progress::new(jobs.len())
        } else {
            Progress::hidden()
        };

        let reports = self.strategy.run_all(&jobs, &progress)?;
        progress.finish();

        let summary = BatchSummary::from_reports(&reports, progress.completed());
        info!(
            "處理完成 - 裁切: {}, 複製: {}, 跳過: {}, 失敗: {}",
            summary.cropped, summary.passed_through, summary.skipped, summary.failed
        );

        Ok(summary)
    }

    pub fn print_summary(&self, summary: &BatchSummary) {
        println!();
        println!("{}", style("=== 最佳 tile 擷取摘要 ===").cyan().bold());
        println!("  總計: {} 張圖片", summary.total);
        println!("  裁切: {} 張", style(summary.cropped).green());

        if summary.passed_through > 0 {
            println!("  直接複製: {} 張", style(summary.passed_through).green());
        }

        if summary.skipped > 0 {
            println!("  跳過: {} 張", style(summary.skipped).yellow());
        }

        if summary.failed > 0 {
            println!("  失敗: {} 張", style(summary.failed).red());
            for (path, reason) in &summary.failures {
                println!("    {} {}: {}", style("✗").red(), path.display(), reason);
            }
        }

        println!("  輸出資料夾: {}", self.output_dir.display());
    }
}
