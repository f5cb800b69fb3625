use super::job::{JobOutcome, JobReport, TileJob, process_image, run_isolated};
use super::worker::WorkerProcess;
use crate::config::ExecutionMode;
use crate::tools::Progress;
use anyhow::{Context, Result};
use log::{error, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;

/// 批次執行策略，建構時決定，透過 [`ExecutionStrategy::run_all`] 統一執行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Sequential,
    ThreadPool { workers: usize },
    ProcessPool { workers: usize, program: PathBuf },
}

#[must_use]
pub fn default_worker_count() -> usize {
    thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

impl ExecutionStrategy {
    /// 依設定建立策略；多程序模式以目前執行檔作為 worker
    pub fn from_mode(mode: ExecutionMode, workers: Option<usize>) -> Result<Self> {
        let workers = workers.unwrap_or_else(default_worker_count).max(1);

        Ok(match mode {
            ExecutionMode::Sequential => Self::Sequential,
            ExecutionMode::Thread => Self::ThreadPool { workers },
            ExecutionMode::Process => Self::ProcessPool {
                workers,
                program: std::env::current_exe().context("無法取得目前執行檔路徑")?,
            },
        })
    }

    /// 執行所有任務，全部完成後才回傳；結果順序與輸入相同
    ///
    /// 每個任務完成時遞增 `progress` 一次，不論成功、跳過或失敗
    pub fn run_all(&self, jobs: &[TileJob], progress: &Progress) -> Result<Vec<JobReport>> {
        let outcomes = match self {
            Self::Sequential => run_sequential(jobs, progress, process_image),
            Self::ThreadPool { workers } => {
                run_thread_pool(jobs, *workers, progress, process_image)?
            }
            Self::ProcessPool { workers, program } => {
                run_process_pool(jobs, *workers, program, progress)
            }
        };

        Ok(jobs
            .iter()
            .zip(outcomes)
            .map(|(job, outcome)| JobReport {
                input: job.input.clone(),
                outcome,
            })
            .collect())
    }
}

fn run_sequential<F>(jobs: &[TileJob], progress: &Progress, process: F) -> Vec<JobOutcome>
where
    F: Fn(&TileJob) -> Result<JobOutcome>,
{
    jobs.iter()
        .map(|job| {
            let outcome = run_isolated(job, &process);
            progress.advance();
            outcome
        })
        .collect()
}

fn run_thread_pool<F>(
    jobs: &[TileJob],
    workers: usize,
    progress: &Progress,
    process: F,
) -> Result<Vec<JobOutcome>>
where
    F: Fn(&TileJob) -> Result<JobOutcome> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("best-tile-{index}"))
        .build()
        .context("無法建立執行緒池")?;

    info!("使用 {workers} 個執行緒處理 {} 個任務", jobs.len());

    Ok(pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let outcome = run_isolated(job, &process);
                progress.advance();
                outcome
            })
            .collect()
    }))
}

fn run_process_pool(
    jobs: &[TileJob],
    workers: usize,
    program: &Path,
    progress: &Progress,
) -> Vec<JobOutcome> {
    let workers = workers.min(jobs.len()).max(1);
    info!(
        "使用 {workers} 個 worker 程序處理 {} 個任務: {}",
        jobs.len(),
        program.display()
    );

    let queue = Mutex::new(jobs.iter().enumerate());
    let mut outcomes: Vec<Option<JobOutcome>> = vec![None; jobs.len()];

    let queue = &queue;
    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| scope.spawn(move || drive_worker(program, queue, progress)))
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(finished) => {
                    for (index, outcome) in finished {
                        outcomes[index] = Some(outcome);
                    }
                }
                Err(_) => warn!("worker 調度執行緒發生 panic"),
            }
        }
    });

    outcomes
        .into_iter()
        .map(|outcome| {
            outcome.unwrap_or_else(|| JobOutcome::Failed {
                reason: "任務未取得結果".to_string(),
            })
        })
        .collect()
}

/// 一個調度執行緒負責一個 worker 程序：從共享佇列取任務、送出、等待結果
///
/// worker 中途結束時只有當下的任務記為失敗，下一個任務會重新啟動 worker
fn drive_worker<'a, I>(
    program: &Path,
    queue: &Mutex<I>,
    progress: &Progress,
) -> Vec<(usize, JobOutcome)>
where
    I: Iterator<Item = (usize, &'a TileJob)>,
{
    let mut finished = Vec::new();
    let mut worker: Option<WorkerProcess> = None;

    loop {
        let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
        let Some((index, job)) = next else {
            break;
        };

        let spawned = match worker.take() {
            Some(active) => Ok(active),
            None => WorkerProcess::spawn(program),
        };

        let outcome = match spawned {
            Ok(mut active) => match active.submit(job) {
                Ok(outcome) => {
                    worker = Some(active);
                    outcome
                }
                Err(e) => {
                    active.kill();
                    failed_outcome(job, &e)
                }
            },
            Err(e) => failed_outcome(job, &e),
        };

        finished.push((index, outcome));
        progress.advance();
    }

    if let Some(worker) = worker {
        worker.shutdown();
    }

    finished
}

fn failed_outcome(job: &TileJob, err: &anyhow::Error) -> JobOutcome {
    let reason = format!("{err:#}");
    error!("處理圖片失敗 {}: {reason}", job.input.display());
    JobOutcome::Failed { reason }
}
