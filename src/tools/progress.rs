use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// 批次進度：跨執行緒共享的完成計數器，以及對應的進度條
///
/// 以 clone 明確傳入每個 worker，計數器只增不減
#[derive(Clone)]
pub struct Progress {
    completed: Arc<AtomicUsize>,
    bar: ProgressBar,
}

impl Progress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message("處理圖片中...");
        Self::with_bar(bar)
    }

    /// 不繪製進度條，只計數（quiet 模式與測試使用）
    #[must_use]
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            bar,
        }
    }

    pub fn advance(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("完成");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_advance_across_threads() {
        let progress = Progress::hidden();

        thread::scope(|scope| {
            for _ in 0..4 {
                let progress = progress.clone();
                scope.spawn(move || {
                    for _ in 0..25 {
                        progress.advance();
                    }
                });
            }
        });

        assert_eq!(progress.completed(), 100);
    }
}
