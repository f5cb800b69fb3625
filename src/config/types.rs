use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_TILE_SIZE: usize = 512;
pub const DEFAULT_SCALE_FACTOR: usize = 1;

/// 批次執行模式，於建構時決定，執行期間不可變更
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Thread,
    Process,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sequential => "sequential",
            Self::Thread => "thread",
            Self::Process => "process",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub tile_size: usize,
    pub execution_mode: ExecutionMode,
    pub scale_factor: usize,
    /// 平行模式的 worker 數量，未設定時使用可用的 CPU 數
    pub workers: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_path: PathBuf::new(),
            tile_size: DEFAULT_TILE_SIZE,
            execution_mode: ExecutionMode::default(),
            scale_factor: DEFAULT_SCALE_FACTOR,
            workers: None,
        }
    }
}
