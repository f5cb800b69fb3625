use crate::config::types::Config;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

pub const SETTINGS_FILE: &str = "best_tile.json";

impl Config {
    /// 從工作目錄的設定檔載入，檔案不存在時使用預設值
    pub fn new() -> Result<Self> {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_path.as_os_str().is_empty() {
            bail!("未設定輸入資料夾");
        }
        if self.output_path.as_os_str().is_empty() {
            bail!("未設定輸出資料夾");
        }
        if self.tile_size == 0 {
            bail!("tile_size 必須為正整數");
        }
        if self.scale_factor == 0 {
            bail!("scale_factor 必須為正整數");
        }
        if self.tile_size / self.scale_factor == 0 {
            bail!(
                "tile_size {} 在 scale_factor {} 下縮小後小於 1",
                self.tile_size,
                self.scale_factor
            );
        }
        if self.workers == Some(0) {
            bail!("workers 必須為正整數");
        }
        Ok(())
    }
}
