use anyhow::Result;
use best_tile::component::BestTile;
use best_tile::component::best_tile::worker::{self, WORKER_FLAG};
use best_tile::config::{Config, SETTINGS_FILE, save_settings};
use best_tile::init;
use console::style;
use dialoguer::Input;
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    init::init();

    // 多程序模式下由父程序以隱藏參數啟動
    if std::env::args().nth(1).as_deref() == Some(WORKER_FLAG) {
        return worker::serve(io::stdin().lock(), io::stdout().lock());
    }

    let mut config = Config::new()?;
    let prompted = prompt_missing_paths(&mut config)?;

    println!("{}", style("=== 最佳 tile 擷取 ===").cyan().bold());
    println!(
        "  tile: {} | 縮放倍率: {} | 模式: {}",
        config.tile_size, config.scale_factor, config.execution_mode
    );

    let best_tile = BestTile::new(&config)?;

    if prompted && let Err(e) = save_settings(&config, Path::new(SETTINGS_FILE)) {
        warn!("無法儲存設定: {e:#}");
    }

    let summary = best_tile.run()?;
    best_tile.print_summary(&summary);

    info!("Program exited normally");
    Ok(())
}

/// 設定檔未指定輸入或輸出資料夾時詢問使用者，回傳是否有詢問
fn prompt_missing_paths(config: &mut Config) -> Result<bool> {
    let mut prompted = false;

    if config.input_path.as_os_str().is_empty() {
        config.input_path = prompt_path("請輸入圖片資料夾路徑")?;
        prompted = true;
    }

    if config.output_path.as_os_str().is_empty() {
        config.output_path = prompt_path("請輸入 tile 輸出資料夾路徑")?;
        prompted = true;
    }

    Ok(prompted)
}

fn prompt_path(prompt: &str) -> Result<PathBuf> {
    let path: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(PathBuf::from(path.trim()))
}
