use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 列出資料夾第一層的所有檔案（不遞迴），依檔名排序以取得穩定的快照
///
/// 不過濾副檔名：無法解碼的檔案會在處理階段被記錄為失敗
pub fn scan_input_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let files = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect();

    Ok(files)
}
