//! 多程序模式的 worker 協定
//!
//! 父程序以隱藏參數 `--tile-worker` 重新啟動自身作為 worker。
//! 每個 worker 從 stdin 逐行讀取 JSON 格式的 [`TileJob`]，處理後將 [`JobOutcome`] 以單行 JSON
//! 寫回 stdout。日誌一律寫到 stderr，stdout 只用於協定。

use super::job::{JobOutcome, TileJob, run_job};
use anyhow::{Context, Result, bail};
use log::{debug, warn};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub const WORKER_FLAG: &str = "--tile-worker";

/// worker 端主迴圈：讀到 EOF 時結束
pub fn serve<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<()> {
    for line in reader.lines() {
        let line = line.context("無法讀取任務")?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match serde_json::from_str::<TileJob>(&line) {
            Ok(job) => run_job(&job),
            Err(e) => JobOutcome::Failed {
                reason: format!("無法解析任務: {e}"),
            },
        };

        serde_json::to_writer(&mut writer, &outcome).context("無法序列化結果")?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    Ok(())
}

/// 父程序端持有的 worker 程序
pub struct WorkerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl WorkerProcess {
    pub fn spawn(program: &Path) -> Result<Self> {
        let mut child = Command::new(program)
            .arg(WORKER_FLAG)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("無法啟動 worker 程序: {}", program.display()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("無法取得 worker stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow::anyhow!("無法取得 worker stdout"))?;

        debug!("啟動 worker [{}]", child.id());

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// 送出一個任務並等待其結果
    pub fn submit(&mut self, job: &TileJob) -> Result<JobOutcome> {
        let mut request = serde_json::to_string(job).context("無法序列化任務")?;
        request.push('\n');
        self.stdin
            .write_all(request.as_bytes())
            .and_then(|()| self.stdin.flush())
            .context("無法傳送任務給 worker")?;

        let mut response = String::new();
        let bytes_read = self
            .stdout
            .read_line(&mut response)
            .context("無法讀取 worker 結果")?;
        if bytes_read == 0 {
            bail!("worker [{}] 在處理任務時結束", self.child.id());
        }

        serde_json::from_str(&response)
            .with_context(|| format!("無法解析 worker 結果: {}", response.trim()))
    }

    /// 關閉 stdin 讓 worker 正常結束
    pub fn shutdown(self) {
        let Self {
            mut child, stdin, ..
        } = self;
        drop(stdin);

        match child.wait() {
            Ok(status) if !status.success() => {
                warn!("worker [{}] 結束狀態異常: {status}", child.id());
            }
            Ok(_) => {}
            Err(e) => warn!("無法等待 worker [{}]: {e}", child.id()),
        }
    }

    /// 強制終止（worker 已失去回應時使用）
    pub fn kill(mut self) {
        let pid = self.child.id();
        if let Err(e) = self.child.kill() {
            debug!("終止 worker [{pid}] 失敗: {e}");
        }
        if let Err(e) = self.child.wait() {
            debug!("無法回收 worker [{pid}]: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_serve_answers_one_line_per_job() {
        let temp_dir = TempDir::new().unwrap();
        let small = temp_dir.path().join("small.png");
        RgbImage::new(4, 4).save(&small).unwrap();

        let jobs = [
            TileJob {
                input: small,
                output_dir: temp_dir.path().to_path_buf(),
                tile_size: 8,
                scale_factor: 1,
            },
            TileJob {
                input: temp_dir.path().join("missing.png"),
                output_dir: temp_dir.path().to_path_buf(),
                tile_size: 8,
                scale_factor: 1,
            },
        ];
        let mut input = String::new();
        for job in &jobs {
            input.push_str(&serde_json::to_string(job).unwrap());
            input.push('\n');
        }
        input.push_str("not json\n");

        let mut output = Vec::new();
        serve(Cursor::new(input), &mut output).unwrap();

        let outcomes: Vec<JobOutcome> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            outcomes[0],
            JobOutcome::Skipped {
                width: 4,
                height: 4
            }
        );
        assert!(outcomes[1].is_failed());
        assert!(outcomes[2].is_failed());
    }

    #[test]
    fn test_serve_empty_input() {
        let mut output = Vec::new();
        serve(Cursor::new(""), &mut output).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_spawn_missing_program_fails() {
        let result = WorkerProcess::spawn(Path::new("/nonexistent/best_tile_worker"));
        assert!(result.is_err());
    }
}
