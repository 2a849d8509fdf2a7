use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Source of the candidate files for a workspace request.
#[async_trait::async_trait]
pub trait FileLister: Send + Sync {
    async fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

/// Lists tracked files plus untracked files that are not ignored, by
/// running `git ls-files` in the workspace root.
#[derive(Debug, Clone, Default)]
pub struct GitCli;

#[async_trait::async_trait]
impl FileLister for GitCli {
    async fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let output = Command::new("git")
            .args([
                "-c",
                "core.quotepath=off",
                "ls-files",
                "--cached",
                "--others",
                "--exclude-standard",
            ])
            .current_dir(root)
            .output()
            .await
            .context("Failed to execute git ls-files - ensure git is installed")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git ls-files failed: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let files = parse_ls_files(root, &stdout);
        debug!(count = files.len(), ?root, "git ls-files");
        Ok(files)
    }
}

pub fn parse_ls_files(root: &Path, stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| root.join(line))
        .collect()
}

/// Nearest directory at or above `start` containing a `.git` entry.
pub fn find_repository_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}
