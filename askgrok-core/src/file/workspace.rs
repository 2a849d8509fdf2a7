use crate::file::extension::is_valid_extension;
use crate::file::filter::{relative_path, PathFilter};
use crate::file::git::FileLister;
use futures::future::join_all;
use globset::GlobMatcher;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Upper bound on files pulled in by a single include pattern.
pub const MAX_INCLUDE_MATCHES: usize = 1000;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("No workspace folder open!")]
    NoWorkspace,

    #[error("No files found in workspace!")]
    NoFiles,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Files of a workspace request, in the order they are sent: tracked files
/// first, then files only reachable through include patterns.
pub async fn resolve_workspace_files(
    root: Option<&Path>,
    lister: &dyn FileLister,
    filter: &PathFilter,
) -> Result<Vec<PathBuf>, WorkspaceError> {
    let root = root.ok_or(WorkspaceError::NoWorkspace)?;

    let candidates = lister.list_files(root).await?;
    let candidate_count = candidates.len();

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for path in candidates {
        let path = absolute(root, path);
        if admitted(&path, root, filter) && seen.insert(path.clone()) {
            files.push(path);
        }
    }
    let tracked_count = files.len();

    for glob in filter.include_globs() {
        let matches = search_include(root.to_path_buf(), glob.clone()).await?;
        for path in matches {
            if admitted(&path, root, filter) && seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    info!(
        candidates = candidate_count,
        tracked = tracked_count,
        included = files.len() - tracked_count,
        "Resolved workspace files"
    );

    if files.is_empty() {
        return Err(WorkspaceError::NoFiles);
    }
    Ok(files)
}

/// Tracked files deleted from the working tree are still listed by git and
/// are dropped here along with anything that is not a regular file.
fn admitted(path: &Path, root: &Path, filter: &PathFilter) -> bool {
    is_valid_extension(path) && filter.admits(path, root) && path.is_file()
}

fn absolute(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

/// Walks the whole root (not only tracked files) for matches of one include
/// pattern. `.git` is never descended into.
async fn search_include(root: PathBuf, glob: GlobMatcher) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = glob.glob().to_string();
    let matches = tokio::task::spawn_blocking(move || {
        let mut matches = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git");
        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(relative) = relative_path(entry.path(), &root) else {
                continue;
            };
            if glob.is_match(&relative) {
                matches.push(entry.into_path());
                if matches.len() >= MAX_INCLUDE_MATCHES {
                    break;
                }
            }
        }
        matches
    })
    .await?;

    debug!(%pattern, count = matches.len(), "Include pattern search");
    Ok(matches)
}

/// Reads every file concurrently and joins them as `path\ncontent` blocks
/// separated by a blank line, in the order given.
pub async fn read_workspace_content(files: &[PathBuf]) -> anyhow::Result<String> {
    let reads = files.iter().map(|path| async move {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read file {}: {}", path.display(), e)
        })?;
        Ok::<_, anyhow::Error>((path, String::from_utf8_lossy(&bytes).into_owned()))
    });

    let mut buffer = String::new();
    for (i, result) in join_all(reads).await.into_iter().enumerate() {
        let (path, content) = result?;
        if i > 0 {
            buffer.push_str("\n\n");
        }
        buffer.push_str(&path.display().to_string());
        buffer.push('\n');
        buffer.push_str(&content);
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct StaticLister(Vec<&'static str>);

    #[async_trait::async_trait]
    impl FileLister for StaticLister {
        async fn list_files(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
            Ok(self.0.iter().map(|p| root.join(p)).collect())
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| relative_path(f, root).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_no_workspace() {
        let filter = PathFilter::new(&[], &[]).unwrap();
        let err = resolve_workspace_files(None, &StaticLister(vec![]), &filter)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::NoWorkspace));
    }

    #[tokio::test]
    async fn test_empty_result_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let filter = PathFilter::new(&strings(&["src"]), &[]).unwrap();
        let lister = StaticLister(vec!["src/a.rs", "logo.png"]);

        let err = resolve_workspace_files(Some(temp_dir.path()), &lister, &filter)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkspaceError::NoFiles));
        assert_eq!(err.to_string(), "No files found in workspace!");
    }

    #[tokio::test]
    async fn test_filters_tracked_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "src/a.ts", "export {}");
        write(root, "node_modules/x/b.ts", "export {}");
        write(root, "img/logo.png", "png");
        let filter = PathFilter::new(&strings(&["node_modules"]), &[]).unwrap();
        let lister = StaticLister(vec!["src/a.ts", "node_modules/x/b.ts", "img/logo.png"]);

        let files = resolve_workspace_files(Some(root), &lister, &filter)
            .await
            .unwrap();
        assert_eq!(relative(root, &files), vec!["src/a.ts"]);
    }

    #[tokio::test]
    async fn test_deleted_tracked_files_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a.rs", "fn a() {}");
        std::fs::create_dir_all(root.join("src.rs")).unwrap();

        let filter = PathFilter::new(&[], &[]).unwrap();
        let lister = StaticLister(vec!["a.rs", "b.rs", "src.rs"]);

        let files = resolve_workspace_files(Some(root), &lister, &filter)
            .await
            .unwrap();
        assert_eq!(relative(root, &files), vec!["a.rs"]);

        let content = read_workspace_content(&files).await.unwrap();
        assert!(content.ends_with("\nfn a() {}"));
    }

    #[tokio::test]
    async fn test_include_search_is_capped_per_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for i in 0..MAX_INCLUDE_MATCHES + 5 {
            write(root, &format!("gen/f{i:04}.txt"), "x");
        }

        let filter = PathFilter::new(&strings(&["gen"]), &strings(&["gen/*.txt"])).unwrap();
        let files = resolve_workspace_files(Some(root), &StaticLister(vec![]), &filter)
            .await
            .unwrap();

        let names = relative(root, &files);
        assert_eq!(names.len(), MAX_INCLUDE_MATCHES);
        assert_eq!(names[0], "gen/f0000.txt");
        assert_eq!(
            names[MAX_INCLUDE_MATCHES - 1],
            format!("gen/f{:04}.txt", MAX_INCLUDE_MATCHES - 1)
        );
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_include_search_appends_untracked_matches() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "src/main.rs", "fn main() {}");
        write(root, "generated/api.rs", "// generated");
        write(root, "generated/blob.bin", "\0");
        write(root, "node_modules/pkg/index.js", "module.exports = 1;");

        let filter = PathFilter::new(
            &strings(&["node_modules", "generated"]),
            &strings(&["generated/**", "src/*.rs"]),
        )
        .unwrap();
        let lister = StaticLister(vec!["src/main.rs"]);

        let files = resolve_workspace_files(Some(root), &lister, &filter)
            .await
            .unwrap();
        assert_eq!(relative(root, &files), vec!["src/main.rs", "generated/api.rs"]);
    }

    #[tokio::test]
    async fn test_results_are_deduplicated() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a.rs", "");
        write(root, "b.rs", "");

        let filter = PathFilter::new(&[], &strings(&["*.rs", "a.*"])).unwrap();
        let lister = StaticLister(vec!["a.rs", "a.rs"]);

        for _ in 0..2 {
            let files = resolve_workspace_files(Some(root), &lister, &filter)
                .await
                .unwrap();
            assert_eq!(relative(root, &files), vec!["a.rs", "b.rs"]);
        }
    }

    #[tokio::test]
    async fn test_read_workspace_content_keeps_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "one.txt", "first");
        write(root, "two.txt", "second");

        let files = vec![root.join("two.txt"), root.join("one.txt")];
        let content = read_workspace_content(&files).await.unwrap();

        assert_eq!(
            content,
            format!(
                "{}\nsecond\n\n{}\nfirst",
                root.join("two.txt").display(),
                root.join("one.txt").display()
            )
        );
    }

    #[tokio::test]
    async fn test_read_workspace_content_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![temp_dir.path().join("missing.txt")];
        let err = read_workspace_content(&files).await.unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }
}
