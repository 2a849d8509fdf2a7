use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::collections::HashSet;
use std::path::{Component, Path};

/// Decides which workspace paths may be sent, from the configured exclude
/// and include lists.
///
/// Exclude entries without wildcards are basenames: they hide a file with
/// that name and every file below a directory with that name. Entries with
/// wildcards are globs over the whole root-relative path. Include entries
/// are always globs, and a path matching one is admitted even when an
/// exclude entry hides it.
///
/// Wildcards also match names starting with a dot: `**/*.json` covers
/// `.vscode/settings.json`. Hidden paths are excluded only through an
/// entry naming them, such as `.git`.
#[derive(Debug, Clone)]
pub struct PathFilter {
    exact_excludes: HashSet<String>,
    exclude_globs: Vec<GlobMatcher>,
    include_globs: Vec<GlobMatcher>,
}

impl PathFilter {
    pub fn new(exclude: &[String], include: &[String]) -> Result<Self> {
        let mut exact_excludes = HashSet::new();
        let mut exclude_globs = Vec::new();
        for pattern in exclude {
            if has_wildcard(pattern) {
                exclude_globs.push(compile(pattern)?);
            } else {
                exact_excludes.insert(pattern.to_lowercase());
            }
        }

        let include_globs = include
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            exact_excludes,
            exclude_globs,
            include_globs,
        })
    }

    pub fn include_globs(&self) -> &[GlobMatcher] {
        &self.include_globs
    }

    pub fn should_exclude(&self, path: &Path, root: &Path) -> bool {
        let Some(relative) = relative_path(path, root) else {
            return false;
        };

        let segments: Vec<&str> = relative.split('/').collect();
        let Some((filename, directories)) = segments.split_last() else {
            return false;
        };

        if self.exact_excludes.contains(&filename.to_lowercase()) {
            return true;
        }
        if directories
            .iter()
            .any(|dir| self.exact_excludes.contains(&dir.to_lowercase()))
        {
            return true;
        }

        self.exclude_globs.iter().any(|glob| glob.is_match(&relative))
    }

    pub fn is_included(&self, path: &Path, root: &Path) -> bool {
        let Some(relative) = relative_path(path, root) else {
            return false;
        };
        self.include_globs.iter().any(|glob| glob.is_match(&relative))
    }

    /// A path is admitted unless it is excluded and no include overrides it.
    pub fn admits(&self, path: &Path, root: &Path) -> bool {
        !self.should_exclude(path, root) || self.is_included(path, root)
    }
}

pub fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{', '}'])
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .with_context(|| format!("Invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// `path` relative to `root` in `/`-separated form. Relative inputs are
/// taken as already root-relative. The root itself and paths outside it
/// yield `None`.
pub fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = if path.is_absolute() {
        path.strip_prefix(root).ok()?
    } else {
        path
    };

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn admitted(filter: &PathFilter, root: &Path, candidates: &[&str]) -> Vec<String> {
        candidates
            .iter()
            .filter(|c| filter.admits(&root.join(c), root))
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_has_wildcard() {
        assert!(has_wildcard("*.log"));
        assert!(has_wildcard("src/**"));
        assert!(has_wildcard("file?.txt"));
        assert!(has_wildcard("[ab].rs"));
        assert!(has_wildcard("{a,b}.rs"));
        assert!(!has_wildcard("node_modules"));
        assert!(!has_wildcard("package-lock.json"));
    }

    #[test]
    fn test_relative_path() {
        let root = PathBuf::from("/repo");
        assert_eq!(
            relative_path(Path::new("/repo/src/a.rs"), &root).as_deref(),
            Some("src/a.rs")
        );
        assert_eq!(
            relative_path(Path::new("src/./a.rs"), &root).as_deref(),
            Some("src/a.rs")
        );
        assert_eq!(relative_path(Path::new("/repo"), &root), None);
        assert_eq!(relative_path(Path::new("/elsewhere/a.rs"), &root), None);
        assert_eq!(relative_path(Path::new("../a.rs"), &root), None);
    }

    #[test]
    fn test_directory_name_excludes_subtree() {
        let root = PathBuf::from("/repo");
        let filter = PathFilter::new(&strings(&["node_modules"]), &[]).unwrap();

        assert_eq!(
            admitted(&filter, &root, &["src/a.ts", "node_modules/x/b.ts"]),
            vec!["src/a.ts"]
        );
        assert!(filter.should_exclude(&root.join("pkg/deep/Node_Modules/y/c.ts"), &root));
    }

    #[test]
    fn test_basename_exclude_is_case_insensitive() {
        let root = PathBuf::from("/repo");
        let filter = PathFilter::new(&strings(&["Package-Lock.json"]), &[]).unwrap();

        assert!(filter.should_exclude(&root.join("package-lock.json"), &root));
        assert!(filter.should_exclude(&root.join("web/PACKAGE-LOCK.JSON"), &root));
        assert!(!filter.should_exclude(&root.join("package.json"), &root));
    }

    #[test]
    fn test_wildcards_match_dot_names() {
        let root = PathBuf::from("/repo");
        let filter = PathFilter::new(&strings(&["**/*.json", "cache/*"]), &[]).unwrap();

        assert!(filter.should_exclude(&root.join(".vscode/settings.json"), &root));
        assert!(filter.should_exclude(&root.join("app/.eslintrc.json"), &root));
        assert!(filter.should_exclude(&root.join("cache/.stamp"), &root));
        assert!(!filter.should_exclude(&root.join(".vscode/launch.toml"), &root));
    }

    #[test]
    fn test_glob_matches_full_relative_path() {
        let root = PathBuf::from("/repo");
        let filter = PathFilter::new(&strings(&["*.log", "build/**"]), &[]).unwrap();

        assert!(filter.should_exclude(&root.join("debug.LOG"), &root));
        // `*` does not cross directory boundaries
        assert!(!filter.should_exclude(&root.join("logs/debug.log"), &root));
        assert!(filter.should_exclude(&root.join("build/out/app.js"), &root));
        assert!(!filter.should_exclude(&root.join("src/build.rs"), &root));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let root = PathBuf::from("/repo");
        let filter = PathFilter::new(&strings(&["*.log"]), &strings(&["keep.log"])).unwrap();

        assert_eq!(
            admitted(&filter, &root, &["keep.log", "drop.log"]),
            vec!["keep.log"]
        );
    }

    #[test]
    fn test_include_reopens_excluded_directory() {
        let root = PathBuf::from("/repo");
        let filter = PathFilter::new(
            &strings(&["dist"]),
            &strings(&["dist/types/**/*.d.ts"]),
        )
        .unwrap();

        assert!(filter.admits(&root.join("dist/types/api/index.d.ts"), &root));
        assert!(!filter.admits(&root.join("dist/bundle.js"), &root));
    }

    #[test]
    fn test_unmatched_include_does_not_restrict() {
        let root = PathBuf::from("/repo");
        let filter = PathFilter::new(&[], &strings(&["docs/**"])).unwrap();

        assert!(filter.admits(&root.join("src/main.rs"), &root));
    }

    #[test]
    fn test_root_relative_candidates() {
        let root = PathBuf::from("/repo");
        let filter = PathFilter::new(&strings(&["target"]), &[]).unwrap();

        assert!(!filter.admits(Path::new("target/debug/build.rs"), &root));
        assert!(filter.admits(Path::new("src/lib.rs"), &root));
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        let err = PathFilter::new(&strings(&["src/[a"]), &[]).unwrap_err();
        assert!(err.to_string().contains("Invalid glob pattern"));
    }
}
