use std::path::Path;

/// Extensions (lowercase, with the leading dot) of files worth sending as
/// text. Anything else is assumed to be binary or generated.
pub const VALID_EXTENSIONS: &[&str] = &[
    // Systems
    ".rs", ".c", ".h", ".cc", ".cpp", ".cxx", ".hpp", ".hh", ".m", ".mm", ".zig", ".go",
    ".swift", ".d",
    // JVM and .NET
    ".java", ".kt", ".kts", ".scala", ".groovy", ".gradle", ".clj", ".cs", ".fs", ".vb",
    // Scripting
    ".py", ".pyi", ".rb", ".php", ".pl", ".pm", ".lua", ".r", ".jl", ".ex", ".exs", ".erl",
    ".hrl", ".hs", ".ml", ".mli", ".dart", ".nim", ".tcl",
    // Web
    ".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx", ".mts", ".cts", ".vue", ".svelte", ".astro",
    ".html", ".htm", ".css", ".scss", ".sass", ".less", ".graphql", ".gql",
    // Shell and build
    ".sh", ".bash", ".zsh", ".fish", ".ps1", ".psm1", ".bat", ".cmd", ".mk", ".cmake",
    ".bazel", ".bzl", ".nix", ".dockerfile",
    // Data and config
    ".json", ".jsonc", ".json5", ".yaml", ".yml", ".toml", ".ini", ".cfg", ".conf", ".env",
    ".properties", ".xml", ".xsd", ".csv", ".tsv", ".sql", ".proto", ".tf", ".hcl", ".lock",
    // Documents
    ".md", ".markdown", ".mdx", ".txt", ".rst", ".adoc", ".org", ".tex", ".svg",
];

/// Whether `path` looks like a text file by its extension.
///
/// Names without a dot (`README`, `Makefile`) and dotfiles (`.gitignore`)
/// are accepted. A trailing dot with no extension is rejected.
pub fn is_valid_extension(path: &Path) -> bool {
    let Some(filename) = path.file_name() else {
        return false;
    };
    let filename = filename.to_string_lossy();
    if filename.is_empty() {
        return false;
    }

    if !filename.contains('.') || filename.starts_with('.') {
        return true;
    }

    let Some((_, extension)) = filename.rsplit_once('.') else {
        return true;
    };
    if extension.is_empty() {
        return false;
    }

    let extension = format!(".{}", extension.to_lowercase());
    VALID_EXTENSIONS.contains(&extension.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extensionless_names_are_valid() {
        assert!(is_valid_extension(Path::new("README")));
        assert!(is_valid_extension(Path::new("/repo/Makefile")));
        assert!(is_valid_extension(Path::new("src/LICENSE")));
    }

    #[test]
    fn test_dotfiles_are_valid() {
        assert!(is_valid_extension(Path::new(".gitignore")));
        assert!(is_valid_extension(Path::new("config/.editorconfig")));
        assert!(is_valid_extension(Path::new(".env.local")));
    }

    #[test]
    fn test_known_extensions_case_insensitive() {
        assert!(is_valid_extension(Path::new("src/main.rs")));
        assert!(is_valid_extension(Path::new("src/App.TSX")));
        assert!(is_valid_extension(Path::new("docs/NOTES.Md")));
        assert!(is_valid_extension(Path::new("archive.tar.toml")));
    }

    #[test]
    fn test_unknown_extensions_rejected() {
        assert!(!is_valid_extension(Path::new("logo.png")));
        assert!(!is_valid_extension(Path::new("bin/app.exe")));
        assert!(!is_valid_extension(Path::new("archive.toml.gz")));
    }

    #[test]
    fn test_trailing_dot_rejected() {
        assert!(!is_valid_extension(Path::new("weird.")));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(!is_valid_extension(&PathBuf::new()));
        assert!(!is_valid_extension(Path::new("/")));
    }
}
