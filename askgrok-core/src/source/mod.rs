//! Collection of the raw text a question is asked about, other than the
//! workspace file set (see `crate::file`).

pub mod symbols;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use symbols::{find_containing_function, symbol_provider_for};

/// Scope of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::VariantArray)]
pub enum MessageType {
    Workspace,
    Tab,
    Function,
    Selection,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Workspace => write!(f, "workspace"),
            MessageType::Tab => write!(f, "tab"),
            MessageType::Function => write!(f, "function"),
            MessageType::Selection => write!(f, "selection"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Active tab appears to be empty!")]
    EmptyTab,

    #[error("No selection available!")]
    NoSelection,

    #[error("No selected text found!")]
    EmptySelection,

    #[error("No symbols found!")]
    NoSymbols,

    #[error("Unable to determine function!")]
    NoFunction,
}

/// 1-based inclusive line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for LineRange {
    type Err = String;

    /// Accepts `N`, `N:M` or `N-M`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |value: &str| {
            value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|line| *line > 0)
                .ok_or_else(|| format!("invalid line number '{value}'"))
        };

        match s.split_once([':', '-']) {
            Some((start, end)) => Ok(LineRange {
                start: parse(start)?,
                end: parse(end)?,
            }),
            None => {
                let line = parse(s)?;
                Ok(LineRange {
                    start: line,
                    end: line,
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabContent {
    pub path: PathBuf,
    pub content: String,
}

impl TabContent {
    /// Text embedded in the prompt: the path line followed by the file.
    pub fn raw(&self) -> String {
        format!("{}\n{}", self.path.display(), self.content)
    }
}

async fn read_source(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn active_tab(path: &Path) -> Result<TabContent, SourceError> {
    let content = read_source(path).await?;
    if content.is_empty() {
        return Err(SourceError::EmptyTab);
    }
    Ok(TabContent {
        path: path.to_path_buf(),
        content,
    })
}

pub async fn selected_text(path: &Path, range: LineRange) -> Result<String, SourceError> {
    if range.start > range.end {
        return Err(SourceError::NoSelection);
    }
    let content = read_source(path).await?;
    let lines: Vec<&str> = content.lines().collect();
    slice_lines(&lines, range.start, range.end)
        .filter(|text| !text.trim().is_empty())
        .ok_or(SourceError::EmptySelection)
}

/// Text of the function or method enclosing `line` (1-based).
pub async fn active_function(path: &Path, line: usize) -> Result<String, SourceError> {
    let content = read_source(path).await?;
    let provider = symbol_provider_for(path).ok_or(SourceError::NoSymbols)?;

    let symbols = match provider.document_symbols(&content) {
        Ok(symbols) => symbols,
        Err(e) => {
            warn!(?e, ?path, "Failed to outline document");
            return Err(SourceError::NoSymbols);
        }
    };
    if symbols.is_empty() {
        return Err(SourceError::NoSymbols);
    }

    let function = find_containing_function(&symbols, line).ok_or(SourceError::NoFunction)?;
    let lines: Vec<&str> = content.lines().collect();
    slice_lines(&lines, function.start_line, function.end_line).ok_or(SourceError::NoFunction)
}

/// Lines `start..=end` (1-based), with `end` clamped to the document.
fn slice_lines(lines: &[&str], start: usize, end: usize) -> Option<String> {
    let end = end.min(lines.len());
    if start == 0 || start > end {
        return None;
    }
    Some(lines[start - 1..end].join("\n"))
}
