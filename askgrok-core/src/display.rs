use crate::ai::types::{ApiResponse, OutputItem};
use crate::settings::OutputMethod;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const OUTPUT_PANEL_FINISHED: &str = "Grok finished. Responses shown in the Output panel.";
pub const TABS_FINISHED: &str = "Grok finished. Responses shown in new tabs.";

const SEPARATOR: &str = "\n---\n";

/// Texts to show for a response, one per choice or output message.
pub fn response_texts(response: &ApiResponse) -> Vec<String> {
    match response {
        ApiResponse::Chat(chat) => chat
            .choices
            .iter()
            .filter_map(|choice| choice.message.content.clone())
            .collect(),
        ApiResponse::Stateful(stateful) => stateful.output.iter().filter_map(item_text).collect(),
    }
}

/// Reasoning items usually carry only a summary and are skipped.
fn item_text(item: &OutputItem) -> Option<String> {
    let blocks = item.content.as_ref()?;
    let text = blocks
        .iter()
        .filter_map(|block| block.text.as_deref())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    (!text.is_empty()).then_some(text)
}

/// Where rendered responses went.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub documents: Vec<PathBuf>,
    pub message: &'static str,
}

/// Shows `texts` using the configured output method. The output panel is
/// `out` itself; tabs become markdown documents under `responses_dir`
/// whose paths are reported on `out`.
pub fn render(
    method: OutputMethod,
    texts: &[String],
    out: &mut dyn Write,
    responses_dir: &Path,
) -> Result<Rendered> {
    match method {
        OutputMethod::OutputChannel => {
            for text in texts {
                write!(out, "{text}{SEPARATOR}")?;
            }
            out.flush()?;
            Ok(Rendered {
                documents: Vec::new(),
                message: OUTPUT_PANEL_FINISHED,
            })
        }
        OutputMethod::Tab => {
            let documents = write_documents(texts, responses_dir)?;
            for path in &documents {
                writeln!(out, "{}", path.display())?;
            }
            out.flush()?;
            Ok(Rendered {
                documents,
                message: TABS_FINISHED,
            })
        }
    }
}

/// Every text gets a new document. Names already taken, for instance by an
/// answer rendered earlier in the same second, are skipped rather than
/// overwritten.
fn write_documents(texts: &[String], dir: &Path) -> Result<Vec<PathBuf>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create responses directory: {dir:?}"))?;

    let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let mut documents = Vec::with_capacity(texts.len());
    let mut n = 0;
    for text in texts {
        let (path, mut file) = loop {
            n += 1;
            let path = dir.join(format!("{stamp}-{n}.md"));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create response {path:?}"))
                }
            }
        };
        file.write_all(text.as_bytes())
            .with_context(|| format!("Failed to write response {path:?}"))?;
        documents.push(path);
    }
    info!(count = documents.len(), ?dir, "Wrote response documents");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn response(value: serde_json::Value) -> ApiResponse {
        ApiResponse::from_value(value).unwrap()
    }

    #[test]
    fn test_chat_texts() {
        let chat = response(json!({
            "choices": [
                {"message": {"content": "first"}},
                {"message": {"content": null}},
                {"message": {"content": "second"}}
            ]
        }));
        assert_eq!(response_texts(&chat), vec!["first", "second"]);
    }

    #[test]
    fn test_stateful_texts_skip_reasoning_and_blank_items() {
        let stateful = response(json!({
            "id": "resp_1",
            "output": [
                {
                    "id": "rs_1",
                    "type": "reasoning",
                    "summary": [{"text": "thinking", "type": "summary_text"}]
                },
                {
                    "id": "msg_1",
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        {"type": "output_text", "text": "Hello"},
                        {"type": "output_text", "text": "  "},
                        {"type": "output_text", "text": "World"}
                    ]
                },
                {"id": "msg_2", "content": [{"text": ""}]}
            ]
        }));
        assert_eq!(response_texts(&stateful), vec!["Hello\n\nWorld"]);
    }

    #[test]
    fn test_render_output_channel() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let texts = vec!["a".to_string(), "b".to_string()];

        let rendered = render(OutputMethod::OutputChannel, &texts, &mut out, dir.path()).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "a\n---\nb\n---\n");
        assert_eq!(rendered.message, OUTPUT_PANEL_FINISHED);
        assert!(rendered.documents.is_empty());
    }

    #[test]
    fn test_render_tabs() {
        let dir = TempDir::new().unwrap();
        let responses = dir.path().join("responses");
        let mut out = Vec::new();
        let texts = vec!["# one".to_string(), "# two".to_string()];

        let rendered = render(OutputMethod::Tab, &texts, &mut out, &responses).unwrap();

        assert_eq!(rendered.message, TABS_FINISHED);
        assert_eq!(rendered.documents.len(), 2);
        assert!(rendered.documents[0].to_string_lossy().ends_with("-1.md"));
        assert_eq!(fs::read_to_string(&rendered.documents[1]).unwrap(), "# two");

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.lines().count(), 2);
    }

    #[test]
    fn test_render_tabs_back_to_back_keeps_both() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();

        let first = render(
            OutputMethod::Tab,
            &["first answer".to_string()],
            &mut out,
            dir.path(),
        )
        .unwrap();
        let second = render(
            OutputMethod::Tab,
            &["second answer".to_string()],
            &mut out,
            dir.path(),
        )
        .unwrap();

        assert_ne!(first.documents, second.documents);
        assert_eq!(
            fs::read_to_string(&first.documents[0]).unwrap(),
            "first answer"
        );
        assert_eq!(
            fs::read_to_string(&second.documents[0]).unwrap(),
            "second answer"
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
