use crate::source::MessageType;

fn prefix(kind: MessageType) -> &'static str {
    match kind {
        MessageType::Workspace => "Please consider the following project files:",
        MessageType::Tab => "Please consider the following project file:",
        MessageType::Function => "Please consider the following function/method:",
        MessageType::Selection => "Please consider the following code:",
    }
}

/// Assembles the text sent to the model: a scope line, the collected
/// content and the question, separated by blank lines.
pub fn build_prompt(kind: MessageType, raw_content: &str, question: &str) -> String {
    [
        prefix(kind).to_string(),
        raw_content.to_string(),
        format!("Question: {question}"),
    ]
    .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::VariantArray;

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt(MessageType::Selection, "let x = 1;", "What is x?");
        assert_eq!(
            prompt,
            "Please consider the following code:\n\nlet x = 1;\n\nQuestion: What is x?"
        );
    }

    #[test]
    fn test_every_scope_has_its_own_prefix() {
        let prefixes: std::collections::HashSet<_> =
            MessageType::VARIANTS.iter().map(|kind| prefix(*kind)).collect();
        assert_eq!(prefixes.len(), MessageType::VARIANTS.len());

        for kind in MessageType::VARIANTS {
            let prompt = build_prompt(*kind, "body", "why?");
            assert!(prompt.starts_with("Please consider the following"));
            assert!(prompt.ends_with("\n\nQuestion: why?"));
        }
    }
}
