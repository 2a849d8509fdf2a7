use crate::settings::PreviewMode;
use crate::source::MessageType;

pub const PREVIEW_TITLE: &str = "Grok Data Preview";

/// Whether the assembled prompt must be confirmed before it is sent.
pub fn should_show_preview(mode: PreviewMode, kind: MessageType) -> bool {
    match mode {
        PreviewMode::Always => true,
        PreviewMode::WorkspaceOnly => kind == MessageType::Workspace,
        PreviewMode::Never => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::VariantArray;

    #[test]
    fn test_preview_gating() {
        for kind in MessageType::VARIANTS {
            assert!(should_show_preview(PreviewMode::Always, *kind));
            assert!(!should_show_preview(PreviewMode::Never, *kind));
            assert_eq!(
                should_show_preview(PreviewMode::WorkspaceOnly, *kind),
                *kind == MessageType::Workspace
            );
        }
    }
}
