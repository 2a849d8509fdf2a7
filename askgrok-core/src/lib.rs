pub mod ai;
pub mod ask;
pub mod display;
pub mod file;
pub mod preview;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod source;
pub mod ui;

// Entry points used by the CLI; everything else stays reachable through its module.
pub use ai::provider::AiProvider;
pub use ai::XaiProvider;
pub use ask::{AskCommand, AskError, AskOutcome, ContentRequest};
pub use settings::{Settings, SettingsManager};
pub use source::{LineRange, MessageType};
pub use ui::Interaction;
