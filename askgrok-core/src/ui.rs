use anyhow::Result;

/// The user-facing side of a command: prompts, confirmations, notices and
/// progress. The CLI implements it on a terminal; tests script it.
pub trait Interaction {
    /// Asks for the API key when none is configured. `None` if the user gave
    /// nothing.
    fn api_key(&self) -> Result<Option<String>>;

    /// Asks for the question, in an external editor when `use_editor` is set.
    fn question(&self, use_editor: bool) -> Result<Option<String>>;

    /// Shows `prompt` under `title` and returns whether to go on.
    fn confirm(&self, title: &str, prompt: &str) -> Result<bool>;

    fn info(&self, message: &str);

    fn error(&self, message: &str);

    fn progress_started(&self, title: &str);

    fn progress_finished(&self);
}
