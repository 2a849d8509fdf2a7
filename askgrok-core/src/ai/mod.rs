pub mod error;
pub mod mock;
pub mod provider;
pub mod types;
pub mod xai;

pub use error::AiError;
pub use provider::AiProvider;
pub use types::*;
pub use xai::XaiProvider;
