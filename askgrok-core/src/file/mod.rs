//! Selection of the files sent with a workspace request.
//!
//! ## Pipeline
//!
//! 1. `git.rs` lists the candidates (tracked plus untracked-but-not-ignored
//!    files) under the workspace root.
//! 2. `extension.rs` drops anything that does not look like text.
//! 3. `filter.rs` applies the configured exclude list, with the include list
//!    taking priority over it.
//! 4. `workspace.rs` assembles the final ordered, deduplicated set, adding
//!    files that only an include pattern reaches, and reads their contents.

pub mod extension;
pub mod filter;
pub mod git;
pub mod workspace;

pub use filter::PathFilter;
pub use git::{FileLister, GitCli};
pub use workspace::{read_workspace_content, resolve_workspace_files, WorkspaceError};
