//! mmduck - shortcut dock backend.
//!
//! A dock shows a row of shortcuts; clicking one activates an application,
//! opens a URL, runs a script in a terminal, or runs a shell command. This
//! crate holds everything behind the buttons.
//!
//! # Architecture
//!
//! - [`config`] - Shortcut records and the JSON file store
//! - [`executor`] - Strategy resolution and execution
//! - [`platform`] - OS mechanisms behind capability traits
//! - [`dispatch`] - The operations front ends call, plus a stdio transport
//! - [`windows`] - One-window-per-role bookkeeping for UI front ends
//! - [`cli`] - The `mmduck` command
//!
//! # Example
//!
//! ```ignore
//! use mmduck::{ConfigStore, ExecutionEngine, ShortcutService};
//!
//! let service = ShortcutService::new(ConfigStore::open_default(), ExecutionEngine::current());
//! let result = service.execute_shortcut("terminal").await;
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod executor;
pub mod logging;
pub mod platform;
pub mod windows;

mod error;

pub use config::{Config, ConfigStore, Shortcut, ShortcutDraft, ShortcutPatch, ShortcutType};
pub use dispatch::{ConfigEvent, Request, ShortcutService};
pub use error::{MmduckError, MmduckResult};
pub use executor::{ExecutionEngine, ExecutionResult};
pub use platform::Platform;
