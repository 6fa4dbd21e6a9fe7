//! Command parsing for rerun comments.
//!
//! Users request reruns with a pull request comment made only of command
//! lines.
//!
//! # Supported Commands
//!
//! - `/retest` or `/rerun-all` - Rerun every workflow for the PR head
//! - `/test NAME` or `/rerun-workflow NAME` - Rerun the workflow named `NAME`
//!
//! # Example
//!
//! ```
//! use rerun_bot::commands::{parse_commands, Command};
//!
//! let commands = parse_commands("/test build\n\n/test lint\n");
//! assert_eq!(commands.len(), 2);
//! assert!(commands.requests_workflow("build"));
//!
//! // Every non-blank line must be a command.
//! assert!(parse_commands("Could someone /retest please?").is_empty());
//! assert!(parse_commands("/test build\nThanks!").is_empty());
//! ```

mod parser;
mod types;

pub use parser::parse_commands;
pub use types::{Command, CommandSet};
