//! Command types parsed from pull request comments.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single rerun command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Command {
    /// Rerun every workflow: `/retest` or `/rerun-all`.
    RerunAll,

    /// Rerun the workflow with exactly this name: `/test NAME` or
    /// `/rerun-workflow NAME`.
    RerunWorkflow(String),
}

/// The deduplicated commands found in one comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandSet(BTreeSet<Command>);

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command, returning false if it was already present.
    pub fn insert(&mut self, command: Command) -> bool {
        self.0.insert(command)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, command: &Command) -> bool {
        self.0.contains(command)
    }

    pub fn reruns_all(&self) -> bool {
        self.0.contains(&Command::RerunAll)
    }

    /// Whether `name` is explicitly requested by a `RerunWorkflow` command.
    ///
    /// Exact, case-sensitive comparison.
    pub fn requests_workflow(&self, name: &str) -> bool {
        self.0.contains(&Command::RerunWorkflow(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.0.iter()
    }
}

impl FromIterator<Command> for CommandSet {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        CommandSet(iter.into_iter().collect())
    }
}
