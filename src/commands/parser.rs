//! Parser for rerun commands in comment text.
//!
//! A comment is a command comment only if every non-blank line is a command
//! line. Any line of prose voids the whole comment, so a command mentioned in
//! the middle of a discussion never triggers anything.

use super::types::{Command, CommandSet};

/// Shortest valid command token (`/test`).
const MIN_COMMAND_LEN: usize = 5;

/// Parses the rerun commands of a command comment.
///
/// # Parsing Rules
///
/// - The body is read line by line; tokens are separated by any whitespace
/// - Blank lines are skipped
/// - A command line's first token starts with `/` and is at least 5 bytes long
/// - Any non-blank line that is not a command line makes the result empty,
///   including commands already read
/// - `/retest` and `/rerun-all` request every workflow
/// - `/test NAME` and `/rerun-workflow NAME` request one workflow; without a
///   name the line is ignored
/// - Unknown commands are ignored
/// - Command names are case-sensitive
///
/// # Examples
///
/// ```
/// use rerun_bot::commands::{parse_commands, Command};
///
/// let commands = parse_commands("/rerun-workflow build\n/test lint\n");
/// assert!(commands.contains(&Command::RerunWorkflow("build".to_string())));
/// assert!(commands.contains(&Command::RerunWorkflow("lint".to_string())));
///
/// assert!(parse_commands("/retest").reruns_all());
/// assert!(parse_commands("looks good /rerun-all").is_empty());
/// ```
pub fn parse_commands(body: &str) -> CommandSet {
    let mut commands = CommandSet::new();

    for line in body.lines() {
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        if !is_command_token(first) {
            return CommandSet::new();
        }

        // is_command_token guarantees a leading ASCII '/'
        match &first[1..] {
            "retest" | "rerun-all" => {
                commands.insert(Command::RerunAll);
            }
            "test" | "rerun-workflow" => {
                if let Some(name) = tokens.next() {
                    commands.insert(Command::RerunWorkflow(name.to_string()));
                }
            }
            _ => {}
        }
    }

    commands
}

fn is_command_token(token: &str) -> bool {
    token.starts_with('/') && token.len() >= MIN_COMMAND_LEN
}
