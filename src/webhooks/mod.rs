//! Webhook handling for GitHub deliveries.
//!
//! - Signature verification (HMAC-SHA256)
//! - Typed event model for `issue_comment` and `ping`
//! - Payload parser

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{CommentAction, GitHubEvent, IssueCommentEvent};
pub use parser::{ParseError, parse_webhook};
pub use signature::{SignatureError, parse_signature_header, verify_delivery};
