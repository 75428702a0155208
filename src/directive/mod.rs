//! Agent directive parsing.
//!
//! The remote agent embeds flat `[TAG:...]` directives in otherwise free
//! text to request UI affordances (buttons, forms, data saves, info
//! callouts). This module extracts them into a typed command list and a
//! clean display message.

mod command;
mod parser;

pub use command::{ButtonVariant, Command, CommandKind, FieldType, FormField};
pub use parser::{ParsedResponse, parse};
