//! Subject analysis modules.
//!
//! This module holds the request pipeline: the thinker roster, the output
//! schema, input validation, prompt composition, response sanitizing and
//! the state machine tying them together.

pub mod pipeline;
pub mod prompt;
pub mod roster;
pub mod sanitizer;
pub mod schema;
pub mod validator;

pub use pipeline::Analyzer;
pub use roster::Roster;
