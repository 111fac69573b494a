//! # pl-term
//!
//! Terminal front end for procline.
//!
//! This crate connects `pl-core` processes to a real terminal: it turns
//! crossterm key events into signals and raw input, writes process output
//! to stdout, and drives the interactive prompt loop.

pub mod connection;
pub mod input;
pub mod session;
pub mod terminal;

pub use connection::TerminalConnection;
pub use input::{classify, input_stream, TermInput};
pub use session::{LineBuffer, LineEdit, Session};
pub use terminal::RawMode;
