//! Debugger console
//!
//! A line-oriented text console on a UART: formatted output shared by every
//! task, line input with echo and editing, and the post-mortem path used
//! when the system can no longer be trusted.

mod debugger;
mod line;

pub use debugger::{Debugger, CHUNK_SIZE, MAX_LINE};
pub use line::{EditMode, Input, LineEditor, Submission};
