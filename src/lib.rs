//! Stario - Terminal Prompt Toolkit
//!
//! Arsitektur:
//! - Core: fixed-capacity byte ring dengan backpressure (satu writer, satu reader)
//! - Prompt: password, masked input, line editor, yes/no, wait-for-sequence
//! - Terminal: raw mode via termios
//!
//! ```no_run
//! let name = stario::line("name: ", "guest").string_or_default();
//! if stario::yes_no("continue? [y/N] ", false).unwrap_or(false) {
//!     println!("hello {}", name);
//! }
//! ```

pub mod core;
pub mod error;
pub mod input;
pub mod prompt;
pub mod terminal;

pub use crate::core::{
    pipe, ByteReader, ByteWriter, Lifecycle, RingBuffer, Sink, Source, Status, Transfer,
};
pub use crate::error::{Error, Result};
pub use crate::input::InputMsg;
pub use crate::prompt::{
    line, message_box, password, password_with_mask, wait_until, yes_no, Prompt, PromptConfig,
};
