//! Value codec for the management CLI's literal syntax.
//!
//! The encoder renders typed values into the textual literal syntax the CLI
//! accepts in command parameters; the decoder parses the CLI's response text
//! (a Lisp-like nested-record format) back into typed values and classifies
//! the outcome.

pub mod decode;
pub mod encode;

pub use decode::{decode, CliResult};
pub use encode::encode;
