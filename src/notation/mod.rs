//! Notation compiler: line-oriented source in, named sections of
//! playback actions out.

pub mod error;
pub mod parser;
pub mod program;

pub use error::{CompileError, ErrorKind};
pub use parser::compile;
pub use program::{Action, Program, Section, ROOT_SECTION};
