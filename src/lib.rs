pub mod ast;
pub mod characters;
pub mod diagnostics;
pub mod elements;
pub mod error;
pub mod glyphs;
pub mod score;

pub use ast::*;
pub use characters::normalize;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use elements::determine_elements;
pub use error::*;
pub use glyphs::determine_glyphs;
pub use score::{build_score, parse_metadata, process_voice, SyllableInput};
