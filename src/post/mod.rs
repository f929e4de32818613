pub mod ascii;
pub mod ascii_pass;

pub use ascii::{AsciiUniforms, Glyph};
pub use ascii_pass::AsciiPass;
