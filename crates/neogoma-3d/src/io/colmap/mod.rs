mod text;
mod types;

pub use text::*;
pub use types::*;
