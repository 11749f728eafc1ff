mod format;
mod sanitize;

pub use format::*;
pub use sanitize::*;
