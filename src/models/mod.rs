mod error;
pub use error::*;

mod fee;
pub use fee::*;

mod payload;
pub use payload::*;
