//! Request handlers.

pub mod artifacts;
pub mod health;
pub mod progress;
pub mod upload;

pub use artifacts::*;
pub use health::*;
pub use progress::*;
pub use upload::*;
