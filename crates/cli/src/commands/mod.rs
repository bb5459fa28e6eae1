pub mod analyze;
pub mod tools;

pub use analyze::*;
pub use tools::*;
