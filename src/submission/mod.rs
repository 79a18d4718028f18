pub mod parser;
pub mod pipeline;
pub mod validate;

pub use validate::{ValidationError, validate};
