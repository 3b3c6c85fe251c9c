//! Configuration validation
//!
//! Every configuration section implements [`Validate`]; the engine config
//! validates its sections in order and reports the first failure.

mod trait_def;
mod validators;

pub use trait_def::Validate;
