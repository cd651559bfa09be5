//! Core types for Ferry.

pub mod message;
pub mod results;

pub use message::*;
pub use results::*;
