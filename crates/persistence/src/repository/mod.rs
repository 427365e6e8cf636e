//! Repository implementations for database operations

pub mod competition;
pub mod rule;
pub mod submission;

pub use competition::*;
pub use rule::*;
pub use submission::*;
