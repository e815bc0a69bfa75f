//! High-level operations.
//!
//! [`Pilot`] binds the user's generate, build and run actions to the project
//! model and the shell session.

pub mod pilot;

pub use pilot::{Pilot, Selection};
