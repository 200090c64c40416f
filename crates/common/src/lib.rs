//! Shared types for the worldscene crates.

mod types;

pub use types::{Color, NodeId, ParseColorError, Transform};
