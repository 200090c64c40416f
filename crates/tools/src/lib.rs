//! Developer tooling: the debug GUI bound to the scene, camera and orbit controls.
//!
//! # Invariants
//! - The GUI holds node handles only; targets are borrowed per draw.
//! - Edits to missing or mismatched nodes are rejected, never panicked on.

mod gui;

pub use gui::{Folder, GuiControls, GuiEdit, GuiError, GuiTargets, apply};
