//! Orbit-style camera input.
//!
//! Hosts translate their native events into [`InputEvent`]s; the controls
//! accumulate them and apply the result to the camera in `update`, which runs
//! once per frame before drawing.
//!
//! # Invariants
//! - Events never move the camera directly; only `update` does.
//! - The camera always looks at the orbit target after `update`.

pub mod event;
pub mod orbit;

pub use event::{InputEvent, Key, PointerButton};
pub use orbit::OrbitControls;
