//! Background textures and the loaders that produce them.
//!
//! Textures are identified by a content hash so renderers can tell when the
//! image behind a handle actually changed. Loading never blocks the frame
//! thread: a loader hands back a [`PendingTexture`] that the caller polls.
//!
//! # Invariants
//! - A pending load resolves exactly once (loaded or failed).
//! - Decoding happens off the frame thread; installation happens on it.

mod loader;
mod texture;

pub use loader::{LoadStatus, ManualLoader, PendingTexture, RgbeLoader, TextureLoader};
pub use texture::{Texture, TextureId, TextureMapping, decode_hdr};

/// Errors from texture loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("load of {0} was abandoned before completing")]
    Abandoned(String),
}

pub fn crate_info() -> &'static str {
    "worldscene-assets v0.1.0"
}
