//! Rendering module
//!
//! `scene` composes a frame from the session without touching the GPU;
//! `pipeline` draws it as textured quads with WebGPU.

pub mod assets;
pub mod error;
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use assets::{AssetId, AssetSet, AssetSource};
pub use error::RenderError;
pub use pipeline::SpriteRenderer;
pub use scene::{DrawOp, Frame, HudSnapshot, Paint, compose};
