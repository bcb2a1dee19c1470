#![forbid(unsafe_code)]

//! Continuous settling of diagram blocks.
//!
//! Each block becomes a rotation-locked body in a small relaxation [`world::World`] whose
//! collider is the block inflated by its margin plus half the inter-block gap. The
//! [`SettlingEngine`] steps that world once per frame until the blocks stop moving, and layers
//! dragging and animated resizing on top.

pub mod anim;
pub mod config;
pub mod engine;
pub mod error;
pub mod world;

pub use anim::ResizeAnimation;
pub use config::{EngineConfig, WorldConfig};
pub use engine::{BodyState, DiagramKey, SettlingEngine};
pub use error::{Error, Result};
pub use world::{BodyDef, BodyHandle, BodyKind, ColliderHandle, World};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
