//! The GPU-independent half of the GL gallery.
//!
//! Geometry generators, the scene graph, camera controls and the data each sample feeds to
//! its shaders live here, so they can be tested without a GL context.

pub mod aabb;
pub mod config;
pub mod controls;
pub mod geometry;
pub mod ifs;
pub mod math;
pub mod raytrace;
pub mod relief;
pub mod rubiks;
pub mod scene;

pub use aabb::Aabb;
pub use scene::{Bounded, Model, ModelNode};
