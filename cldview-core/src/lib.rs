//! Core data structures for cldview
//!
//! This crate provides the owned scene graph the Comedy Lab viewer works on:
//! rigid transforms, per-body motion timelines, annotation tracks, marker
//! geometry and the [`Scene`] that ties them together.

pub mod annotation;
pub mod error;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod timeline;
pub mod traits;
pub mod transform;

pub use annotation::*;
pub use error::*;
pub use mesh::*;
pub use node::*;
pub use scene::*;
pub use timeline::*;
pub use traits::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Isometry3, Matrix4, Point3, UnitQuaternion, Vector3};
