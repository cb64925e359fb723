//! Core traits for cldview

use crate::{mesh::TriangleMesh, transform::Point3f};

/// Anything occupying space in the scene
pub trait Drawable {
    /// Axis-aligned bounding box as `(min, max)`; the origin for empty objects
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }

    /// Largest side of the bounding box
    fn extent(&self) -> f32 {
        let (min, max) = self.bounding_box();
        (max - min).max()
    }
}

impl Drawable for [Point3f] {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        let Some(first) = self.first() else {
            return (Point3f::origin(), Point3f::origin());
        };

        self.iter().fold((*first, *first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        })
    }
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        self.vertices.as_slice().bounding_box()
    }
}
