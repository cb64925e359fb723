//! Points of view for looking at a scene

use cldview_core::{
    Drawable, Error, Matrix4, NodeId, NodeRole, Point3f, Result, RigidTransform, Scene, Vector3f,
};
use nalgebra::{Orthographic3, Perspective3};
use tracing::debug;

const DEFAULT_FOV_Y: f32 = std::f32::consts::FRAC_PI_3;
const DEFAULT_ASPECT: f32 = 16.0 / 9.0;
const OVERHEAD_CLEARANCE: f32 = 10.0;
const ORTHO_MARGIN: f32 = 1.2;
const MIN_ORTHO_SCALE: f32 = 1.0;

/// Lens of a point of view
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// `fov_y` is the vertical field of view in radians
    Perspective { fov_y: f32, near: f32, far: f32 },
    /// `scale` is half the visible height in scene units
    Orthographic { scale: f32, near: f32, far: f32 },
}

/// Where a viewer stands and how it sees
#[derive(Debug, Clone, PartialEq)]
pub struct PointOfView {
    pub transform: RigidTransform,
    pub projection: Projection,
    pub aspect_ratio: f32,
}

impl PointOfView {
    pub fn new(transform: RigidTransform, projection: Projection) -> Self {
        Self {
            transform,
            projection,
            aspect_ratio: DEFAULT_ASPECT,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.transform.inverse().to_homogeneous()
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.projection {
            Projection::Perspective { fov_y, near, far } => {
                Perspective3::new(self.aspect_ratio, fov_y, near, far).into_inner()
            }
            Projection::Orthographic { scale, near, far } => {
                let half_width = scale * self.aspect_ratio;
                Orthographic3::new(-half_width, half_width, -scale, scale, near, far).into_inner()
            }
        }
    }
}

impl Default for PointOfView {
    fn default() -> Self {
        Self::new(
            RigidTransform::look_at(
                &Point3f::new(0.0, 0.0, 5.0),
                &Point3f::origin(),
                &Vector3f::y(),
            ),
            Projection::Perspective {
                fov_y: DEFAULT_FOV_Y,
                near: 0.1,
                far: 100.0,
            },
        )
    }
}

/// Orthographic view straight down onto everyone in the scene.
///
/// Framed on the bounding box of the persons' current positions; an empty scene
/// is framed on the origin. The stage side (-Z) is at the top of the image.
pub fn pov_ortho(scene: &Scene) -> PointOfView {
    let positions: Vec<Point3f> = scene
        .nodes_with_role(NodeRole::Person)
        .filter_map(|n| scene.world_transform(n.id()))
        .map(|t| t.position())
        .collect();

    let (min, max) = positions.as_slice().bounding_box();
    let center = positions.as_slice().center();
    let eye = Point3f::new(center.x, max.y + OVERHEAD_CLEARANCE, center.z);
    let scale = (0.5 * (max.x - min.x).max(max.z - min.z) * ORTHO_MARGIN).max(MIN_ORTHO_SCALE);

    debug!(persons = positions.len(), scale, "Orthographic point of view");
    PointOfView::new(
        RigidTransform::look_at(&eye, &center, &-Vector3f::z()),
        Projection::Orthographic {
            scale,
            near: 0.1,
            far: eye.y - min.y + OVERHEAD_CLEARANCE,
        },
    )
}

/// Perspective view through the eyes of a person
pub fn pov_with_person(scene: &Scene, id: NodeId) -> Result<PointOfView> {
    let node = scene
        .node(id)
        .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
    if node.role() != NodeRole::Person {
        return Err(Error::InvalidData(format!(
            "'{}' is a {} node, not a person",
            node.name(),
            node.role()
        )));
    }
    let transform = scene
        .world_transform(id)
        .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;

    Ok(PointOfView::new(
        transform,
        Projection::Perspective {
            fov_y: DEFAULT_FOV_Y,
            near: 0.05,
            far: 100.0,
        },
    ))
}

/// Put the scene camera at a point of view
pub fn apply_pov(scene: &mut Scene, pov: &PointOfView) -> Result<()> {
    let camera = scene
        .camera_mut()
        .ok_or_else(|| Error::NodeNotFound("scene has no camera".to_string()))?;
    camera.set_transform(pov.transform);
    Ok(())
}
