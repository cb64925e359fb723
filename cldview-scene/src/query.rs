//! Scene queries and fixed camera viewpoints

use cldview_core::{Error, Node, NodeRole, Point3f, Result, RigidTransform, Scene, Vector3f};
use serde::Serialize;
use tracing::debug;

/// A named, data-independent camera viewpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StandardCameraPosition {
    pub name: &'static str,
    pub transform: RigidTransform,
}

/// Eye points of the standard viewpoints, in metres, scene Y up.
/// The stage is at -Z, the audience at +Z.
const STANDARD_EYES: [(&str, [f32; 3]); 5] = [
    ("Overhead", [0.0, 12.0, 0.0]),
    ("Front", [0.0, 1.6, 9.0]),
    ("Side", [9.0, 1.6, 0.0]),
    ("Stage", [0.0, 1.7, -4.0]),
    ("Audience", [0.0, 1.2, 6.0]),
];

/// Person nodes in creation order
pub fn person_nodes(scene: &Scene) -> Vec<&Node> {
    scene.nodes_with_role(NodeRole::Person).collect()
}

/// The fixed list of standard viewpoints, each looking at the scene origin
pub fn standard_camera_positions(_scene: &Scene) -> Vec<StandardCameraPosition> {
    let target = Point3f::origin();
    STANDARD_EYES
        .iter()
        .map(|&(name, [x, y, z])| StandardCameraPosition {
            name,
            transform: RigidTransform::look_at(&Point3f::new(x, y, z), &target, &Vector3f::y()),
        })
        .collect()
}

/// Move the scene camera to the standard viewpoint called `name` (ignoring case)
pub fn apply_standard_position(scene: &mut Scene, name: &str) -> Result<()> {
    let position = standard_camera_positions(scene)
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::InvalidData(format!("unknown standard camera position '{}'", name)))?;

    let camera = scene
        .camera_mut()
        .ok_or_else(|| Error::NodeNotFound("scene has no camera".to_string()))?;
    camera.set_transform(position.transform);
    debug!(position = position.name, "Camera moved to standard position");
    Ok(())
}
