//! Static orientation markers: a single arrow and a set of coloured axes

use cldview_core::{
    NodeId, NodeRole, Point3f, Quaternionf, Result, RigidTransform, Scene, TriangleMesh, Vector3f,
};
use std::f32::consts::{PI, TAU};
use tracing::debug;

pub const ARROW_NODE: &str = "arrow";
pub const AXES_NODE: &str = "axes";

const SEGMENTS: usize = 16;
const SHAFT_RADIUS: f32 = 0.02;
const HEAD_RADIUS: f32 = 0.06;
const HEAD_LENGTH: f32 = 0.25;

const ARROW_COLOR: [u8; 3] = [230, 230, 230];
const X_COLOR: [u8; 3] = [220, 40, 40];
const Y_COLOR: [u8; 3] = [40, 200, 40];
const Z_COLOR: [u8; 3] = [40, 80, 230];

/// Push a ring of `SEGMENTS` vertices around the Z axis, returning the index of the first
fn push_ring(mesh: &mut TriangleMesh, radius: f32, z: f32) -> usize {
    let first = mesh.vertex_count();
    for i in 0..SEGMENTS {
        let angle = TAU * i as f32 / SEGMENTS as f32;
        mesh.add_vertex(Point3f::new(radius * angle.cos(), radius * angle.sin(), z));
    }
    first
}

/// Fan a ring onto a single apex; `outward` picks the winding for the +Z side
fn fan(mesh: &mut TriangleMesh, ring: usize, apex: usize, outward: bool) {
    for i in 0..SEGMENTS {
        let a = ring + i;
        let b = ring + (i + 1) % SEGMENTS;
        if outward {
            mesh.add_face([a, b, apex]);
        } else {
            mesh.add_face([b, a, apex]);
        }
    }
}

/// An arrow of the given length from the origin along +Z: a capped cylinder shaft
/// and a cone head.
pub fn arrow(length: f32) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let shaft_end = length * (1.0 - HEAD_LENGTH);

    let base_center = mesh.vertex_count();
    mesh.add_vertex(Point3f::new(0.0, 0.0, 0.0));
    let base = push_ring(&mut mesh, length * SHAFT_RADIUS, 0.0);
    let top = push_ring(&mut mesh, length * SHAFT_RADIUS, shaft_end);
    fan(&mut mesh, base, base_center, false);
    for i in 0..SEGMENTS {
        let j = (i + 1) % SEGMENTS;
        mesh.add_face([base + i, base + j, top + j]);
        mesh.add_face([base + i, top + j, top + i]);
    }

    let head = push_ring(&mut mesh, length * HEAD_RADIUS, shaft_end);
    let head_center = mesh.vertex_count();
    mesh.add_vertex(Point3f::new(0.0, 0.0, shaft_end));
    let tip = mesh.vertex_count();
    mesh.add_vertex(Point3f::new(0.0, 0.0, length));
    fan(&mut mesh, head, head_center, false);
    fan(&mut mesh, head, tip, true);

    mesh.fill_color(ARROW_COLOR);
    mesh
}

/// Three arrows along +X (red), +Y (green) and +Z (blue)
pub fn axes(length: f32) -> TriangleMesh {
    let z = arrow(length);
    let to_x = RigidTransform::rotation(Quaternionf::from_axis_angle(&Vector3f::y_axis(), PI / 2.0));
    let to_y = RigidTransform::rotation(Quaternionf::from_axis_angle(&Vector3f::x_axis(), -PI / 2.0));

    let mut x = z.transformed(&to_x);
    x.fill_color(X_COLOR);
    let mut y = z.transformed(&to_y);
    y.fill_color(Y_COLOR);
    let mut z = z;
    z.fill_color(Z_COLOR);

    let mut mesh = x;
    mesh.merge(&y);
    mesh.merge(&z);
    mesh
}

/// Add the `arrow` and `axes` marker nodes at the scene origin
pub fn add_markers(scene: &mut Scene, scale: f32) -> Result<(NodeId, NodeId)> {
    let arrow_id = scene.add_node(ARROW_NODE, NodeRole::Marker)?;
    if let Some(node) = scene.node_mut(arrow_id) {
        node.set_geometry(arrow(scale));
    }
    let axes_id = scene.add_node(AXES_NODE, NodeRole::Marker)?;
    if let Some(node) = scene.node_mut(axes_id) {
        node.set_geometry(axes(scale));
    }
    debug!(scale, "Added marker nodes");
    Ok((arrow_id, axes_id))
}
