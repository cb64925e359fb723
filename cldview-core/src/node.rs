//! Scene nodes

use crate::annotation::AnnotationTrack;
use crate::mesh::TriangleMesh;
use crate::timeline::Timeline;
use crate::transform::RigidTransform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Index of a node in its scene's node store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node stands for in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// The recording camera; at most one per scene
    Camera,
    /// A tracked performer or audience member
    Person,
    /// Static orientation aid such as the arrow or axes
    Marker,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeRole::Camera => "camera",
            NodeRole::Person => "person",
            NodeRole::Marker => "marker",
        };
        f.write_str(name)
    }
}

/// A named point in the scene with a current pose and, optionally, captured motion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    name: String,
    role: NodeRole,
    parent: Option<NodeId>,
    transform: RigidTransform,
    timeline: Option<Timeline>,
    geometry: Option<TriangleMesh>,
    annotations: BTreeMap<String, AnnotationTrack>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String, role: NodeRole) -> Self {
        Self {
            id,
            name,
            role,
            parent: None,
            transform: RigidTransform::identity(),
            timeline: None,
            geometry: None,
            annotations: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn is_camera(&self) -> bool {
        self.role == NodeRole::Camera
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Current pose relative to the parent (or the scene root)
    pub fn transform(&self) -> &RigidTransform {
        &self.transform
    }

    /// Overwrite the current pose. The timeline is left alone.
    pub fn set_transform(&mut self, transform: RigidTransform) {
        self.transform = transform;
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    /// Attach captured motion and move the node to its first pose
    pub fn set_timeline(&mut self, timeline: Timeline) {
        if let Some(first) = timeline.first() {
            self.transform = first.transform;
        }
        self.timeline = Some(timeline);
    }

    pub fn geometry(&self) -> Option<&TriangleMesh> {
        self.geometry.as_ref()
    }

    pub fn set_geometry(&mut self, geometry: TriangleMesh) {
        self.geometry = Some(geometry);
    }

    pub fn annotations(&self) -> impl Iterator<Item = &AnnotationTrack> {
        self.annotations.values()
    }

    pub fn annotation(&self, name: &str) -> Option<&AnnotationTrack> {
        self.annotations.get(name)
    }

    /// Attach an annotation track, replacing any previous track of the same name
    pub fn set_annotation(&mut self, track: AnnotationTrack) {
        self.annotations.insert(track.name().to_string(), track);
    }

    /// Pose this node at time `t` from its timeline; returns false if it has none
    pub(crate) fn pose_at(&mut self, t: f64) -> bool {
        match self.timeline.as_ref().and_then(|tl| tl.sample_at(t)) {
            Some(transform) => {
                self.transform = transform;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Vector3f;

    #[test]
    fn test_set_timeline_moves_to_first_sample() {
        let mut node = Node::new(NodeId(0), "Person1".into(), NodeRole::Person);
        let mut timeline = Timeline::new();
        timeline
            .push(0.0, RigidTransform::translation(Vector3f::new(1.0, 2.0, 3.0)))
            .unwrap();
        timeline
            .push(1.0, RigidTransform::translation(Vector3f::new(4.0, 5.0, 6.0)))
            .unwrap();

        node.set_timeline(timeline);
        assert_eq!(node.transform().translation, Vector3f::new(1.0, 2.0, 3.0));
        assert_eq!(node.timeline().map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_set_transform_keeps_timeline() {
        let mut node = Node::new(NodeId(0), "Camera".into(), NodeRole::Camera);
        let mut timeline = Timeline::new();
        timeline.push(0.0, RigidTransform::identity()).unwrap();
        node.set_timeline(timeline.clone());

        node.set_transform(RigidTransform::translation(Vector3f::new(0.0, 9.0, 0.0)));
        assert_eq!(node.timeline(), Some(&timeline));
        assert_eq!(node.transform().translation.y, 9.0);
    }
}
