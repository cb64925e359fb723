//! Owned scene graph: a flat store of nodes plus the playback range

use crate::error::{Error, Result};
use crate::node::{Node, NodeId, NodeRole};
use crate::transform::RigidTransform;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Root container for a capture session.
///
/// Nodes live in creation order and are addressed by [`NodeId`]. `start_time` and
/// `finish_time` bound the span covered by the attached timelines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    nodes: Vec<Node>,
    camera: Option<NodeId>,
    start_time: f64,
    finish_time: f64,
    current_time: f64,
}

impl Scene {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at the scene root. A scene holds at most one camera.
    pub fn add_node(&mut self, name: impl Into<String>, role: NodeRole) -> Result<NodeId> {
        let name = name.into();
        if role == NodeRole::Camera {
            if let Some(existing) = self.camera() {
                return Err(Error::InvalidData(format!(
                    "Scene already has camera '{}', cannot add '{}'",
                    existing.name(),
                    name
                )));
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, name, role));
        if role == NodeRole::Camera {
            self.camera = Some(id);
        }
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn camera_id(&self) -> Option<NodeId> {
        self.camera
    }

    pub fn camera(&self) -> Option<&Node> {
        self.camera.and_then(|id| self.node(id))
    }

    pub fn camera_mut(&mut self) -> Option<&mut Node> {
        let id = self.camera?;
        self.nodes.get_mut(id.0)
    }

    /// First node whose name matches, ignoring ASCII case
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name().eq_ignore_ascii_case(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|n| n.name().eq_ignore_ascii_case(name))
    }

    /// Nodes of one role, in creation order
    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.role() == role)
    }

    /// Re-parent `child`; `None` moves it back to the root.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<()> {
        if self.node(child).is_none() {
            return Err(Error::NodeNotFound(child.to_string()));
        }
        if let Some(parent) = parent {
            if self.node(parent).is_none() {
                return Err(Error::NodeNotFound(parent.to_string()));
            }
            let mut cursor = Some(parent);
            while let Some(id) = cursor {
                if id == child {
                    return Err(Error::InvalidData(format!(
                        "Parenting {} under {} would create a cycle",
                        child, parent
                    )));
                }
                cursor = self.node(id).and_then(|n| n.parent());
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.set_parent(parent);
        }
        Ok(())
    }

    /// Pose of a node in scene space, composed through its ancestors
    pub fn world_transform(&self, id: NodeId) -> Option<RigidTransform> {
        let mut node = self.node(id)?;
        let mut world = *node.transform();
        while let Some(parent) = node.parent().and_then(|p| self.node(p)) {
            world = *parent.transform() * world;
            node = parent;
        }
        Some(world)
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn finish_time(&self) -> f64 {
        self.finish_time
    }

    pub fn time_range(&self) -> (f64, f64) {
        (self.start_time, self.finish_time)
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Recompute the playback range from every attached timeline.
    ///
    /// Returns the new range, or `None` (range untouched) when no node has motion.
    pub fn update_time_range(&mut self) -> Option<(f64, f64)> {
        let (start, finish) = self
            .nodes
            .iter()
            .filter_map(|n| n.timeline())
            .filter_map(|tl| Some((tl.start_time()?, tl.finish_time()?)))
            .reduce(|(lo, hi), (start, finish)| (lo.min(start), hi.max(finish)))?;

        self.start_time = start;
        self.finish_time = finish;
        self.current_time = self.current_time.max(start).min(finish);
        debug!(start, finish, "Scene time range updated");
        Some((start, finish))
    }

    /// Move the playback cursor and pose every animated node for that instant.
    ///
    /// `t` is clamped into the scene's time range; the clamped value is returned.
    pub fn set_time(&mut self, t: f64) -> f64 {
        let t = t.max(self.start_time).min(self.finish_time);
        self.current_time = t;
        let posed = self
            .nodes
            .iter_mut()
            .map(|n| n.pose_at(t))
            .filter(|&posed| posed)
            .count();
        debug!(time = t, posed, "Scene time set");
        t
    }
}

impl<'a> IntoIterator for &'a Scene {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
