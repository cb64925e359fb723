//! Building scenes from mocap files and augmenting them with analysis datasets

use crate::markers;
use cldview_core::{Error, NodeId, NodeRole, Result, Scene};
use cldview_io::{DatasetData, DatasetReader, MocapData, MocapReadOptions, MocapReader};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Configuration for scene building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneBuilderOptions {
    /// Name of the rigid body that carried the recording camera, matched ignoring case
    pub camera_body: String,
    /// Factor applied to every captured position
    pub unit_scale: f32,
    /// Size of the arrow and axes markers in scene units
    pub marker_scale: f32,
    /// Whether to add the arrow and axes markers at all
    pub markers: bool,
}

impl Default for SceneBuilderOptions {
    fn default() -> Self {
        Self {
            camera_body: "Camera".to_string(),
            unit_scale: 1.0,
            marker_scale: 1.0,
            markers: true,
        }
    }
}

impl SceneBuilderOptions {
    pub fn with_camera_body<S: Into<String>>(mut self, name: S) -> Self {
        self.camera_body = name.into();
        self
    }

    pub fn with_unit_scale(mut self, scale: f32) -> Self {
        self.unit_scale = scale;
        self
    }

    pub fn with_marker_scale(mut self, scale: f32) -> Self {
        self.marker_scale = scale;
        self
    }

    pub fn without_markers(mut self) -> Self {
        self.markers = false;
        self
    }
}

/// Outcome of merging a dataset into a scene
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetReport {
    /// Dataset bodies whose measures were attached to a node
    pub matched: Vec<String>,
    /// Dataset bodies with no node of the same name, or whose node was already matched
    pub skipped: Vec<String>,
}

/// Builds [`Scene`]s from Comedy Lab capture files
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    options: SceneBuilderOptions,
}

impl SceneBuilder {
    pub fn new(options: SceneBuilderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SceneBuilderOptions {
        &self.options
    }

    /// Read a mocap file and build a scene from it.
    ///
    /// Fails with [`Error::Parse`] for unreadable or malformed files and with
    /// [`Error::EmptyData`] when no body has any samples. No partial scene is returned.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn build_scene<P: AsRef<Path>>(&self, path: P) -> Result<Scene> {
        let read_options = MocapReadOptions {
            unit_scale: self.options.unit_scale,
        };
        let data = MocapReader::read(path, &read_options)?;
        self.build_from_mocap(data)
    }

    /// Build a scene from already parsed mocap data
    pub fn build_from_mocap(&self, data: MocapData) -> Result<Scene> {
        if data.is_empty() {
            return Err(Error::EmptyData("mocap file contains no tracked bodies".to_string()));
        }

        let mut scene = Scene::new();
        for body in data.bodies {
            let is_camera = body.name.eq_ignore_ascii_case(&self.options.camera_body);
            let role = if is_camera && scene.camera_id().is_none() {
                NodeRole::Camera
            } else {
                if is_camera {
                    warn!(body = %body.name, "Second camera body found, treating it as a person");
                }
                NodeRole::Person
            };

            let id = scene.add_node(body.name, role)?;
            if let Some(node) = scene.node_mut(id) {
                debug!(node = %id, role = %role, samples = body.timeline.len(), "Adding body");
                node.set_timeline(body.timeline);
            }
        }

        if scene.camera_id().is_none() {
            warn!(camera_body = %self.options.camera_body, "No camera body in mocap data");
        }

        if self.options.markers {
            markers::add_markers(&mut scene, self.options.marker_scale)?;
        }

        let (start, finish) = scene
            .update_time_range()
            .ok_or_else(|| Error::EmptyData("mocap file contains no samples".to_string()))?;
        scene.set_time(start);

        info!(
            nodes = scene.len(),
            persons = scene.nodes_with_role(NodeRole::Person).count(),
            camera = scene.camera_id().is_some(),
            start,
            finish,
            "Scene built"
        );
        Ok(scene)
    }

    /// Read a dataset file and attach its measures to the matching nodes.
    ///
    /// The file is parsed completely before the scene is touched, so any error
    /// leaves the scene as it was.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn add_dataset<P: AsRef<Path>>(&self, scene: &mut Scene, path: P) -> Result<DatasetReport> {
        let data = DatasetReader::read(path)?;
        self.apply_dataset(scene, data)
    }

    /// Attach already parsed dataset measures to the matching nodes.
    ///
    /// Bodies without a camera or person node of the same name are skipped, as are
    /// bodies naming a node an earlier body already matched (names differing only
    /// in case). When no body matches at all this fails with [`Error::Dataset`]
    /// and changes nothing.
    pub fn apply_dataset(&self, scene: &mut Scene, data: DatasetData) -> Result<DatasetReport> {
        let mut report = DatasetReport::default();
        let mut matches: Vec<(NodeId, Vec<_>)> = Vec::new();

        for body in data.bodies {
            let target = scene
                .iter()
                .filter(|n| n.role() != NodeRole::Marker)
                .find(|n| n.name().eq_ignore_ascii_case(&body.name))
                .map(|n| n.id());
            match target {
                Some(id) if matches.iter().any(|(matched, _)| *matched == id) => {
                    warn!(
                        body = %body.name,
                        node = %id,
                        "Dataset body names a node already matched by another body, skipping"
                    );
                    report.skipped.push(body.name);
                }
                Some(id) => {
                    report.matched.push(body.name);
                    matches.push((id, body.tracks));
                }
                None => {
                    warn!(body = %body.name, "Dataset body has no matching node, skipping");
                    report.skipped.push(body.name);
                }
            }
        }

        if matches.is_empty() {
            return Err(Error::Dataset(format!(
                "none of the dataset bodies ({}) match a node in the scene",
                report.skipped.join(", ")
            )));
        }

        for (id, tracks) in matches {
            if let Some(node) = scene.node_mut(id) {
                for track in tracks {
                    node.set_annotation(track);
                }
            }
        }

        info!(
            matched = report.matched.len(),
            skipped = report.skipped.len(),
            "Dataset applied"
        );
        Ok(report)
    }
}

/// Build a scene from a mocap file with default options
pub fn build_scene<P: AsRef<Path>>(path: P) -> Result<Scene> {
    SceneBuilder::default().build_scene(path)
}

/// Attach a dataset file to a scene with default options
pub fn add_dataset<P: AsRef<Path>>(scene: &mut Scene, path: P) -> Result<DatasetReport> {
    SceneBuilder::default().add_dataset(scene, path)
}
