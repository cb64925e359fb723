//! Scene building and viewing helpers for the Comedy Lab viewer
//!
//! [`build_scene`] turns a mocap file into a [`Scene`] with one camera node, one
//! node per tracked person and two orientation markers. [`add_dataset`] layers
//! analysis measures onto the same nodes. The remaining modules position the
//! camera: fixed viewpoints, saved position blobs and person or overhead views.

pub mod builder;
pub mod markers;
pub mod positioning;
pub mod pov;
pub mod query;

pub use builder::{add_dataset, build_scene, DatasetReport, SceneBuilder, SceneBuilderOptions};
pub use markers::{ARROW_NODE, AXES_NODE};
pub use positioning::{decode_position, encode_position, position_data, set_position, POSITION_DATA_LEN};
pub use pov::{apply_pov, pov_ortho, pov_with_person, PointOfView, Projection};
pub use query::{apply_standard_position, person_nodes, standard_camera_positions, StandardCameraPosition};

pub use cldview_core::{Error, Node, NodeId, NodeRole, Result, Scene};
