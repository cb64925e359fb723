//! Readers for Comedy Lab capture files
//!
//! This crate reads the two lab formats the viewer consumes:
//! - motion-capture tables ([`mocap`]): timestamped poses of named rigid bodies
//! - analysis datasets ([`dataset`]): timestamped measures keyed by the same body names
//!
//! Both share the delimited table layout implemented in [`delimited`].

pub mod dataset;
pub mod delimited;
pub mod error;
pub mod mocap;

pub use dataset::{DatasetBody, DatasetData, DatasetReader};
pub use delimited::{Delimiter, Record, TableReader};
pub use error::*;
pub use mocap::{BodyTrack, MocapData, MocapReadOptions, MocapReader};
