//! Comedy Lab motion-capture tables
//!
//! Every tracked rigid body contributes a group of columns to the table:
//! - `x`, `y`, `z`: position (required)
//! - `qx`, `qy`, `qz`, `qw`: orientation as a quaternion, or
//! - `rx`, `ry`, `rz`: orientation as XYZ Euler angles in degrees
//!
//! A body with no orientation columns keeps the identity orientation. Frames where
//! any of a body's cells are empty or `NaN` are dropouts and produce no sample.

use crate::delimited::{split_column_name, Record, TableReader, NAME_SEPARATORS};
use crate::error::FormatError;
use cldview_core::{Error, Quaternionf, Result, RigidTransform, Timeline, Vector3f};
use nalgebra::Quaternion;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Column types that can appear in a body's column group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MocapField {
    X,
    Y,
    Z,
    Qx,
    Qy,
    Qz,
    Qw,
    Rx,
    Ry,
    Rz,
    Unknown,
}

impl MocapField {
    /// Parse the field part of a column name
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "x" | "px" | "pos_x" => MocapField::X,
            "y" | "py" | "pos_y" => MocapField::Y,
            "z" | "pz" | "pos_z" => MocapField::Z,
            "qx" | "rot_x" => MocapField::Qx,
            "qy" | "rot_y" => MocapField::Qy,
            "qz" | "rot_z" => MocapField::Qz,
            "qw" | "rot_w" => MocapField::Qw,
            "rx" | "roll" => MocapField::Rx,
            "ry" | "pitch" => MocapField::Ry,
            "rz" | "yaw" => MocapField::Rz,
            _ => MocapField::Unknown,
        }
    }
}

/// Field names that contain a name separator themselves
const UNDERSCORE_FIELDS: [&str; 7] = ["pos_x", "pos_y", "pos_z", "rot_x", "rot_y", "rot_z", "rot_w"];

/// Split a mocap column name into `(body, field)`.
///
/// `Camera rot_x` is body `Camera` with field `rot_x`; names without an
/// underscore field fall back to [`split_column_name`].
pub fn split_mocap_column(header: &str) -> Option<(&str, &str)> {
    let header = header.trim();
    for alias in UNDERSCORE_FIELDS {
        let Some(cut) = header.len().checked_sub(alias.len()) else {
            continue;
        };
        let Some(field) = header.get(cut..).filter(|f| f.eq_ignore_ascii_case(alias)) else {
            continue;
        };
        let Some(body) = header[..cut].strip_suffix(NAME_SEPARATORS) else {
            continue;
        };
        let body = body.trim_end();
        if !body.is_empty() {
            return Some((body, field));
        }
    }
    split_column_name(header)
}

/// How a body's orientation is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Identity,
    Quaternion([usize; 4]),
    Euler([usize; 3]),
}

/// Column layout of one body: value-column indices for each field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyColumns {
    pub name: String,
    position: [usize; 3],
    orientation: Orientation,
}

/// Column layout of a whole mocap table, bodies in header order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MocapSchema {
    pub bodies: Vec<BodyColumns>,
}

impl MocapSchema {
    /// Derive the body layout from the value column names
    pub fn from_columns(columns: &[String]) -> std::result::Result<Self, FormatError> {
        // (name, slots for x y z qx qy qz qw rx ry rz)
        let mut groups: Vec<(String, [Option<usize>; 10])> = Vec::new();

        for (index, header) in columns.iter().enumerate() {
            let column = index + 2;
            let Some((body, field)) = split_mocap_column(header) else {
                debug!(column, header = %header, "Ignoring column without a body name");
                continue;
            };
            let slot = match MocapField::from_name(field) {
                MocapField::X => 0,
                MocapField::Y => 1,
                MocapField::Z => 2,
                MocapField::Qx => 3,
                MocapField::Qy => 4,
                MocapField::Qz => 5,
                MocapField::Qw => 6,
                MocapField::Rx => 7,
                MocapField::Ry => 8,
                MocapField::Rz => 9,
                MocapField::Unknown => {
                    debug!(column, header = %header, "Ignoring unrecognized field");
                    continue;
                }
            };

            let group = match groups.iter().position(|(name, _)| name == body) {
                Some(i) => i,
                None => {
                    groups.push((body.to_string(), [None; 10]));
                    groups.len() - 1
                }
            };
            if groups[group].1[slot].replace(index).is_some() {
                return Err(FormatError::Header {
                    column,
                    header: header.clone(),
                    message: format!("field '{}' repeated for body '{}'", field, body),
                });
            }
        }

        let bodies = groups
            .into_iter()
            .map(|(name, slots)| Self::body_columns(name, slots, columns))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { bodies })
    }

    fn body_columns(
        name: String,
        slots: [Option<usize>; 10],
        columns: &[String],
    ) -> std::result::Result<BodyColumns, FormatError> {
        let first_column = slots.iter().flatten().min().copied().unwrap_or(0);
        let incomplete = |what: &str| FormatError::Header {
            column: first_column + 2,
            header: columns.get(first_column).cloned().unwrap_or_default(),
            message: format!("body '{}' has incomplete {} columns", name, what),
        };

        let position = match (slots[0], slots[1], slots[2]) {
            (Some(x), Some(y), Some(z)) => [x, y, z],
            _ => return Err(incomplete("position")),
        };

        // Quaternion columns win when both orientation encodings are present
        let orientation = match slots {
            [_, _, _, Some(qx), Some(qy), Some(qz), Some(qw), ..] => {
                Orientation::Quaternion([qx, qy, qz, qw])
            }
            [_, _, _, None, None, None, None, Some(rx), Some(ry), Some(rz)] => {
                Orientation::Euler([rx, ry, rz])
            }
            [_, _, _, None, None, None, None, None, None, None] => Orientation::Identity,
            [_, _, _, None, None, None, None, ..] => return Err(incomplete("rotation")),
            _ => return Err(incomplete("quaternion")),
        };

        Ok(BodyColumns {
            name,
            position,
            orientation,
        })
    }
}

impl BodyColumns {
    /// Pose of this body in one frame, or `None` for a dropout
    fn pose(&self, record: &Record, unit_scale: f32) -> std::result::Result<Option<RigidTransform>, FormatError> {
        let value = |i: usize| record.values.get(i).copied().flatten();

        let [x, y, z] = self.position;
        let (Some(x), Some(y), Some(z)) = (value(x), value(y), value(z)) else {
            return Ok(None);
        };
        let translation = Vector3f::new(x as f32, y as f32, z as f32) * unit_scale;

        let rotation = match self.orientation {
            Orientation::Identity => Quaternionf::identity(),
            Orientation::Quaternion([i, j, k, w]) => {
                let (Some(i), Some(j), Some(k), Some(w)) = (value(i), value(j), value(k), value(w)) else {
                    return Ok(None);
                };
                let q = Quaternion::new(w as f32, i as f32, j as f32, k as f32);
                Quaternionf::try_new(q, 1.0e-6).ok_or_else(|| FormatError::ZeroRotation {
                    body: self.name.clone(),
                })?
            }
            Orientation::Euler([rx, ry, rz]) => {
                let (Some(rx), Some(ry), Some(rz)) = (value(rx), value(ry), value(rz)) else {
                    return Ok(None);
                };
                Quaternionf::from_euler_angles(
                    (rx as f32).to_radians(),
                    (ry as f32).to_radians(),
                    (rz as f32).to_radians(),
                )
            }
        };

        Ok(Some(RigidTransform::from_translation_rotation(translation, rotation)))
    }
}

/// Options for reading mocap tables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MocapReadOptions {
    /// Factor applied to every position, e.g. `0.001` for millimetre captures
    pub unit_scale: f32,
}

impl Default for MocapReadOptions {
    fn default() -> Self {
        Self { unit_scale: 1.0 }
    }
}

/// Captured motion of one named rigid body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyTrack {
    pub name: String,
    pub timeline: Timeline,
}

/// Parsed contents of a mocap file, bodies in header order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MocapData {
    pub bodies: Vec<BodyTrack>,
}

impl MocapData {
    pub fn body(&self, name: &str) -> Option<&BodyTrack> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Total number of samples across all bodies
    pub fn sample_count(&self) -> usize {
        self.bodies.iter().map(|b| b.timeline.len()).sum()
    }
}

/// Mocap table reader
pub struct MocapReader;

impl MocapReader {
    /// Read a mocap file from disk
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read<P: AsRef<Path>>(path: P, options: &MocapReadOptions) -> Result<MocapData> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::parse_file(format!("cannot read {}: {}", path.display(), e)))?;
        Self::read_from(BufReader::new(file), options)
    }

    /// Read a mocap table from any buffered source
    pub fn read_from<R: BufRead>(reader: R, options: &MocapReadOptions) -> Result<MocapData> {
        let table = TableReader::new(reader)?;
        let schema = MocapSchema::from_columns(table.columns()).map_err(|e| e.at_line(1))?;
        debug!(
            delimiter = ?table.delimiter(),
            bodies = schema.bodies.len(),
            "Mocap header parsed"
        );

        let mut timelines = vec![Timeline::new(); schema.bodies.len()];
        let mut frames = 0usize;
        for record in table {
            let record = record?;
            frames += 1;
            for (body, timeline) in schema.bodies.iter().zip(timelines.iter_mut()) {
                let pose = body
                    .pose(&record, options.unit_scale)
                    .map_err(|e| e.at_line(record.line))?;
                if let Some(pose) = pose {
                    timeline
                        .push(record.time, pose)
                        .map_err(|e| Error::parse(record.line, e.to_string()))?;
                }
            }
        }

        let mut bodies = Vec::with_capacity(schema.bodies.len());
        for (columns, timeline) in schema.bodies.into_iter().zip(timelines) {
            if timeline.is_empty() {
                warn!(body = %columns.name, "Body has no captured samples, dropping it");
                continue;
            }
            bodies.push(BodyTrack {
                name: columns.name,
                timeline,
            });
        }

        let data = MocapData { bodies };
        info!(
            frames,
            bodies = data.bodies.len(),
            samples = data.sample_count(),
            "Mocap data read"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn read(content: &str) -> Result<MocapData> {
        MocapReader::read_from(Cursor::new(content), &MocapReadOptions::default())
    }

    #[test]
    fn test_field_names() {
        assert_eq!(MocapField::from_name("X"), MocapField::X);
        assert_eq!(MocapField::from_name("qw"), MocapField::Qw);
        assert_eq!(MocapField::from_name("yaw"), MocapField::Rz);
        assert_eq!(MocapField::from_name("marker"), MocapField::Unknown);
    }

    #[test]
    fn test_split_underscore_fields() {
        assert_eq!(split_mocap_column("Camera rot_x"), Some(("Camera", "rot_x")));
        assert_eq!(split_mocap_column("Person_1_POS_Z"), Some(("Person_1", "POS_Z")));
        assert_eq!(split_mocap_column("Person_1_qw"), Some(("Person_1", "qw")));
        assert_eq!(split_mocap_column("rot_x"), Some(("rot", "x")));
    }

    #[test]
    fn test_read_underscore_field_names() {
        let content = "\
time,Camera pos_x,Camera pos_y,Camera pos_z,Camera rot_x,Camera rot_y,Camera rot_z,Camera rot_w
0,1,2,3,0,0,0.7071068,0.7071068
";
        let data = read(content).unwrap();
        let names: Vec<&str> = data.bodies.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Camera"]);

        let pose = data.bodies[0].timeline.first().unwrap().transform;
        assert_eq!(pose.translation, Vector3f::new(1.0, 2.0, 3.0));
        assert_relative_eq!(pose.rotation.angle(), std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_read_positions_and_quaternions() {
        let content = "\
time,Camera/x,Camera/y,Camera/z,Camera/qx,Camera/qy,Camera/qz,Camera/qw,Person1/x,Person1/y,Person1/z
0.0,1,2,3,0,0,0,2,10,0,0
0.5,1,2,4,0,0,0,1,11,0,0
";
        let data = read(content).unwrap();
        assert_eq!(data.bodies.len(), 2);

        let camera = data.body("Camera").unwrap();
        assert_eq!(camera.timeline.len(), 2);
        let first = camera.timeline.first().unwrap();
        assert_eq!(first.transform.translation, Vector3f::new(1.0, 2.0, 3.0));
        assert!(first.transform.rotation.angle() < 1e-6);

        let person = data.body("Person1").unwrap();
        assert_eq!(person.timeline.finish_time(), Some(0.5));
        assert!(person.timeline.iter().all(|s| s.transform.rotation.angle() == 0.0));
    }

    #[test]
    fn test_read_euler_degrees() {
        let content = "time\tA x\tA y\tA z\tA rx\tA ry\tA rz\n0\t0\t0\t0\t0\t0\t90\n";
        let data = read(content).unwrap();
        let pose = data.bodies[0].timeline.first().unwrap().transform;
        assert_relative_eq!(pose.rotation.angle(), std::f32::consts::FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_dropouts_skip_samples() {
        let content = "\
time,A/x,A/y,A/z,B/x,B/y,B/z
0,0,0,0,NaN,NaN,NaN
1,1,1,1,,2,2
2,2,2,2,3,3,3
";
        let data = read(content).unwrap();
        assert_eq!(data.body("A").unwrap().timeline.len(), 3);
        let b = &data.body("B").unwrap().timeline;
        assert_eq!(b.len(), 1);
        assert_eq!(b.start_time(), Some(2.0));
    }

    #[test]
    fn test_body_without_samples_is_dropped() {
        let content = "time,A/x,A/y,A/z,B/x,B/y,B/z\n0,0,0,0,,,\n";
        let data = read(content).unwrap();
        assert_eq!(data.bodies.len(), 1);
        assert_eq!(data.bodies[0].name, "A");
    }

    #[test]
    fn test_unit_scale() {
        let options = MocapReadOptions { unit_scale: 0.001 };
        let data = MocapReader::read_from(Cursor::new("time A:x A:y A:z\n0 1000 2000 -500\n"), &options).unwrap();
        let t = data.bodies[0].timeline.first().unwrap().transform.translation;
        assert_relative_eq!(t, Vector3f::new(1.0, 2.0, -0.5), epsilon = 1e-6);
    }

    #[test]
    fn test_header_errors() {
        // missing z
        assert!(matches!(read("time,A/x,A/y\n0,1,2\n"), Err(Error::Parse { line: Some(1), .. })));
        // partial quaternion
        assert!(read("time,A/x,A/y,A/z,A/qw\n0,1,2,3,1\n").is_err());
        // repeated field
        assert!(read("time,A/x,A/x,A/y,A/z\n0,1,1,2,3\n").is_err());
    }

    #[test]
    fn test_zero_quaternion_rejected() {
        let content = "time,A/x,A/y,A/z,A/qx,A/qy,A/qz,A/qw\n0,0,0,0,0,0,0,0\n";
        assert!(matches!(read(content), Err(Error::Parse { line: Some(2), .. })));
    }

    #[test]
    fn test_unknown_columns_ignored() {
        let content = "time,Frame,A/x,A/y,A/z,A/residual\n0,1,0,0,0,0.2\n";
        let data = read(content).unwrap();
        assert_eq!(data.bodies.len(), 1);
        assert_eq!(data.sample_count(), 1);
    }

    #[test]
    fn test_header_only_yields_no_bodies() {
        let data = read("time,A/x,A/y,A/z\n").unwrap();
        assert!(data.is_empty());
    }
}
