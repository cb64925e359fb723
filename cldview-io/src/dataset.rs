//! Comedy Lab analysis datasets
//!
//! Same table layout as the mocap files, but every column after the time is a
//! free-form measure for one body, named `<body><sep><measure>`, e.g.
//! `Audience 03/laughter` or `Performer:gaze`.

use crate::delimited::{split_column_name, TableReader};
use cldview_core::{AnnotationTrack, Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// All measures recorded for one body
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBody {
    pub name: String,
    pub tracks: Vec<AnnotationTrack>,
}

/// Parsed contents of a dataset file, bodies in header order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetData {
    pub bodies: Vec<DatasetBody>,
}

impl DatasetData {
    pub fn body(&self, name: &str) -> Option<&DatasetBody> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn body_names(&self) -> impl Iterator<Item = &str> {
        self.bodies.iter().map(|b| b.name.as_str())
    }
}

/// Dataset table reader
pub struct DatasetReader;

impl DatasetReader {
    /// Read a dataset file from disk
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read<P: AsRef<Path>>(path: P) -> Result<DatasetData> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::parse_file(format!("cannot read {}: {}", path.display(), e)))?;
        Self::read_from(BufReader::new(file))
    }

    /// Read a dataset table from any buffered source
    pub fn read_from<R: BufRead>(reader: R) -> Result<DatasetData> {
        let table = TableReader::new(reader)?;

        // (body index, track index) for every value column, None for ignored columns
        let mut bodies: Vec<DatasetBody> = Vec::new();
        let mut targets: Vec<Option<(usize, usize)>> = Vec::with_capacity(table.columns().len());
        for header in table.columns() {
            let Some((body, measure)) = split_column_name(header) else {
                debug!(header = %header, "Ignoring column without a body name");
                targets.push(None);
                continue;
            };
            let body_index = match bodies.iter().position(|b| b.name == body) {
                Some(i) => i,
                None => {
                    bodies.push(DatasetBody {
                        name: body.to_string(),
                        tracks: Vec::new(),
                    });
                    bodies.len() - 1
                }
            };
            let tracks = &mut bodies[body_index].tracks;
            if tracks.iter().any(|t| t.name() == measure) {
                return Err(Error::parse(
                    1,
                    format!("measure '{}' repeated for body '{}'", measure, body),
                ));
            }
            tracks.push(AnnotationTrack::new(measure));
            targets.push(Some((body_index, tracks.len() - 1)));
        }

        let mut frames = 0usize;
        for record in table {
            let record = record?;
            frames += 1;
            for (value, target) in record.values.iter().zip(&targets) {
                if let (Some(value), Some((body, track))) = (value, target) {
                    bodies[*body].tracks[*track]
                        .push(record.time, *value as f32)
                        .map_err(|e| Error::parse(record.line, e.to_string()))?;
                }
            }
        }

        for body in &mut bodies {
            body.tracks.retain(|t| {
                if t.is_empty() {
                    debug!(body = %body.name, measure = t.name(), "Dropping empty measure");
                }
                !t.is_empty()
            });
        }
        bodies.retain(|b| !b.tracks.is_empty());

        info!(frames, bodies = bodies.len(), "Dataset read");
        Ok(DatasetData { bodies })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_measures_per_body() {
        let content = "\
Time,Audience 01/laughter,Audience 01/gaze,Performer/gaze,Frame
0.0,0.1,1,0,30
1.0,,0,1,31
";
        let data = DatasetReader::read_from(Cursor::new(content)).unwrap();
        let names: Vec<&str> = data.body_names().collect();
        assert_eq!(names, vec!["Audience 01", "Performer"]);

        let audience = data.body("Audience 01").unwrap();
        assert_eq!(audience.tracks.len(), 2);
        assert_eq!(audience.tracks[0].name(), "laughter");
        assert_eq!(audience.tracks[0].len(), 1);
        assert_eq!(audience.tracks[1].value_at(1.5), Some(0.0));
    }

    #[test]
    fn test_empty_measures_dropped() {
        let content = "time,A/score,B/score\n0,1,\n1,2,NaN\n";
        let data = DatasetReader::read_from(Cursor::new(content)).unwrap();
        assert_eq!(data.bodies.len(), 1);
        assert_eq!(data.bodies[0].name, "A");
    }

    #[test]
    fn test_repeated_measure_rejected() {
        let content = "time,A/score,A/score\n0,1,2\n";
        assert!(matches!(
            DatasetReader::read_from(Cursor::new(content)),
            Err(Error::Parse { line: Some(1), .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = DatasetReader::read("does/not/exist.csv");
        assert!(matches!(result, Err(Error::Parse { line: None, .. })));
    }
}
