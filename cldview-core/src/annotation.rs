//! Analysis-dataset values attached to tracked bodies

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A named scalar measure over time, e.g. a laughter or gaze score.
///
/// Values hold until the next sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationTrack {
    name: String,
    samples: Vec<(f64, f32)>,
}

impl AnnotationTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a value. Its timestamp must be finite and later than the last one.
    pub fn push(&mut self, time: f64, value: f32) -> Result<()> {
        if !time.is_finite() {
            return Err(Error::InvalidData(format!("Annotation time {} is not finite", time)));
        }
        if let Some(&(last, _)) = self.samples.last() {
            if time <= last {
                return Err(Error::InvalidData(format!(
                    "Annotation '{}' time {} does not follow {}",
                    self.name, time, last
                )));
            }
        }
        self.samples.push((time, value));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[(f64, f32)] {
        &self.samples
    }

    /// Most recent value at or before `t`
    pub fn value_at(&self, t: f64) -> Option<f32> {
        let index = self.samples.partition_point(|&(time, _)| time <= t);
        index.checked_sub(1).map(|i| self.samples[i].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_at_holds_previous_sample() {
        let mut track = AnnotationTrack::new("laughter");
        track.push(1.0, 0.2).unwrap();
        track.push(3.0, 0.9).unwrap();

        assert_eq!(track.value_at(0.5), None);
        assert_eq!(track.value_at(1.0), Some(0.2));
        assert_eq!(track.value_at(2.9), Some(0.2));
        assert_eq!(track.value_at(10.0), Some(0.9));
    }

    #[test]
    fn test_push_rejects_out_of_order() {
        let mut track = AnnotationTrack::new("gaze");
        track.push(2.0, 1.0).unwrap();
        assert!(track.push(1.0, 0.0).is_err());
        assert_eq!(track.len(), 1);
    }
}
