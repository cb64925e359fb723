//! Time-stamped motion for a single tracked body

use crate::error::{Error, Result};
use crate::transform::RigidTransform;
use serde::{Deserialize, Serialize};

/// One captured pose
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds from the start of the recording
    pub time: f64,
    pub transform: RigidTransform,
}

impl Sample {
    pub fn new(time: f64, transform: RigidTransform) -> Self {
        Self { time, transform }
    }
}

/// Ordered pose samples with strictly increasing timestamps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    samples: Vec<Sample>,
}

impl Timeline {
    /// Create a new empty timeline
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Create a new timeline with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Build a timeline from samples, checking their ordering
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        let mut timeline = Self::with_capacity(samples.len());
        for sample in samples {
            timeline.push(sample.time, sample.transform)?;
        }
        Ok(timeline)
    }

    /// Append a sample. Its timestamp must be finite and later than the last one.
    pub fn push(&mut self, time: f64, transform: RigidTransform) -> Result<()> {
        if !time.is_finite() {
            return Err(Error::InvalidData(format!("Sample time {} is not finite", time)));
        }
        if let Some(last) = self.samples.last() {
            if time <= last.time {
                return Err(Error::InvalidData(format!(
                    "Sample time {} does not follow {}",
                    time, last.time
                )));
            }
        }
        self.samples.push(Sample::new(time, transform));
        Ok(())
    }

    /// Get the number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the timeline is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Timestamp of the first sample
    pub fn start_time(&self) -> Option<f64> {
        self.first().map(|s| s.time)
    }

    /// Timestamp of the last sample
    pub fn finish_time(&self) -> Option<f64> {
        self.last().map(|s| s.time)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Pose at time `t`.
    ///
    /// Before the first sample this is the first pose, after the last it is the last
    /// pose; in between the two neighbouring samples are interpolated.
    pub fn sample_at(&self, t: f64) -> Option<RigidTransform> {
        let first = self.samples.first()?;
        let index = self.samples.partition_point(|s| s.time <= t);
        if index == 0 {
            return Some(first.transform);
        }
        let before = &self.samples[index - 1];
        let Some(after) = self.samples.get(index) else {
            return Some(before.transform);
        };
        let fraction = ((t - before.time) / (after.time - before.time)) as f32;
        Some(before.transform.interpolate(&after.transform, fraction))
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
