//! Per-segment speed aggregation for the grouped bar comparison
//!
//! The fetch collaborator supplies two labeled datasets of
//! `{segment, avgSpeed}` records. This module buckets them by integer
//! segment index into two equal-length series for the chart collaborator
//! to render; the rendering itself is out of scope.

use serde::{Deserialize, Serialize};

/// One average-speed sample for a segment index, as delivered by the data
/// fetch collaborator
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedRecord {
    /// Zero-based segment index along the path
    pub segment: usize,
    /// Average speed observed on that segment
    #[serde(rename = "avgSpeed")]
    pub avg_speed: f64,
}

/// Two speed-by-segment series bucketed over a shared segment range
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SpeedComparison {
    /// Buckets for the primary dataset, indexed by segment
    pub primary: Vec<f64>,
    /// Buckets for the comparison dataset, same length as `primary`
    pub compare: Vec<f64>,
}

impl SpeedComparison {
    /// Bucket both datasets over 0..N where N is the highest segment index
    /// seen in either dataset plus one (0 when both are empty)
    ///
    /// Records accumulate into their segment's bucket; buckets with no
    /// contributing records stay 0.
    pub fn bucket(primary: &[SpeedRecord], compare: &[SpeedRecord]) -> Self {
        let max_segment = primary
            .iter()
            .chain(compare)
            .map(|record| record.segment)
            .max();
        let Some(max_segment) = max_segment else {
            return Self::default();
        };
        let buckets = max_segment + 1;

        let mut result = Self {
            primary: vec![0.0; buckets],
            compare: vec![0.0; buckets],
        };
        for record in primary {
            result.primary[record.segment] += record.avg_speed;
        }
        for record in compare {
            result.compare[record.segment] += record.avg_speed;
        }
        result
    }

    /// Number of buckets in each series
    #[inline]
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }
}
