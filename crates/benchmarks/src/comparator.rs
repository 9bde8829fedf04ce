//! Verdict between two timed runs.

use crate::result::RunResult;
use offload_bench_core::{Hms, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which run was faster and by how much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonVerdict {
    /// Label of the faster run; `None` when both took exactly as long.
    pub faster_label: Option<String>,
    /// Absolute gap between the two elapsed times.
    pub absolute_difference_seconds: f64,
    /// Gap as a percentage of the slower run's elapsed time.
    pub percentage_difference: f64,
}

impl ComparisonVerdict {
    /// Whether the runs tied.
    pub fn is_tie(&self) -> bool {
        self.faster_label.is_none()
    }

    /// The absolute gap split into hours, minutes and seconds.
    pub fn difference_hms(&self) -> Result<Hms> {
        Hms::from_secs_f64(self.absolute_difference_seconds)
    }
}

/// Compare two runs.
///
/// The percentage is relative to the slower run. A slower run of zero
/// seconds can only happen on a tie and yields 0%.
pub fn compare(first: &RunResult, second: &RunResult) -> ComparisonVerdict {
    let a = first.elapsed_seconds();
    let b = second.elapsed_seconds();

    let (faster_label, slower) = if a > b {
        (Some(second.label().to_string()), a)
    } else if b > a {
        (Some(first.label().to_string()), b)
    } else {
        (None, a)
    };

    let absolute_difference_seconds = (a - b).abs();
    let percentage_difference = if slower > 0.0 {
        absolute_difference_seconds / slower * 100.0
    } else {
        0.0
    };

    debug!(
        faster = faster_label.as_deref().unwrap_or("tie"),
        absolute_difference_seconds, percentage_difference, "verdict computed"
    );

    ComparisonVerdict {
        faster_label,
        absolute_difference_seconds,
        percentage_difference,
    }
}
