// Copyright 2025 Offload Bench Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hours/minutes/seconds decomposition of elapsed time.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_MINUTE: f64 = 60.0;
const MINUTES_PER_HOUR: f64 = 60.0;

/// An elapsed duration split into hours, minutes and leftover seconds.
///
/// `seconds` keeps its fractional part so that
/// `hours * 3600 + minutes * 60 + seconds` reconstructs the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hms {
    /// Whole hours.
    pub hours: u64,
    /// Whole minutes, always below 60.
    pub minutes: u64,
    /// Remaining seconds, in `[0, 60)`.
    pub seconds: f64,
}

impl Hms {
    /// Decompose `elapsed_seconds` by successive division and remainder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDuration`] for negative or non-finite input.
    pub fn from_secs_f64(elapsed_seconds: f64) -> Result<Self> {
        if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
            return Err(Error::InvalidDuration(elapsed_seconds));
        }

        let total_minutes = (elapsed_seconds / SECONDS_PER_MINUTE).floor();
        let seconds = (elapsed_seconds - total_minutes * SECONDS_PER_MINUTE).max(0.0);
        let hours = (total_minutes / MINUTES_PER_HOUR).floor();
        let minutes = total_minutes - hours * MINUTES_PER_HOUR;

        Ok(Self {
            hours: hours as u64,
            minutes: minutes as u64,
            seconds,
        })
    }

    /// Reassemble the total number of seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.hours as f64 * MINUTES_PER_HOUR * SECONDS_PER_MINUTE
            + self.minutes as f64 * SECONDS_PER_MINUTE
            + self.seconds
    }
}

impl fmt::Display for Hms {
    // Whole seconds, floored.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hours, {} minutes, and {} seconds",
            self.hours,
            self.minutes,
            self.seconds.floor() as u64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_mixed_duration() {
        let hms = Hms::from_secs_f64(3725.5).unwrap();
        assert_eq!(hms.hours, 1);
        assert_eq!(hms.minutes, 2);
        assert!((hms.seconds - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_decompose_zero() {
        let hms = Hms::from_secs_f64(0.0).unwrap();
        assert_eq!((hms.hours, hms.minutes), (0, 0));
        assert_eq!(hms.seconds, 0.0);
    }

    #[test]
    fn test_exact_minute_boundary() {
        let hms = Hms::from_secs_f64(60.0).unwrap();
        assert_eq!((hms.hours, hms.minutes), (0, 1));
        assert_eq!(hms.seconds, 0.0);

        let hms = Hms::from_secs_f64(3600.0).unwrap();
        assert_eq!((hms.hours, hms.minutes), (1, 0));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = Hms::from_secs_f64(-0.001).unwrap_err();
        assert!(matches!(err, Error::InvalidDuration(v) if v < 0.0));
    }

    #[test]
    fn test_non_finite_duration_rejected() {
        assert!(Hms::from_secs_f64(f64::NAN).is_err());
        assert!(Hms::from_secs_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_reconstruction_stays_within_same_second() {
        let samples = [
            0.0, 0.4, 1.0, 59.999, 60.0, 61.25, 599.9, 3599.5, 3600.0, 3661.7, 86_399.99,
            123_456.789,
        ];
        for &elapsed in &samples {
            let hms = Hms::from_secs_f64(elapsed).unwrap();
            assert!(hms.minutes < 60, "minutes overflow for {elapsed}");
            assert!(hms.seconds >= 0.0 && hms.seconds < 60.0, "seconds out of range for {elapsed}");
            let rebuilt = hms.hours * 3600 + hms.minutes * 60 + hms.seconds.floor() as u64;
            assert_eq!(rebuilt, elapsed.floor() as u64, "reconstruction drifted for {elapsed}");
        }
    }

    #[test]
    fn test_display_floors_seconds() {
        let hms = Hms::from_secs_f64(119.9).unwrap();
        assert_eq!(hms.to_string(), "0 hours, 1 minutes, and 59 seconds");
    }

    #[test]
    fn test_as_secs_round_trip() {
        let hms = Hms::from_secs_f64(7322.25).unwrap();
        assert!((hms.as_secs_f64() - 7322.25).abs() < 1e-9);
    }
}
