//! Boundary validation for workout descriptions.
//!
//! The expander and TSS calculator trust their input; anything that reaches them from a file or
//! from the interactive builder passes through [`WorkoutValidator`] first. Physiological
//! plausibility (e.g. 400% FTP for ten minutes) is not judged.

use rust_decimal::prelude::ToPrimitive;

use crate::error::{PlanError, ValidationErrors};
use crate::models::{IntervalNode, SimpleInterval, WorkoutDescription};
use crate::tss::TssCalculator;

/// Tolerance when comparing a supplied IF with the computed one
const IF_TOLERANCE: f64 = 0.005;

/// A single finding, located by a path into the workout document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub location: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Outcome of validating one workout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Issues that make the workout unusable
    pub errors: Vec<ValidationIssue>,
    /// Issues that are reported but do not stop processing
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn blocking issues into an error, handing back the warnings otherwise
    pub fn into_result(self) -> Result<Vec<ValidationIssue>, PlanError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(PlanError::Validation(ValidationErrors(self.errors)))
        }
    }

    fn error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(location, message));
    }

    fn warning(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(location, message));
    }
}

/// Validate workout structure before expansion
pub struct WorkoutValidator;

impl WorkoutValidator {
    /// Validate a complete workout
    pub fn validate_workout(workout: &WorkoutDescription) -> ValidationReport {
        let mut report = ValidationReport::default();

        if workout.name.trim().is_empty() {
            report.error("name", "workout name is empty");
        }

        if workout.intervals.is_empty() {
            report.error("intervals", "workout has no intervals");
        }

        for (index, node) in workout.intervals.iter().enumerate() {
            let location = format!("intervals[{}]", index);
            match node {
                IntervalNode::Simple(interval) => {
                    Self::validate_atomic(interval, &location, &mut report);
                }
                IntervalNode::Group(group) => {
                    if group.name.trim().is_empty() {
                        report.warning(&location, "group name is empty");
                    }
                    if group.repeat == Some(0) {
                        report.error(&location, "repeat must be at least 1");
                    }
                    if group.subintervals.is_empty() {
                        report.warning(&location, "group has no subintervals and contributes nothing");
                    }
                    for (sub_index, sub) in group.subintervals.iter().enumerate() {
                        let sub_location = format!("{}.subintervals[{}]", location, sub_index);
                        Self::validate_atomic(sub, &sub_location, &mut report);
                    }
                }
            }
        }

        Self::check_totals(workout, &mut report);

        // Recomputing metrics is only meaningful for a structurally sound workout
        if report.is_valid() {
            Self::check_supplied_metrics(workout, &mut report);
        }

        report
    }

    /// Totals must fit the `u32` seconds and TSS the plan format carries
    fn check_totals(workout: &WorkoutDescription, report: &mut ValidationReport) {
        if TssCalculator::checked_total_duration(&workout.intervals).is_none() {
            report.error(
                "intervals",
                format!("total duration exceeds {} seconds", u32::MAX),
            );
        } else if TssCalculator::checked_tss(&workout.intervals).is_none() {
            report.error("intervals", format!("total TSS exceeds {}", u32::MAX));
        }
    }

    fn validate_atomic(interval: &SimpleInterval, location: &str, report: &mut ValidationReport) {
        if interval.duration == 0 {
            report.error(location, format!("interval '{}' must last at least one second", interval.name));
        }
        if interval.name.trim().is_empty() {
            report.warning(location, "interval name is empty");
        }
        if interval.percent_ftp == 0 {
            report.warning(location, format!("interval '{}' has 0% FTP", interval.name));
        }
    }

    /// Supplied duration/TSS/IF are hints; flag any that disagree with the structure
    fn check_supplied_metrics(workout: &WorkoutDescription, report: &mut ValidationReport) {
        if workout.duration.is_none() && workout.tss.is_none() && workout.intensity_factor.is_none() {
            return;
        }

        let metrics = TssCalculator::compute_workout_metrics(workout);

        if let Some(duration) = workout.duration {
            if duration != metrics.duration {
                report.warning(
                    "duration",
                    format!(
                        "supplied duration {} s differs from the intervals' {} s; using {} s",
                        duration, metrics.duration, metrics.duration
                    ),
                );
            }
        }

        if let Some(tss) = workout.tss {
            if tss.round() != f64::from(metrics.tss) {
                report.warning(
                    "tss",
                    format!("supplied TSS {} differs from computed {}; using {}", tss, metrics.tss, metrics.tss),
                );
            }
        }

        if let Some(intensity_factor) = workout.intensity_factor {
            let computed = metrics.intensity_factor.to_f64().unwrap_or(0.0);
            if (intensity_factor - computed).abs() > IF_TOLERANCE {
                report.warning(
                    "if",
                    format!(
                        "supplied IF {} differs from computed {}; using {}",
                        intensity_factor, metrics.intensity_factor, metrics.intensity_factor
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IntervalGroup;

    #[test]
    fn test_valid_workout_has_no_issues() {
        let workout = WorkoutDescription::new(
            "Sweet spot",
            vec![
                IntervalNode::simple("Warm up", 55, 600),
                IntervalNode::group("2x20", 2, vec![SimpleInterval::new("SST", 90, 1200)]),
            ],
        );

        let report = WorkoutValidator::validate_workout(&workout);

        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_zero_duration_is_an_error() {
        let workout = WorkoutDescription::new(
            "Broken",
            vec![IntervalNode::group(
                "Block",
                2,
                vec![SimpleInterval::new("On", 100, 60), SimpleInterval::new("Off", 50, 0)],
            )],
        );

        let report = WorkoutValidator::validate_workout(&workout);

        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].location, "intervals[0].subintervals[1]");
    }

    #[test]
    fn test_zero_repeat_and_blank_name_are_errors() {
        let mut workout = WorkoutDescription::new(
            " ",
            vec![IntervalNode::Group(IntervalGroup::new(
                "Block",
                Some(0),
                vec![SimpleInterval::new("On", 100, 60)],
            ))],
        );

        let report = WorkoutValidator::validate_workout(&workout);
        assert_eq!(report.errors.len(), 2);

        workout.intervals.clear();
        let report = WorkoutValidator::validate_workout(&workout);
        assert!(report.errors.iter().any(|e| e.location == "intervals"));
    }

    #[test]
    fn test_empty_group_is_only_a_warning() {
        let workout = WorkoutDescription::new(
            "Mostly empty",
            vec![
                IntervalNode::simple("Ride", 65, 1800),
                IntervalNode::group("Nothing", 3, Vec::new()),
            ],
        );

        let report = WorkoutValidator::validate_workout(&workout);

        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].location, "intervals[1]");
    }

    #[test]
    fn test_divergent_supplied_metrics_warn() {
        let mut workout = WorkoutDescription::new("T", vec![IntervalNode::simple("A", 100, 60)]);
        workout.duration = Some(3420);
        workout.tss = Some(62.0);
        workout.intensity_factor = Some(0.81);

        let report = WorkoutValidator::validate_workout(&workout);

        assert!(report.is_valid());
        let locations: Vec<&str> = report.warnings.iter().map(|w| w.location.as_str()).collect();
        assert_eq!(locations, vec!["duration", "tss", "if"]);
    }

    #[test]
    fn test_matching_supplied_metrics_are_accepted() {
        let mut workout = WorkoutDescription::new("T", vec![IntervalNode::simple("A", 100, 60)]);
        workout.duration = Some(60);
        workout.tss = Some(2.0);
        workout.intensity_factor = Some(1.1);

        let report = WorkoutValidator::validate_workout(&workout);

        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_total_duration_overflow_is_an_error() {
        let mut workout = WorkoutDescription::new(
            "Endless",
            vec![
                IntervalNode::simple("A", 100, 3_000_000_000),
                IntervalNode::simple("B", 100, 3_000_000_000),
            ],
        );
        workout.duration = Some(5);

        let report = WorkoutValidator::validate_workout(&workout);

        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].location, "intervals");
        // Supplied metrics are not compared against an unrepresentable total
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_repeat_overflow_is_an_error() {
        let workout = WorkoutDescription::new(
            "Forever",
            vec![IntervalNode::group("Loop", u32::MAX, vec![SimpleInterval::new("On", 100, 2)])],
        );

        let report = WorkoutValidator::validate_workout(&workout);

        assert!(!report.is_valid());
    }

    #[test]
    fn test_tss_overflow_is_an_error() {
        let workout = WorkoutDescription::new(
            "Impossible",
            vec![IntervalNode::simple("Max", u32::MAX, 4_000_000_000)],
        );

        let report = WorkoutValidator::validate_workout(&workout);

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("TSS"));
    }

    #[test]
    fn test_into_result() {
        let workout = WorkoutDescription::new("Empty", Vec::new());
        let result = WorkoutValidator::validate_workout(&workout).into_result();
        assert!(matches!(result, Err(PlanError::Validation(_))));
    }
}
