use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A workout as written by the athlete, either loaded from a file or assembled interactively.
///
/// `duration`, `tss` and `intensity_factor` are optional hints carried over from the source
/// document. They are never rendered as-is: every consumer recomputes them from `intervals`
/// through [`crate::tss::TssCalculator::compute_workout_metrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDescription {
    pub name: String,

    /// Supplied total duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    /// Supplied Training Stress Score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tss: Option<f64>,

    /// Supplied Intensity Factor
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub intensity_factor: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,

    pub intervals: Vec<IntervalNode>,
}

impl WorkoutDescription {
    pub fn new(name: impl Into<String>, intervals: Vec<IntervalNode>) -> Self {
        Self {
            name: name.into(),
            duration: None,
            tss: None,
            intensity_factor: None,
            description: Vec::new(),
            intervals,
        }
    }

    /// Attach free-text description lines
    pub fn with_description(mut self, lines: Vec<String>) -> Self {
        self.description = lines;
        self
    }

    /// Overwrite the supplied metric hints with computed values
    pub fn with_metrics(mut self, metrics: &WorkoutMetrics) -> Self {
        self.duration = Some(metrics.duration);
        self.tss = Some(f64::from(metrics.tss));
        self.intensity_factor = metrics.intensity_factor.to_f64();
        self
    }

    /// Base name used for generated files: lowercased, spaces replaced by underscores
    pub fn file_stem(&self) -> String {
        self.name.to_lowercase().replace(' ', "_")
    }
}

/// One node of the workout tree.
///
/// Groups are recognised by their `subintervals` key, so `Group` is tried first when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntervalNode {
    Group(IntervalGroup),
    Simple(SimpleInterval),
}

impl IntervalNode {
    pub fn simple(name: impl Into<String>, percent_ftp: u32, duration: u32) -> Self {
        IntervalNode::Simple(SimpleInterval::new(name, percent_ftp, duration))
    }

    pub fn group(name: impl Into<String>, repeat: u32, subintervals: Vec<SimpleInterval>) -> Self {
        IntervalNode::Group(IntervalGroup::new(name, Some(repeat), subintervals))
    }

    pub fn name(&self) -> &str {
        match self {
            IntervalNode::Simple(interval) => &interval.name,
            IntervalNode::Group(group) => &group.name,
        }
    }
}

/// Atomic interval: one name, one intensity, one duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleInterval {
    pub name: String,
    /// Target intensity as a percentage of FTP
    pub percent_ftp: u32,
    /// Duration in seconds
    pub duration: u32,
}

impl SimpleInterval {
    pub fn new(name: impl Into<String>, percent_ftp: u32, duration: u32) -> Self {
        Self {
            name: name.into(),
            percent_ftp,
            duration,
        }
    }
}

/// A block of atomic intervals performed `repeat` times
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalGroup {
    pub name: String,

    /// Kept as written so the plan file only carries `REPEAT=` when the source did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u32>,

    pub subintervals: Vec<SimpleInterval>,
}

impl IntervalGroup {
    pub fn new(name: impl Into<String>, repeat: Option<u32>, subintervals: Vec<SimpleInterval>) -> Self {
        Self {
            name: name.into(),
            repeat,
            subintervals,
        }
    }

    /// Effective repetition count (1 when absent)
    pub fn repeat(&self) -> u32 {
        self.repeat.unwrap_or(1)
    }

    /// Duration of a single pass through the subintervals
    pub fn single_pass_duration(&self) -> u32 {
        self.subintervals.iter().map(|sub| sub.duration).sum()
    }
}

/// A flattened interval positioned on the workout timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedInterval {
    pub name: String,
    pub percent_ftp: u32,
    pub duration: u32,
    /// Seconds from workout start
    pub start_time: u32,
    pub end_time: u32,
}

/// Aggregate metrics derived from the interval structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutMetrics {
    /// Total duration in seconds
    pub duration: u32,
    pub tss: u32,
    /// Intensity Factor rounded to two decimals, 0 for an empty workout
    #[serde(rename = "if", with = "rust_decimal::serde::float")]
    pub intensity_factor: Decimal,
}
