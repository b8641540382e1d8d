//! Workout intensity chart
//!
//! [`ChartLayout`] turns the expanded timeline into everything the drawing step needs (bar
//! geometry in minutes, zone colours, labels, axis ranges and ticks), so the layout rules are
//! testable without a drawing backend. Drawing itself lives in `render` behind the `charts`
//! feature.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::expand::IntervalExpander;
use crate::models::{WorkoutDescription, WorkoutMetrics};
use crate::zones::IntensityZone;

#[cfg(feature = "charts")]
pub mod render;

/// Bars taller than this (in % FTP) carry their label inside
const INSIDE_LABEL_MIN_HEIGHT: u32 = 20;

/// Longest interval name shown on a bar
const LABEL_NAME_CHARS: usize = 12;

/// Headroom above the tallest bar
const Y_HEADROOM: f64 = 1.1;

/// Chart output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

impl std::str::FromStr for ChartFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ChartFormat::Png),
            "svg" => Ok(ChartFormat::Svg),
            _ => Err(format!("Unsupported chart format: {}", s)),
        }
    }
}

/// Where a bar's label is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPlacement {
    /// Centred inside the bar, white bold text
    Inside,
    /// Just above the bar, black text
    Above,
}

/// One bar of the chart, in minutes and % FTP
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub x_start: f64,
    pub width: f64,
    pub percent_ftp: u32,
    pub zone: IntensityZone,
    /// `"<pct>%\n<name>"`, name truncated
    pub label: String,
    pub placement: LabelPlacement,
}

impl ChartBar {
    pub fn x_center(&self) -> f64 {
        self.x_start + self.width / 2.0
    }

    pub fn height(&self) -> f64 {
        f64::from(self.percent_ftp)
    }
}

/// Fully computed chart content
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub title: String,
    pub subtitle: String,
    pub bars: Vec<ChartBar>,
    pub x_max: f64,
    pub y_max: f64,
    pub x_ticks: Vec<f64>,
    pub legend: Vec<IntensityZone>,
}

impl ChartLayout {
    /// Lay out a workout chart. Fails for a workout with nothing to draw.
    pub fn from_workout(workout: &WorkoutDescription, metrics: &WorkoutMetrics) -> Result<Self> {
        let expanded = IntervalExpander::expand(workout);

        if expanded.is_empty() {
            return Err(RenderError::EmptyWorkout {
                target: "chart".to_string(),
                reason: format!("workout '{}' has no intervals", workout.name),
            }
            .into());
        }

        let bars: Vec<ChartBar> = expanded
            .iter()
            .map(|interval| ChartBar {
                x_start: f64::from(interval.start_time) / 60.0,
                width: f64::from(interval.duration) / 60.0,
                percent_ftp: interval.percent_ftp,
                zone: IntensityZone::from_percent_ftp(interval.percent_ftp),
                label: bar_label(interval.percent_ftp, &interval.name),
                placement: if interval.percent_ftp > INSIDE_LABEL_MIN_HEIGHT {
                    LabelPlacement::Inside
                } else {
                    LabelPlacement::Above
                },
            })
            .collect();

        let max_percent = expanded.iter().map(|i| i.percent_ftp).max().unwrap_or(0);
        let y_max = if max_percent == 0 {
            1.0
        } else {
            f64::from(max_percent) * Y_HEADROOM
        };

        let x_max = f64::from(IntervalExpander::timeline_end(&expanded)) / 60.0;

        Ok(Self {
            title: format!("{} - Interval Workout", workout.name),
            subtitle: format!(
                "Duration: {}, TSS: {}, IF: {}",
                format_time(metrics.duration),
                metrics.tss,
                metrics.intensity_factor
            ),
            bars,
            x_max,
            y_max,
            x_ticks: x_ticks(x_max),
            legend: IntensityZone::ALL.to_vec(),
        })
    }
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Tick positions every 5 minutes up to half an hour, every 10 beyond
fn x_ticks(x_max: f64) -> Vec<f64> {
    let step = if x_max <= 30.0 { 5.0 } else { 10.0 };
    let mut ticks = Vec::new();
    let mut tick = 0.0;
    while tick < x_max + 1.0 {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

fn bar_label(percent_ftp: u32, name: &str) -> String {
    let short: String = name.chars().take(LABEL_NAME_CHARS).collect();
    format!("{}%\n{}", percent_ftp, short)
}
