//! Wahoo `.plan` file rendering
//!
//! The header carries computed metrics, never the values supplied in the source document.

use std::path::Path;

use crate::error::{RenderError, Result};
use crate::models::{IntervalNode, SimpleInterval, WorkoutDescription, WorkoutMetrics};

/// Renders workouts into the plan text format read by ELEMNT head units
pub struct PlanWriter;

impl PlanWriter {
    /// Render the complete plan text, lines joined with `\n`
    pub fn render(workout: &WorkoutDescription, metrics: &WorkoutMetrics) -> String {
        let mut lines: Vec<String> = Vec::new();

        // Header
        lines.push("=HEADER=".to_string());
        lines.push(String::new());
        lines.push(format!("NAME={}", workout.name));
        lines.push(format!("DURATION={}", metrics.duration));
        lines.push(String::new());
        lines.push(format!("TSS={}", metrics.tss));
        lines.push(format!("IF={}", metrics.intensity_factor));
        lines.push(String::new());
        for line in &workout.description {
            lines.push(format!("DESCRIPTION={}", line));
        }
        lines.push(String::new());

        // Stream
        lines.push("=STREAM=".to_string());
        lines.push(String::new());

        for node in &workout.intervals {
            match node {
                IntervalNode::Simple(interval) => {
                    Self::push_segment(&mut lines, "=INTERVAL=", interval);
                }
                IntervalNode::Group(group) => {
                    lines.push("=INTERVAL=".to_string());
                    lines.push(format!("INTERVAL_NAME={}", group.name));
                    if let Some(repeat) = group.repeat {
                        lines.push(format!("REPEAT={}", repeat));
                    }
                    // The group itself completes immediately; its subintervals carry the time
                    lines.push("MESG_DURATION_SEC>=0?EXIT".to_string());
                    lines.push(String::new());

                    for sub in &group.subintervals {
                        Self::push_segment(&mut lines, "=SUBINTERVAL=", sub);
                    }
                }
            }
        }

        lines.join("\n")
    }

    /// Render and write the plan to `path`
    pub fn write(workout: &WorkoutDescription, metrics: &WorkoutMetrics, path: &Path) -> Result<()> {
        let text = Self::render(workout, metrics);

        std::fs::write(path, text).map_err(|e| RenderError::WriteFailed {
            target: "plan".to_string(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::info!(path = %path.display(), "Plan file written");
        Ok(())
    }

    fn push_segment(lines: &mut Vec<String>, marker: &str, interval: &SimpleInterval) {
        lines.push(marker.to_string());
        lines.push(format!("INTERVAL_NAME={}", interval.name));
        lines.push(format!("PERCENT_FTP_HI={}", interval.percent_ftp));
        lines.push(format!("MESG_DURATION_SEC>={}?EXIT", interval.duration));
        lines.push(String::new());
    }
}
