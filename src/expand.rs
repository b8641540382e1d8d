//! Interval expansion
//!
//! Flattens the workout tree into a gap-free timeline of atomic intervals. The traversal itself
//! lives in [`atomic_intervals`], which the TSS calculator walks as well, so the timeline and the
//! aggregate metrics can never disagree on what a repetition contributes.

use crate::models::{ExpandedInterval, IntervalNode, SimpleInterval, WorkoutDescription};

/// Position of an atomic interval inside a repeated group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repetition {
    /// 1-based repetition index
    pub index: u32,
    pub total: u32,
}

/// An atomic interval as visited by the traversal, once per repetition
#[derive(Debug, Clone, Copy)]
pub struct AtomicInterval<'a> {
    pub interval: &'a SimpleInterval,
    /// Set only for members of a group repeated more than once
    pub repetition: Option<Repetition>,
}

impl AtomicInterval<'_> {
    /// Name with the ` (k/total)` marker for repeated group members
    pub fn display_name(&self) -> String {
        match self.repetition {
            Some(rep) => format!("{} ({}/{})", self.interval.name, rep.index, rep.total),
            None => self.interval.name.clone(),
        }
    }
}

/// Visit every atomic interval in workout order, group members once per repetition.
///
/// Empty groups and groups with `repeat: 0` yield nothing.
pub fn atomic_intervals(nodes: &[IntervalNode]) -> impl Iterator<Item = AtomicInterval<'_>> {
    nodes.iter().flat_map(|node| {
        let (members, total, grouped): (&[SimpleInterval], u32, bool) = match node {
            IntervalNode::Simple(interval) => (std::slice::from_ref(interval), 1, false),
            IntervalNode::Group(group) => (group.subintervals.as_slice(), group.repeat(), true),
        };

        (1..=total).flat_map(move |index| {
            members.iter().map(move |interval| AtomicInterval {
                interval,
                repetition: (grouped && total > 1).then_some(Repetition { index, total }),
            })
        })
    })
}

/// Interval expansion engine
pub struct IntervalExpander;

impl IntervalExpander {
    /// Expand a workout into its timeline
    pub fn expand(workout: &WorkoutDescription) -> Vec<ExpandedInterval> {
        let expanded = Self::expand_intervals(&workout.intervals);
        tracing::debug!(
            workout = %workout.name,
            nodes = workout.intervals.len(),
            expanded = expanded.len(),
            "Expanded workout intervals"
        );
        expanded
    }

    /// Expand a bare interval list, starting the cursor at 0.
    ///
    /// The cursor saturates at `u32::MAX`; workouts that long are rejected by the validator, so a
    /// validated workout always yields `end_time == start_time + duration`.
    pub fn expand_intervals(nodes: &[IntervalNode]) -> Vec<ExpandedInterval> {
        let mut current_time = 0u32;

        atomic_intervals(nodes)
            .map(|atomic| {
                let start_time = current_time;
                current_time = current_time.saturating_add(atomic.interval.duration);

                ExpandedInterval {
                    name: atomic.display_name(),
                    percent_ftp: atomic.interval.percent_ftp,
                    duration: atomic.interval.duration,
                    start_time,
                    end_time: current_time,
                }
            })
            .collect()
    }

    /// End of the timeline, 0 for an empty one
    pub fn timeline_end(expanded: &[ExpandedInterval]) -> u32 {
        expanded.last().map(|interval| interval.end_time).unwrap_or(0)
    }
}
