//! Prompt-driven workout composition
//!
//! [`WorkoutBuilder`] works over any `BufRead`/`Write` pair so the CLI can hand it stdin and
//! stdout while tests feed it scripted answers.

use std::io::{BufRead, Write};

use crate::error::{PlanError, Result};
use crate::models::{IntervalGroup, IntervalNode, SimpleInterval, WorkoutDescription};
use crate::tss::TssCalculator;
use crate::validation::WorkoutValidator;

/// Intensity of the rest appended to a repeated block
const BLOCK_REST_PERCENT_FTP: u32 = 50;

const SECONDS_PER_MINUTE: u32 = 60;

/// Builds a workout by asking questions on `output` and reading answers from `input`
pub struct WorkoutBuilder<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> WorkoutBuilder<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Run the full prompt sequence.
    ///
    /// The returned workout carries computed duration, TSS and IF and has passed validation.
    /// Running out of input part way through is a [`PlanError::Prompt`].
    pub fn build(&mut self) -> Result<WorkoutDescription> {
        writeln!(self.output, "--- Let's build a workout! ---")?;
        let name = self.prompt_text("Enter the name of your workout")?;

        let mut intervals = Vec::new();

        writeln!(self.output, "--- Warm-up ---")?;
        if let Some(warm_up) = self.prompt_bookend("Warm-up", "warm-up")? {
            intervals.push(IntervalNode::Simple(warm_up));
        }

        writeln!(self.output, "--- Interval Blocks ---")?;
        while self.confirm("Add an interval block?", true)? {
            if let Some(block) = self.prompt_block()? {
                intervals.push(IntervalNode::Group(block));
            } else {
                writeln!(self.output, "Block has no sub-intervals, skipping it.")?;
            }
        }

        writeln!(self.output, "--- Cool-down ---")?;
        if let Some(cool_down) = self.prompt_bookend("Cool-down", "cool-down")? {
            intervals.push(IntervalNode::Simple(cool_down));
        }

        let workout = WorkoutDescription::new(name, intervals);
        let metrics = TssCalculator::compute_workout_metrics(&workout);
        let workout = workout.with_metrics(&metrics);

        for warning in WorkoutValidator::validate_workout(&workout).into_result()? {
            tracing::warn!("{}", warning);
        }

        tracing::debug!(
            workout = %workout.name,
            duration = metrics.duration,
            tss = metrics.tss,
            "Workout composed interactively"
        );

        Ok(workout)
    }

    /// Warm-up or cool-down; zero minutes leaves it out
    fn prompt_bookend(&mut self, name: &str, label: &str) -> Result<Option<SimpleInterval>> {
        let duration = self.prompt_minutes(&format!("Enter {} duration in minutes", label), None)?;
        if duration == 0 {
            return Ok(None);
        }
        let intensity = self.prompt_int(&format!("Enter {} intensity (% FTP)", label), None)?;
        Ok(Some(SimpleInterval::new(name, intensity, duration)))
    }

    fn prompt_block(&mut self) -> Result<Option<IntervalGroup>> {
        let name = self.prompt_text("Enter a name for this block (e.g., 'VO2 Max Intervals')")?;
        let repetitions = loop {
            let value = self.prompt_int("How many times to repeat this block?", Some(1))?;
            if value > 0 {
                break value;
            }
            writeln!(self.output, "Please enter at least 1.")?;
        };
        let rest = if repetitions > 1 {
            self.prompt_minutes("Enter rest duration between blocks in minutes", Some(0))?
        } else {
            0
        };

        let mut subintervals = Vec::new();
        while self.confirm("Add a sub-interval to this block?", true)? {
            subintervals.push(self.prompt_subinterval()?);
        }

        if subintervals.is_empty() {
            return Ok(None);
        }
        if rest > 0 {
            subintervals.push(SimpleInterval::new("Rest", BLOCK_REST_PERCENT_FTP, rest));
        }

        Ok(Some(IntervalGroup::new(name, Some(repetitions), subintervals)))
    }

    fn prompt_subinterval(&mut self) -> Result<SimpleInterval> {
        let name = self.prompt_text("Enter interval name (e.g., 'Work', 'Rest')")?;
        let duration = loop {
            let value = self.prompt_minutes("Enter duration in minutes", None)?;
            if value > 0 {
                break value;
            }
            writeln!(self.output, "Please enter at least 1 minute.")?;
        };
        let intensity = self.prompt_int("Enter intensity (% FTP)", None)?;
        Ok(SimpleInterval::new(name, intensity, duration))
    }

    /// Whole minutes, returned as seconds
    fn prompt_minutes(&mut self, question: &str, default: Option<u32>) -> Result<u32> {
        loop {
            let minutes = self.prompt_int(question, default)?;
            match minutes.checked_mul(SECONDS_PER_MINUTE) {
                Some(seconds) => return Ok(seconds),
                None => writeln!(self.output, "That is too long, please enter fewer minutes.")?,
            }
        }
    }

    /// Non-empty free text
    fn prompt_text(&mut self, question: &str) -> Result<String> {
        loop {
            write!(self.output, "{}: ", question)?;
            self.output.flush()?;
            let answer = self.read_line()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            writeln!(self.output, "Please enter a value.")?;
        }
    }

    /// Non-negative integer; empty input takes `default` when there is one
    fn prompt_int(&mut self, question: &str, default: Option<u32>) -> Result<u32> {
        loop {
            match default {
                Some(value) => write!(self.output, "{} ({}): ", question, value)?,
                None => write!(self.output, "{}: ", question)?,
            }
            self.output.flush()?;

            let answer = self.read_line()?;
            if answer.is_empty() {
                if let Some(value) = default {
                    return Ok(value);
                }
            } else if let Ok(value) = answer.parse::<u32>() {
                return Ok(value);
            }
            writeln!(self.output, "Please enter a valid integer.")?;
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            write!(self.output, "{} {}: ", question, hint)?;
            self.output.flush()?;

            match self.read_line()?.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please enter Y or N.")?,
            }
        }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(PlanError::Prompt("input ended before the workout was complete".to_string()));
        }
        Ok(line.trim().to_string())
    }
}
