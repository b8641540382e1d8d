//! Workout document loading and output path derivation.

use std::path::{Path, PathBuf};

use crate::chart::ChartFormat;
use crate::error::{ParseError, Result};
use crate::models::WorkoutDescription;
use crate::validation::{ValidationIssue, WorkoutValidator};

/// Supported workout document encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutFormat {
    Yaml,
    Json,
}

impl WorkoutFormat {
    /// Pick the decoder from the file extension; unknown extensions are read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("json") => WorkoutFormat::Json,
            _ => WorkoutFormat::Yaml,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            WorkoutFormat::Yaml => "YAML",
            WorkoutFormat::Json => "JSON",
        }
    }
}

/// Decode a workout from text without validating it
pub fn parse_workout(text: &str, format: WorkoutFormat) -> Result<WorkoutDescription> {
    let decoded = match format {
        WorkoutFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        WorkoutFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    };

    decoded.map_err(|reason| {
        ParseError::Malformed {
            format: format.name().to_string(),
            reason,
        }
        .into()
    })
}

/// Read, decode and validate a workout file.
///
/// Validation warnings are logged and returned alongside the workout; validation errors fail the
/// load so malformed input never reaches the expander.
pub fn load_workout(path: &Path) -> Result<(WorkoutDescription, Vec<ValidationIssue>)> {
    if !path.exists() {
        return Err(ParseError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let text = std::fs::read_to_string(path)?;
    let format = WorkoutFormat::from_path(path);
    let workout = parse_workout(&text, format)?;

    let warnings = WorkoutValidator::validate_workout(&workout).into_result()?;
    for warning in &warnings {
        tracing::warn!(file = %path.display(), "{}", warning);
    }

    tracing::info!(
        file = %path.display(),
        workout = %workout.name,
        intervals = workout.intervals.len(),
        "Workout loaded"
    );

    Ok((workout, warnings))
}

/// Write a workout as YAML so it can be regenerated later
pub fn save_workout(workout: &WorkoutDescription, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(workout).map_err(|e| ParseError::Encode {
        format: WorkoutFormat::Yaml.name().to_string(),
        reason: e.to_string(),
    })?;

    std::fs::write(path, yaml)?;
    tracing::info!(path = %path.display(), "Workout saved");
    Ok(())
}

/// Files produced for one workout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub plan: PathBuf,
    pub chart: PathBuf,
}

impl OutputPaths {
    /// Outputs named after the input file: `dir/stem.plan`, `dir/stem.<chart ext>`.
    ///
    /// Without an output directory the files land next to the input.
    pub fn for_input(input: &Path, output_dir: Option<&Path>, chart_format: ChartFormat) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workout".to_string());
        let dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        Self::in_dir(&dir, &stem, chart_format)
    }

    /// Outputs named after the workout itself, for workouts with no source file
    pub fn for_workout(workout: &WorkoutDescription, output_dir: Option<&Path>, chart_format: ChartFormat) -> Self {
        let dir = output_dir.map(Path::to_path_buf).unwrap_or_default();
        Self::in_dir(&dir, &workout.file_stem(), chart_format)
    }

    fn in_dir(dir: &Path, stem: &str, chart_format: ChartFormat) -> Self {
        Self {
            plan: dir.join(format!("{}.plan", stem)),
            chart: dir.join(format!("{}.{}", stem, chart_format.extension())),
        }
    }
}
