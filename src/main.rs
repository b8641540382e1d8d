use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::io;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use planrs::chart::{format_time, ChartFormat, ChartLayout};
use planrs::config::AppConfig;
use planrs::error::PlanError;
use planrs::expand::IntervalExpander;
use planrs::interactive::WorkoutBuilder;
use planrs::loader::{load_workout, save_workout, OutputPaths};
use planrs::logging::{init_logging, LogLevel};
use planrs::models::{WorkoutDescription, WorkoutMetrics};
use planrs::plan::PlanWriter;
use planrs::tss::TssCalculator;

/// planrs - Structured workout plan generator
///
/// Turns YAML or JSON interval workouts into Wahoo ELEMNT `.plan` files and intensity charts,
/// computing duration, TSS and IF from the interval structure.
#[derive(Parser)]
#[command(name = "planrs")]
#[command(version)]
#[command(about = "Structured workout plan generator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the plan file and chart for a workout
    Generate {
        /// Workout file (YAML or JSON)
        file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Chart format (png, svg)
        #[arg(short = 'f', long)]
        format: Option<ChartFormat>,

        /// Only write the plan file
        #[arg(long)]
        no_chart: bool,
    },

    /// Generate only the plan file
    Plan {
        /// Workout file (YAML or JSON)
        file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate only the intensity chart
    Chart {
        /// Workout file (YAML or JSON)
        file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Chart format (png, svg)
        #[arg(short = 'f', long)]
        format: Option<ChartFormat>,
    },

    /// Show the expanded interval timeline
    Expand {
        /// Workout file (YAML or JSON)
        file: PathBuf,
    },

    /// Show duration, TSS and IF
    Metrics {
        /// Workout file (YAML or JSON)
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a workout through prompts, then generate its outputs
    Interactive {
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the composed workout as YAML
        #[arg(long)]
        save_yaml: bool,
    },
}

#[derive(Tabled)]
struct TimelineRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Interval")]
    name: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "%FTP")]
    percent_ftp: u32,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        let message = match err.downcast_ref::<PlanError>() {
            Some(plan_error) => {
                plan_error.log();
                plan_error.user_message()
            }
            None => {
                tracing::error!(error = %format!("{:#}", err), "Command failed");
                format!("{:#}", err)
            }
        };
        eprintln!("{} {}", "Error:".red().bold(), message);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default()?,
    };

    let mut log_config = config.logging.clone();
    log_config.level = LogLevel::from_verbosity(log_config.level, cli.verbose);
    init_logging(&log_config)?;

    if cli.verbose > 0 {
        eprintln!("{}", format!("Log level: {}", log_config.level.to_filter()).dimmed());
    }

    match cli.command {
        Commands::Generate {
            file,
            output,
            format,
            no_chart,
        } => {
            let (workout, metrics) = load_with_metrics(&file)?;
            let format = format.unwrap_or(config.output.chart_format);
            let output_dir = output_directory(output, &config)?;
            let paths = OutputPaths::for_input(&file, output_dir.as_deref(), format);

            println!("{}", format!("Generating outputs for {}...", workout.name).green().bold());
            write_plan(&workout, &metrics, &paths.plan)?;
            if config.output.charts_enabled && !no_chart {
                write_chart(&workout, &metrics, &paths.chart, format, &config)?;
            }
            print_metrics(&metrics);
        }

        Commands::Plan { file, output } => {
            let (workout, metrics) = load_with_metrics(&file)?;
            let output_dir = output_directory(output, &config)?;
            let paths = OutputPaths::for_input(&file, output_dir.as_deref(), config.output.chart_format);

            write_plan(&workout, &metrics, &paths.plan)?;
        }

        Commands::Chart { file, output, format } => {
            let (workout, metrics) = load_with_metrics(&file)?;
            let format = format.unwrap_or(config.output.chart_format);
            let output_dir = output_directory(output, &config)?;
            let paths = OutputPaths::for_input(&file, output_dir.as_deref(), format);

            write_chart(&workout, &metrics, &paths.chart, format, &config)?;
        }

        Commands::Expand { file } => {
            let (workout, metrics) = load_with_metrics(&file)?;
            let rows: Vec<TimelineRow> = IntervalExpander::expand(&workout)
                .into_iter()
                .enumerate()
                .map(|(index, interval)| TimelineRow {
                    index: index + 1,
                    name: interval.name,
                    start: format_time(interval.start_time),
                    end: format_time(interval.end_time),
                    duration: format_time(interval.duration),
                    percent_ftp: interval.percent_ftp,
                })
                .collect();

            println!("{}", workout.name.cyan().bold());
            println!("{}", Table::new(rows).with(Style::rounded()));
            print_metrics(&metrics);
        }

        Commands::Metrics { file, json } => {
            let (workout, metrics) = load_with_metrics(&file)?;
            if json {
                let text = serde_json::to_string_pretty(&metrics).context("Failed to encode metrics")?;
                println!("{}", text);
            } else {
                println!("{}", workout.name.cyan().bold());
                print_metrics(&metrics);
            }
        }

        Commands::Interactive { output, save_yaml } => {
            let stdin = io::stdin();
            let workout = WorkoutBuilder::new(stdin.lock(), io::stdout()).build()?;
            let metrics = TssCalculator::compute_workout_metrics(&workout);

            let format = config.output.chart_format;
            let output_dir = output_directory(output, &config)?;
            let paths = OutputPaths::for_workout(&workout, output_dir.as_deref(), format);

            println!();
            println!("{}", format!("Workout '{}' created.", workout.name).green().bold());
            if save_yaml {
                let yaml_path = paths.plan.with_extension("yaml");
                save_workout(&workout, &yaml_path)?;
                println!("{} {}", "✓ Workout saved to".green(), yaml_path.display());
            }
            write_plan(&workout, &metrics, &paths.plan)?;
            if config.output.charts_enabled {
                write_chart(&workout, &metrics, &paths.chart, format, &config)?;
            }
            print_metrics(&metrics);
        }
    }

    Ok(())
}

fn load_with_metrics(file: &Path) -> Result<(WorkoutDescription, WorkoutMetrics)> {
    let (workout, _warnings) = load_workout(file)?;
    let metrics = TssCalculator::compute_workout_metrics(&workout);
    Ok((workout, metrics))
}

/// Command line directory wins over the configured one; the directory is created if needed
fn output_directory(cli_dir: Option<PathBuf>, config: &AppConfig) -> Result<Option<PathBuf>> {
    let dir = cli_dir.or_else(|| config.output.directory.clone());
    if let Some(dir) = &dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }
    Ok(dir)
}

fn write_plan(workout: &WorkoutDescription, metrics: &WorkoutMetrics, path: &Path) -> Result<()> {
    PlanWriter::write(workout, metrics, path)?;
    println!("{} {}", "✓ Plan file written to".green(), path.display());
    Ok(())
}

#[cfg(feature = "charts")]
fn write_chart(
    workout: &WorkoutDescription,
    metrics: &WorkoutMetrics,
    path: &Path,
    format: ChartFormat,
    config: &AppConfig,
) -> Result<()> {
    let layout = ChartLayout::from_workout(workout, metrics)?;
    planrs::chart::render::render_chart(&layout, path, format, config.chart.size())?;
    println!("{} {}", "✓ Chart written to".green(), path.display());
    Ok(())
}

#[cfg(not(feature = "charts"))]
fn write_chart(
    workout: &WorkoutDescription,
    metrics: &WorkoutMetrics,
    path: &Path,
    _format: ChartFormat,
    _config: &AppConfig,
) -> Result<()> {
    // Layout still runs so an undrawable workout is reported the same way
    ChartLayout::from_workout(workout, metrics)?;
    tracing::warn!(path = %path.display(), "Chart skipped: built without the `charts` feature");
    println!("{}", "! Chart skipped (rebuild with --features charts)".yellow());
    Ok(())
}

fn print_metrics(metrics: &WorkoutMetrics) {
    println!("  Duration: {}", format_time(metrics.duration));
    println!("  TSS:      {}", metrics.tss);
    println!("  IF:       {}", metrics.intensity_factor);
}
