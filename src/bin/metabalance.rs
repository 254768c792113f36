//! Metabalance CLI
//!
//! Runs the estimation pipeline over a JSON fixture of weight logs,
//! nutrition logs, and a goal profile, printing the report as JSON or as a
//! human-readable summary. Intended for fixture exploration and support
//! debugging; production callers consume the library directly.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use metabalance::{run_pipeline, Confidence, GoalProfile, NutritionObservation, TdeeReport,
    WeightObservation};
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "metabalance", version, about = "Adaptive TDEE and calorie-target estimation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one check-in computation over a JSON fixture
    Compute {
        /// Fixture file with profile, weight_logs, and nutrition_logs
        /// ("-" reads stdin)
        #[arg(short, long)]
        input: String,

        /// Date to treat as "today" (YYYY-MM-DD, defaults to the local date)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Emit the raw report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

/// Input fixture: everything one check-in needs.
#[derive(Deserialize)]
struct Fixture {
    profile: GoalProfile,
    #[serde(default)]
    weight_logs: Vec<WeightObservation>,
    #[serde(default)]
    nutrition_logs: Vec<NutritionObservation>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Compute { input, date, json } => match compute(&input, date, json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("error: {message}");
                ExitCode::FAILURE
            }
        },
    }
}

fn compute(input: &str, date: Option<NaiveDate>, json: bool) -> Result<(), String> {
    let raw = read_input(input)?;
    let fixture: Fixture =
        serde_json::from_str(&raw).map_err(|e| format!("invalid fixture: {e}"))?;
    let today = date.unwrap_or_else(|| Local::now().date_naive());

    let report = run_pipeline(
        &fixture.weight_logs,
        &fixture.nutrition_logs,
        &fixture.profile,
        today,
    );

    if json {
        let out = report.to_json().map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn read_input(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        Ok(raw)
    } else {
        fs::read_to_string(input).map_err(|e| format!("failed to read {input}: {e}"))
    }
}

fn print_summary(report: &TdeeReport) {
    let color = atty::is(atty::Stream::Stdout);
    let (bold, dim, reset) = if color {
        ("\x1b[1m", "\x1b[2m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    println!("{bold}TDEE estimate{reset}      {:.0} kcal/day", report.tdee_kcal);
    println!("{bold}Daily target{reset}       {:.0} kcal/day", report.daily_target_kcal);
    println!(
        "{bold}Confidence{reset}         {} {dim}({}){reset}",
        confidence_label(report.confidence),
        report.confidence_reason
    );
    println!(
        "{bold}Average intake{reset}     {:.0} kcal/day ({:?})",
        report.avg_calories_kcal, report.calorie_trend
    );
    println!(
        "{bold}Weight trend{reset}       {:+.2} kg/week (latest {:.1} kg)",
        report.weight_change_per_week_kg, report.latest_weight_kg
    );
    println!(
        "{dim}Logs: {} weight / {} nutrition, {} outliers removed{reset}",
        report.weight_logs_count, report.nutrition_logs_count, report.outliers_count
    );

    if let Some(fat) = report.fat_change_kg {
        println!("{bold}Fat change{reset}         {fat:+.2} kg");
    }
    if let Some(muscle) = report.muscle_change_kg {
        println!("{bold}Muscle change{reset}      {muscle:+.2} kg");
    }
    if let Some(weeks) = report.weeks_to_goal {
        println!("{bold}At current pace{reset}    {weeks:.1} weeks to goal");
    }
    if let Some(weeks) = report.goal_eta_weeks {
        println!("{bold}At goal pace{reset}       {weeks:.1} weeks to goal");
    }
}

fn confidence_label(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::None => "none",
        Confidence::Low => "low",
        Confidence::Medium => "medium",
        Confidence::High => "high",
    }
}
