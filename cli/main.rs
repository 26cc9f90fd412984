#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

// ========================================================================================
//
//                      THE SCREENING CONSOLE: BLOODBEACON
//
// ========================================================================================
//
// The command line plays the presentation layer. It gathers one patient's intake
// values, refuses to scan until BMI is resolved, loads the fitted artifacts once, runs
// a single scan, and hands the outcome to the selected renderer.
//
// Exit codes: 0 on success, 2 when the scan is blocked or the inputs are unreadable or
// out of range, 1 when configuration or artifacts are unavailable.

use bloodbeacon::classify::ClassifierAdapter;
use bloodbeacon::config::{ConfigError, ScanConfig};
use bloodbeacon::features::{
    ClinicalInputs, IncompleteInputError, InputRangeError, check_measurements, compute_bmi,
};
use bloodbeacon::pipeline::{PredictionOrchestrator, ScanError};
use bloodbeacon::render::RenderFormat;
use bloodbeacon::types::Gender;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;

#[derive(Parser)]
#[command(
    name = "bloodbeacon",
    version,
    about = "Diabetes risk screening from six clinical biomarkers",
    long_about = "Combines a pre-trained diabetes classifier with a graded biomarker risk index. \
                 The classifier and its scaler are read from TOML artifacts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one risk scan
    #[command(about = "Classify one patient and report the Threat Index")]
    Scan(ScanArgs),

    /// Derive BMI from weight and height
    #[command(about = "Calculate BMI (kg / m^2, two decimals)")]
    Bmi {
        /// Body weight in kilograms
        #[arg(long)]
        weight_kg: f64,

        /// Height in centimetres
        #[arg(long)]
        height_cm: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderCli {
    Male,
    Female,
}

impl From<GenderCli> for Gender {
    fn from(value: GenderCli) -> Self {
        match value {
            GenderCli::Male => Gender::Male,
            GenderCli::Female => Gender::Female,
        }
    }
}

#[derive(Args)]
struct ScanArgs {
    /// Read all intake values from a TOML file instead of flags
    #[arg(long, value_name = "FILE")]
    inputs: Option<PathBuf>,

    #[arg(long, value_enum, required_unless_present = "inputs")]
    gender: Option<GenderCli>,

    /// Age in years
    #[arg(long, required_unless_present = "inputs")]
    age: Option<u32>,

    /// Hypertension (0 or 1)
    #[arg(long, value_parser = parse_indicator, required_unless_present = "inputs")]
    hypertension: Option<bool>,

    /// Heart disease (0 or 1)
    #[arg(long, value_parser = parse_indicator, required_unless_present = "inputs")]
    heart_disease: Option<bool>,

    /// HbA1c, percent
    #[arg(long, required_unless_present = "inputs")]
    hba1c: Option<f64>,

    /// Blood glucose, mg/dL
    #[arg(long, required_unless_present = "inputs")]
    glucose: Option<f64>,

    /// BMI, if already known
    #[arg(long)]
    bmi: Option<f64>,

    /// Body weight in kilograms, used with --height-cm when --bmi is absent
    #[arg(long)]
    weight_kg: Option<f64>,

    /// Height in centimetres, used with --weight-kg when --bmi is absent
    #[arg(long)]
    height_cm: Option<f64>,

    /// Config file naming the artifact locations
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Classifier artifact (.toml); overrides the config file
    #[arg(long)]
    model: Option<PathBuf>,

    /// Scaler artifact (.toml); overrides the config file
    #[arg(long)]
    scaler: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: RenderFormat,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Range(#[from] InputRangeError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Bmi(#[from] IncompleteInputError),
    #[error("Failed to read inputs file '{path}': {reason}")]
    Inputs { path: PathBuf, reason: String },
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Range(_) | CliError::Inputs { .. } | CliError::Bmi(_) => 2,
            CliError::Scan(ScanError::Blocked(_)) => 2,
            CliError::Scan(ScanError::Failed(_)) => 1,
            CliError::Config(_) | CliError::Output(_) => 1,
        }
    }
}

fn parse_indicator(value: &str) -> Result<bool, String> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(format!("expected 0 or 1, got '{other}'")),
    }
}

fn collect_inputs(args: &ScanArgs) -> Result<ClinicalInputs, CliError> {
    if let Some(path) = &args.inputs {
        let text = fs::read_to_string(path).map_err(|e| CliError::Inputs {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        return toml::from_str(&text).map_err(|e| CliError::Inputs {
            path: path.clone(),
            reason: e.to_string(),
        });
    }

    // clap enforces presence of every field below when --inputs is absent.
    let missing = |flag: &str| CliError::Inputs {
        path: PathBuf::from("<command line>"),
        reason: format!("--{flag} is required"),
    };
    Ok(ClinicalInputs {
        gender: args.gender.ok_or_else(|| missing("gender"))?.into(),
        age: args.age.ok_or_else(|| missing("age"))?,
        hypertension: args.hypertension.ok_or_else(|| missing("hypertension"))?,
        heart_disease: args.heart_disease.ok_or_else(|| missing("heart-disease"))?,
        hba1c: args.hba1c.ok_or_else(|| missing("hba1c"))?,
        glucose: args.glucose.ok_or_else(|| missing("glucose"))?,
        bmi: args.bmi,
        weight_kg: args.weight_kg,
        height_cm: args.height_cm,
    })
}

fn run_scan(args: ScanArgs) -> Result<(), CliError> {
    let inputs = collect_inputs(&args)?;
    inputs.validate()?;

    // The scan control stays disabled until BMI resolves; nothing is loaded before that.
    if let Err(e) = inputs.resolve_bmi() {
        return Err(ScanError::Blocked(e).into());
    }

    let config = match &args.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    }
    .with_overrides(args.model.clone(), args.scaler.clone());

    let adapter = ClassifierAdapter::load(&config.artifacts.model, &config.artifacts.scaler)
        .map_err(ScanError::from)?;

    let outcome = PredictionOrchestrator::new(&adapter).run_scan(&inputs)?;
    log::info!(
        "Scan complete: label={}, threat index {:.1}%",
        outcome.classifier_label.as_u8(),
        outcome.risk_score.percent()
    );

    let renderer = args.format.renderer();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    renderer.render(&outcome, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run_bmi(weight_kg: f64, height_cm: f64) -> Result<(), CliError> {
    check_measurements(weight_kg, height_cm)?;
    let bmi = compute_bmi(weight_kg, height_cm);
    if !bmi.is_finite() {
        return Err(IncompleteInputError::NonFiniteBmi {
            weight_kg,
            height_cm,
        }
        .into());
    }
    println!("{bmi:.2}");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Bmi {
            weight_kg,
            height_cm,
        } => run_bmi(weight_kg, height_cm),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(e.exit_code());
    }
}
