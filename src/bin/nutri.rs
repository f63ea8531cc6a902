//! Nutri CLI - Command-line interface for the Nutri Engine
//!
//! Commands:
//! - assess: Assess a client from a JSON request (file or stdin)
//! - metrics: Compute BMI, BMR, TDEE and calorie target from flags
//! - macros: Apply a single macro edit to a split
//! - config: Print the default engine configuration
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use nutri_engine::config::EngineConfig;
use nutri_engine::pipeline::{AssessmentRequest, HealthEngine};
use nutri_engine::types::{ActivityLevel, Gender, Goal, Macro, MacroSplit, PersonProfile};
use nutri_engine::{logging, MacroAllocator, ENGINE_VERSION, PRODUCER_NAME};

/// Nutri - Health metrics and macro allocation engine
#[derive(Parser)]
#[command(name = "nutri")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Compute client health metrics, ideal ranges, trends and macro splits", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a client from a JSON request
    Assess {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Compute energy metrics for a single measurement
    Metrics {
        /// Body weight (kg)
        #[arg(long)]
        weight: f64,

        /// Height (cm)
        #[arg(long)]
        height: f64,

        /// Age (years)
        #[arg(long)]
        age: u32,

        /// male or female
        #[arg(long)]
        gender: String,

        /// sedentary, light, moderate, active or very_active
        #[arg(long, default_value = "sedentary")]
        activity: String,

        /// lose, maintain or gain
        #[arg(long, default_value = "maintain")]
        goal: String,
    },

    /// Apply a macro edit, e.g. `--edit protein=45`
    Macros {
        #[arg(long, default_value = "30")]
        protein: i32,

        #[arg(long, default_value = "40")]
        carbs: i32,

        #[arg(long, default_value = "30")]
        fat: i32,

        /// Field and new value as <field>=<value>
        #[arg(long)]
        edit: Option<String>,

        /// Daily calorie target for gram conversion
        #[arg(long)]
        calories: Option<f64>,
    },

    /// Print the default engine configuration
    Config,

    /// Diagnose configuration and environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init_with_level("debug");
    } else {
        logging::init();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), NutriCliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Assess {
            input,
            output_format,
        } => cmd_assess(&input, output_format, config_path),

        Commands::Metrics {
            weight,
            height,
            age,
            gender,
            activity,
            goal,
        } => cmd_metrics(
            weight,
            height,
            age,
            &gender,
            &activity,
            &goal,
            config_path,
        ),

        Commands::Macros {
            protein,
            carbs,
            fat,
            edit,
            calories,
        } => cmd_macros(
            MacroSplit {
                protein,
                carbs,
                fat,
            },
            edit.as_deref(),
            calories,
            config_path,
        ),

        Commands::Config => {
            println!("{}", EngineConfig::default().to_json()?);
            Ok(())
        }

        Commands::Doctor { json } => cmd_doctor(config_path, json),
    }
}

fn load_engine(config_path: Option<&Path>) -> Result<HealthEngine, NutriCliError> {
    match config_path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            let config = EngineConfig::from_json(&json)?;
            tracing::debug!(path = %path.display(), "loaded engine configuration");
            Ok(HealthEngine::with_config(config)?)
        }
        None => Ok(HealthEngine::new()),
    }
}

fn cmd_assess(
    input: &Path,
    output_format: OutputFormat,
    config_path: Option<&Path>,
) -> Result<(), NutriCliError> {
    let engine = load_engine(config_path)?;

    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let request: AssessmentRequest = serde_json::from_str(&input_data)?;
    if request.measurements.is_empty() {
        return Err(NutriCliError::NoMeasurements);
    }

    let assessment = engine.assess_request(&request)?;
    let report = nutri_engine::encoder::ReportEncoder::new().encode(assessment);

    let output = match output_format {
        OutputFormat::Json => serde_json::to_string(&report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)?,
    };
    println!("{output}");

    Ok(())
}

fn cmd_metrics(
    weight: f64,
    height: f64,
    age: u32,
    gender: &str,
    activity: &str,
    goal: &str,
    config_path: Option<&Path>,
) -> Result<(), NutriCliError> {
    let engine = load_engine(config_path)?;
    let profile = PersonProfile {
        gender: gender.parse::<Gender>()?,
        age,
        activity_level: activity.parse::<ActivityLevel>()?,
        goal: goal.parse::<Goal>()?,
    };

    let calculator = engine.calculator();
    let bmr = calculator.basal_energy_expenditure(weight, height, profile.age, profile.gender)?;
    let tdee = calculator.total_daily_expenditure(bmr, profile.activity_level)?;
    let target = calculator.target_calories(tdee, profile.goal)?;
    let bmi = calculator.bmi(weight, height)?;

    let output = serde_json::json!({
        "bmi": round1(bmi),
        "bmiCategory": nutri_engine::bmi_category(bmi).as_str(),
        "bmr": round1(bmr),
        "tdee": round1(tdee),
        "targetCalories": round1(target),
        "idealWeight": engine.classifier().weight_range(height),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn cmd_macros(
    current: MacroSplit,
    edit: Option<&str>,
    calories: Option<f64>,
    config_path: Option<&Path>,
) -> Result<(), NutriCliError> {
    let engine = load_engine(config_path)?;

    let split = match edit {
        Some(arg) => {
            let (field, value) = parse_edit(arg)?;
            engine.apply_macro_edit(current, field, value)
        }
        None => MacroAllocator::normalize(current),
    };

    let mut output = serde_json::json!({ "split": split });
    if let Some(target) = calories {
        output["grams"] = serde_json::to_value(MacroAllocator::grams(
            split,
            target,
            &engine.config().macros,
        ))?;
    }
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), NutriCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Engine version {}", ENGINE_VERSION),
    });

    match config_path {
        Some(path) if path.exists() => match fs::read_to_string(path) {
            Ok(content) => match EngineConfig::from_json(&content) {
                Ok(_) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("Configuration {} is valid", path.display()),
                }),
                Err(e) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid configuration: {}", e),
                }),
            },
            Err(e) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read configuration file: {}", e),
            }),
        },
        Some(_) => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Configuration file does not exist".to_string(),
        }),
        None => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "Using built-in defaults".to_string(),
        }),
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass -i <file> to assess)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (assess can read requests)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Nutri Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(NutriCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn parse_edit(arg: &str) -> Result<(Macro, f64), NutriCliError> {
    let (field, value) = arg
        .split_once('=')
        .ok_or_else(|| {
            NutriCliError::BadArgument(format!("expected <field>=<value>, got {arg:?}"))
        })?;
    let field = field.parse::<Macro>()?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| NutriCliError::BadArgument(format!("not a number: {value:?}")))?;
    Ok((field, value))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// Error types

#[derive(Debug)]
enum NutriCliError {
    Io(io::Error),
    Engine(nutri_engine::EngineError),
    Json(serde_json::Error),
    Validation(nutri_engine::ValidationError),
    NoMeasurements,
    BadArgument(String),
    DoctorFailed,
}

impl From<io::Error> for NutriCliError {
    fn from(e: io::Error) -> Self {
        NutriCliError::Io(e)
    }
}

impl From<nutri_engine::EngineError> for NutriCliError {
    fn from(e: nutri_engine::EngineError) -> Self {
        NutriCliError::Engine(e)
    }
}

impl From<serde_json::Error> for NutriCliError {
    fn from(e: serde_json::Error) -> Self {
        NutriCliError::Json(e)
    }
}

impl From<nutri_engine::ValidationError> for NutriCliError {
    fn from(e: nutri_engine::ValidationError) -> Self {
        NutriCliError::Validation(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<NutriCliError> for CliError {
    fn from(e: NutriCliError) -> Self {
        match e {
            NutriCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            NutriCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the request profile and measurements".to_string()),
            },
            NutriCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            NutriCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Weight, height and age must be positive".to_string()),
            },
            NutriCliError::NoMeasurements => CliError {
                code: "NO_MEASUREMENTS".to_string(),
                message: "No measurements found in request".to_string(),
                hint: Some("Provide at least one measurement, newest first".to_string()),
            },
            NutriCliError::BadArgument(msg) => CliError {
                code: "BAD_ARGUMENT".to_string(),
                message: msg,
                hint: Some("Run 'nutri --help' for usage".to_string()),
            },
            NutriCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
