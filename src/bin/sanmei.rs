//! Sanmei CLI - command-line interface for Sanmei Core
//!
//! Commands:
//! - chart: Build a natal chart
//! - luck: Ten decades of great luck
//! - annual: Annual luck for an age range
//! - relate: Phase relations between two pillars
//! - compat: Compatibility between two people
//! - doctor: Diagnose configuration and environment

use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use sanmei_core::chart::Chart;
use sanmei_core::encoder::ChartEncoder;
use sanmei_core::luck::{self, LuckRow};
use sanmei_core::relations::describe_labels;
use sanmei_core::{
    ChartError, EngineConfig, Gender, PersonPillars, Pillar, SanmeiEngine, ENGINE_VERSION,
    PRODUCER_NAME,
};

/// Sanmei - sexagenary Four Pillars chart engine
#[derive(Parser)]
#[command(name = "sanmei")]
#[command(author = "Sanmei Core Contributors")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Compute Four Pillars charts, luck cycles and phase relations", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "json-pretty")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a natal chart
    Chart {
        #[command(flatten)]
        birth: BirthArgs,
    },

    /// Ten decades of great luck
    Luck {
        #[command(flatten)]
        birth: BirthArgs,
    },

    /// Annual luck for each age in a range
    Annual {
        #[command(flatten)]
        birth: BirthArgs,

        /// First age
        #[arg(long, default_value = "0")]
        start: u32,

        /// Last age (inclusive, at most 120)
        #[arg(long, default_value = "100")]
        end: u32,
    },

    /// Phase relations of a moving pillar against a fixed one
    Relate {
        /// Moving pillar, e.g. 甲子 or jia-zi
        moving: String,

        /// Fixed pillar
        fixed: String,
    },

    /// Compatibility between two people
    Compat {
        /// First person's pillars: "year month day [hour]", e.g. "癸亥 庚申 辛未 甲午"
        first: String,

        /// Second person's pillars
        second: String,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct BirthArgs {
    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// Hour of birth (0-23)
    #[arg(long, default_value = "0")]
    hour: u32,

    /// Gender (male or female)
    #[arg(long)]
    gender: Gender,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    JsonPretty,
    /// Human-readable table
    Table,
}

impl OutputFormat {
    fn encoder(self) -> ChartEncoder {
        match self {
            OutputFormat::Json => ChartEncoder::new(),
            OutputFormat::JsonPretty | OutputFormat::Table => ChartEncoder::pretty(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

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

fn run(cli: Cli) -> Result<(), SanmeiCliError> {
    let format = cli.format;
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Chart { birth } => cmd_chart(&load_engine(config)?, &birth, format),
        Commands::Luck { birth } => cmd_luck(&load_engine(config)?, &birth, format),
        Commands::Annual { birth, start, end } => {
            cmd_annual(&load_engine(config)?, &birth, start, end, format)
        }
        Commands::Relate { moving, fixed } => cmd_relate(&moving, &fixed, format),
        Commands::Compat { first, second } => {
            cmd_compat(&load_engine(config)?, &first, &second, format)
        }
        Commands::Doctor { json } => cmd_doctor(config, json),
    }
}

fn load_engine(config: Option<&Path>) -> Result<SanmeiEngine, SanmeiCliError> {
    let mut engine = SanmeiEngine::new();
    if let Some(path) = config {
        let json = fs::read_to_string(path)?;
        engine.load_config(&json)?;
    }
    Ok(engine)
}

fn build_chart(engine: &SanmeiEngine, birth: &BirthArgs) -> Result<Chart, SanmeiCliError> {
    let date = birth.date;
    Ok(engine.chart(date.year(), date.month(), date.day(), birth.hour, birth.gender)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<(), SanmeiCliError> {
    println!("{}", format.encoder().encode(value)?);
    Ok(())
}

fn cmd_chart(
    engine: &SanmeiEngine,
    birth: &BirthArgs,
    format: OutputFormat,
) -> Result<(), SanmeiCliError> {
    let chart = build_chart(engine, birth)?;

    match format {
        OutputFormat::Table => {
            print_chart_table(&chart);
            Ok(())
        }
        _ => {
            let encoder = format.encoder();
            println!("{}", encoder.encode_chart(&chart, None, None)?);
            Ok(())
        }
    }
}

fn cmd_luck(
    engine: &SanmeiEngine,
    birth: &BirthArgs,
    format: OutputFormat,
) -> Result<(), SanmeiCliError> {
    let chart = build_chart(engine, birth)?;
    let great = luck::great_luck(&chart);

    match format {
        OutputFormat::Table => {
            println!(
                "Direction: {:?}  Days to boundary: {}  Starting age: {}",
                great.direction, great.days_to_boundary, great.starting_age
            );
            print_luck_table(&great.rows);
            Ok(())
        }
        _ => print_json(&great, format),
    }
}

fn cmd_annual(
    engine: &SanmeiEngine,
    birth: &BirthArgs,
    start: u32,
    end: u32,
    format: OutputFormat,
) -> Result<(), SanmeiCliError> {
    let chart = build_chart(engine, birth)?;
    let rows = luck::annual_luck(&chart, start, end)?;

    match format {
        OutputFormat::Table => {
            print_luck_table(&rows);
            Ok(())
        }
        _ => print_json(&rows, format),
    }
}

fn cmd_relate(moving: &str, fixed: &str, format: OutputFormat) -> Result<(), SanmeiCliError> {
    let moving: Pillar = moving.parse()?;
    let fixed: Pillar = fixed.parse()?;
    let labels = sanmei_core::classify_phase_relation(moving, fixed);

    match format {
        OutputFormat::Table => {
            println!("{} → {}: {}", moving, fixed, describe_labels(&labels));
            Ok(())
        }
        _ => print_json(&labels, format),
    }
}

fn cmd_compat(
    engine: &SanmeiEngine,
    first: &str,
    second: &str,
    format: OutputFormat,
) -> Result<(), SanmeiCliError> {
    let first: PersonPillars = first.parse()?;
    let second: PersonPillars = second.parse()?;
    let result = engine.compatibility(&first, &second);

    match format {
        OutputFormat::Table => {
            let b = &result.breakdown;
            println!("Score:  {} ({:?})", result.score, result.rating);
            println!("  day stem relation  {:>3}", b.day_stem_relation);
            println!("  stem combination   {:>3}", b.stem_combination);
            println!("  day branch         {:>3}", b.day_branch);
            println!("  year harmony       {:>3}", b.year_harmony);
            println!("  element variety    {:>3}", b.element_variety);
            for finding in &result.findings {
                println!("  - {:?}", finding);
            }
            Ok(())
        }
        _ => print_json(&result, format),
    }
}

fn print_chart_table(chart: &Chart) {
    println!(
        "Birth: {} {:02}:00 ({})",
        chart.birth.date,
        chart.birth.hour,
        chart.gender.as_str()
    );
    println!(
        "Solar month {} (boundary day {}, {} days in)",
        chart.solar_month.ordinal(),
        chart.boundary_day,
        chart.days_since_boundary
    );
    println!();
    println!("        pillar  hidden  stem    hidden  stage");
    for (name, p) in [
        ("hour", &chart.hour),
        ("day", &chart.day),
        ("month", &chart.month),
        ("year", &chart.year),
    ] {
        println!(
            "  {:<5} {}    {}      {}  {}  {}",
            name,
            p.pillar,
            p.hidden_stem.symbol(),
            p.stem_deity.symbol(),
            p.hidden_deity.symbol(),
            p.stage.star()
        );
    }

    let s = &chart.star_chart;
    println!();
    println!(
        "Star chart: N {} / S {} / E {} / W {} / C {}",
        s.north.symbol(),
        s.south.symbol(),
        s.east.symbol(),
        s.west.symbol(),
        s.center.symbol()
    );
    println!(
        "            start {} / middle {} / end {}",
        s.start.star(),
        s.middle.star(),
        s.end.star()
    );

    let balance = &chart.five_elements;
    println!();
    print!("Elements:");
    for (element, pct) in balance.percentages.iter() {
        print!(" {} {:.1}%", element.symbol(), pct);
    }
    println!();
    println!(
        "  dominant {}  weakest {}  balance {:.1}",
        balance.dominant.symbol(),
        balance.weakest.symbol(),
        balance.balance_score
    );
    println!("Energy total: {}", chart.energy.total);
    println!(
        "Void: {} (year {})",
        chart.own_void.label(),
        chart.year_void.label()
    );
}

fn print_luck_table(rows: &[LuckRow]) {
    println!("  age  year  pillar  deity   stage   day / month / year");
    for row in rows {
        println!(
            "  {:>3}  {}  {}{}  {}  {}  {} / {} / {}",
            row.age,
            row.year,
            row.pillar,
            if row.in_void { "*" } else { " " },
            row.ten_deity.symbol(),
            row.twelve_stage.star(),
            describe_labels(&row.against_day),
            describe_labels(&row.against_month),
            describe_labels(&row.against_year)
        );
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), SanmeiCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Sanmei Core version {}", ENGINE_VERSION),
    });

    if let Some(path) = config {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match EngineConfig::from_json(&content) {
                    Ok(config) => checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (minor hidden stems {})",
                            if config.include_minor_hidden_stems {
                                "on"
                            } else {
                                "off"
                            }
                        ),
                    }),
                    Err(e) => checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    }),
                },
                Err(e) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                }),
            }
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist, defaults apply".to_string(),
            });
        }
    }

    // Known chart as a smoke test of the tables
    let smoke = SanmeiEngine::new()
        .chart(1983, 8, 11, 12, Gender::Male)
        .map(|chart| chart.day.pillar.to_string());
    checks.push(match smoke {
        Ok(day) if day == "辛未" => DoctorCheck {
            name: "reference_chart".to_string(),
            status: CheckStatus::Ok,
            message: "Reference chart resolves day pillar 辛未".to_string(),
        },
        Ok(day) => DoctorCheck {
            name: "reference_chart".to_string(),
            status: CheckStatus::Error,
            message: format!("Reference chart resolved day pillar {} (expected 辛未)", day),
        },
        Err(e) => DoctorCheck {
            name: "reference_chart".to_string(),
            status: CheckStatus::Error,
            message: format!("Reference chart failed: {}", e),
        },
    });

    let stdout_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (table output readable)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a pipe (JSON output recommended)".to_string(),
        }
    };
    checks.push(stdout_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Sanmei Doctor Report");
        println!("====================");
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
        Err(SanmeiCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Debug)]
enum SanmeiCliError {
    Io(io::Error),
    Chart(ChartError),
    Json(serde_json::Error),
    DoctorFailed,
}

impl From<io::Error> for SanmeiCliError {
    fn from(e: io::Error) -> Self {
        SanmeiCliError::Io(e)
    }
}

impl From<ChartError> for SanmeiCliError {
    fn from(e: ChartError) -> Self {
        SanmeiCliError::Chart(e)
    }
}

impl From<serde_json::Error> for SanmeiCliError {
    fn from(e: serde_json::Error) -> Self {
        SanmeiCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SanmeiCliError> for CliError {
    fn from(e: SanmeiCliError) -> Self {
        match e {
            SanmeiCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SanmeiCliError::Chart(e) if e.is_invalid_input() => CliError {
                code: "INVALID_INPUT".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Dates are YYYY-MM-DD, hours 0-23, pillars like 甲子 or jia-zi".to_string(),
                ),
            },
            SanmeiCliError::Chart(ChartError::InvalidConfig(msg)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Run 'sanmei doctor --config <path>' for details".to_string()),
            },
            SanmeiCliError::Chart(e) => CliError {
                code: "CHART_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            SanmeiCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SanmeiCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
