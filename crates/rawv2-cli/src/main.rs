use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use rawv2_core::{
    DecodeError, HexLineSource, Report, SensorConfig, analyze_hex_file, analyze_source, decode,
    strip_manufacturer_id,
};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("RAWV2_BUILD_COMMIT"),
    ", ",
    env!("RAWV2_BUILD_DATE"),
    ")"
);

const STDIN_INPUT: &str = "-";
const INPUT_EXTENSIONS: [&str; 2] = ["hex", "txt"];

#[derive(Parser, Debug)]
#[command(name = "rawv2")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for Ruuvi RAWv2 (0x05) and cut RAWv2 (0xC5) sensor advertisements.",
    long_about = None,
    after_help = "Examples:\n  rawv2 decode 0512FC5394C37C0004FFFC040CAC364200CDCBB8334C884F --pretty\n  rawv2 analyse capture.hex -o report.json\n  rawv2 analyze - --stdout --config sensors.toml < capture.hex"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one hex-encoded advertisement payload and print it as JSON.
    Decode {
        /// Payload as hex, without the manufacturer ID unless --strip-manufacturer-id is set
        payload: String,

        /// Capture time to stamp on the reading (RFC3339); defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        timestamp: Option<OffsetDateTime>,

        /// Drop a leading 9904 manufacturer ID before decoding
        #[arg(long)]
        strip_manufacturer_id: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Decode a capture file (one hex payload per line) into a JSON report.
    #[command(alias = "analyze")]
    Analyse(AnalyseArgs),
}

#[derive(Args, Debug)]
struct AnalyseArgs {
    /// Path to a .hex or .txt capture file, or - for stdin
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Sensor alias configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drop a leading 9904 manufacturer ID before decoding
    #[arg(long)]
    strip_manufacturer_id: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any advertisement failed to decode
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(&cli.command, Commands::Analyse(args) if args.quiet);
    init_tracing(quiet);

    let result = match cli.command {
        Commands::Decode {
            payload,
            timestamp,
            strip_manufacturer_id,
            pretty,
        } => cmd_decode(&payload, timestamp, strip_manufacturer_id, pretty),
        Commands::Analyse(args) => cmd_analyse(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<DecodeError> for CliError {
    fn from(err: DecodeError) -> Self {
        let hint = match err {
            DecodeError::UnsupportedFormat { tag: 0x99 } => {
                "payload looks like it starts with a manufacturer ID; use --strip-manufacturer-id"
            }
            DecodeError::UnsupportedFormat { .. } => "expected format tag 0x05 or 0xC5",
            DecodeError::TooShort { .. } => "the capture looks truncated",
        };
        CliError::new(err.to_string(), Some(hint.to_string()))
    }
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|err| format!("expected RFC3339: {err}"))
}

fn cmd_decode(
    payload: &str,
    timestamp: Option<OffsetDateTime>,
    strip: bool,
    pretty: bool,
) -> Result<(), CliError> {
    let hex_text = payload
        .strip_prefix("0x")
        .or_else(|| payload.strip_prefix("0X"))
        .unwrap_or(payload);
    let bytes = hex::decode(hex_text).map_err(|err| {
        CliError::new(
            format!("invalid hex payload: {err}"),
            Some("pass the advertisement as an even number of hex digits".to_string()),
        )
    })?;
    let bytes = if strip {
        strip_manufacturer_id(&bytes)
    } else {
        bytes.as_slice()
    };

    let captured_at = timestamp.unwrap_or_else(OffsetDateTime::now_utc);
    let reading = decode(bytes, captured_at)?;
    debug!(address = %reading.address, format_tag = reading.format_tag, "decoded advertisement");

    let json = if pretty {
        serde_json::to_string_pretty(&reading)
    } else {
        serde_json::to_string(&reading)
    }
    .context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn cmd_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => SensorConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => SensorConfig::default(),
    };
    config.strip_manufacturer_id |= args.strip_manufacturer_id;

    let rep = if args.input.as_os_str() == STDIN_INPUT {
        let source = HexLineSource::new(io::stdin().lock());
        analyze_source(STDIN_INPUT, source, &config).context("capture analysis failed")?
    } else {
        let resolved_input = resolve_input_path(&args.input)?;
        validate_input_file(&resolved_input)?;
        if let Some(report_path) = args.report.as_ref() {
            ensure_distinct_output(&resolved_input, report_path)?;
        }
        analyze_hex_file(&resolved_input, &config).context("capture analysis failed")?
    };
    info!(
        decoded = rep.summary.decoded,
        total = rep.summary.advertisements_total,
        sensors = rep.sensors.len(),
        "analysis complete"
    );

    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match args.report {
        Some(report) if !args.stdout => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
        _ => print!("{}", json),
    }

    if !args.quiet {
        print_errors(&rep);
    }
    if args.strict && has_errors(&rep) {
        return Err(CliError::new(
            "decode errors detected",
            Some("inspect the report's errors section".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn has_errors(rep: &Report) -> bool {
    rep.errors.iter().any(|entry| entry.count > 0)
}

fn print_errors(rep: &Report) {
    if !has_errors(rep) {
        return;
    }
    eprintln!("Decode errors:");
    for entry in &rep.errors {
        eprintln!("  {} ({})", entry.kind, entry.count);
    }
}

fn ensure_distinct_output(input: &Path, report_path: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let report_dir = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::canonicalize(parent),
        _ => fs::canonicalize("."),
    };
    // A missing output directory cannot contain the input.
    let Ok(report_dir) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .hex or .txt capture file, or - for stdin".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .hex or .txt capture file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !INPUT_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .hex or .txt capture file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .hex or .txt".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
