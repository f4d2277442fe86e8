use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glob::glob;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trackdecode_core::{DecodePolicy, decode_hex_packet, decode_webhook};

const STDIN_INPUT: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "trackdecode")]
#[command(version)]
#[command(
    about = "Decoder for tracker telemetry packets (GPS / sensor / management).",
    long_about = None,
    after_help = "Examples:\n  trackdecode decode 0200105e5f2a00ffffffffff000000070054fbff\n  trackdecode webhook capture.json -o measurements.json\n  trackdecode webhook 'captures/*.json' --stdout --pretty"
)]
struct Cli {
    /// Log filter (e.g. `warn`, `debug`, `trackdecode_core=debug`)
    #[arg(long, global = true, env = "TRACKDECODE_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode hex-encoded packets and print the records as a JSON array.
    Decode {
        /// Packets as hex strings (whitespace inside a packet is ignored)
        #[arg(required = true)]
        packets: Vec<String>,

        /// Reject sample counts outside the modelled range
        #[arg(long)]
        strict: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,
    },
    /// Decode captured webhook bodies into device measurements.
    #[command(
        after_help = "Examples:\n  trackdecode webhook capture.json -o measurements.json\n  cat capture.json | trackdecode webhook - --stdout\n  trackdecode webhook 'captures/*.json' --stdout"
    )]
    Webhook {
        /// Webhook body file, glob pattern, or `-` for stdin
        input: String,

        /// Output path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Reject sample counts outside the modelled range
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = init_logging(&cli.log_level).and_then(|()| match cli.command {
        Commands::Decode {
            packets,
            strict,
            pretty,
            compact,
        } => cmd_decode(&packets, policy(strict), pretty, compact),
        Commands::Webhook {
            input,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            strict,
        } => cmd_webhook(&input, report, stdout, pretty, compact, quiet, policy(strict)),
    });

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

fn init_logging(filter: &str) -> Result<(), CliError> {
    let filter = EnvFilter::try_new(filter).map_err(|err| {
        CliError::new(
            format!("invalid log filter '{}': {}", filter, err),
            Some(
                "use --log-level or TRACKDECODE_LOG with a filter like `warn` or \
                 `trackdecode_core=debug`"
                    .to_string(),
            ),
        )
    })?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}

fn policy(strict: bool) -> DecodePolicy {
    if strict {
        DecodePolicy::Strict
    } else {
        DecodePolicy::Lenient
    }
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
        CliError::new(format!("{:#}", err), None)
    }
}

fn cmd_decode(
    packets: &[String],
    policy: DecodePolicy,
    pretty: bool,
    compact: bool,
) -> Result<(), CliError> {
    let mut records = Vec::with_capacity(packets.len());
    for (index, packet) in packets.iter().enumerate() {
        let record = decode_hex_packet(packet, policy).map_err(|err| {
            CliError::new(
                format!("packet {} could not be decoded: {}", index + 1, err),
                Some(
                    "expected an even number of hex digits and a 20-byte packet; \
                     --strict also rejects out-of-range sample counts"
                        .to_string(),
                ),
            )
        })?;
        records.push(serde_json::to_value(record).context("JSON serialization failed")?);
    }

    let json = serialize_output(&Value::Array(records), pretty, compact)?;
    println!("{}", json);
    Ok(())
}

fn cmd_webhook(
    input: &str,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    policy: DecodePolicy,
) -> Result<(), CliError> {
    let inputs = resolve_inputs(input)?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };
    if let Some(report_path) = report.as_ref() {
        ensure_report_differs(report_path, &inputs)?;
    }

    let mut measurements = Vec::new();
    for source in &inputs {
        let body = read_body(source)?;
        let decoded = decode_webhook(&body, policy)
            .with_context(|| format!("webhook decoding failed: {}", source.label()))?;
        debug!(input = %source.label(), packets = decoded.len(), "decoded webhook");
        for measurement in decoded {
            measurements.push(
                serde_json::to_value(measurement).context("JSON serialization failed")?,
            );
        }
    }
    let json = serialize_output(&Value::Array(measurements), pretty, compact)?;

    let Some(report) = report else {
        println!("{}", json);
        return Ok(());
    };

    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&report, json)
        .with_context(|| format!("Failed to write output: {}", report.display()))?;
    info!(output = %report.display(), inputs = inputs.len(), "measurements written");

    if !quiet {
        eprintln!("OK: measurements written -> {}", report.display());
    }
    Ok(())
}

fn serialize_output(value: &Value, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    fn label(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}

fn read_body(source: &InputSource) -> Result<String, CliError> {
    match source {
        InputSource::Stdin => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read webhook body from stdin")?;
            Ok(body)
        }
        InputSource::File(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))
            .map_err(Into::into),
    }
}

fn ensure_report_differs(report: &Path, inputs: &[InputSource]) -> Result<(), CliError> {
    let Some(report_abs) = resolve_output_path(report)? else {
        return Ok(());
    };
    for input in inputs {
        let InputSource::File(path) = input else {
            continue;
        };
        let input_abs = fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve input path: {}", path.display()))?;
        if input_abs == report_abs {
            return Err(CliError::new(
                format!("output path must differ from input: {}", report.display()),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn resolve_output_path(report: &Path) -> Result<Option<PathBuf>, CliError> {
    let Some(parent) = report.parent() else {
        return Ok(None);
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    // A missing output directory is created later and cannot alias an input.
    let Ok(dir) = fs::canonicalize(parent) else {
        return Ok(None);
    };
    let name = report
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", report.display()))?;
    Ok(Some(dir.join(name)))
}

fn resolve_inputs(input: &str) -> Result<Vec<InputSource>, CliError> {
    if input == STDIN_INPUT {
        return Ok(vec![InputSource::Stdin]);
    }
    if !is_glob_pattern(input) {
        let path = PathBuf::from(input);
        validate_input_file(&path)?;
        return Ok(vec![InputSource::File(path)]);
    }

    let paths = glob(input).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", input),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", input),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(InputSource::File(path));
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", input),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    debug!(pattern = input, matches = matches.len(), "resolved input pattern");
    Ok(matches)
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a captured webhook body (JSON) or `-` for stdin".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a captured webhook body (JSON) or `-` for stdin".to_string()),
        ));
    }
    Ok(())
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
