mod config;
mod output;

use std::fs::{self, File};
use std::io::{self, BufWriter, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use sage_config_core::{Document, IssueLevel, ValidationIssue, ValidationPolicy, validate_document};
use sage_config_dialect::{
    DialectParser, ParseOutcome, SkippedLine, download_filename, generate, write_document,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{ToolConfig, load_policy};
use crate::output::{OutputFormat, format_document, summary_table};

const DEFAULT_LOG_FILTER: &str = "sage_yaml=warn,sage_config_dialect=warn";

/// Path argument that reads from stdin or writes to stdout.
const STDIO_PATH: &str = "-";

#[derive(Debug, Parser)]
#[command(name = "sage-yaml")]
#[command(about = "Parse, format and validate SAGE configuration files")]
#[command(version)]
struct Cli {
    /// Tool configuration file (default: .sage-yaml.yml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a configuration file and print it as JSON or YAML.
    Parse(ParseArgs),
    /// Write configuration text from a JSON document.
    Generate(GenerateArgs),
    /// Rewrite a configuration file in canonical layout.
    Fmt(FmtArgs),
    /// Check one or more configuration files against a validation policy.
    Validate(ValidateArgs),
    /// Print a table of catalogs and packages.
    Summary(SummaryArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Configuration file, or `-` for stdin.
    input: PathBuf,
    /// Output format (default: json, or the config file's `format`).
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Report unrecognized lines and exit non-zero if any were found.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// JSON document, or `-` for stdin.
    input: PathBuf,
    /// Output path, or `-` for stdout (default: derived from the document name).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FmtArgs {
    /// Configuration file, or `-` for stdin.
    input: PathBuf,
    /// Exit non-zero if the file is not already formatted.
    #[arg(long, conflicts_with = "in_place")]
    check: bool,
    /// Overwrite the input file instead of printing.
    #[arg(long)]
    in_place: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Configuration files to check.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Validation policy YAML (overrides the config file's `policy`).
    #[arg(long)]
    policy: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SummaryArgs {
    /// Configuration file, or `-` for stdin.
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    let result = ToolConfig::resolve(cli.config.as_deref())
        .map_err(|err| err.to_string())
        .and_then(|config| match cli.command {
            Command::Parse(args) => run_parse(args, &config),
            Command::Generate(args) => run_generate(args),
            Command::Fmt(args) => run_fmt(args),
            Command::Validate(args) => run_validate(args, &config),
            Command::Summary(args) => run_summary(args),
        });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_parse(args: ParseArgs, config: &ToolConfig) -> Result<(), String> {
    let strict = args.strict || config.strict;
    let format = args.format.unwrap_or(config.format);

    let outcome = parse_input(&args.input, strict)?;
    print_skipped(&args.input, &outcome.skipped);
    println!("{}", format_document(&outcome.document, format)?);

    if strict && !outcome.skipped.is_empty() {
        return Err(format!(
            "{} unrecognized line(s) in '{}'",
            outcome.skipped.len(),
            args.input.display()
        ));
    }
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let raw = read_input(&args.input)?;
    let doc: Document = serde_json::from_slice(&raw)
        .map_err(|err| format!("Failed to read document '{}': {err}", args.input.display()))?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(download_filename(&doc.meta)));

    if output.as_os_str() == STDIO_PATH {
        let stdout = io::stdout();
        return write_document(&doc, stdout.lock())
            .map_err(|err| format!("Failed to write to stdout: {err}"));
    }

    let file = File::create(&output)
        .map_err(|err| format!("Failed to create '{}': {err}", output.display()))?;
    write_document(&doc, BufWriter::new(file))
        .map_err(|err| format!("Failed to write '{}': {err}", output.display()))?;

    println!(
        "Wrote {} catalog(s) and {} package(s) to '{}'.",
        doc.catalogs.len(),
        doc.packages.len(),
        output.display()
    );
    Ok(())
}

fn run_fmt(args: FmtArgs) -> Result<(), String> {
    let raw = read_input(&args.input)?;
    let doc = DialectParser::new()
        .parse_bytes(&raw)
        .map_err(|err| interpret_error(&args.input, err))?
        .document;
    let formatted = generate(&doc);
    let unchanged = raw == formatted.as_bytes();

    if args.check {
        if !unchanged {
            return Err(format!("'{}' is not formatted", args.input.display()));
        }
        return Ok(());
    }

    if args.in_place {
        if args.input.as_os_str() == STDIO_PATH {
            return Err("--in-place needs a file path, not stdin".to_string());
        }
        if unchanged {
            debug!(path = %args.input.display(), "Already formatted");
            return Ok(());
        }
        fs::write(&args.input, formatted)
            .map_err(|err| format!("Failed to write '{}': {err}", args.input.display()))?;
        println!("Formatted '{}'.", args.input.display());
        return Ok(());
    }

    print!("{formatted}");
    Ok(())
}

/// Result of checking one file.
struct FileReport {
    path: PathBuf,
    outcome: Result<(Vec<SkippedLine>, Vec<ValidationIssue>), String>,
}

fn run_validate(args: ValidateArgs, config: &ToolConfig) -> Result<(), String> {
    let policy = match &args.policy {
        Some(path) => load_policy(path).map_err(|err| err.to_string())?,
        None => config.policy.clone(),
    };

    let reports: Vec<FileReport> = args
        .inputs
        .par_iter()
        .map(|path| FileReport {
            path: path.clone(),
            outcome: check_file(path, &policy),
        })
        .collect();

    let mut failed = 0usize;
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for report in &reports {
        let display = report.path.display();
        match &report.outcome {
            Err(err) => {
                eprintln!("{display}: {err}");
                failed += 1;
            }
            Ok((skipped, issues)) => {
                print_skipped(&report.path, skipped);
                warnings += skipped.len();

                let mut file_errors = 0usize;
                for issue in issues {
                    println!("{display}: {issue}");
                    match issue.level {
                        IssueLevel::Error => file_errors += 1,
                        IssueLevel::Warning => warnings += 1,
                    }
                }
                if file_errors > 0 {
                    failed += 1;
                    errors += file_errors;
                } else if issues.is_empty() && skipped.is_empty() {
                    println!("{display}: ok");
                }
            }
        }
    }

    println!(
        "Validated {} file(s): {errors} error(s), {warnings} warning(s).",
        reports.len()
    );

    if failed > 0 {
        return Err(format!("{failed} file(s) failed validation"));
    }
    Ok(())
}

fn check_file(
    path: &Path,
    policy: &ValidationPolicy,
) -> Result<(Vec<SkippedLine>, Vec<ValidationIssue>), String> {
    let outcome = parse_input(path, true)?;
    let issues = validate_document(&outcome.document, policy);
    debug!(
        path = %path.display(),
        skipped = outcome.skipped.len(),
        issues = issues.len(),
        "Checked file"
    );
    Ok((outcome.skipped, issues))
}

fn run_summary(args: SummaryArgs) -> Result<(), String> {
    let outcome = parse_input(&args.input, false)?;
    print!("{}", summary_table(&outcome.document));
    Ok(())
}

fn parse_input(path: &Path, strict: bool) -> Result<ParseOutcome, String> {
    let raw = read_input(path)?;
    DialectParser::new()
        .strict(strict)
        .parse_bytes(&raw)
        .map_err(|err| interpret_error(path, err))
}

fn read_input(path: &Path) -> Result<Vec<u8>, String> {
    if path.as_os_str() == STDIO_PATH {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        return Ok(buf);
    }
    fs::read(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn interpret_error(path: &Path, err: sage_config_dialect::ParseError) -> String {
    format!("could not interpret '{}': {err}", path.display())
}

fn print_skipped(path: &Path, skipped: &[SkippedLine]) {
    for line in skipped {
        eprintln!("{}: warning: {line}", path.display());
    }
}
