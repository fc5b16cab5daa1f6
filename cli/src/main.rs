mod declaration;

use std::path::PathBuf;

use argot_core::{
    AliasSuggester, DEFAULT_MAX_ALIAS_LENGTH, DEFAULT_MAX_ALIAS_WORD_COUNT, ErrorInfo,
    ParseOutcome, ParseStatus, Parser as ArgParser, Suggestion,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use crate::declaration::{Declaration, OptionSummary, Values};

/// Exit code for a parse pass that recorded errors.
const EXIT_INVALID: i32 = 2;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argot")]
#[command(version, about = "Declare, check and exercise typed argument parsers")]
struct Cli {
    /// Log engine decisions to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse arguments against a declaration file and print the outcome.
    Parse(ParseArgs),
    /// Build a declaration file and list the resulting options.
    Check(CheckArgs),
    /// Suggest aliases for field names.
    Suggest(SuggestArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Declaration file (YAML or JSON).
    #[arg(long)]
    spec: PathBuf,
    /// Output format for the report.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to parse, after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Declaration file (YAML or JSON).
    #[arg(long)]
    spec: PathBuf,
}

#[derive(Debug, Args)]
struct SuggestArgs {
    /// Field names, in declaration order.
    #[arg(required = true)]
    names: Vec<String>,
    /// Treat aliases differing only in case as the same alias.
    #[arg(long)]
    case_insensitive: bool,
    /// Longest alias to suggest.
    #[arg(long, default_value_t = DEFAULT_MAX_ALIAS_LENGTH)]
    max_length: usize,
    /// Most words joined into a long alias.
    #[arg(long, default_value_t = DEFAULT_MAX_ALIAS_WORD_COUNT)]
    max_words: usize,
}

/// What `parse` prints.
#[derive(Debug, Serialize)]
struct Report<'a> {
    status: ParseStatus,
    values: &'a Values,
    errors: Vec<ErrorReport>,
    verbosity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Vec<OptionSummary>>,
}

#[derive(Debug, Serialize)]
struct ErrorReport {
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    option: Option<String>,
    message: String,
}

impl From<&ErrorInfo> for ErrorReport {
    fn from(err: &ErrorInfo) -> Self {
        Self {
            code: err.code.as_str(),
            option: err.option.clone(),
            message: err.to_string(),
        }
    }
}

impl<'a> Report<'a> {
    fn new(parser: &ArgParser<Values>, outcome: &ParseOutcome, values: &'a Values) -> Self {
        let options = outcome
            .is_help()
            .then(|| parser.options().iter().map(OptionSummary::of).collect());
        Self {
            status: outcome.status,
            values,
            errors: outcome.errors.iter().map(ErrorReport::from).collect(),
            verbosity: outcome.verbosity(),
            options,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
        Command::Suggest(args) => run_suggest(args),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run_parse(args: ParseArgs) -> Result<i32, String> {
    let declaration = Declaration::load(&args.spec)?;
    let mut parser = declaration.build()?;

    let mut values = Values::new();
    let outcome = parser.parse(args.args.as_slice(), &mut values);
    debug!(status = ?outcome.status, errors = outcome.errors.len(), "Parsed arguments");

    let report = Report::new(&parser, &outcome, &values);
    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&report)
            .map_err(|err| format!("JSON serialization failed: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&report)
            .map_err(|err| format!("YAML serialization failed: {err}"))?,
    };
    println!("{}", rendered.trim_end());

    Ok(if outcome.status == ParseStatus::Invalid {
        EXIT_INVALID
    } else {
        0
    })
}

fn run_check(args: CheckArgs) -> Result<i32, String> {
    let declaration = Declaration::load(&args.spec)?;
    let parser = declaration.build()?;

    for option in parser.options() {
        let aliases = if option.prefixed_aliases().is_empty() {
            "<positional>".to_string()
        } else {
            option.prefixed_aliases().join(", ")
        };
        println!(
            "{} ({}, {}): {aliases}",
            option.name(),
            option.kind().as_str(),
            option.value_kind()
        );
    }
    info!(options = parser.options().len(), "Declaration is valid");
    println!("{} option(s) declared.", parser.options().len());

    Ok(0)
}

fn run_suggest(args: SuggestArgs) -> Result<i32, String> {
    let mut used: Vec<String> = Vec::new();

    for name in &args.names {
        let suggestions: Vec<Suggestion> = AliasSuggester::new(
            name,
            used.iter().map(String::as_str),
            !args.case_insensitive,
            args.max_length,
            args.max_words,
        )
        .collect();

        let short = suggestions
            .iter()
            .find(|s| matches!(s, Suggestion::Short(_)))
            .map_or("-", Suggestion::as_str);
        let long = suggestions
            .iter()
            .find(|s| matches!(s, Suggestion::Long(_)))
            .map_or("-", Suggestion::as_str);
        println!("{name}: {short} {long}");

        used.extend(suggestions.iter().map(|s| s.as_str().to_string()));
    }

    Ok(0)
}
