use std::path::{Path, PathBuf};

use argz_core::{Argument, ArgumentVector, NameCase, Navigator, PathKey, validate_argument};
use argz_document::{DocumentFormat, ResolverConfig, load_argument, load_document};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_ENV: &str = "ARGZ_LOG";

/// CLI-specific naming convention enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliNameCase {
    Kebab,
    Snake,
    Camel,
    Verbatim,
}

impl From<CliNameCase> for NameCase {
    fn from(case: CliNameCase) -> Self {
        match case {
            CliNameCase::Kebab => Self::Kebab,
            CliNameCase::Snake => Self::Snake,
            CliNameCase::Camel => Self::Camel,
            CliNameCase::Verbatim => Self::Verbatim,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "argz")]
#[command(about = "Resolve argument vectors against argz schema documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve an argument vector and print a JSON report.
    Resolve(ResolveArgs),
    /// Load schema documents and check their flag names.
    Check(CheckArgs),
    /// List the flag spellings and collection paths of a schema.
    Names(NamesArgs),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Schema document (JSON or YAML).
    #[arg(long)]
    schema: PathBuf,
    /// Resolver configuration file (YAML or JSON).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Naming convention; overrides the configuration file.
    #[arg(long)]
    name_case: Option<CliNameCase>,
    /// Skip validation and report the raw resolved value.
    #[arg(long)]
    raw: bool,
    /// Print the report on a single line.
    #[arg(long)]
    compact: bool,
    /// The argument vector to resolve, after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema files and/or directories containing schema documents.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Naming convention used to derive flag names.
    #[arg(long, default_value = "kebab")]
    name_case: CliNameCase,
}

#[derive(Debug, Args)]
struct NamesArgs {
    /// Schema document (JSON or YAML).
    #[arg(long)]
    schema: PathBuf,
    /// Naming convention used to derive flag names.
    #[arg(long, default_value = "kebab")]
    name_case: CliNameCase,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Resolve(args) => run_resolve(args),
        Command::Check(args) => run_check(args),
        Command::Names(args) => run_names(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => ResolverConfig::load(path)
            .map_err(|e| format!("failed to load config '{}': {e}", path.display()))?,
        None => ResolverConfig::default(),
    };
    if let Some(case) = args.name_case {
        config.name_case = case.into();
    }
    if args.raw {
        config.validate = false;
    }

    let root = load_schema(&args.schema)?;
    let argv = ArgumentVector::with_converter(root, config.converter());

    let mut resolution = argv.resolve(args.argv.as_slice());
    if config.validate {
        let schema = argv.root().schema(None);
        resolution = argv.validate_resolution(resolution, &schema);
    }
    debug!(status = ?resolution.status, issues = resolution.issues.len(), "Resolved argv");

    let report = if args.compact {
        serde_json::to_string(&resolution)
    } else {
        serde_json::to_string_pretty(&resolution)
    }
    .map_err(|e| format!("failed to serialize report: {e}"))?;
    println!("{report}");

    if resolution.is_valid() {
        Ok(())
    } else {
        Err(format!(
            "argument vector is {} ({} issue(s))",
            resolution.status,
            resolution.issues.len()
        ))
    }
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let case = NameCase::from(args.name_case);
    let mut checked = 0usize;
    let mut failed = 0usize;

    for input in &args.inputs {
        for (label, result) in load_inputs(input)? {
            checked += 1;
            let errors = match result {
                Ok(argument) => validate_argument(&argument, &case)
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                Err(err) => vec![err],
            };
            if errors.is_empty() {
                debug!(document = %label, "Document ok");
                continue;
            }
            failed += 1;
            for err in errors {
                eprintln!("{label}: {err}");
            }
        }
    }

    println!("Checked {checked} document(s), {failed} with errors.");
    if failed > 0 {
        return Err(format!("{failed} document(s) failed validation"));
    }
    Ok(())
}

fn run_names(args: NamesArgs) -> Result<(), String> {
    let root = load_schema(&args.schema)?;
    let case = NameCase::from(args.name_case);
    let navigator = Navigator::new(&root, &case);

    for name in navigator.flag_names() {
        println!("{}", spell(&name));
    }
    for path in navigator.positional_paths() {
        println!("positional: {}", dotted(&path));
    }
    for path in navigator.bypassed_paths() {
        println!("bypassed: {}", dotted(&path));
    }
    Ok(())
}

fn load_schema(path: &Path) -> Result<Argument, String> {
    let root = load_argument(path)
        .map_err(|e| format!("failed to load schema '{}': {e}", path.display()))?;
    debug!(schema = %path.display(), kind = %root.kind(), "Loaded schema");
    Ok(root)
}

/// Loads a single document, or every document in a directory, each with its
/// own result.
fn load_inputs(input: &Path) -> Result<Vec<(String, Result<Argument, String>)>, String> {
    if !input.is_dir() {
        return Ok(vec![(input.display().to_string(), load_one(input))]);
    }

    let entries = std::fs::read_dir(input)
        .map_err(|e| format!("failed to read '{}': {e}", input.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| format!("failed to read '{}': {e}", input.display()))?
            .path();
        if path.is_file() && DocumentFormat::from_path(&path).is_some() {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths
        .into_iter()
        .map(|path| (path.display().to_string(), load_one(&path)))
        .collect())
}

fn load_one(path: &Path) -> Result<Argument, String> {
    load_document(path)
        .and_then(|document| document.into_argument())
        .map_err(|e| e.to_string())
}

/// Adds the dashes a user would type.
fn spell(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

fn dotted(path: &[PathKey]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}
