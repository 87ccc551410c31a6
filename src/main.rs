use clap::Parser;
use colored::Colorize;
use deadsharp::analysis::Analyzer;
use deadsharp::report::{ReportFormat, Reporter};
use deadsharp::{CancellationToken, Config, Error, ImportFixer, SolutionLoader};
use indicatif::{ProgressBar, ProgressStyle};
use miette::Result;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};

/// Exit code for a run interrupted with Ctrl-C
const EXIT_CANCELLED: u8 = 130;

/// deadsharp - Find unused members and unnecessary usings in C# solutions
#[derive(Parser, Debug)]
#[command(name = "deadsharp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the .sln or .csproj file to analyze
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (json format; stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Leave public members out of the report (true or false)
    #[arg(long, value_name = "BOOL")]
    exclude_public: Option<bool>,

    /// Skip unused using analysis
    #[arg(long)]
    skip_usings: bool,

    /// Remove unused usings from source files
    #[arg(long, conflicts_with = "skip_usings")]
    fix_usings: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    match run(&cli, &cancel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) if is_cancelled(&report) => {
            eprintln!("{}", "Analysis cancelled.".yellow());
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(report) => {
            eprintln!("{:?}", report);
            ExitCode::FAILURE
        }
    }
}

fn is_cancelled(report: &miette::Report) -> bool {
    report
        .downcast_ref::<Error>()
        .is_some_and(|e| e.is_cancelled())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout is reserved for reports
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from the directory holding the solution
        Config::from_default_locations(config_root(&cli.path))?
    };

    // Override with CLI arguments
    if let Some(exclude_public) = cli.exclude_public {
        config.exclude_public_api = exclude_public;
    }
    if cli.skip_usings {
        config.imports.enabled = false;
    }
    if cli.fix_usings {
        config.imports.fix = true;
    }

    Ok(config)
}

fn config_root(path: &Path) -> &Path {
    if path.is_dir() {
        return path;
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn progress_spinner(cli: &Cli) -> ProgressBar {
    let json_to_stdout = matches!(cli.format, OutputFormat::Json) && cli.output.is_none();
    if cli.quiet || json_to_stdout || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn run(cli: &Cli, cancel: &CancellationToken) -> Result<()> {
    let config = load_config(cli)?;
    info!("deadsharp v{}", env!("CARGO_PKG_VERSION"));

    let spinner = progress_spinner(cli);

    // Step 1: Load the solution
    spinner.set_message(format!("Loading {}...", cli.path.display()));
    let solution = match SolutionLoader::new(&config).load(&cli.path) {
        Ok(solution) => solution,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    // Step 2: Analyze
    spinner.set_message("Analyzing...");
    let result = Analyzer::new(&config, cancel.clone()).analyze(&solution);
    spinner.finish_and_clear();
    let result = result?;

    // Step 3: Fix usings before anything is reported
    let fixed = if config.imports.fix && !result.unused_imports().is_empty() {
        Some(ImportFixer::new(cancel).fix(&solution, result.unused_imports())?)
    } else {
        None
    };

    // Step 4: Report
    Reporter::new(cli.format.into(), cli.output.clone()).report(&result)?;

    if let Some(fixed) = fixed {
        eprintln!(
            "{}",
            format!("Removed unused usings from {} files", fixed).green()
        );
    }

    Ok(())
}
