//! Host Lookup CLI Application
//!
//! Reads host names from one or more input files, resolves each distinct
//! name once and writes `<count>, <name>, <address>` lines to an output
//! file. A thin front end over host-lookup-lib.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use host_lookup_lib::{
    load_env_config, parse_duration_string, ConfigManager, FileConfig, LookupConfig, LookupError,
    Pipeline, ReportFormat, StaticResolver,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for host-lookup
#[derive(Parser, Debug)]
#[command(name = "host-lookup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Resolve host names from many files, deduplicated and counted")]
#[command(
    long_about = "Resolve host names read from one or more input files.\n\nEach distinct name is looked up once and written to the output file as\n'<count>, <name>, <address>', in the order names were first seen.\nFailed lookups get an empty address."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Input files followed by the output file
    #[arg(
        value_name = "FILE",
        num_args = 2..,
        required = true,
        help_heading = "Files"
    )]
    pub paths: Vec<PathBuf>,

    /// Resolve from a hosts-format file instead of the system resolver
    #[arg(long = "hosts", value_name = "FILE", help_heading = "Resolution")]
    pub hosts: Option<PathBuf>,

    /// Give up on a single lookup after this long (e.g. 5s, 500ms)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Resolution")]
    pub timeout: Option<String>,

    /// Max input files read at once (default: 10, max: 100)
    #[arg(short = 'p', long = "producers", value_name = "N", help_heading = "Performance")]
    pub producers: Option<usize>,

    /// Max concurrent queue admissions (default: 100, max: 10000)
    #[arg(long = "capacity", value_name = "N", help_heading = "Performance")]
    pub capacity: Option<usize>,

    /// Write the report as JSON instead of text lines
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Print nothing on stdout
    #[arg(short = 'q', long = "quiet", help_heading = "Output Format")]
    pub quiet: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logging on stderr
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

impl Args {
    /// Every path but the last.
    fn inputs(&self) -> &[PathBuf] {
        &self.paths[..self.paths.len().saturating_sub(1)]
    }

    /// The last path.
    fn output(&self) -> &Path {
        self.paths
            .last()
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(""))
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_lookup(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the flags.
fn init_logging(args: &Args) {
    let default_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.paths.len() < 2 {
        return Err(format!(
            "Not enough arguments: {}. Need at least one input file and an output file",
            args.paths.len()
        ));
    }

    if let Some(producers) = args.producers {
        if producers == 0 || producers > 100 {
            return Err("Producers must be between 1 and 100".to_string());
        }
    }

    if let Some(capacity) = args.capacity {
        if capacity == 0 || capacity > 10_000 {
            return Err("Capacity must be between 1 and 10000".to_string());
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_duration_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '500ms', '5s', '2m'",
                timeout
            ));
        }
    }

    if args
        .inputs()
        .iter()
        .any(|input| same_file(input, args.output()))
    {
        return Err(format!(
            "Output file '{}' is also listed as an input",
            args.output().display()
        ));
    }

    Ok(())
}

/// Best-effort absolute form of `path`, also for files that do not exist yet.
fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Whether two paths name the same file, e.g. `out.txt` and `./out.txt`.
fn same_file(a: &Path, b: &Path) -> bool {
    a == b || normalize_path(a) == normalize_path(b)
}

/// Main lookup logic
async fn run_lookup(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (config, format) = build_config(&args)?;

    // Load everything that can fail before the output file is truncated.
    let mut pipeline = Pipeline::with_config(config.clone());
    if let Some(hosts) = &args.hosts {
        let resolver = StaticResolver::from_hosts_file(hosts)?;
        info!("Using {} entries from {}", resolver.len(), hosts.display());
        pipeline = pipeline.with_resolver(Arc::new(resolver));
    }

    // The output file must be usable before any work starts.
    let output_path = args.output();
    let mut output = File::create(output_path)
        .map_err(|e| LookupError::output_error(output_path.display().to_string(), e.to_string()))?;

    let inputs = args.inputs();
    if args.verbose && !args.quiet {
        ui::print_header(inputs.len(), &config);
    }

    let spinner = if args.quiet {
        None
    } else {
        ui::Spinner::start(format!("Resolving host names from {} files...", inputs.len()))
    };

    let report = pipeline.run(inputs).await?;

    if let Some(s) = spinner {
        s.stop().await;
    }

    report
        .write_to(&mut output, format)
        .map_err(|e| LookupError::output_error(output_path.display().to_string(), e.to_string()))?;

    if !args.quiet {
        ui::print_summary(&report.summary, output_path);
    }

    Ok(())
}

/// Build LookupConfig and report format from CLI arguments with config
/// file integration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments (explicit user input)
/// 2. Environment variables (HL_*)
/// 3. Local config file (./host-lookup.toml)
/// 4. Global config file (~/.host-lookup.toml)
/// 5. XDG config file (~/.config/host-lookup/config.toml)
/// 6. Built-in defaults
fn build_config(
    args: &Args,
) -> Result<(LookupConfig, ReportFormat), Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config(args.verbose);

    // Step 1: config files
    let file_config = if let Some(explicit_path) = &args.config {
        info!("Using explicit config file (CLI --config): {}", explicit_path);
        config_manager.load_file(explicit_path)?
    } else if let Some(env_path) = &env_config.config {
        info!("Using explicit config file (HL_CONFIG env var): {}", env_path);
        config_manager.load_file(env_path)?
    } else {
        config_manager.discover_and_load()?
    };

    let (mut config, mut format) =
        merge_file_config(LookupConfig::default(), ReportFormat::default(), file_config);

    // Step 2: environment variables
    if let Some(capacity) = env_config.queue_capacity {
        config = config.with_queue_capacity(capacity);
    }
    if let Some(producers) = env_config.max_producers {
        config = config.with_max_producers(producers);
    }
    if let Some(timeout) = env_config.timeout {
        config = config.with_resolve_timeout(timeout);
    }
    if let Some(env_format) = env_config.format {
        format = env_format;
    }

    // Step 3: CLI arguments
    Ok(apply_cli_args(config, format, args))
}

/// Merge FileConfig defaults into a LookupConfig.
///
/// Values were validated when the file was loaded.
fn merge_file_config(
    mut config: LookupConfig,
    mut format: ReportFormat,
    file_config: FileConfig,
) -> (LookupConfig, ReportFormat) {
    let Some(defaults) = file_config.defaults else {
        return (config, format);
    };

    if let Some(capacity) = defaults.queue_capacity {
        config = config.with_queue_capacity(capacity);
    }
    if let Some(producers) = defaults.max_producers {
        config = config.with_max_producers(producers);
    }
    if let Some(capacity) = defaults.cache_capacity {
        config = config.with_cache_capacity(capacity);
    }
    if let Some(length) = defaults.max_name_length {
        config = config.with_max_name_length(length);
    }
    if let Some(jitter) = defaults.jitter.as_deref().and_then(parse_duration_string) {
        config = config.with_jitter(jitter);
    }
    if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_duration_string) {
        config = config.with_resolve_timeout(timeout);
    }
    if let Some(file_format) = defaults.format.as_deref().and_then(|f| f.parse().ok()) {
        format = file_format;
    }

    (config, format)
}

/// Apply CLI flags on top of the merged configuration.
fn apply_cli_args(
    mut config: LookupConfig,
    mut format: ReportFormat,
    args: &Args,
) -> (LookupConfig, ReportFormat) {
    if let Some(producers) = args.producers {
        config = config.with_max_producers(producers);
    }
    if let Some(capacity) = args.capacity {
        config = config.with_queue_capacity(capacity);
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_duration_string) {
        config = config.with_resolve_timeout(timeout);
    }
    if args.json {
        format = ReportFormat::Json;
    }
    (config, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_lookup_lib::DefaultsConfig;
    use std::time::Duration;

    fn create_test_args(paths: &[&str]) -> Args {
        Args {
            paths: paths.iter().map(PathBuf::from).collect(),
            hosts: None,
            timeout: None,
            producers: None,
            capacity: None,
            json: false,
            quiet: false,
            config: None,
            debug: false,
            verbose: false,
        }
    }

    #[test]
    fn test_inputs_and_output_split() {
        let args = create_test_args(&["names1.txt", "names2.txt", "results.txt"]);
        assert_eq!(
            args.inputs(),
            &[PathBuf::from("names1.txt"), PathBuf::from("names2.txt")]
        );
        assert_eq!(args.output(), Path::new("results.txt"));
    }

    #[test]
    fn test_validate_args_accepts_minimal() {
        let args = create_test_args(&["names1.txt", "results.txt"]);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_too_few_paths() {
        let args = create_test_args(&["results.txt"]);
        let err = validate_args(&args).unwrap_err();
        assert!(err.contains("Not enough arguments"));
    }

    #[test]
    fn test_validate_args_rejects_output_as_input() {
        let args = create_test_args(&["names1.txt", "names1.txt"]);
        assert!(validate_args(&args).unwrap_err().contains("also listed"));
    }

    #[test]
    fn test_validate_args_rejects_output_as_input_via_other_spelling() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let input = dir.path().join("names.txt");
        std::fs::write(&input, "host1").unwrap();
        let detour = dir.path().join("sub").join("..").join("names.txt");

        let mut args = create_test_args(&[]);
        args.paths = vec![input, detour];
        assert!(validate_args(&args).unwrap_err().contains("also listed"));
    }

    #[test]
    fn test_same_file_for_missing_output() {
        assert!(same_file(
            Path::new("not-created-yet.txt"),
            Path::new("./not-created-yet.txt")
        ));
        assert!(!same_file(
            Path::new("not-created-yet.txt"),
            Path::new("other-not-created.txt")
        ));
    }

    #[test]
    fn test_validate_args_ranges() {
        let mut args = create_test_args(&["in.txt", "out.txt"]);
        args.producers = Some(0);
        assert!(validate_args(&args).is_err());

        let mut args = create_test_args(&["in.txt", "out.txt"]);
        args.capacity = Some(20_000);
        assert!(validate_args(&args).is_err());

        let mut args = create_test_args(&["in.txt", "out.txt"]);
        args.timeout = Some("whenever".to_string());
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_file_config_merge() {
        let file_config = FileConfig {
            defaults: Some(DefaultsConfig {
                max_producers: Some(4),
                jitter: Some("2ms".to_string()),
                timeout: Some("3s".to_string()),
                format: Some("json".to_string()),
                ..Default::default()
            }),
        };

        let (config, format) =
            merge_file_config(LookupConfig::default(), ReportFormat::Text, file_config);

        assert_eq!(config.max_producers, 4);
        assert_eq!(config.jitter, Duration::from_millis(2));
        assert_eq!(config.resolve_timeout, Some(Duration::from_secs(3)));
        assert_eq!(format, ReportFormat::Json);
    }

    #[test]
    fn test_cli_args_override_config() {
        let file_config = FileConfig {
            defaults: Some(DefaultsConfig {
                max_producers: Some(4),
                queue_capacity: Some(50),
                ..Default::default()
            }),
        };
        let (config, format) =
            merge_file_config(LookupConfig::default(), ReportFormat::Text, file_config);

        let mut args = create_test_args(&["in.txt", "out.txt"]);
        args.producers = Some(2);
        args.json = true;

        let (config, format) = apply_cli_args(config, format, &args);
        assert_eq!(config.max_producers, 2); // CLI wins
        assert_eq!(config.queue_capacity, 50); // File value kept
        assert_eq!(format, ReportFormat::Json);
    }
}
