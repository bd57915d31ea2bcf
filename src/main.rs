// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use db2rst::app_config::{self, Config};
use db2rst::Controller;

/// CLI Wrapper for the known Sphinx extensions to implement ValueEnum
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliExtension {
    Autodoc,
    Doctest,
    Intersphinx,
    Todo,
    Coverage,
    Imgmath,
    Mathjax,
    Ifconfig,
    Viewcode,
    Githubpages,
}

impl CliExtension {
    fn config_name(self) -> &'static str {
        match self {
            Self::Autodoc => "autodoc",
            Self::Doctest => "doctest",
            Self::Intersphinx => "intersphinx",
            Self::Todo => "todo",
            Self::Coverage => "coverage",
            Self::Imgmath => "imgmath",
            Self::Mathjax => "mathjax",
            Self::Ifconfig => "ifconfig",
            Self::Viewcode => "viewcode",
            Self::Githubpages => "githubpages",
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for db2rst
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Project name, also the name of the master document
    #[arg(value_name = "PROJECT")]
    project: Option<String>,

    /// Main DocBook document
    #[arg(short = 'd', long)]
    docbook_source: Option<PathBuf>,

    /// New directory for the reStructuredText project
    #[arg(long)]
    destination: Option<String>,

    /// Do not separate source and build directories
    #[arg(long, help_heading = "Structure options")]
    no_sep: bool,

    /// Replacement for the dot in _templates etc.
    #[arg(long, help_heading = "Structure options")]
    dot: Option<String>,

    /// Copyright holder
    #[arg(short, long, help_heading = "Project basic options")]
    author: Option<String>,

    /// Version of the project
    #[arg(short = 'v', long, help_heading = "Project basic options")]
    doc_version: Option<String>,

    /// Release of the project
    #[arg(short, long, help_heading = "Project basic options")]
    release: Option<String>,

    /// Document language
    #[arg(short = 'l', long, help_heading = "Project basic options")]
    language: Option<String>,

    /// Source file suffix
    #[arg(long, help_heading = "Project basic options")]
    suffix: Option<String>,

    /// Master document name
    #[arg(long, help_heading = "Project basic options")]
    master: Option<String>,

    /// Use epub
    #[arg(long, help_heading = "Project basic options")]
    epub: bool,

    /// Enable a Sphinx extension (repeatable)
    #[arg(long = "ext", value_enum, help_heading = "Extension options")]
    extensions: Vec<CliExtension>,

    /// Do not create a makefile
    #[arg(long, help_heading = "Makefile and Batchfile creation")]
    no_makefile: bool,

    /// Create a batchfile
    #[arg(long, help_heading = "Makefile and Batchfile creation")]
    batchfile: bool,

    /// Do not use make-mode for Makefile/make.bat
    #[arg(short = 'M', long, conflicts_with = "use_make_mode", help_heading = "Makefile and Batchfile creation")]
    no_use_make_mode: bool,

    /// Use make-mode for Makefile/make.bat
    #[arg(short = 'm', long, help_heading = "Makefile and Batchfile creation")]
    use_make_mode: bool,

    /// Convert without running the project scaffold tool
    #[arg(long)]
    skip_scaffold: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "db2rst.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// db2rst - DocBook to Sphinx reStructuredText converter
#[derive(Parser, Debug)]
#[command(name = "db2rst")]
#[command(version)]
#[command(about = "Convert a DocBook document to a Sphinx reStructuredText project")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "db2rst generates a Sphinx project skeleton and converts a DocBook book, with every
sub-document it declares, into reStructuredText.

EXAMPLES:
    db2rst manual -d manual.xml                  # Scaffold ./doc and convert manual.xml
    db2rst manual -d manual.xml --skip-scaffold  # Convert into ./doc/source only
    db2rst manual --no-sep --ext mathjax         # Scaffold only, with the mathjax extension
    db2rst completions bash > db2rst.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in db2rst.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. Command line options override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Label and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (label, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger with every level enabled, the max level filters
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "db2rst", &mut std::io::stdout());
            Ok(())
        }
        None => run_convert(cli.convert),
    }
}

fn run_convert(options: ConvertArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let config = load_config(&options)?;

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    if let Some(summary) = controller.run(options.docbook_source.as_deref())? {
        for document in &summary.documents {
            debug!("{:?} -> {:?}", document.source, document.destination);
        }
        info!("Success: {} document(s) converted", summary.documents.len());
    }

    Ok(())
}

/// Load the configuration file, creating it with defaults when missing
fn load_config(options: &ConvertArgs) -> Result<Config> {
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    apply_overrides(&mut config, options);
    Ok(config)
}

// Override config with CLI options if provided
fn apply_overrides(config: &mut Config, options: &ConvertArgs) {
    let scaffold = &mut config.scaffold;

    if let Some(project) = &options.project {
        scaffold.project = project.clone();
    }
    if let Some(author) = &options.author {
        scaffold.author = author.clone();
    }
    if let Some(version) = &options.doc_version {
        scaffold.version = version.clone();
    }
    if let Some(release) = &options.release {
        scaffold.release = release.clone();
    }
    if let Some(language) = &options.language {
        scaffold.language = language.clone();
    }
    if let Some(suffix) = &options.suffix {
        scaffold.suffix = suffix.clone();
    }
    if let Some(master) = &options.master {
        scaffold.master = Some(master.clone());
    }
    if let Some(dot) = &options.dot {
        scaffold.dot = dot.clone();
    }
    if options.no_sep {
        scaffold.separate_source = false;
    }
    if options.epub {
        scaffold.epub = true;
    }
    for extension in &options.extensions {
        let name = extension.config_name().to_string();
        if !scaffold.extensions.contains(&name) {
            scaffold.extensions.push(name);
        }
    }
    if options.no_makefile {
        scaffold.makefile = false;
    }
    if options.batchfile {
        scaffold.batchfile = true;
    }
    if options.use_make_mode {
        scaffold.use_make_mode = Some(true);
    } else if options.no_use_make_mode {
        scaffold.use_make_mode = Some(false);
    }
    if options.skip_scaffold {
        scaffold.enabled = false;
    }

    if let Some(destination) = &options.destination {
        config.conversion.destination = destination.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}
