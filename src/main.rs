// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

use rosetta::app_config::{Config, LogLevel};
use rosetta::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Parser, Debug, Clone)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Address to bind (overrides config and ROSETTA_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides config and ROSETTA_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file (overrides config and ROSETTA_DB_PATH)
    #[arg(long)]
    db_path: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),

    /// Check the Google Cloud credentials and endpoints
    CheckCloud(ConfigArgs),

    /// Generate shell completions for rosetta
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Rosetta - personal translation assistant backend
#[derive(Parser, Debug)]
#[command(name = "rosetta")]
#[command(version)]
#[command(about = "Personal translation assistant backend")]
#[command(long_about = "Rosetta serves an HTTP API for translation, OCR, speech-to-text and
text-to-speech backed by Google Cloud, plus a personal library of saved translations.

EXAMPLES:
    rosetta serve                              # Serve using conf.json
    rosetta serve --port 9090 --db-path ./r.db # Override port and database
    rosetta check-cloud                        # Verify Google Cloud credentials
    rosetta completions bash > rosetta.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one with a generated token secret is created. Values from a .env
    file and the environment override the file; command line flags override both.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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

    // @returns: Color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
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
            let (color, emoji) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger filters at Trace; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    if let Ok(path) = dotenv::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "rosetta", &mut std::io::stdout());
            Ok(())
        }
        Commands::Serve(args) => {
            let mut config = load_config(&args.config)?;
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            if let Some(db_path) = args.db_path {
                config.database.path = Some(db_path);
            }
            config.validate().context("Configuration validation failed")?;

            let controller = Controller::with_config(config)?;
            controller.run_server().await
        }
        Commands::CheckCloud(args) => {
            let config = load_config(&args)?;
            config.validate().context("Configuration validation failed")?;

            let controller = Controller::with_config(config)?;
            controller.check_cloud().await
        }
    }
}

/// Load the config file, then apply environment and command line overrides
fn load_config(args: &ConfigArgs) -> Result<Config> {
    let mut config = Config::load_or_create(&args.config_path)?;
    config
        .apply_env_overrides()
        .context("Invalid environment override")?;

    if let Some(level) = &args.log_level {
        config.log_level = level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}
