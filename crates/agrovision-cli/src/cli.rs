//! Argument parsing and command dispatch.

use agrovision_api_models::BatchId;
use agrovision_config::loader::{parse_http_url, parse_timeout_secs};
use agrovision_config::{
    ClientConfig, ConfigError, LogFormatPreference, WeatherUnits, load_from_env,
};
use agrovision_telemetry::{LogFormat, LoggingConfig, init_logging, operation_span};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::time::Duration;
use tracing::Instrument;
use url::Url;

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::account::handle_login;
use crate::commands::assistant::handle_ask;
use crate::commands::batches::{
    handle_batch_add, handle_batch_list, handle_batch_show, handle_track,
};
use crate::commands::weather::handle_weather;

/// Parses CLI arguments, executes the requested command and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let config = match cli.settings.resolve(load_from_env()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let logging = LoggingConfig {
        level: &config.logging.level,
        format: log_format(config.logging.format),
        build_sha: option_env!("AGROVISION_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err}");
    }

    let span = operation_span(command_label(&cli.command));
    match dispatch(cli, config).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, config: ClientConfig) -> CliResult<()> {
    let ctx = AppContext::new(config, cli.output)?;
    match cli.command {
        Command::Login(args) => handle_login(&ctx, args).await,
        Command::Batches(batches) => match batches {
            BatchesCommand::List => handle_batch_list(&ctx).await,
            BatchesCommand::Show(args) => handle_batch_show(&ctx, args).await,
            BatchesCommand::Add(args) => handle_batch_add(&ctx, args).await,
        },
        Command::Track(args) => handle_track(&ctx, args).await,
        Command::Weather(args) => handle_weather(&ctx, args).await,
        Command::Ask(args) => handle_ask(&ctx, args).await,
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Batches(BatchesCommand::List) => "batches.list",
        Command::Batches(BatchesCommand::Show(_)) => "batches.show",
        Command::Batches(BatchesCommand::Add(_)) => "batches.add",
        Command::Track(_) => "track",
        Command::Weather(_) => "weather",
        Command::Ask(_) => "ask",
    }
}

const fn log_format(preference: LogFormatPreference) -> LogFormat {
    match preference {
        LogFormatPreference::Json => LogFormat::Json,
        LogFormatPreference::Pretty => LogFormat::Pretty,
        LogFormatPreference::Infer => LogFormat::infer(),
    }
}

#[derive(Parser)]
#[command(name = "agrovision", about = "Terminal client for the AgroVision crop tracker")]
pub(crate) struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

/// Overrides applied on top of the `AGROVISION_*` environment.
#[derive(Args, Default)]
pub(crate) struct SettingsArgs {
    #[arg(long, global = true, value_parser = parse_api_url, help = "Backend base URL")]
    api_url: Option<Url>,
    #[arg(
        long,
        global = true,
        value_parser = parse_timeout_secs,
        help = "Request timeout in seconds"
    )]
    timeout: Option<u64>,
    #[arg(long, global = true, value_parser = parse_weather_url)]
    weather_url: Option<Url>,
    #[arg(long, global = true)]
    weather_api_key: Option<String>,
    #[arg(long, global = true, value_parser = parse_units)]
    weather_units: Option<WeatherUnits>,
    #[arg(long, global = true)]
    log_level: Option<String>,
}

impl SettingsArgs {
    fn resolve(&self, loaded: Result<ClientConfig, ConfigError>) -> CliResult<ClientConfig> {
        let mut config = loaded.map_err(|err| CliError::validation(err.to_string()))?;
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.http_timeout = Duration::from_secs(timeout);
        }
        if let Some(endpoint) = &self.weather_url {
            config.weather.endpoint = endpoint.clone();
        }
        if let Some(api_key) = self.weather_api_key.as_deref().map(str::trim) {
            if !api_key.is_empty() {
                config.weather.api_key = Some(api_key.to_string());
            }
        }
        if let Some(units) = self.weather_units {
            config.weather.units = units;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        Ok(config)
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    parse_http_url("--api-url", raw)
}

fn parse_weather_url(raw: &str) -> Result<Url, ConfigError> {
    parse_http_url("--weather-url", raw)
}

fn parse_units(raw: &str) -> Result<WeatherUnits, ConfigError> {
    raw.parse()
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sign in, registering first when the email has no account.
    Login(LoginArgs),
    /// Browse and create batches.
    #[command(subcommand)]
    Batches(BatchesCommand),
    /// Load a batch and record tracking entries for this session.
    Track(TrackArgs),
    /// Show current weather at a position.
    Weather(WeatherArgs),
    /// Ask the growing assistant a question.
    Ask(AskArgs),
}

#[derive(Subcommand)]
pub(crate) enum BatchesCommand {
    /// List every batch.
    List,
    /// Show one batch.
    Show(BatchShowArgs),
    /// Create a batch.
    Add(BatchAddArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "AGROVISION_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
    #[arg(long)]
    pub(crate) first_name: Option<String>,
    #[arg(long)]
    pub(crate) last_name: Option<String>,
    #[arg(long)]
    pub(crate) phone: Option<String>,
}

#[derive(Args)]
pub(crate) struct BatchShowArgs {
    #[arg(help = "Batch identifier")]
    pub(crate) id: BatchId,
}

#[derive(Args)]
pub(crate) struct BatchAddArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long = "type")]
    pub(crate) kind: String,
    #[arg(long, help = "Sowing date as YYYY-MM-DD")]
    pub(crate) sowing_date: String,
    #[arg(long)]
    pub(crate) substrate: String,
}

#[derive(Args)]
pub(crate) struct TrackArgs {
    #[arg(help = "Batch identifier")]
    pub(crate) id: BatchId,
    #[arg(long = "photo", help = "Local image reference; repeatable")]
    pub(crate) photos: Vec<String>,
    #[arg(long, help = "Record an irrigation event now")]
    pub(crate) irrigation: bool,
    #[arg(long = "note", help = "Growth note text; repeatable")]
    pub(crate) notes: Vec<String>,
}

#[derive(Args)]
pub(crate) struct WeatherArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lon: f64,
}

#[derive(Args)]
pub(crate) struct AskArgs {
    #[arg(required = true, trailing_var_arg = true, help = "Question text")]
    pub(crate) question: Vec<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrovision_config::load_from_lookup;

    #[test]
    fn parses_track_with_repeated_entries() {
        let cli = Cli::try_parse_from([
            "agrovision",
            "track",
            "7",
            "--photo",
            "file:///a.jpg",
            "--photo",
            "file:///b.jpg",
            "--irrigation",
            "--note",
            "first leaves",
        ])
        .expect("valid arguments");
        let Command::Track(args) = cli.command else {
            panic!("expected track command");
        };
        assert_eq!(args.id, BatchId(7));
        assert_eq!(args.photos.len(), 2);
        assert!(args.irrigation);
        assert_eq!(args.notes, vec!["first leaves".to_string()]);
    }

    #[test]
    fn parses_negative_coordinates_and_json_output() {
        let cli = Cli::try_parse_from([
            "agrovision",
            "weather",
            "--lat",
            "-33.9",
            "--lon",
            "18.4",
            "--output",
            "json",
        ])
        .expect("valid arguments");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(command_label(&cli.command), "weather");
    }

    #[test]
    fn rejects_non_web_api_url() {
        let parsed = Cli::try_parse_from([
            "agrovision",
            "--api-url",
            "ftp://example.com",
            "batches",
            "list",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn flags_override_environment() {
        let loaded = load_from_lookup(|key| match key {
            "AGROVISION_API_URL" => Some("http://env.example.com".to_string()),
            "AGROVISION_WEATHER_API_KEY" => Some("from-env".to_string()),
            _ => None,
        });
        let settings = SettingsArgs {
            api_url: Some(Url::parse("https://flag.example.com").expect("url")),
            timeout: Some(3),
            weather_api_key: Some("  ".to_string()),
            ..SettingsArgs::default()
        };
        let config = settings.resolve(loaded).expect("config");
        assert_eq!(config.api_url.host_str(), Some("flag.example.com"));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.weather.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn invalid_environment_is_a_validation_error() {
        let loaded = load_from_lookup(|key| {
            (key == "AGROVISION_HTTP_TIMEOUT_SECS").then(|| "0".to_string())
        });
        let err = SettingsArgs::default()
            .resolve(loaded)
            .expect_err("invalid timeout");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn infer_preference_maps_to_build_default() {
        assert_eq!(log_format(LogFormatPreference::Infer), LogFormat::infer());
        assert_eq!(log_format(LogFormatPreference::Json), LogFormat::Json);
    }
}
