//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "halide";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_CONTENT_BASE_URL: &str = "https://api.repo.md/v1/";
const DEFAULT_CONTENT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SITE_NAME: &str = "Halide";
const DEFAULT_SITE_DESCRIPTION: &str =
    "Photography projects and essays from working photojournalists.";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_PAGE_SIZE: usize = 200;
const DEFAULT_BACKFILL_YEAR: i32 = 2024;

/// Command-line arguments for the Halide binary.
#[derive(Debug, Parser)]
#[command(name = "halide", version, about = "Halide showcase server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "HALIDE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CliOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the content service base URL.
    #[arg(long = "content-base-url", value_name = "URL")]
    pub content_base_url: Option<String>,

    /// Override the content project identifier.
    #[arg(long = "content-project-id", value_name = "ID")]
    pub content_project_id: Option<String>,

    /// Pin the content working set to a specific release revision.
    #[arg(long = "content-revision", value_name = "REV")]
    pub content_revision: Option<String>,

    /// Serve the built-in demo content instead of the hosted service.
    #[arg(
        long = "content-demo",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub content_demo: Option<bool>,

    /// Override the public site URL used for canonical links and the sitemap.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub site_public_url: Option<String>,

    /// Override the listing page size.
    #[arg(long = "feed-page-size", value_name = "COUNT")]
    pub feed_page_size: Option<usize>,

    /// Override the year used to backfill the featured section.
    #[arg(long = "feed-backfill-year", value_name = "YEAR")]
    pub feed_backfill_year: Option<i32>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub site: SiteSettings,
    pub feed: FeedSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Where posts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentBackend {
    Hosted,
    Demo,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub backend: ContentBackend,
    pub base_url: Url,
    pub project_id: String,
    pub revision: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub name: String,
    pub description: String,
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub page_size: usize,
    pub backfill_year: i32,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("HALIDE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    site: RawSiteSettings,
    feed: RawFeedSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.content_base_url.as_ref() {
            self.content.base_url = Some(url.clone());
        }
        if let Some(id) = overrides.content_project_id.as_ref() {
            self.content.project_id = Some(id.clone());
        }
        if let Some(revision) = overrides.content_revision.as_ref() {
            self.content.revision = Some(revision.clone());
        }
        if let Some(demo) = overrides.content_demo {
            self.content.demo = Some(demo);
        }
        if let Some(url) = overrides.site_public_url.as_ref() {
            self.site.public_url = Some(url.clone());
        }
        if let Some(size) = overrides.feed_page_size {
            self.feed.page_size = Some(size);
        }
        if let Some(year) = overrides.feed_backfill_year {
            self.feed.backfill_year = Some(year);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            site,
            feed,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let content = build_content_settings(content)?;
        let site = build_site_settings(site)?;
        let feed = build_feed_settings(feed)?;

        Ok(Self {
            server,
            logging,
            content,
            site,
            feed,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let backend = if content.demo.unwrap_or(false) {
        ContentBackend::Demo
    } else {
        ContentBackend::Hosted
    };

    let base_url = content
        .base_url
        .unwrap_or_else(|| DEFAULT_CONTENT_BASE_URL.to_string());
    let base_url = Url::parse(&base_url)
        .map_err(|err| LoadError::invalid("content.base_url", err.to_string()))?;

    let project_id = content
        .project_id
        .map(|id| id.trim().to_string())
        .unwrap_or_default();
    if backend == ContentBackend::Hosted && project_id.is_empty() {
        return Err(LoadError::invalid(
            "content.project_id",
            "required unless content.demo is enabled",
        ));
    }

    let revision = content.revision.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let timeout_secs = content
        .request_timeout_seconds
        .unwrap_or(DEFAULT_CONTENT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "content.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ContentSettings {
        backend,
        base_url,
        project_id,
        revision,
        request_timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let name = site.name.unwrap_or_else(|| DEFAULT_SITE_NAME.to_string());
    if name.trim().is_empty() {
        return Err(LoadError::invalid("site.name", "must not be empty"));
    }

    let public_url = site
        .public_url
        .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
    Url::parse(&public_url)
        .map_err(|err| LoadError::invalid("site.public_url", err.to_string()))?;

    Ok(SiteSettings {
        name,
        description: site
            .description
            .unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string()),
        public_url,
    })
}

fn build_feed_settings(feed: RawFeedSettings) -> Result<FeedSettings, LoadError> {
    let page_size = feed.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(LoadError::invalid(
            "feed.page_size",
            "must be greater than zero",
        ));
    }

    Ok(FeedSettings {
        page_size,
        backfill_year: feed.backfill_year.unwrap_or(DEFAULT_BACKFILL_YEAR),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    base_url: Option<String>,
    project_id: Option<String>,
    revision: Option<String>,
    request_timeout_seconds: Option<u64>,
    demo: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    name: Option<String>,
    description: Option<String>,
    public_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawFeedSettings {
    page_size: Option<usize>,
    backfill_year: Option<i32>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_raw() -> RawSettings {
        let mut raw = RawSettings::default();
        raw.content.demo = Some(true);
        raw
    }

    #[test]
    fn cli_overrides_take_highest_precedence() {
        let mut raw = demo_raw();
        raw.server.port = Some(4000);
        raw.logging.level = Some("info".to_string());

        let overrides = CliOverrides {
            server_port: Some(4321),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        raw.apply_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert_eq!(settings.server.addr.port(), 4321);
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    }

    #[test]
    fn hosted_backend_requires_a_project_id() {
        let raw = RawSettings::default();
        assert!(matches!(
            Settings::from_raw(raw),
            Err(LoadError::Invalid {
                key: "content.project_id",
                ..
            })
        ));
    }

    #[test]
    fn demo_backend_needs_no_project_id() {
        let settings = Settings::from_raw(demo_raw()).expect("valid settings");
        assert_eq!(settings.content.backend, ContentBackend::Demo);
        assert!(settings.content.project_id.is_empty());
    }

    #[test]
    fn feed_defaults_apply() {
        let settings = Settings::from_raw(demo_raw()).expect("valid settings");
        assert_eq!(settings.feed.page_size, 200);
        assert_eq!(settings.feed.backfill_year, 2024);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut raw = demo_raw();
        raw.feed.page_size = Some(0);
        assert!(Settings::from_raw(raw).is_err());
    }

    #[test]
    fn cli_json_logging_enforces_format() {
        let mut raw = demo_raw();
        let overrides = CliOverrides {
            log_json: Some(true),
            ..Default::default()
        };

        raw.apply_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert!(matches!(settings.logging.format, LogFormat::Json));
    }

    #[test]
    fn parse_cli_overrides() {
        let args = CliArgs::parse_from([
            "halide",
            "--server-host",
            "0.0.0.0",
            "--content-project-id",
            "press-photo-site",
            "--feed-page-size",
            "50",
        ]);

        assert_eq!(args.overrides.server_host.as_deref(), Some("0.0.0.0"));
        assert_eq!(
            args.overrides.content_project_id.as_deref(),
            Some("press-photo-site")
        );
        assert_eq!(args.overrides.feed_page_size, Some(50));
    }
}
