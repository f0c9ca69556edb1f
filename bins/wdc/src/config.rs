use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use alert_store::StoreConfig;

use crate::error::WdcError;

// ═══════════════════════════════════════════════════════════════
//  CLI
// ═══════════════════════════════════════════════════════════════

#[derive(Parser)]
#[command(
    name = "wdc",
    about = "wdc listens for incoming alert messages and helps you inspect them.",
    long_about = "wdc listens for incoming alert messages and helps you inspect them.\n\
                  An alert can be inspected with the inspect command or by visiting localhost:8080/{id}"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start listening to incoming alerts
    Listen(ListenArgs),
    /// Inspect an alert using its ID
    Inspect(InspectArgs),
    /// Serve alert details over HTTP without listening for alerts
    Serve(ServeArgs),
}

#[derive(Args, Clone, Debug)]
pub struct CommonArgs {
    /// Path to the TOML config file
    #[arg(long, default_value = "wdc.toml", env = "WDC_CONFIG")]
    pub config: String,

    /// Directory holding the daily alert logs
    #[arg(long, env = "WDC_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Number of most recent days searched for an alert
    #[arg(long, env = "WDC_WINDOW_DAYS")]
    pub window_days: Option<NonZeroU32>,
}

#[derive(Args, Clone, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Network address of the alert server
    #[arg(short = 'r', long, env = "WDC_ADDR")]
    pub addr: Option<String>,

    /// Websocket connection endpoint of the alert server
    #[arg(short = 'e', long, env = "WDC_END_POINT")]
    pub end_point: Option<String>,

    /// Port of the alert info HTTP server
    #[arg(long, env = "WDC_HTTP_PORT")]
    pub port: Option<u16>,
}

#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Alert ID
    pub id: String,
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Port of the alert info HTTP server
    #[arg(long, env = "WDC_HTTP_PORT")]
    pub port: Option<u16>,
}

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub store: StoreConfig,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_end_point")]
    pub end_point: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            http_port: default_http_port(),
            addr: default_addr(),
            end_point: default_end_point(),
        }
    }
}

fn default_http_port() -> u16 {
    8080
}
fn default_addr() -> String {
    "localhost:40080".into()
}
fn default_end_point() -> String {
    "/ws/connect".into()
}

pub fn load_config(path: &str) -> Result<Config, WdcError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| WdcError::Config { context: "read", detail: format!("'{path}': {e}") })?;
    toml::from_str(&content)
        .map_err(|e| WdcError::Config { context: "parse", detail: format!("'{path}': {e}") })
}

// ═══════════════════════════════════════════════════════════════
//  Effective — merged config
// ═══════════════════════════════════════════════════════════════

/// Settings after the merge: config file < env < CLI.
#[derive(Debug)]
pub struct Effective {
    pub store: StoreConfig,
    pub http_port: u16,
    pub addr: String,
    pub end_point: String,
}

impl Effective {
    pub fn new(common: &CommonArgs) -> Result<Self, WdcError> {
        let cfg = match load_config(&common.config) {
            Ok(c) => c,
            Err(e) => {
                if std::path::Path::new(&common.config).exists() {
                    return Err(e);
                }
                Config::default()
            }
        };

        Ok(Self {
            store: StoreConfig {
                log_dir: common.log_dir.clone().unwrap_or(cfg.store.log_dir),
                window_days: common.window_days.unwrap_or(cfg.store.window_days),
            },
            http_port: cfg.http_port,
            addr: cfg.addr,
            end_point: cfg.end_point,
        })
    }

    pub fn for_listen(args: &ListenArgs) -> Result<Self, WdcError> {
        let mut eff = Self::new(&args.common)?;
        if let Some(addr) = &args.addr {
            eff.addr = addr.clone();
        }
        if let Some(end_point) = &args.end_point {
            eff.end_point = end_point.clone();
        }
        eff.http_port = args.port.unwrap_or(eff.http_port);
        Ok(eff)
    }

    pub fn for_serve(args: &ServeArgs) -> Result<Self, WdcError> {
        let mut eff = Self::new(&args.common)?;
        eff.http_port = args.port.unwrap_or(eff.http_port);
        Ok(eff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(config: &str) -> CommonArgs {
        CommonArgs { config: config.into(), log_dir: None, window_days: None }
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.toml");
        let eff = Effective::new(&common(path.to_str().unwrap())).unwrap();
        assert_eq!(eff.http_port, 8080);
        assert_eq!(eff.addr, "localhost:40080");
        assert_eq!(eff.end_point, "/ws/connect");
        assert_eq!(eff.store.window_days.get(), 30);
    }

    #[test]
    fn file_values_are_overridden_by_flags() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("wdc.toml");
        std::fs::write(
            &path,
            "log_dir = \"/srv/wdc\"\nwindow_days = 60\nhttp_port = 9000\naddr = \"alerts:1\"\n",
        )
        .unwrap();

        let args = ListenArgs {
            common: CommonArgs {
                config: path.to_str().unwrap().into(),
                log_dir: None,
                window_days: NonZeroU32::new(7),
            },
            addr: None,
            end_point: Some("/ws".into()),
            port: Some(9100),
        };
        let eff = Effective::for_listen(&args).unwrap();
        assert_eq!(eff.store.log_dir, PathBuf::from("/srv/wdc"));
        assert_eq!(eff.store.window_days.get(), 7);
        assert_eq!(eff.addr, "alerts:1");
        assert_eq!(eff.end_point, "/ws");
        assert_eq!(eff.http_port, 9100);
    }

    #[test]
    fn broken_config_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("wdc.toml");
        std::fs::write(&path, "window_days = 0\n").unwrap();
        let err = Effective::new(&common(path.to_str().unwrap())).unwrap_err();
        assert!(matches!(err, WdcError::Config { context: "parse", .. }));
    }

    #[test]
    fn cli_parses_listen_shorthands() {
        let cli = Cli::try_parse_from(["wdc", "listen", "-r", "host:1", "-e", "/feed"]).unwrap();
        match cli.command {
            Commands::Listen(args) => {
                assert_eq!(args.addr.as_deref(), Some("host:1"));
                assert_eq!(args.end_point.as_deref(), Some("/feed"));
            }
            _ => panic!("expected listen"),
        }
    }

    #[test]
    fn inspect_requires_an_id() {
        assert!(Cli::try_parse_from(["wdc", "inspect"]).is_err());
        assert!(Cli::try_parse_from(["wdc", "inspect", "A1", "--window-days", "0"]).is_err());
    }
}
