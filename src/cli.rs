// ABOUTME: Command-line arguments for the IN450 viewer using clap derive
// ABOUTME: Merges defaults, the config file, environment variables and flags into a startup profile

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AppConfig, ConnectionProfile, ProfileOverrides};
use crate::models::RowLimit;

/// IN450 Database Viewer - browse the in450a/b/c tables
#[derive(Parser, Debug)]
#[command(name = "in450-viewer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Front-end to start (default: console)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Connection and logging options available to all commands.
/// The password is only ever read from `DB_PASS`.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database server host
    #[arg(long, env = "DB_HOST", global = true)]
    pub host: Option<String>,

    /// Database server port
    #[arg(long, env = "DB_PORT", global = true)]
    pub port: Option<u16>,

    /// Database name
    #[arg(long = "dbname", env = "DB_NAME", global = true)]
    pub database: Option<String>,

    /// Database user
    #[arg(long, env = "DB_USER", global = true)]
    pub user: Option<String>,

    /// Initial row limit for the row views
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Interactive console viewer
    Console,

    /// Print the in450a row count and the first few names from in450b
    Smoke(SmokeArgs),

    /// Open the desktop window
    #[cfg(feature = "desktop")]
    Desktop,
}

/// Arguments for the smoke command
#[derive(Args, Debug, Clone)]
pub struct SmokeArgs {
    /// How many names to print
    #[arg(short, long, default_value_t = 5)]
    pub names: u32,
}

impl GlobalArgs {
    fn overrides(&self) -> ProfileOverrides {
        ProfileOverrides {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            username: self.user.clone(),
            password: std::env::var("DB_PASS").ok(),
        }
    }

    /// Load the config file and apply environment and flag overrides
    pub fn startup(&self) -> Startup {
        let config = AppConfig::load_or_default(self.config.as_deref());
        Startup::new(config, self.config.clone(), &self.overrides(), self.limit)
    }
}

/// Everything a front-end needs before the login form is shown
#[derive(Debug, Clone)]
pub struct Startup {
    pub config: AppConfig,
    config_path: Option<PathBuf>,
    pub profile: ConnectionProfile,
    pub row_limit: RowLimit,
}

impl Startup {
    pub fn new(
        config: AppConfig,
        config_path: Option<PathBuf>,
        overrides: &ProfileOverrides,
        limit: Option<u32>,
    ) -> Self {
        let mut profile = config.profile.clone();
        profile.apply(overrides);
        let profile = profile.with_login_user_fallback();

        let row_limit =
            RowLimit::clamped(u64::from(limit.unwrap_or(config.preferences.row_limit)));

        Self {
            config,
            config_path,
            profile,
            row_limit,
        }
    }

    /// Persist a profile that logged in successfully, and the last row limit
    pub fn remember(&mut self, profile: &ConnectionProfile, row_limit: RowLimit) {
        self.config.remember_profile(profile);
        self.config.preferences.row_limit = row_limit.get();

        let saved = match &self.config_path {
            Some(path) => self.config.save_to(path),
            None => self.config.save(),
        };
        if let Err(e) = saved {
            log::warn!("Could not save configuration: {}", e);
        }
    }
}
