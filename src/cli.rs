//! Command-line arguments for creaturebox-install

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for creaturebox-install
///
/// Every option falls back to its environment variable, then the config
/// file, then the built-in default.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "creaturebox-install")]
#[command(version, about = "Install CreatureBox and its dashboard services on a Raspberry Pi")]
pub struct Cli {
    /// Installation root (default: ~/CreatureBox)
    #[arg(long, env = "CREATUREBOX_TARGET_DIR", value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// Isolated Python environment (default: ~/CreatureBox-env)
    #[arg(long, env = "CREATUREBOX_VENV", value_name = "DIR", conflicts_with = "no_venv")]
    pub venv: Option<PathBuf>,

    /// Use the system interpreter instead of an isolated environment
    #[arg(long)]
    pub no_venv: bool,

    /// Local port the dashboard listens on (default: 5000)
    #[arg(long, env = "CREATUREBOX_PORT")]
    pub port: Option<u16>,

    /// CreatureBox checkout to install from (default: current directory)
    #[arg(long, env = "CREATUREBOX_SOURCE", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Name published on the local network as <alias>.local (default: creaturebox)
    #[arg(long, env = "CREATUREBOX_HOST_ALIAS", value_name = "NAME")]
    pub host_alias: Option<String>,

    /// Account the dashboard service runs as (default: the invoking user)
    #[arg(long, env = "CREATUREBOX_USER", value_name = "USER")]
    pub user: Option<String>,

    /// TOML file with installer settings
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Install on hardware that is not a Raspberry Pi
    #[arg(long)]
    pub allow_unsupported_host: bool,

    /// Deploy files but only print the package and service changes
    #[arg(long)]
    pub dry_run: bool,

    /// Prompt for the installation paths before starting
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
