//! Clap derive structures for the `nbnak` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use clap_complete::Shell;

use nbnak_config::Overrides;
use nbnak_core::{ContextRequest, ErrorPolicy};

/// nbnak -- Netbox device context for config templating
#[derive(Debug, Parser)]
#[command(
    name = "nbnak",
    version,
    about = "Render Netbox device context (hostname, VLANs, ports) as YAML",
    long_about = "Queries a Netbox instance and renders the configuration context of a\n\
        device as a single YAML document for a templating pipeline.\n\n\
        Sections are opt-in: pass --device, --vlans and/or --ports."
)]
pub struct Cli {
    /// Config file [default: ~/.nbnak.cfg]
    #[arg(long, env = "NBNAK_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Include the VLAN catalog
    #[arg(long)]
    pub vlans: bool,

    /// Include the users section (not implemented yet)
    #[arg(long)]
    pub users: bool,

    /// Include information about a specific device
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Include the port configuration of the device
    #[arg(long, requires = "device")]
    pub ports: bool,

    /// Skip interfaces that cannot be normalized instead of failing
    #[arg(long, requires = "ports")]
    pub skip_invalid: bool,

    #[command(flatten)]
    pub connection: ConnectionOpts,

    /// Output format
    #[arg(long, short = 'o', env = "NBNAK_OUTPUT", default_value = "yaml")]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,
}

// ── Connection overrides ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConnectionOpts {
    /// Netbox API URL (overrides config file)
    #[arg(long, env = "NBNAK_API_URL")]
    pub api_url: Option<String>,

    /// Netbox API token (overrides config file)
    #[arg(long, env = "NBNAK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Domain appended when the bare device name does not resolve
    #[arg(long, env = "NBNAK_SEARCH_DOMAIN")]
    pub search_domain: Option<String>,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "NBNAK_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "NBNAK_INSECURE")]
    pub insecure: bool,
}

impl ConnectionOpts {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            search_domain: self.search_domain.clone(),
            timeout: self.timeout,
            insecure: self.insecure,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// YAML document with an explicit `---` start marker
    Yaml,
    /// Pretty-printed JSON
    Json,
}

impl Cli {
    pub fn context_request(&self) -> ContextRequest {
        ContextRequest {
            device: self.device.clone(),
            vlans: self.vlans,
            ports: self.ports,
            users: self.users,
            on_port_error: if self.skip_invalid {
                ErrorPolicy::Skip
            } else {
                ErrorPolicy::Abort
            },
        }
    }
}
