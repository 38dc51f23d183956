//! CLI argument definitions.
//!
//! Every connection setting can come from a flag or its `PROXMOX_*`
//! environment variable; flags win.

use clap::Parser;

/// MCP server for Proxmox VE, speaking JSON-RPC over stdio.
#[derive(Parser, Debug)]
#[command(name = "proxmox-mcp-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Management host name or address
    #[arg(long, env = "PROXMOX_HOST")]
    pub host: Option<String>,

    /// Management API port
    #[arg(long, env = "PROXMOX_PORT", default_value_t = 8006)]
    pub port: u16,

    /// User identity including realm, e.g. root@pam
    #[arg(long, env = "PROXMOX_USER")]
    pub user: Option<String>,

    /// API token name
    #[arg(long, env = "PROXMOX_TOKEN_NAME")]
    pub token_name: Option<String>,

    /// API token secret
    #[arg(long, env = "PROXMOX_TOKEN_VALUE", hide_env_values = true)]
    pub token_value: Option<String>,

    /// Password, used when no complete token pair is set
    #[arg(long, env = "PROXMOX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Verify the server certificate; only "true" enables
    #[arg(long, env = "PROXMOX_VERIFY_SSL")]
    pub verify_ssl: Option<String>,

    /// URL scheme; http is accepted for loopback hosts only
    #[arg(long, env = "PROXMOX_SCHEME")]
    pub scheme: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "PROXMOX_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Re-authenticate and retry once when a ticket is rejected
    #[arg(long, env = "PROXMOX_RETRY_ON_AUTH_FAILURE")]
    pub retry_on_auth_failure: Option<String>,

    /// Cluster listing behavior when a node fails: fail-fast or partial
    #[arg(long, env = "PROXMOX_FANOUT_POLICY")]
    pub fanout_policy: Option<String>,

    /// Maximum per-node requests in flight during a cluster listing
    #[arg(long, env = "PROXMOX_FANOUT_WIDTH")]
    pub fanout_width: Option<usize>,
}
