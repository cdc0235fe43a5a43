//! Clap derive structures for the `stormgr` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// stormgr -- command-line client for storage-management clusters
#[derive(Debug, Parser)]
#[command(
    name = "stormgr",
    version,
    about = "Manage storage clusters from the command line",
    long_about = "A CLI for administering storage clusters over their management REST API.\n\n\
        Mutating calls that start server-side tasks are followed to completion,\n\
        and property updates are read-modify-write so omitted fields are kept.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Cluster profile to use
    #[arg(long, short = 'p', env = "STORMGR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Cluster address (overrides profile)
    #[arg(long, short = 'c', env = "STORMGR_CLUSTER", global = true)]
    pub cluster: Option<String>,

    /// Management port (overrides profile)
    #[arg(long, env = "STORMGR_PORT", global = true)]
    pub port: Option<u16>,

    /// Login user (overrides profile)
    #[arg(long, short = 'u', env = "STORMGR_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "STORMGR_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "STORMGR_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "STORMGR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Seconds between task status checks
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Seconds to wait for a task before giving up
    #[arg(long, global = true)]
    pub task_timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// GET any resource path
    Get(GetArgs),

    /// Issue an arbitrary call (any method, body, and query)
    Call(CallArgs),

    /// Read-modify-write update of any resource path
    Update(UpdateArgs),

    /// Show the status of a server-side task
    Task(TaskArgs),

    /// Manage file shares
    #[command(alias = "sh")]
    Shares(SharesArgs),

    /// Manage local users
    Users(UsersArgs),

    /// Manage volumes
    #[command(alias = "vol")]
    Volumes(VolumesArgs),

    /// View and change SNMP settings
    Snmp(SnmpArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Query parameters given as repeated `key=value` pairs.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Query parameter `key=value`; repeat a key to send it several times
    #[arg(long = "query", short = 'Q', value_name = "KEY=VALUE")]
    pub query: Vec<String>,
}

/// A JSON document given inline or as a file.
#[derive(Debug, Args)]
pub struct DataArgs {
    /// Inline JSON body
    #[arg(long, short = 'd', conflicts_with = "from_file")]
    pub data: Option<String>,

    /// Read the JSON body from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

/// Field changes for a safe update.
#[derive(Debug, Args)]
pub struct PatchArgs {
    /// Field assignment `key=value` (value parsed as JSON, else taken as a string)
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    #[command(flatten)]
    pub data: DataArgs,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GENERIC CALLS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Resource path relative to the REST root, or an absolute URL
    pub path: String,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Skip formatting: keep internal fields and raw timestamps
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// HTTP method (GET, POST, PUT, DELETE, PATCH)
    pub method: String,

    /// Resource path relative to the REST root, or an absolute URL
    pub path: String,

    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Follow the task the call starts until it finishes
    #[arg(long, short = 'w')]
    pub wait: bool,

    /// Collection to fetch the task's resulting entity from
    #[arg(long, requires = "wait")]
    pub entity_collection: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Resource path relative to the REST root
    pub path: String,

    #[command(flatten)]
    pub patch: PatchArgs,

    /// Follow the task the update starts until it finishes
    #[arg(long, short = 'w')]
    pub wait: bool,
}

#[derive(Debug, Args)]
pub struct TaskArgs {
    /// Task UUID
    pub uuid: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SHARES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SharesArgs {
    #[command(subcommand)]
    pub command: SharesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SharesCommand {
    /// List shares
    #[command(alias = "ls")]
    List(QueryArgs),

    /// Show one share
    Get { id: String },

    /// Create a share from a JSON document
    Create(DataArgs),

    /// Change share properties (other fields are kept)
    Update {
        id: String,
        #[command(flatten)]
        patch: PatchArgs,
    },

    /// Delete a share
    #[command(alias = "rm")]
    Delete { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List local users
    #[command(alias = "ls")]
    List,

    /// Show one user
    Get { id: String },

    /// Create a user from a JSON document
    Create(DataArgs),

    /// Change user properties (other fields are kept)
    Update {
        id: String,
        #[command(flatten)]
        patch: PatchArgs,
    },

    /// Delete a user
    #[command(alias = "rm")]
    Delete { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VOLUMES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VolumesArgs {
    #[command(subcommand)]
    pub command: VolumesCommand,
}

#[derive(Debug, Subcommand)]
pub enum VolumesCommand {
    /// List volumes
    #[command(alias = "ls")]
    List,

    /// Show one volume
    Get { id: String },

    /// Create a volume from a JSON document
    Create(DataArgs),

    /// Change volume properties (other fields are kept)
    Update {
        id: String,
        #[command(flatten)]
        patch: PatchArgs,
    },

    /// Set a new capacity in bytes
    Resize {
        id: String,
        /// New capacity (bytes)
        capacity: u64,
    },

    /// Delete a volume
    #[command(alias = "rm")]
    Delete { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SNMP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SnmpArgs {
    #[command(subcommand)]
    pub command: SnmpCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnmpCommand {
    /// Show SNMP agent settings
    Show,

    /// Change SNMP agent settings (other fields are kept)
    Update(PatchArgs),

    /// List trap receivers
    Receivers,

    /// Add a trap receiver from a JSON document
    AddReceiver(DataArgs),

    /// Remove a trap receiver
    RemoveReceiver { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a profile value
    Set {
        /// Profile key (cluster, port, api_prefix, username, password_env, ca_cert, verify_ssl, timeout)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
