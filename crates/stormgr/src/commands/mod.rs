//! Command dispatch: bridges CLI args -> client calls -> output formatting.

pub mod config_cmd;
pub mod generic;
pub mod shares;
pub mod snmp;
pub mod users;
pub mod util;
pub mod volumes;

use stormgr_api::StorageClient;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Dispatch a cluster-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &StorageClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match cmd {
        Command::Get(args) => generic::get(client, args, global, format).await,
        Command::Call(args) => generic::call(client, args, global, format).await,
        Command::Update(args) => generic::update(client, args, global, format).await,
        Command::Task(args) => generic::task(client, args, global, format).await,
        Command::Shares(args) => shares::handle(client, args, global, format).await,
        Command::Users(args) => users::handle(client, args, global, format).await,
        Command::Volumes(args) => volumes::handle(client, args, global, format).await,
        Command::Snmp(args) => snmp::handle(client, args, global, format).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled without a cluster session".into(),
        }),
    }
}
