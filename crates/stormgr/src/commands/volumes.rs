//! Volume command handlers.
//!
//! Updates and resizes may start tasks, so they run with the progress
//! spinner attached like creates and deletes.

use stormgr_api::StorageClient;

use crate::cli::{GlobalOpts, OutputFormat, VolumesArgs, VolumesCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    client: &StorageClient,
    args: VolumesArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        VolumesCommand::List => util::print_value(&client.list_volumes().await?, format, global),

        VolumesCommand::Get { id } => {
            util::print_value(&client.get_volume(&id).await?, format, global);
        }

        VolumesCommand::Create(data) => {
            let volume = util::require_data(&data)?;
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.create_volume(volume).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }

        VolumesCommand::Update { id, patch } => {
            let patch = util::parse_patch(&patch)?;
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.update_volume(&id, patch).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }

        VolumesCommand::Resize { id, capacity } => {
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.resize_volume(&id, capacity).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }

        VolumesCommand::Delete { id } => {
            if !util::confirm("volumes delete", &format!("Delete volume {id}?"), global.yes)? {
                return Ok(());
            }
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.delete_volume(&id).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }
    }
    Ok(())
}
