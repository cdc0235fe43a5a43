//! Share command handlers.

use stormgr_api::StorageClient;

use crate::cli::{GlobalOpts, OutputFormat, SharesArgs, SharesCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    client: &StorageClient,
    args: SharesArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        SharesCommand::List(query) => {
            let query = util::parse_query(&query.query)?;
            let shares = client.list_shares(query).await?;
            util::print_value(&shares, format, global);
        }

        SharesCommand::Get { id } => {
            util::print_value(&client.get_share(&id).await?, format, global);
        }

        SharesCommand::Create(data) => {
            let share = util::require_data(&data)?;
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.create_share(share).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }

        SharesCommand::Update { id, patch } => {
            let patch = util::parse_patch(&patch)?;
            util::print_raw(client.update_share(&id, patch).await?, format, global);
        }

        SharesCommand::Delete { id } => {
            if !util::confirm("shares delete", &format!("Delete share {id}?"), global.yes)? {
                return Ok(());
            }
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.delete_share(&id).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }
    }
    Ok(())
}
