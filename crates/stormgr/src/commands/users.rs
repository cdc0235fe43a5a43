//! User command handlers.

use stormgr_api::StorageClient;

use crate::cli::{GlobalOpts, OutputFormat, UsersArgs, UsersCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    client: &StorageClient,
    args: UsersArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List => util::print_value(&client.list_users().await?, format, global),

        UsersCommand::Get { id } => util::print_value(&client.get_user(&id).await?, format, global),

        UsersCommand::Create(data) => {
            let user = util::require_data(&data)?;
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.create_user(user).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }

        UsersCommand::Update { id, patch } => {
            let patch = util::parse_patch(&patch)?;
            util::print_raw(client.update_user(&id, patch).await?, format, global);
        }

        UsersCommand::Delete { id } => {
            if !util::confirm("users delete", &format!("Delete user {id}?"), global.yes)? {
                return Ok(());
            }
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.delete_user(&id).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }
    }
    Ok(())
}
