//! SNMP command handlers.

use stormgr_api::StorageClient;

use crate::cli::{GlobalOpts, OutputFormat, SnmpArgs, SnmpCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    client: &StorageClient,
    args: SnmpArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        SnmpCommand::Show => util::print_value(&client.get_snmp().await?, format, global),

        SnmpCommand::Update(patch) => {
            let patch = util::parse_patch(&patch)?;
            util::print_raw(client.update_snmp(patch).await?, format, global);
        }

        SnmpCommand::Receivers => {
            util::print_value(&client.list_trap_receivers().await?, format, global);
        }

        SnmpCommand::AddReceiver(data) => {
            let receiver = util::require_data(&data)?;
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.add_trap_receiver(receiver).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }

        SnmpCommand::RemoveReceiver { id } => {
            if !util::confirm(
                "snmp remove-receiver",
                &format!("Remove trap receiver {id}?"),
                global.yes,
            )? {
                return Ok(());
            }
            let (tracked, spinner) = util::tracked(client, global);
            let outcome = tracked.remove_trap_receiver(&id).await;
            util::finish(spinner);
            util::print_outcome(outcome?, format, global);
        }
    }
    Ok(())
}
