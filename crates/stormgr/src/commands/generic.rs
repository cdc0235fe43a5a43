//! Path-level commands: get, call, update, task.
//!
//! These expose the client's call primitives directly, for resources the
//! typed subcommands do not cover.

use stormgr_api::{Method, Request, StorageClient};

use crate::cli::{CallArgs, GetArgs, GlobalOpts, OutputFormat, TaskArgs, UpdateArgs};
use crate::error::CliError;

use super::util;

pub async fn get(
    client: &StorageClient,
    args: GetArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let query = util::parse_query(&args.query.query)?;
    let mut request = Request::get(args.path).queries(query);
    if args.raw {
        request = request.raw();
    }
    let result = client.session().invoke(request).await?;
    util::print_raw(result, format, global);
    Ok(())
}

pub async fn call(
    client: &StorageClient,
    args: CallArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let method = Method::parse(&args.method)?;
    let body = util::read_data(&args.data)?;
    let query = util::parse_query(&args.query.query)?;

    if method == Method::Delete
        && !util::confirm("delete", &format!("Delete {}?", args.path), global.yes)?
    {
        return Ok(());
    }

    if !args.wait {
        let result = client.call(&args.path, method, body, query).await?;
        util::print_raw(result, format, global);
        return Ok(());
    }

    let mut options = client.monitor_options().clone();
    if let Some(collection) = args.entity_collection {
        options = options.entity_collection(collection);
    }
    let (options, spinner) = util::with_spinner(&options, global);
    let request = Request::new(method, args.path).json_value(body).queries(query);
    let outcome = client.monitor_with(request, &options).await;
    util::finish(spinner);
    util::print_outcome(outcome?, format, global);
    Ok(())
}

pub async fn update(
    client: &StorageClient,
    args: UpdateArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let patch = util::parse_patch(&args.patch)?;

    if !args.wait {
        let result = client.update(&args.path, patch).await?;
        util::print_raw(result, format, global);
        return Ok(());
    }

    let (tracked, spinner) = util::tracked(client, global);
    let outcome = tracked.update_monitored(&args.path, patch).await;
    util::finish(spinner);
    util::print_outcome(outcome?, format, global);
    Ok(())
}

pub async fn task(
    client: &StorageClient,
    args: TaskArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let task = client
        .task(&args.uuid)
        .await?
        .ok_or_else(|| CliError::NotFound {
            path: format!("tasks/{}", args.uuid),
        })?;
    util::print_value(&serde_json::to_value(task)?, format, global);
    Ok(())
}
