//! `cloudctl endpoint ...` commands

use anyhow::Result;
use nexus::{
    AllowListChange, AsyncOperation, AutoConfirm, Client, ConfirmCallback, ConfirmRequest,
    CreateRequest, TargetUpdate,
};

use crate::Context;
use crate::cli::{AllowedNamespaceArgs, AllowedNamespaceCommand, EndpointCommand};
use crate::ui;

pub fn run(ctx: &Context, cmd: EndpointCommand) -> Result<()> {
    let client = Client::new(&ctx.settings);
    let mut confirm = confirmer(ctx);
    run_with(ctx, &client, confirm.as_mut(), cmd)
}

fn confirmer(ctx: &Context) -> Box<dyn ConfirmCallback> {
    if ctx.auto_confirm {
        Box::new(AutoConfirm)
    } else {
        Box::new(PromptConfirm)
    }
}

fn run_with(
    ctx: &Context,
    client: &Client,
    confirm: &mut dyn ConfirmCallback,
    cmd: EndpointCommand,
) -> Result<()> {
    match cmd {
        EndpointCommand::Get(args) => ui::json(&client.get(&args.name)?),
        EndpointCommand::List => ui::json(&client.list()?),
        EndpointCommand::Create(args) => {
            let request = CreateRequest {
                name: args.name,
                target_namespace: args.target_namespace,
                target_task_queue: args.target_task_queue,
                allowed_namespaces: args.allow_namespaces,
                request_id: args.request_id,
            };
            let result = client.create(&request, confirm)?;
            if !ctx.quiet {
                ui::success(&format!("Created endpoint '{}'", request.name));
                ui::kv("Endpoint id", &result.endpoint_id);
                if let Some(op) = &result.async_operation {
                    report_operation(op);
                }
            }
            Ok(())
        }
        EndpointCommand::Update(args) => {
            let update = TargetUpdate {
                namespace: args.target_namespace,
                task_queue: args.target_task_queue,
            };
            let op = client.update(&args.name, &update, args.request_id.as_deref(), confirm)?;
            done(ctx, &format!("Updating endpoint '{}'", args.name), &op);
            Ok(())
        }
        EndpointCommand::AllowedNamespace(cmd) => allowed_namespace(ctx, client, confirm, cmd),
        EndpointCommand::Delete(args) => {
            let op = client.delete(&args.name, args.request_id.as_deref(), confirm)?;
            done(ctx, &format!("Deleting endpoint '{}'", args.name), &op);
            Ok(())
        }
    }
}

fn allowed_namespace(
    ctx: &Context,
    client: &Client,
    confirm: &mut dyn ConfirmCallback,
    cmd: AllowedNamespaceCommand,
) -> Result<()> {
    let (args, change) = match cmd {
        AllowedNamespaceCommand::List(args) => {
            return ui::json(&client.allowed_namespaces(&args.name)?);
        }
        AllowedNamespaceCommand::Add(args) => change_for(args, AllowListChange::Add),
        AllowedNamespaceCommand::Set(args) => change_for(args, AllowListChange::Set),
        AllowedNamespaceCommand::Remove(args) => change_for(args, AllowListChange::Remove),
    };

    let op = client.change_allowed_namespaces(
        &args.name,
        &change,
        args.request_id.as_deref(),
        confirm,
    )?;
    done(ctx, &format!("Endpoint '{}': {change}", args.name), &op);
    Ok(())
}

fn change_for(
    mut args: AllowedNamespaceArgs,
    make: fn(String) -> AllowListChange,
) -> (AllowedNamespaceArgs, AllowListChange) {
    let change = make(std::mem::take(&mut args.namespace));
    (args, change)
}

fn done(ctx: &Context, msg: &str, op: &AsyncOperation) {
    if ctx.quiet {
        return;
    }
    ui::success(msg);
    report_operation(op);
}

fn report_operation(op: &AsyncOperation) {
    ui::kv("Async operation", &op.id);
    if let Some(state) = &op.state {
        ui::kv("State", state);
    }
}

// ============================================================================
// Interactive confirmation
// ============================================================================

/// Shows the pending spec change and asks on the terminal.
struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, request: &ConfirmRequest<'_>) -> nexus::Result<bool> {
        ui::header(&format!("Endpoint '{}'", request.endpoint));
        ui::print_spec_diff(request.before, request.after);
        println!();

        dialoguer::Confirm::new()
            .with_prompt(request.prompt())
            .default(false)
            .interact()
            .map_err(|e| nexus::Error::Confirm(e.to_string()))
    }
}
