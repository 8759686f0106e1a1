use anyhow::Result;

use crate::Context;
use crate::cli::ConfigCommand;
use crate::ui;

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn show(ctx: &Context) -> Result<()> {
    ui::header("Configuration");

    let path = ctx.config_path.display().to_string();
    if ctx.config_path.exists() {
        ui::kv("Config file", &path);
    } else {
        ui::kv(
            "Config file",
            &format!("{path} (not found, using defaults)"),
        );
    }

    let settings = &ctx.settings;
    ui::kv("Server", &settings.server);
    ui::kv("API version", &settings.api_version);
    ui::kv(
        "API key",
        if settings.api_key.is_some() {
            "set"
        } else {
            "not set"
        },
    );
    ui::kv("Timeout", &format!("{}s", settings.timeout.as_secs()));
    ui::kv("Auto-confirm", if ctx.auto_confirm { "yes" } else { "no" });

    if settings.api_key.is_none() {
        println!();
        ui::warn("No API key configured.");
        ui::dim("Set CLOUDCTL_API_KEY or api_key in the config file.");
    }
    Ok(())
}
