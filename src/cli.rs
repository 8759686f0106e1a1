use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cloudctl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Manage Nexus endpoints in your cloud account", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Cloud operations API address
    #[arg(long, env = "CLOUDCTL_SERVER", global = true)]
    pub server: Option<String>,

    /// API key used to authenticate
    #[arg(long, env = "CLOUDCTL_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Skip confirmation prompts
    #[arg(long, env = "CLOUDCTL_AUTO_CONFIRM", global = true)]
    pub auto_confirm: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage Nexus endpoints
    #[command(subcommand)]
    Endpoint(EndpointCommand),

    /// Inspect client configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Endpoint Commands
// ============================================================================

#[derive(Subcommand)]
pub enum EndpointCommand {
    /// Show an endpoint
    Get(NameArgs),

    /// List all endpoints
    List,

    /// Create an endpoint
    Create(CreateArgs),

    /// Update an endpoint's target
    Update(UpdateArgs),

    /// Manage the namespaces allowed to call an endpoint
    #[command(subcommand)]
    AllowedNamespace(AllowedNamespaceCommand),

    /// Delete an endpoint
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct NameArgs {
    /// Endpoint name
    #[arg(short, long)]
    pub name: String,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Endpoint name
    #[arg(short, long)]
    pub name: String,

    /// Namespace the endpoint routes to (<namespace>.<account>)
    #[arg(long)]
    pub target_namespace: String,

    /// Task queue the endpoint routes to
    #[arg(long)]
    pub target_task_queue: String,

    /// Namespace allowed to call the endpoint (repeatable)
    #[arg(long = "allow-namespace", required = true)]
    pub allow_namespaces: Vec<String>,

    /// Idempotency token for the async operation
    #[arg(long)]
    pub request_id: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Endpoint name
    #[arg(short, long)]
    pub name: String,

    /// New target namespace
    #[arg(long)]
    pub target_namespace: Option<String>,

    /// New target task queue
    #[arg(long)]
    pub target_task_queue: Option<String>,

    /// Idempotency token for the async operation
    #[arg(long)]
    pub request_id: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Endpoint name
    #[arg(short, long)]
    pub name: String,

    /// Idempotency token for the async operation
    #[arg(long)]
    pub request_id: Option<String>,
}

#[derive(Subcommand)]
pub enum AllowedNamespaceCommand {
    /// Allow one more namespace
    Add(AllowedNamespaceArgs),

    /// Replace the allow-list with a single namespace
    Set(AllowedNamespaceArgs),

    /// Stop allowing a namespace
    Remove(AllowedNamespaceArgs),

    /// List allowed namespaces
    List(NameArgs),
}

#[derive(Args)]
pub struct AllowedNamespaceArgs {
    /// Endpoint name
    #[arg(short, long)]
    pub name: String,

    /// Caller namespace (<namespace>.<account>)
    #[arg(long)]
    pub namespace: String,

    /// Idempotency token for the async operation
    #[arg(long)]
    pub request_id: Option<String>,
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("cloudctl").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_get_requires_name() {
        assert!(parse(&["endpoint", "get"]).is_err());
        assert!(parse(&["endpoint", "get", "--name", "orders"]).is_ok());
    }

    #[test]
    fn test_create_requires_all_fields() {
        let base = [
            "endpoint",
            "create",
            "--name",
            "orders",
            "--target-namespace",
            "orders.acct",
            "--target-task-queue",
            "tq",
        ];
        assert!(parse(&base).is_err());

        let mut full = base.to_vec();
        full.extend(["--allow-namespace", "a.acct"]);
        full.extend(["--allow-namespace", "b.acct"]);
        let cli = parse(&full).unwrap();
        match cli.command {
            Command::Endpoint(EndpointCommand::Create(args)) => {
                assert_eq!(args.allow_namespaces, vec!["a.acct", "b.acct"]);
                assert!(args.request_id.is_none());
            }
            _ => panic!("Expected endpoint create"),
        }
    }

    #[test]
    fn test_update_fields_are_optional() {
        let cli = parse(&["endpoint", "update", "--name", "orders"]).unwrap();
        match cli.command {
            Command::Endpoint(EndpointCommand::Update(args)) => {
                assert!(args.target_namespace.is_none());
                assert!(args.target_task_queue.is_none());
            }
            _ => panic!("Expected endpoint update"),
        }
    }

    #[test]
    fn test_allowed_namespace_requires_namespace() {
        let add = ["endpoint", "allowed-namespace", "add", "--name", "orders"];
        assert!(parse(&add).is_err());
        let list = ["endpoint", "allowed-namespace", "list", "--name", "orders"];
        assert!(parse(&list).is_ok());

        let cli = parse(&[
            "endpoint",
            "allowed-namespace",
            "remove",
            "--name",
            "orders",
            "--namespace",
            "a.acct",
            "--request-id",
            "req-1",
        ])
        .unwrap();
        match cli.command {
            Command::Endpoint(EndpointCommand::AllowedNamespace(
                AllowedNamespaceCommand::Remove(args),
            )) => {
                assert_eq!(args.namespace, "a.acct");
                assert_eq!(args.request_id.as_deref(), Some("req-1"));
            }
            _ => panic!("Expected allowed-namespace remove"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&[
            "endpoint",
            "list",
            "-vv",
            "--auto-confirm",
            "--server",
            "https://example.test",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.auto_confirm);
        assert_eq!(cli.server.as_deref(), Some("https://example.test"));
    }
}
