//! `pabrik`: command-line client for the factory's Directus instance.
//!
//! Manages contexts, the local token override, generic collection CRUD and
//! the inventory views (pending sales orders, SPK approvals, outflow).

mod commands;
mod config;

use clap::{Parser, Subcommand};

use commands::inventory::OutflowArgs;
use commands::resource::ListArgs;

/// Pabrik CLI tool.
#[derive(Parser, Debug)]
#[command(name = "pabrik", about = "Pabrik inventory client")]
struct Cli {
    /// Path to client config file (default: ~/.pabrik/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts (Directus instances).
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Local token override for the current context.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Get record(s) of a collection.
    Get {
        /// Collection or alias (e.g. gudang, spk, sj).
        resource: String,
        /// Optional record ID for single get.
        id: Option<String>,
        /// Limit results (-1 for all).
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Offset for pagination.
        #[arg(long)]
        offset: Option<usize>,
        /// Sort field, `-field` for descending. Repeatable.
        #[arg(long)]
        sort: Vec<String>,
        /// Filter as field:op:value. Repeatable.
        #[arg(long)]
        filter: Vec<String>,
        /// Comma separated field list.
        #[arg(long)]
        fields: Option<String>,
    },

    /// Create a record.
    Create {
        /// Collection or alias.
        resource: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },

    /// Update a record (PATCH).
    Update {
        /// Collection or alias.
        resource: String,
        /// Record ID.
        id: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: String,
    },

    /// Delete a record.
    Delete {
        /// Collection or alias.
        resource: String,
        /// Record ID.
        id: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },

    /// Check the connection to each collection.
    Status,

    /// Sales order views.
    So {
        #[command(subcommand)]
        action: SoAction,
    },

    /// Work orders and their approval workflow.
    Spk {
        #[command(subcommand)]
        action: SpkAction,
    },

    /// SPK waiting for approval.
    Notices {
        #[command(subcommand)]
        action: NoticesAction,
    },

    /// Inventory outflow derived from delivery notes.
    Outflow {
        #[command(subcommand)]
        action: OutflowAction,
    },

    /// Raw material views.
    Materials {
        #[command(subcommand)]
        action: MaterialsAction,
    },

    /// Delivery note helpers.
    Sj {
        #[command(subcommand)]
        action: SjAction,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        /// Context name.
        name: String,
        /// Directus base URL.
        #[arg(long)]
        server: String,
        /// Static token used when no override is stored.
        #[arg(long)]
        token: Option<String>,
        /// Local state file (default: ~/.pabrik/<name>.redb).
        #[arg(long)]
        state: Option<String>,
    },
    /// List all contexts.
    List,
    /// Set properties on a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        token: Option<String>,
        /// Request timeout in seconds, 0 for none.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(Subcommand, Debug)]
enum TokenAction {
    /// Store a token that takes precedence over the context's token.
    Set { token: String },
    /// Remove the stored token.
    Clear,
}

#[derive(Subcommand, Debug)]
enum SoAction {
    /// Orders without a delivery date or due today or later.
    Pending,
    /// Orders from the last 30 days, newest first.
    Recent,
}

#[derive(Subcommand, Debug)]
enum SpkAction {
    /// List work orders, newest first.
    List,
    /// Submit a draft or rejected SPK for approval.
    Submit { id: String },
    /// Approve a pending SPK.
    Approve { id: String },
    /// Reject a pending SPK.
    Reject {
        id: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
}

#[derive(Subcommand, Debug)]
enum NoticesAction {
    /// Pending SPK not yet marked read.
    List {
        /// Include notices already marked read.
        #[arg(long)]
        all: bool,
    },
    /// Show the SPK behind a notice.
    Show { id: String },
    /// Mark the notice of an SPK read.
    Ack { id: String },
    /// Forget every local acknowledgement.
    Clear,
}

#[derive(clap::Args, Debug, Default)]
struct OutflowFilterArgs {
    /// First day, YYYY-MM-DD.
    #[arg(long)]
    from: Option<String>,
    /// Last day (inclusive), YYYY-MM-DD.
    #[arg(long)]
    to: Option<String>,
    /// FINISHED GOOD, RAW MATERIAL or CONSUMABLE (fg, rm accepted).
    #[arg(long = "type")]
    item_type: Option<String>,
    #[arg(long)]
    status: Option<String>,
    /// Case-insensitive text search.
    #[arg(long)]
    search: Option<String>,
}

impl From<OutflowFilterArgs> for OutflowArgs {
    fn from(a: OutflowFilterArgs) -> Self {
        OutflowArgs {
            from: a.from,
            to: a.to,
            item_type: a.item_type,
            status: a.status,
            search: a.search,
        }
    }
}

#[derive(Subcommand, Debug)]
enum OutflowAction {
    /// List outflow rows.
    List {
        #[command(flatten)]
        filter: OutflowFilterArgs,
    },
    /// Totals per period and item type.
    Summary,
    /// Export outflow rows as CSV.
    Export {
        #[command(flatten)]
        filter: OutflowFilterArgs,
        /// Output file (default: pengeluaran-inventory-<today>.csv).
        #[arg(long = "out")]
        out: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum MaterialsAction {
    /// Materials whose remaining stock is below the minimum.
    LowStock,
}

#[derive(Subcommand, Debug)]
enum SjAction {
    /// Print the next delivery note number.
    NextNumber,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_output = cli.output == "json";

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create {
                name,
                server,
                token,
                state,
            } => {
                commands::context::create(
                    &name,
                    &server,
                    token.as_deref(),
                    state.as_deref(),
                    &config_path,
                )?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Set {
                name,
                server,
                token,
                timeout,
            } => {
                commands::context::set(
                    &name,
                    server.as_deref(),
                    token.as_deref(),
                    timeout,
                    &config_path,
                )?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
        },

        Commands::Token { action } => match action {
            TokenAction::Set { token } => commands::token::set(&token, &config_path)?,
            TokenAction::Clear => commands::token::clear(&config_path)?,
        },

        Commands::Get {
            resource,
            id,
            limit,
            offset,
            sort,
            filter,
            fields,
        } => {
            let args = ListArgs {
                limit,
                offset,
                sort,
                filters: filter,
                fields,
            };
            commands::resource::get(&resource, id.as_deref(), &args, &config_path).await?;
        }

        Commands::Create {
            resource,
            json_body,
            file,
        } => {
            let body = if let Some(path) = file {
                std::fs::read_to_string(&path)?
            } else if let Some(json) = json_body {
                json
            } else {
                anyhow::bail!("Provide --json or -f <file>.");
            };
            commands::resource::create(&resource, &body, &config_path).await?;
        }

        Commands::Update {
            resource,
            id,
            json_body,
        } => {
            commands::resource::update(&resource, &id, &json_body, &config_path).await?;
        }

        Commands::Delete { resource, id, yes } => {
            if !yes {
                eprint!("Are you sure? [y/N]: ");
                let mut s = String::new();
                std::io::stdin().read_line(&mut s)?;
                if !s.trim().eq_ignore_ascii_case("y") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            commands::resource::delete(&resource, &id, &config_path).await?;
        }

        Commands::Status => {
            commands::resource::status(&config_path).await?;
        }

        Commands::So { action } => match action {
            SoAction::Pending => commands::inventory::so_pending(&config_path).await?,
            SoAction::Recent => commands::inventory::so_recent(&config_path).await?,
        },

        Commands::Spk { action } => match action {
            SpkAction::List => commands::inventory::spk_list(&config_path).await?,
            SpkAction::Submit { id } => commands::inventory::spk_submit(&id, &config_path).await?,
            SpkAction::Approve { id } => {
                commands::inventory::spk_approve(&id, &config_path).await?
            }
            SpkAction::Reject { id, reason } => {
                commands::inventory::spk_reject(&id, &reason, &config_path).await?
            }
        },

        Commands::Notices { action } => match action {
            NoticesAction::List { all } => {
                commands::inventory::notices_list(all, json_output, &config_path).await?
            }
            NoticesAction::Show { id } => {
                commands::inventory::notices_show(&id, &config_path).await?
            }
            NoticesAction::Ack { id } => commands::inventory::notices_ack(&id, &config_path).await?,
            NoticesAction::Clear => commands::inventory::notices_clear(&config_path)?,
        },

        Commands::Outflow { action } => match action {
            OutflowAction::List { filter } => {
                let args = OutflowArgs::from(filter);
                commands::inventory::outflow_list(&args, json_output, &config_path).await?
            }
            OutflowAction::Summary => commands::inventory::outflow_summary(&config_path).await?,
            OutflowAction::Export { filter, out } => {
                let args = OutflowArgs::from(filter);
                commands::inventory::outflow_export(&args, out.as_deref(), &config_path).await?
            }
        },

        Commands::Materials { action } => match action {
            MaterialsAction::LowStock => {
                commands::inventory::materials_low_stock(json_output, &config_path).await?
            }
        },

        Commands::Sj { action } => match action {
            SjAction::NextNumber => commands::inventory::sj_next_number(&config_path).await?,
        },

        Commands::Version => {
            println!("pabrik cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
