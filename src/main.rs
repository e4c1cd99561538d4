//! Tipcast - categorized tip delivery and push subscriptions
//!
//! The CLI is the orchestrating layer: it maps each subcommand onto one core
//! operation, translates outcomes into the configured prompt strings, and
//! chooses the push transport. The core itself never talks to users.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tipcast::{
    config::TipcastConfig,
    dispatch::{HttpPushTransport, LogTransport, PushTransport},
    selection::MOST_RECENT_CATEGORY,
    TipService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tipcast")]
#[command(version)]
#[command(about = "Categorized tip delivery and push subscriptions")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TIPCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Tip corpus file (defaults to the bundled corpus)
    #[arg(long, env = "TIPCAST_TIPS", global = true)]
    tips: Option<PathBuf>,

    /// Subscriber registry directory
    #[arg(long, env = "TIPCAST_REGISTRY_DIR", global = true)]
    registry_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tip categories
    Categories,

    /// Pick a random tip from a category ("most recent" works too)
    Pick {
        /// Category label
        #[arg(long)]
        category: String,
    },

    /// Show the most recently added tip
    MostRecent,

    /// Re-load the tip corpus from its source
    Restore,

    /// Opt a user into a notification intent
    Subscribe {
        /// User identifier
        #[arg(long)]
        user: String,

        /// Notification intent
        #[arg(long)]
        intent: String,

        /// Intent parameter as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Opt a user out of a notification intent
    Unsubscribe {
        /// User identifier
        #[arg(long)]
        user: String,

        /// Notification intent
        #[arg(long)]
        intent: String,

        /// Intent parameter as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// List subscribers registered for an intent
    Subscribers {
        /// Notification intent
        #[arg(long)]
        intent: String,
    },

    /// Notify every subscriber of an intent
    Notify {
        /// Notification intent
        #[arg(long)]
        intent: String,

        /// Display title; {key} placeholders are filled from each
        /// subscriber's parameters
        #[arg(long)]
        title: Option<String>,

        /// Log sends instead of calling the push endpoint
        #[arg(long)]
        dry_run: bool,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

/// Parse a `key=value` argument into its parts
fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid key=value pair: {}", s)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tipcast={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        let content = std::fs::read_to_string(config_path)?;
        toml::from_str(&content)?
    } else {
        TipcastConfig::default()
    };
    if let Some(tips) = cli.tips {
        config.content.source_path = Some(tips);
    }
    if let Some(dir) = cli.registry_dir {
        config.registry.dir = Some(dir);
    }

    match cli.command {
        Commands::Categories => {
            run_categories(config).await?;
        }
        Commands::Pick { category } => {
            run_pick(config, &category).await?;
        }
        Commands::MostRecent => {
            run_most_recent(config).await?;
        }
        Commands::Restore => {
            run_restore(config).await?;
        }
        Commands::Subscribe {
            user,
            intent,
            params,
        } => {
            run_subscribe(config, &user, &intent, params.into_iter().collect()).await?;
        }
        Commands::Unsubscribe {
            user,
            intent,
            params,
        } => {
            run_unsubscribe(config, &user, &intent, params.into_iter().collect()).await?;
        }
        Commands::Subscribers { intent } => {
            run_subscribers(config, &intent).await?;
        }
        Commands::Notify {
            intent,
            title,
            dry_run,
        } => {
            run_notify(config, &intent, title, dry_run).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

/// Build the service with the log transport, for commands that never push
async fn make_service(config: TipcastConfig) -> Result<TipService> {
    Ok(TipService::new(config, Arc::new(LogTransport)).await?)
}

async fn run_categories(config: TipcastConfig) -> Result<()> {
    let prompts = config.prompts.clone();
    let service = make_service(config).await?;

    println!("{}", prompts.welcome);
    for category in service.list_categories().await {
        println!("  {}", category);
    }
    println!("  {}", MOST_RECENT_CATEGORY);
    Ok(())
}

async fn run_pick(config: TipcastConfig, category: &str) -> Result<()> {
    let prompts = config.prompts.clone();
    let service = make_service(config).await?;

    let tip = service.pick_content(category).await?;
    println!("{}", tip.body);
    println!("{}: {}", prompts.button_title, tip.reference_url);
    println!("({})", prompts.daily_updates_suggestion);
    Ok(())
}

async fn run_most_recent(config: TipcastConfig) -> Result<()> {
    let prompts = config.prompts.clone();
    let service = make_service(config).await?;

    let tip = service.most_recent_content().await?;
    println!("{}", tip.body);
    println!("{}: {}", prompts.button_title, tip.reference_url);
    println!("({})", prompts.notifications_suggestion);
    Ok(())
}

async fn run_restore(config: TipcastConfig) -> Result<()> {
    let prompts = config.prompts.clone();
    let service = make_service(config).await?;

    service.reload().await?;
    println!("{}", prompts.restore_tips);
    println!(
        "{} categories loaded",
        service.list_categories().await.len()
    );
    Ok(())
}

async fn run_subscribe(
    config: TipcastConfig,
    user: &str,
    intent: &str,
    params: BTreeMap<String, String>,
) -> Result<()> {
    let prompts = config.prompts.clone();
    let service = make_service(config).await?;

    // Parameterized opt-ins are recurring updates; bare ones are one-off alerts
    let recurring = !params.is_empty();
    match service.subscribe(user, intent, params).await {
        Ok(()) => {
            let message = if recurring {
                &prompts.daily_update_setup_success
            } else {
                &prompts.notification_setup_success
            };
            println!("{}", message);
            Ok(())
        }
        Err(e) => {
            let message = if recurring {
                &prompts.daily_update_setup_fail
            } else {
                &prompts.notification_setup_fail
            };
            println!("{}", message);
            Err(e.into())
        }
    }
}

async fn run_unsubscribe(
    config: TipcastConfig,
    user: &str,
    intent: &str,
    params: BTreeMap<String, String>,
) -> Result<()> {
    let service = make_service(config).await?;

    service.unsubscribe(user, intent, &params).await?;
    println!("Unsubscribed {} from {}", user, intent);
    Ok(())
}

async fn run_subscribers(config: TipcastConfig, intent: &str) -> Result<()> {
    let service = make_service(config).await?;

    let subscribers = service.subscribers_for(intent).await?;
    println!("{}", serde_json::to_string_pretty(&subscribers)?);
    Ok(())
}

async fn run_notify(
    config: TipcastConfig,
    intent: &str,
    title: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let prompts = config.prompts.clone();
    let title = title.unwrap_or_else(|| prompts.notification_title.clone());

    let transport: Arc<dyn PushTransport> = if dry_run {
        Arc::new(LogTransport)
    } else {
        Arc::new(HttpPushTransport::new(&config.transport)?)
    };
    let service = TipService::new(config, transport).await?;

    let report = service.dispatch_notifications(intent, &title).await?;
    if report.failures.is_empty() {
        println!("{}", prompts.notification_send_success);
    } else {
        println!("{}", prompts.notification_send_fail);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn show_config(config: Option<&TipcastConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
