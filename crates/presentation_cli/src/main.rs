//! KeyGate CLI
//!
//! Operator tool: derive keys offline and talk to a running gateway.

#![allow(clippy::print_stdout)]

mod client;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use client::GatewayClient;
use domain::{IsoWeek, derive_access_key};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_URL: &str = "http://localhost:8000";

/// KeyGate CLI
#[derive(Debug, Parser)]
#[command(name = "keygate-cli")]
#[command(author, version, about = "KeyGate operator CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the access key for a given instant without contacting the server
    ///
    /// Example: keygate-cli derive --secret "$ADMIN_SECRET" --at 2024-06-12T09:00:00Z
    Derive {
        /// Admin secret the server was started with
        #[arg(long, env = "ADMIN_SECRET", hide_env_values = true)]
        secret: String,

        /// Instant to derive for (RFC 3339, default: now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Fetch the live key from a running gateway
    CurrentKey {
        /// Server URL
        #[arg(short, long, env = "KEYGATE_URL", default_value = DEFAULT_URL)]
        url: String,

        /// Admin secret
        #[arg(long, env = "ADMIN_SECRET", hide_env_values = true)]
        admin_secret: String,

        /// Header carrying the admin secret
        #[arg(long, default_value = "admin-secret")]
        admin_header: String,
    },

    /// Send a chat prompt through the gateway
    Chat {
        /// Prompt to send
        prompt: String,

        /// Server URL
        #[arg(short, long, env = "KEYGATE_URL", default_value = DEFAULT_URL)]
        url: String,

        /// Weekly access key
        #[arg(long, env = "KEYGATE_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Header carrying the access key
        #[arg(long, default_value = "x-api-key")]
        api_key_header: String,
    },

    /// Check server health (exit code 1 when unhealthy)
    Health {
        /// Server URL
        #[arg(short, long, env = "KEYGATE_URL", default_value = DEFAULT_URL)]
        url: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(
            cli.verbose,
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Derive { secret, at } => {
            let at = at.unwrap_or_else(Utc::now);
            let key = derive_access_key(at, &secret);
            println!("ISO week: {}", IsoWeek::of(&at));
            println!("Key:      {}", key.value());
            println!(
                "Expiry:   {}",
                key.expiry().to_rfc3339_opts(SecondsFormat::Secs, true)
            );
        },

        Commands::CurrentKey {
            url,
            admin_secret,
            admin_header,
        } => {
            let key = GatewayClient::new(&url)
                .current_key(&admin_header, &admin_secret)
                .await?;
            println!("Key:            {}", key.api_key);
            println!("Expiry:         {}", key.expiry);
            println!("Days remaining: {}", key.days_remaining);
        },

        Commands::Chat {
            prompt,
            url,
            api_key,
            api_key_header,
        } => {
            let reply = GatewayClient::new(&url)
                .chat(&api_key_header, &api_key, &prompt)
                .await?;
            println!("{}", reply.response.as_deref().unwrap_or_default());
            println!();
            println!("model: {}", reply.model);
            println!(
                "usage: {}",
                serde_json::to_string(&reply.usage).context("usage is not serializable")?
            );
        },

        Commands::Health { url } => match GatewayClient::new(&url).health().await {
            Ok(health) => {
                println!(
                    "{} at {} (v{})",
                    health.status,
                    health.timestamp,
                    health.version.as_deref().unwrap_or("unknown")
                );
            },
            Err(e) => {
                println!("Unhealthy: {e:#}");
                std::process::exit(1);
            },
        },
    }

    Ok(())
}
