//! keyroute command line
//!
//! `ask` sends a prompt through the router, `pairs` shows the current
//! rotation order, `probe` checks each provider with its first key.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keyroute::{
    CredentialStore, FileSource, HttpClient, Provider, ProviderRegistry, Router, RouterSettings,
};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "keyroute")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Route prompts across LLM providers with key rotation and failover")]
struct Cli {
    /// Key storage file (default: $KEYROUTE_CONFIG, ./key_storage.json, user config dir, ~/.keyroute)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,

    /// Overall deadline for one dispatch in seconds
    #[arg(long, global = true)]
    deadline: Option<u64>,

    /// Also route through ArliAI and ShaleProtocol
    #[arg(long, global = true)]
    extended: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a prompt; reads stdin when no prompt is given
    Ask {
        prompt: Vec<String>,

        /// Model to use instead of the configured default
        #[arg(long)]
        model: Option<String>,
    },

    /// Show the pairing sequence with masked keys
    Pairs,

    /// Send a test prompt to each provider using its first key
    Probe {
        #[arg(long, default_value = "Say hello from the test!")]
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyroute=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let store = match &cli.config {
        Some(path) => CredentialStore::new(Arc::new(FileSource::new(path))),
        None => CredentialStore::discover(),
    };
    let settings = RouterSettings {
        request_timeout: Duration::from_secs(cli.timeout),
        dispatch_deadline: cli.deadline.map(Duration::from_secs),
        ..RouterSettings::default()
    };
    let router = if cli.extended {
        let client = HttpClient::with_timeout(settings.request_timeout)
            .context("Failed to create HTTP client")?;
        Router::new(ProviderRegistry::extended(client), store, settings)
    } else {
        Router::with_builtin_providers(store, settings).context("Failed to create HTTP client")?
    };
    tracing::debug!(
        providers = ?router.registry().names(),
        timeout = ?router.settings().request_timeout,
        deadline = ?router.settings().dispatch_deadline,
        "Router ready"
    );

    match cli.command {
        Command::Ask { prompt, model } => ask(&router, prompt, model).await,
        Command::Pairs => {
            let pairs = router.pairs();
            if pairs.is_empty() {
                println!("No providers or keys configured.");
            }
            for (index, (provider, key)) in pairs.iter().enumerate() {
                println!("{:>3}  {:<12} {}", index, provider, key);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Probe { prompt } => probe(&router, &prompt).await,
    }
}

async fn ask(router: &Router, prompt: Vec<String>, model: Option<String>) -> Result<ExitCode> {
    let prompt = if prompt.is_empty() {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read prompt from stdin")?;
        buffer
    } else {
        prompt.join(" ")
    };

    if prompt.trim().is_empty() {
        anyhow::bail!("Prompt is empty");
    }

    match router.dispatch(&prompt, model.as_deref()).await {
        Ok(reply) => {
            tracing::info!(provider = %reply.provider, model = %reply.model, attempts = reply.attempts, "Done");
            println!("{}", reply.text);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            for failure in e.failures() {
                tracing::debug!(provider = %failure.provider, credential = %failure.credential, error = %failure.error, "Attempt failed");
            }
            eprintln!("{}", e.user_message());
            eprintln!("({})", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn probe(router: &Router, prompt: &str) -> Result<ExitCode> {
    let mut all_ok = true;

    for provider in router.registry().iter() {
        let name = provider.name();
        let Some(key) = router.store().first_credential(name) else {
            println!("{:<12} skipped (no key)", name);
            continue;
        };
        let model = router
            .store()
            .default_model(name)
            .unwrap_or_else(|| provider.fallback_model().to_string());

        match provider.send(prompt, &key, &model).await {
            Ok(reply) => println!("{:<12} ok   {}", name, reply.trim()),
            Err(e) => {
                all_ok = false;
                println!("{:<12} FAIL {}", name, e);
            }
        }
    }

    Ok(if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
