//! HAL CLI - inspect an endpoint manifest and follow HAL links
//!
//! Usage:
//!     hal --manifest endpoints.json list
//!     hal --manifest endpoints.json match "/users/42?expand=true"
//!     hal --manifest endpoints.json build user id=42
//!     hal --manifest endpoints.json get user id=42
//!     hal --manifest endpoints.json follow "/users?page=1" --pages

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hal_core::{EndpointEntry, EndpointRegistry, HalError, Params, RegistryConfig, TargetCatalog};
use hal_http::ReqwestClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "hal")]
#[command(about = "Inspect HAL endpoint manifests and follow hypermedia links")]
#[command(version)]
struct Args {
    /// Path to the endpoint manifest (JSON)
    #[arg(short, long, default_value = "endpoints.json")]
    manifest: PathBuf,

    /// Override the manifest's base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered endpoints in registration order
    List,

    /// Show which endpoint an href resolves to
    Match {
        href: String,
    },

    /// Build the URL for an endpoint
    Build {
        id: String,
        /// Parameters as key=value
        params: Vec<String>,
    },

    /// Fetch an endpoint and print the response
    Get {
        id: String,
        /// Parameters as key=value
        params: Vec<String>,
    },

    /// Fetch an href, resolving it against the manifest
    Follow {
        href: String,
        /// Keep following `next` links
        #[arg(long)]
        pages: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "hal=debug,hal_core=debug,hal_http=debug" } else { "hal=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.error_code(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, HalError> {
    let mut config = RegistryConfig::from_file(&args.manifest)?;
    if let Some(base_url) = args.base_url {
        config.client.base_url = Some(base_url);
    }
    tracing::info!(
        "Loaded {} endpoint(s) from {}",
        config.endpoints.len(),
        args.manifest.display()
    );

    // The CLI has no model types; every endpoint realizes a generic document
    let mut registry = EndpointRegistry::from_config(&config, &TargetCatalog::new())?;

    match args.command {
        Command::List => {
            for entry in registry.entries() {
                let query = entry.query().to_string();
                if query.is_empty() {
                    println!("{:<24} {:<10} {}", entry.id(), entry.kind(), entry.url_template());
                } else {
                    println!("{:<24} {:<10} {} [{}]", entry.id(), entry.kind(), entry.url_template(), query);
                }
            }
        }

        Command::Match { href } => {
            registry.bind_client(ReqwestClient::new(config.client.clone())?);
            let Some(entry) = registry.find_match(&href) else {
                eprintln!("No endpoint matches '{}'", href);
                return Ok(ExitCode::FAILURE);
            };

            println!("{} ({} {})", entry.id(), entry.kind(), entry.url_template());
            for (name, value) in href_captures(entry, &href, registry.base_url()) {
                println!("  {} = {}", name, value);
            }
        }

        Command::Build { id, params } => {
            let params = parse_params(&params)?;
            println!("{}", registry.url_for(&id, &params)?);
        }

        Command::Get { id, params } => {
            let params = parse_params(&params)?;
            registry.bind_client(ReqwestClient::new(config.client.clone())?);
            let document: hal_core::Document = registry.fetch(&id, &params)?;
            print_json(&document)?;
        }

        Command::Follow { href, pages } => {
            registry.bind_client(ReqwestClient::new(config.client.clone())?);
            if pages {
                for page in registry.pages(href) {
                    let page = page?;
                    tracing::info!("{} -> {}", page.href, page.endpoint);
                    print_json(&page.document)?;
                }
            } else {
                let realized = registry.resolve_document(&href)?;
                tracing::info!("{} -> {}", realized.href, realized.endpoint);
                print_json(&realized.document)?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Placeholder values bound by `href`, trying the template with and without the base prefix
fn href_captures(entry: &EndpointEntry, href: &str, base_url: Option<&str>) -> BTreeMap<String, String> {
    let stripped = hal_core::client::strip_base(base_url, href);
    let (path, _) = hal_core::endpoint::split_href(&stripped);
    entry
        .pattern()
        .captures(path)
        .or_else(|| {
            let base = base_url?.trim_end_matches('/');
            entry.pattern().captures(&format!("{base}{path}"))
        })
        .unwrap_or_default()
}

fn parse_params(raw: &[String]) -> Result<Params, HalError> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=').ok_or_else(|| HalError::Config {
                reason: format!("expected key=value, got '{}'", pair),
            })
        })
        .collect()
}

fn print_json(document: &hal_core::Document) -> Result<(), HalError> {
    let json = serde_json::to_string_pretty(document).map_err(|source| HalError::Deserialize {
        target: "Document",
        source,
    })?;
    println!("{}", json);
    Ok(())
}
