//! Wikigraph CLI - GraphQL gateway over Wikipedia

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wikigraph::config::{self, WikigraphConfig};
use wikigraph::source::{InMemorySource, MediaWikiSource};
use wikigraph::{server, ui, QueryExecutor};

#[derive(Parser)]
#[command(name = "wikigraph")]
#[command(version)]
#[command(about = "GraphQL gateway over the Wikipedia API")]
#[command(long_about = r#"
Wikigraph serves Wikipedia pages through a GraphQL endpoint.

Example usage:
  wikigraph serve --port 8080
  curl -g 'http://localhost:8080/graphql?query={page(id:"4138548"){title}}'
  wikigraph query '{page(title:"Argentina"){summary,images{url}}}'
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Path to the config file (defaults to ./wikigraph.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wikipedia language edition (e.g. en, es)
    #[arg(short, long)]
    language: Option<String>,

    /// Explicit MediaWiki api.php URL
    #[arg(long)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the GraphQL HTTP server
    Serve {
        #[command(flatten)]
        source: SourceArgs,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Execute one query and print the JSON result
    Query {
        /// GraphQL query string
        query: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the GraphQL schema (SDL)
    Schema,

    /// Write a default config file
    Init {
        /// Where to write the config
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn load_config(args: &SourceArgs) -> anyhow::Result<WikigraphConfig> {
    let mut cfg = config::resolve_config(args.config.as_deref())?;
    if let Some(language) = &args.language {
        cfg.source.language = language.clone();
        cfg.source.api_url = None;
    }
    if let Some(api_url) = &args.api_url {
        cfg.source.api_url = Some(api_url.clone());
    }
    Ok(cfg)
}

fn live_executor(cfg: &WikigraphConfig) -> anyhow::Result<QueryExecutor> {
    let source = MediaWikiSource::new(cfg.source.settings()?)?;
    tracing::debug!("Using MediaWiki endpoint {}", source.api_url());
    Ok(QueryExecutor::new(Arc::new(source)))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging (stderr, so `query` output stays clean JSON)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli.command).await {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { source, host, port } => {
            let mut cfg = load_config(&source)?;
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }

            let addr = cfg.server.socket_addr()?;
            let executor = live_executor(&cfg)?;

            ui::header(&format!("Wikigraph {}", env!("CARGO_PKG_VERSION")));
            ui::listening(&addr.to_string());
            ui::info("Source", &cfg.source.endpoint());
            ui::info(
                "Try",
                &format!(
                    "curl -g 'http://localhost:{}/graphql?query={{page(id:\"4138548\"){{title}}}}'",
                    addr.port()
                ),
            );

            server::start_server(addr, executor).await?;
        }

        Commands::Query { query, source, pretty } => {
            let cfg = load_config(&source)?;
            let executor = live_executor(&cfg)?;

            let result = executor.execute_json(&query).await?;
            let output = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", output);

            if let Some(errors) = result.get("errors").and_then(|e| e.as_array()) {
                ui::warn(&format!("Query completed with {} error(s)", errors.len()));
            }
        }

        Commands::Schema => {
            // The SDL does not depend on the source, so no network client is built.
            let executor = QueryExecutor::new(Arc::new(InMemorySource::new()));
            println!("{}", executor.sdl());
        }

        Commands::Init { path, force } => {
            let path = path.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &WikigraphConfig::default(), force)?;
            ui::success(&format!("Config written to {}", path.display()));
        }
    }

    Ok(())
}
