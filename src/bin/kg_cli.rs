//! kg-cli: command-line access to a knowledge graph server.
//!
//! Usage:
//!   kg-cli health                                   Check server health
//!   kg-cli search <query> [--limit N] [--threshold F]  Search stored knowledge
//!   kg-cli entities                                 List entities
//!
//! Configuration comes from `KG_*` environment variables.

use anyhow::{bail, Context};
use kg_client::types::{ConceptSearch, EntityQuery, SearchOptions};
use kg_client::KgClient;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "help" | "--help" | "-h" => {
            print_usage();
            return;
        }
        "--version" | "-V" => {
            println!("kg-cli {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {}
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(&args[1], &args[2..])) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"kg-cli - Knowledge Graph command-line client

USAGE:
    kg-cli <COMMAND> [OPTIONS]

COMMANDS:
    health                                  Check server health
    version                                 Show server version
    stats                                   Show knowledge graph statistics
    metrics                                 Show server metrics
    capabilities                            Show server capabilities
    entities                                List entities by frequency
    search <query> [--limit N] [--threshold F]
                                            Search stored knowledge
    concepts <query>                        Search concepts
    help                                    Show this help message

ENVIRONMENT:
    KG_BASE_URL                 Server base URL (default http://localhost:3000/api)
    KG_API_KEY                  Bearer token
    KG_HTTP_TIMEOUT_SECS        Per-attempt timeout in seconds
    KG_MAX_ATTEMPTS             Attempts for network failures
    KG_PROXY_URL                HTTP(S) proxy
    RUST_LOG                    Log filter (default warn)"#
    );
}

async fn run(command: &str, args: &[String]) -> anyhow::Result<()> {
    let client = KgClient::builder()
        .from_env()
        .build()
        .context("invalid client configuration")?;

    let payload = match command {
        "health" => client.health_check().await?,
        "version" => client.get_version().await?,
        "stats" => client.get_stats().await?,
        "metrics" => client.get_metrics().await?,
        "capabilities" => client.get_capabilities().await?,
        "entities" => client.get_entities(EntityQuery::default()).await?,
        "search" => {
            let (query, options) = parse_search(args)?;
            client.search_knowledge(&query, options).await?
        }
        "concepts" => {
            let query = positional_query(args)?;
            client.search_concepts(&query, ConceptSearch::default()).await?
        }
        other => {
            print_usage();
            bail!("unknown command: {other}");
        }
    };

    print_payload(&payload)?;
    eprintln!();
    eprintln!("{}", client.performance_report());
    client.close();
    Ok(())
}

fn positional_query(args: &[String]) -> anyhow::Result<String> {
    let words: Vec<&str> = args
        .iter()
        .take_while(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect();
    if words.is_empty() {
        bail!("missing <query>");
    }
    Ok(words.join(" "))
}

fn parse_search(args: &[String]) -> anyhow::Result<(String, SearchOptions)> {
    let query = positional_query(args)?;
    let mut options = SearchOptions::default();

    let mut rest = args.iter().skip_while(|a| !a.starts_with("--"));
    while let Some(flag) = rest.next() {
        let value = rest
            .next()
            .with_context(|| format!("{flag} requires a value"))?;
        match flag.as_str() {
            "--limit" => {
                options.limit = value
                    .parse()
                    .with_context(|| format!("invalid --limit: {value}"))?;
            }
            "--threshold" => {
                options.threshold = value
                    .parse()
                    .with_context(|| format!("invalid --threshold: {value}"))?;
            }
            other => bail!("unknown option: {other}"),
        }
    }
    Ok((query, options))
}

fn print_payload(payload: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}
