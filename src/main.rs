mod cli;

use playgate::{config, resolver::RedirectResolver, server};
use playgate_core::PlaybackDirective;
use playgate_rules::ProviderClassifier;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    apply_server_overrides(&mut config, host, port);

    tracing::info!("Starting Playgate server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

/// Command-line host/port win over the config file only when given.
fn apply_server_overrides(config: &mut config::Config, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "playgate=trace,playgate_rules=trace,tower_http=debug".to_string()
        } else {
            "playgate=debug,playgate_rules=info,tower_http=info".to_string()
        }
    });

    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Resolve { url, provider } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve_url(&url, &provider, cli.config.as_deref()))
        }
        Commands::Classify { url, provider } => {
            classify_url(&url, &provider, cli.config.as_deref())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("playgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn classifier_for(config: &config::Config) -> ProviderClassifier {
    ProviderClassifier::builtin().with_direct_media_relay(config.classifier.relay_direct_media)
}

fn print_directive(directive: &PlaybackDirective) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(directive)?);
    Ok(())
}

async fn resolve_url(url: &str, provider: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let resolver = RedirectResolver::new(&config.resolver);

    let resolved = resolver.resolve(url).await;
    tracing::debug!("Resolved {} -> {}", url, resolved);

    print_directive(&classifier_for(&config).classify(&resolved, provider))
}

fn classify_url(url: &str, provider: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    print_directive(&classifier_for(&config).classify(url, provider))
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!(
                "  Metadata API: {}",
                config.metadata.base_url.as_deref().unwrap_or("(not set)")
            );
            match &config.progress.path {
                Some(path) => println!("  Progress store: {}", path.display()),
                None => println!("  Progress store: in-memory"),
            }
            println!(
                "  Allowed providers: {}",
                config.session.allowed_providers.join(", ")
            );
            println!(
                "  Direct media relay: {}",
                if config.classifier.relay_direct_media {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            for warning in config.validate() {
                println!("  ! {}", warning);
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
