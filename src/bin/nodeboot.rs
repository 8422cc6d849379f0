//! nodeboot binary — bootstrap a managed data-plane node against a remote
//! control plane. All real work lives in the library; this layer parses
//! arguments, initializes logging, and maps the outcome to an exit code.

use clap::Parser;
use nodeboot::config::{parse_labels, BootstrapConfig, TOKEN_ENV};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nodeboot",
    version,
    about = "Bootstrap a managed data-plane node against a remote control plane"
)]
struct Args {
    /// Control plane name to bootstrap against
    #[arg(short = 'c', long = "control-plane")]
    control_plane: String,

    /// Region identifier qualifying the API base address
    #[arg(long, default_value = "us")]
    region: String,

    /// Node image reference to launch
    #[arg(long, default_value = "nodehub/gateway:latest")]
    image: String,

    /// Name for the launched process instance
    #[arg(long, default_value = "managed-node")]
    name: String,

    /// Teardown interval in seconds; 0 leaves the node running
    #[arg(long, default_value_t = 0)]
    ttl: u64,

    /// Labels as key:value pairs, comma separated
    #[arg(long, default_value = "")]
    labels: String,

    /// Directory holding the key/certificate pair
    #[arg(long = "cert-dir", default_value = "./certs")]
    cert_dir: PathBuf,

    /// Revoke the registered certificate during cleanup
    #[arg(long = "cleanup-cert")]
    cleanup_cert: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Default to info level if RUST_LOG not set; --verbose bumps to debug
    let default_level = if args.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let labels = match parse_labels(&args.labels) {
        Ok(labels) => labels,
        Err(e) => {
            tracing::error!("Invalid --labels: {}", e);
            std::process::exit(2);
        }
    };

    // Credential is supplied out-of-band; its absence is fatal before any
    // pipeline stage runs
    let token = std::env::var(TOKEN_ENV).unwrap_or_default();
    if token.is_empty() {
        tracing::error!("{} is not set; a control plane access token is required", TOKEN_ENV);
        std::process::exit(10);
    }

    let config = BootstrapConfig {
        control_plane: args.control_plane,
        region: args.region,
        image: args.image,
        labels,
        process_name: args.name,
        ttl_secs: args.ttl,
        cleanup_certificate: args.cleanup_cert,
        verbose: args.verbose,
        cert_dir: args.cert_dir,
        token,
    };

    tracing::info!("nodeboot starting");
    tracing::info!("  Control plane: {}", config.control_plane);
    tracing::info!("  API: {}", config.api_base());
    tracing::info!("  Image: {}", config.image);
    tracing::info!("  Node name: {}", config.process_name);

    let code = nodeboot::bootstrap(&config).await;
    std::process::exit(code);
}
