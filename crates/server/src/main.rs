use std::{net::SocketAddr, path::PathBuf};

use blog_core::{config::BlogConfig, ledger::PostLedger};
use clap::Parser;
use tokio::{net::TcpListener, signal::ctrl_c};
use tracing::{error, info};

use server::{init_tracing, serve};

#[derive(Parser)]
#[command(author, version, about = "Reference post store", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE")]
    /// Path to config file; defaults to ~/.blog/blog.toml
    config: Option<PathBuf>,

    #[arg(short, long)]
    /// Address to listen on. For ex, 127.0.0.1:8080
    socket_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match BlogConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_filter);

    let socket_addr = args.socket_addr.unwrap_or(config.socket);
    let listener = match TcpListener::bind(socket_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%socket_addr, error = %err, "unable to bind");
            std::process::exit(1);
        }
    };

    info!("Press Ctrl-C to stop the server; posts are kept in memory only");
    tokio::select! {
        result = serve(listener, PostLedger::default()) => {
            if let Err(err) = result {
                error!(error = %err, "server stopped");
                std::process::exit(1);
            }
        }
        _ = ctrl_c() => info!("Ctrl-C, shutting down"),
    }
}
