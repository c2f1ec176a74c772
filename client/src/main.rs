use clap::Parser;
use client::config::{explicit_endpoint, ClientConfig, DEFAULT_DIRECTORY_URL};
use client::directory;
use client::network::Client;
use log::{error, info};
use shared::GameMode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Experimental autonomous arena game client", long_about = None)]
struct Args {
    /// Server address; looked up in the server directory when omitted
    #[arg(short, long)]
    address: Option<String>,

    /// Server port; must accompany --address
    #[arg(short, long)]
    port: Option<u16>,

    /// Number of concurrent client instances
    #[arg(short, long, default_value = "1")]
    instances: usize,

    /// Game mode to join (ffa or tdm)
    #[arg(short, long, default_value = "ffa")]
    mode: GameMode,

    /// Skip directory servers with fewer players than this
    #[arg(long, default_value = "1")]
    min_players: u32,

    /// Server directory listing
    #[arg(long, default_value = DEFAULT_DIRECTORY_URL)]
    directory_url: String,

    /// Fail on leftover bytes after a packet instead of tolerating them
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = ClientConfig {
        mode: args.mode,
        strict_trailing_bytes: args.strict,
        min_players: args.min_players,
        directory_url: args.directory_url,
    };
    config.validate()?;

    let (address, port) = match explicit_endpoint(args.address, args.port)? {
        Some(endpoint) => endpoint,
        None => {
            info!("No address and port given, consulting the server directory");
            directory::find_server(&config).await?
        }
    };
    info!("Using server {}:{}", address, port);

    let mut handles = Vec::with_capacity(args.instances);
    for instance in 0..args.instances {
        let address = address.clone();
        let config = config.clone();
        handles.push(tokio::spawn(async move {
            match Client::connect(&address, port, config).await {
                Ok(client) => match client.run().await {
                    Ok(summary) => info!(
                        "Instance {} ended after {} packet(s)",
                        instance, summary.stats.packets_applied
                    ),
                    Err(e) => error!("Instance {} ended: {}", instance, e),
                },
                Err(e) => error!("Instance {} failed to connect: {}", instance, e),
            }
        }));
    }

    tokio::select! {
        results = futures::future::join_all(handles) => {
            for result in results {
                if let Err(e) = result {
                    error!("Client task panicked: {}", e);
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
