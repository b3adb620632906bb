//! epmd-cli
//!
//! Command-line client for the Erlang Port Mapper Daemon: register a node,
//! resolve names, list or dump registrations, or kill the daemon.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use epmd_client::{
    dump_nodes, node_names, resolve_node, Config, Connection, NodeInfo, DEFAULT_EPMD_PORT,
};

/// EPMD client CLI
#[derive(Parser, Debug)]
#[command(name = "epmd-cli")]
#[command(about = "Client for the Erlang Port Mapper Daemon")]
#[command(version)]
struct Args {
    /// Daemon host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Daemon port
    #[arg(short, long, default_value_t = DEFAULT_EPMD_PORT)]
    port: u16,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a node and hold the keepalive socket until the daemon closes it
    Register {
        /// Node name to register
        name: String,

        /// Port the node listens on
        node_port: u16,
    },

    /// Resolve a node name to its listening port
    Lookup {
        /// Node name to resolve
        name: String,
    },

    /// List all registered nodes
    Names,

    /// Dump all node records, including daemon-internal file descriptors
    Dump,

    /// Kill the daemon - use with caution
    Kill,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,epmd_client=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> epmd_client::Result<()> {
    match &args.command {
        Commands::Register { name, node_port } => register(args, name, *node_port),
        Commands::Lookup { name } => {
            let node = resolve_node(&args.host, args.port, name)?;
            if args.json {
                print_json(&node);
            } else {
                println!("{} listens on port {}", node.name, node.port);
            }
            Ok(())
        }
        Commands::Names => {
            let nodes = node_names(&args.host, args.port)?;
            print_nodes(args, &nodes);
            Ok(())
        }
        Commands::Dump => {
            let nodes = dump_nodes(&args.host, args.port)?;
            print_nodes(args, &nodes);
            Ok(())
        }
        Commands::Kill => {
            let config = connection_config(args);
            let mut conn = Connection::connect(&config)?;
            conn.kill()?;
            let _ = conn.recv()?;
            tracing::info!("Kill request sent, daemon is gone");
            Ok(())
        }
    }
}

/// Register and then hold the connection open as the liveness signal
fn register(args: &Args, name: &str, node_port: u16) -> epmd_client::Result<()> {
    // The keepalive wait is open-ended, so the read timeout must be off
    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .read_timeout_ms(0)
        .build();

    let mut conn = Connection::connect(&config)?;
    let ack = conn.register(node_port, name)?;

    tracing::info!(
        "Registered {} on port {} (creation {:?})",
        name,
        node_port,
        ack.creation
    );
    tracing::info!("Holding keepalive socket open; closing it deregisters the node");

    // Blocks until the daemon goes away
    let _ = conn.recv()?;
    tracing::info!("Daemon closed the keepalive, registration withdrawn");

    Ok(())
}

fn connection_config(args: &Args) -> Config {
    Config::builder().host(&args.host).port(args.port).build()
}

fn print_nodes(args: &Args, nodes: &[NodeInfo]) {
    if args.json {
        print_json(&nodes);
        return;
    }
    if nodes.is_empty() {
        println!("no registered nodes");
        return;
    }
    for node in nodes {
        match node.fd {
            Some(fd) => println!("name {} at port {}, fd = {}", node.name, node.port, fd),
            None => println!("name {} at port {}", node.name, node.port),
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => tracing::error!("Failed to serialize output: {e}"),
    }
}
