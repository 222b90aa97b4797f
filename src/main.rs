use ring_overlay::config::NodeConfig;
use ring_overlay::node::coordinator::NodeCoordinator;

fn usage(program: &str) {
    eprintln!(
        "Usage: {} --ip <node-ip> [--prefix <a.b>] [--ping-port <port>] [--ring-port <port>]",
        program
    );
    eprintln!("       [--http <addr:port>] [--bridge <url>] [--no-ping-responder] [--verbose]");
    eprintln!("Example: {} --ip 10.20.5.1", program);
    eprintln!(
        "Example: {} --ip 10.20.5.1 --http 0.0.0.0:8080 --bridge http://10.20.0.2:9000/events",
        program
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("ring-node");

    let flags = args.get(1..).unwrap_or_default();

    let config = match NodeConfig::from_args(flags, |key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            usage(program);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(if config.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    tracing::info!(
        "Node {} (ping port {}, ring port {})",
        config.node_ip,
        config.ping_port,
        config.ring_port
    );
    if let Some(http_bind) = config.http_bind {
        tracing::info!("HTTP API on {}", http_bind);
    }

    NodeCoordinator::new(config)?.run().await
}
