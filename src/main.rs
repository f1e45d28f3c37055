use std::process::ExitCode;

use clap::Parser;
use log::error;

use simple_chat::{chat, ChatNode, Config, Multiaddr, Result, DEFAULT_LISTEN_ADDR};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional address of a peer to connect to and greet. The address must
    /// end with a /p2p/ component carrying the peer identity.
    peer_addr: Option<String>,

    /// Address for accepting incoming connections.
    #[arg(short, long, default_value = DEFAULT_LISTEN_ADDR)]
    listen_addr: Multiaddr,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let listen_only = cli.peer_addr.is_none();

    // Create the configuration for the node.
    let config = Config {
        listen_addr: cli.listen_addr,
        peer_addr: cli.peer_addr,
        ..Default::default()
    };

    // Create a new tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Build a new tokio runtime");

    // Close the shutdown channel on ctrlc signal
    let (shutdown, shutdown_recv) = async_channel::bounded::<()>(1);
    let handle = move || {
        shutdown.close();
    };
    ctrlc::set_handler(handle).expect("ctrlc set handler");

    let result: Result<()> = rt.block_on(async {
        // Create a new ChatNode
        let mut node = ChatNode::new(config)?;
        println!("Node ID: {}", node.local_peer_id());

        // Start listening
        let addr = node.listen().await?;
        println!("Node Address: {addr}");

        if listen_only {
            println!("Run this program with another peer's address as an argument to connect.");
        }

        // Run the node until the ctrlc signal
        node.run(shutdown_recv, chat::handle_stream).await
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
