//! A minimal peer-to-peer chat node built on libp2p streams.
//!
//! The node always listens for inbound chat streams and prints every
//! received line. When a peer address is provided, it also dials that peer
//! and greets it periodically over a single outbound stream.
//!
//! # Example
//! ```no_run
//! use simple_chat::{chat, ChatNode, Config};
//!
//! // Create the configuration for the node.
//! let config = Config::default();
//!
//! // Create a new ChatNode
//! let mut node = ChatNode::new(config).unwrap();
//! println!("Node ID: {}", node.local_peer_id());
//!
//! // Closing this channel shuts the node down.
//! let (_shutdown, shutdown_recv) = async_channel::bounded::<()>(1);
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     // Start listening
//!     let addr = node.listen().await.unwrap();
//!     println!("Node Address: {addr}");
//!
//!     // Run the node with the printing stream handler
//!     node.run(shutdown_recv, chat::handle_stream).await.unwrap();
//! });
//! ```

mod codec;
mod config;
mod connector;
mod error;
mod node;

/// The chat protocol: inbound stream handling and periodic greeting.
pub mod chat;

pub use codec::LineReader;
pub use config::{Config, DEFAULT_LISTEN_ADDR};
pub use error::{Error, Result};
pub use node::ChatNode;

pub use libp2p::{Multiaddr, PeerId, Stream};
