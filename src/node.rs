use std::{future::Future, time::Duration};

use async_channel::{Receiver, Sender};
use futures_util::StreamExt;
use libp2p::{
    multiaddr::Protocol, noise, swarm::SwarmEvent, tcp, yamux, Multiaddr, PeerId, Stream, Swarm,
    SwarmBuilder,
};
use libp2p_stream as stream;
use log::{debug, info};

use crate::{chat, connector, Config, Error, Result};

/// ChatNode serves as the central entry point for running the chat node. It
/// owns the libp2p swarm, accepts inbound chat streams, and optionally dials
/// and greets one configured peer.
///
/// # Example
/// ```no_run
/// use simple_chat::{chat, ChatNode, Config};
///
/// // Create the configuration for the node.
/// let config = Config::default();
///
/// // Create a new ChatNode
/// let mut node = ChatNode::new(config).unwrap();
/// println!("Node ID: {}", node.local_peer_id());
///
/// // Closing this channel shuts the node down.
/// let (_shutdown, shutdown_recv) = async_channel::bounded::<()>(1);
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     // Start listening
///     let addr = node.listen().await.unwrap();
///     println!("Node Address: {addr}");
///
///     // Run the node with the printing stream handler
///     node.run(shutdown_recv, chat::handle_stream).await.unwrap();
/// });
/// ```
pub struct ChatNode {
    /// The Configuration for the chat node.
    config: Config,

    /// Drives all connection and stream activity.
    swarm: Swarm<stream::Behaviour>,

    /// Control handle used to open outbound chat streams.
    control: stream::Control,

    /// Inbound chat streams accepted under the chat protocol.
    incoming: stream::IncomingStreams,

    /// The peer to greet, resolved from the configured peer address.
    peer: Option<PeerId>,
}

impl ChatNode {
    /// Creates a new ChatNode.
    pub fn new(config: Config) -> Result<Self> {
        let swarm = SwarmBuilder::with_new_identity()
            .with_tokio()
            .with_tcp(
                tcp::Config::default().nodelay(true),
                noise::Config::new,
                yamux::Config::default,
            )
            .map_err(|err| Error::Setup(err.to_string()))?
            .with_behaviour(|_| stream::Behaviour::new())
            .map_err(|err| Error::Setup(err.to_string()))?
            .build();

        let mut control = swarm.behaviour().new_control();
        let incoming = control
            .accept(chat::CHAT_PROTOCOL)
            .map_err(|_| Error::Setup("chat protocol already registered".to_string()))?;

        Ok(Self {
            config,
            swarm,
            control,
            incoming,
            peer: None,
        })
    }

    /// Returns the local peer identity.
    pub fn local_peer_id(&self) -> &PeerId {
        self.swarm.local_peer_id()
    }

    /// Starts listening on the configured address, returning the first
    /// resolved listen address tagged with the local peer identity.
    pub async fn listen(&mut self) -> Result<Multiaddr> {
        self.swarm
            .listen_on(self.config.listen_addr.clone())
            .map_err(|err| Error::Setup(err.to_string()))?;

        loop {
            match self.swarm.select_next_some().await {
                SwarmEvent::NewListenAddr { address, .. } => {
                    info!("Start listening on {address}");
                    let peer_id = *self.swarm.local_peer_id();
                    return Ok(address.with(Protocol::P2p(peer_id)));
                }
                SwarmEvent::ListenerClosed {
                    reason: Err(err), ..
                } => {
                    return Err(Error::Setup(err.to_string()));
                }
                SwarmEvent::ListenerError { error, .. } => {
                    return Err(Error::Setup(error.to_string()));
                }
                event => debug!("Swarm event: {event:?}"),
            }
        }
    }

    /// Runs the node until the shutdown channel closes or a fatal error
    /// occurs.
    ///
    /// The given handler is spawned on its own task for every accepted
    /// inbound chat stream. If a peer address is configured, it is resolved
    /// and dialed before the event loop starts, and the greeter task is
    /// launched once the connection is established.
    pub async fn run<Fut>(
        mut self,
        shutdown: Receiver<()>,
        handler: impl Fn(PeerId, Stream) -> Fut + Send + 'static,
    ) -> Result<()>
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        // Fatal errors reported back by the greeter task.
        let (err_chan, err_chan_recv) = async_channel::bounded(1);

        if let Some(peer_addr) = &self.config.peer_addr {
            let (peer, addr) = connector::resolve(peer_addr)?;
            info!("Dial {addr}");
            self.swarm
                .dial(addr)
                .map_err(|err| Error::Connect(err.to_string()))?;
            self.peer = Some(peer);
        }

        loop {
            tokio::select! {
                event = self.swarm.select_next_some() => {
                    self.handle_swarm_event(event, &err_chan, &shutdown)?;
                }
                incoming = self.incoming.next() => {
                    if let Some((peer, chat_stream)) = incoming {
                        debug!("Accept a new chat stream from {peer}");
                        tokio::spawn(handler(peer, chat_stream));
                    }
                }
                err = err_chan_recv.recv() => {
                    return Err(err?);
                }
                _ = shutdown.recv() => {
                    info!("Shutting down");
                    return Ok(());
                }
            }
        }
    }

    fn handle_swarm_event(
        &mut self,
        event: SwarmEvent<()>,
        err_chan: &Sender<Error>,
        shutdown: &Receiver<()>,
    ) -> Result<()> {
        match event {
            SwarmEvent::NewListenAddr { address, .. } => {
                info!("Start listening on {address}");
            }
            SwarmEvent::ConnectionEstablished { peer_id, .. } if self.peer == Some(peer_id) => {
                // Greet the peer once; the invariant is a single outbound
                // stream per run.
                self.peer = None;
                println!("Connected to peer: {peer_id}");
                self.spawn_greeter(peer_id, err_chan.clone(), shutdown.clone());
            }
            SwarmEvent::OutgoingConnectionError {
                peer_id: Some(peer_id),
                error,
                ..
            } if self.peer == Some(peer_id) => {
                return Err(Error::Connect(error.to_string()));
            }
            event => debug!("Swarm event: {event:?}"),
        }

        Ok(())
    }

    /// Spawns the greeter task for the given peer.
    fn spawn_greeter(&self, peer: PeerId, err_chan: Sender<Error>, shutdown: Receiver<()>) {
        let control = self.control.clone();
        let local_id = *self.swarm.local_peer_id();
        let interval = Duration::from_secs(self.config.greeting_interval);

        tokio::spawn(chat::run_greeter(
            control, peer, local_id, interval, err_chan, shutdown,
        ));
    }
}
