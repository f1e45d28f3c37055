use libp2p::Multiaddr;

/// The default listening address, bound to an OS-assigned TCP port.
pub const DEFAULT_LISTEN_ADDR: &str = "/ip4/0.0.0.0/tcp/0";

/// the Configuration for the chat node.
pub struct Config {
    /// A listening address to accept incoming connections.
    pub listen_addr: Multiaddr,
    /// An optional address of a peer to connect to and greet. The address
    /// must end with a `/p2p/` component carrying the peer identity.
    pub peer_addr: Option<String>,
    /// Interval at which the greeting message is sent to the connected peer,
    /// in seconds.
    pub greeting_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: DEFAULT_LISTEN_ADDR.parse().unwrap(),
            peer_addr: None,
            greeting_interval: 2,
        }
    }
}
