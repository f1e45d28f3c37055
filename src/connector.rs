use libp2p::{multiaddr::Protocol, Multiaddr, PeerId};

use crate::{Error, Result};

/// Resolves a textual peer address into a peer identity and a dialable
/// address.
///
/// The address must be a valid multiaddress terminated by a `/p2p/`
/// component carrying the remote peer identity, for example
/// `/ip4/127.0.0.1/tcp/4001/p2p/12D3KooW...`. Resolution is purely
/// syntactic and performs no network I/O.
pub(crate) fn resolve(peer_addr: &str) -> Result<(PeerId, Multiaddr)> {
    let addr: Multiaddr = peer_addr.parse()?;

    let peer_id = match addr.iter().last() {
        Some(Protocol::P2p(peer_id)) => peer_id,
        _ => {
            return Err(Error::AddressInfo(
                "address does not end with a peer identity",
            ))
        }
    };

    Ok((peer_id, addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_valid_address() {
        let peer_id = PeerId::random();
        let addr = format!("/ip4/127.0.0.1/tcp/4001/p2p/{peer_id}");

        let (resolved_id, resolved_addr) = resolve(&addr).unwrap();
        assert_eq!(resolved_id, peer_id);
        assert_eq!(resolved_addr.to_string(), addr);
    }

    #[test]
    fn test_resolve_malformed_address() {
        let result = resolve("not an address");
        assert!(matches!(result, Err(Error::AddressParse(_))));
    }

    #[test]
    fn test_resolve_address_without_peer_id() {
        let result = resolve("/ip4/127.0.0.1/tcp/4001");
        assert!(matches!(result, Err(Error::AddressInfo(_))));
    }
}
