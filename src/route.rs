//! The route triple shared by the consolidator and the renderers.

use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;

/// One line of a device routing table: network, dotted mask and description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    network: Ipv4Addr,
    mask: Ipv4Addr,
    description: String,
}

impl Route {
    /// Build a route. The mask is not required to be canonical; renderers
    /// report non-canonical masks per line.
    pub fn new(network: Ipv4Addr, mask: Ipv4Addr, description: impl Into<String>) -> Self {
        Self {
            network,
            mask,
            description: description.into(),
        }
    }

    /// Single-address route (`255.255.255.255`).
    pub fn host(ip: Ipv4Addr, description: impl Into<String>) -> Self {
        Self::new(ip, Ipv4Addr::BROADCAST, description)
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn mask(&self) -> Ipv4Addr {
        self.mask
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Prefix length for the mask, or `None` when the mask is not a
    /// contiguous run of ones.
    pub fn prefix_len(&self) -> Option<u8> {
        ipnet::ipv4_mask_to_prefix(self.mask).ok()
    }

    /// The network this route covers, with host bits cleared.
    pub fn net(&self) -> Option<Ipv4Net> {
        let prefix_len = self.prefix_len()?;
        Ipv4Net::new(self.network, prefix_len).ok().map(|n| n.trunc())
    }

    /// `network/len` using the network address as given.
    pub fn cidr(&self) -> Option<String> {
        self.prefix_len()
            .map(|len| format!("{}/{}", self.network, len))
    }

    /// Inverted mask, as used by Cisco-style wildcard notation.
    pub fn wildcard(&self) -> Ipv4Addr {
        Ipv4Addr::from(!u32::from(self.mask))
    }

    /// Whether `ip` falls inside the covered network.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.net().is_some_and(|net| net.contains(&ip))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.network, self.mask, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_len_canonical_masks() {
        let route = Route::new(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 255, 0, 0), "x");
        assert_eq!(route.prefix_len(), Some(16));
        assert_eq!(route.cidr().as_deref(), Some("10.0.0.0/16"));

        let host = Route::host(Ipv4Addr::new(1, 2, 3, 4), "x");
        assert_eq!(host.prefix_len(), Some(32));

        let all = Route::new(Ipv4Addr::UNSPECIFIED, Ipv4Addr::UNSPECIFIED, "x");
        assert_eq!(all.prefix_len(), Some(0));
    }

    #[test]
    fn test_prefix_len_non_canonical_mask() {
        let route = Route::new(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 0, 255, 0), "x");
        assert_eq!(route.prefix_len(), None);
        assert_eq!(route.cidr(), None);
        assert_eq!(route.net(), None);
        assert!(!route.contains(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_wildcard() {
        let route = Route::new(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 255, 255, 0), "x");
        assert_eq!(route.wildcard(), Ipv4Addr::new(0, 0, 0, 255));
        assert_eq!(Route::host(Ipv4Addr::LOCALHOST, "x").wildcard(), Ipv4Addr::UNSPECIFIED);
    }

    #[test]
    fn test_net_clears_host_bits() {
        let route = Route::new(Ipv4Addr::new(10, 1, 2, 3), Ipv4Addr::new(255, 255, 0, 0), "x");
        assert_eq!(route.net().unwrap().to_string(), "10.1.0.0/16");
        assert!(route.contains(Ipv4Addr::new(10, 1, 200, 7)));
        assert!(!route.contains(Ipv4Addr::new(10, 2, 0, 1)));
    }
}
