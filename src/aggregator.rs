//! Consolidation of resolved addresses into routes.
//!
//! Addresses are grouped by their first two and first three octets. A /16
//! group with more than [`SUBNET16_THRESHOLD`] members becomes one route, then
//! a /24 group with more than [`SUBNET24_THRESHOLD`] still-unclaimed members
//! does, and whatever is left is routed per address. Only /16, /24 and /32
//! routes are ever produced.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::net::Ipv4Addr;
use tracing::{debug, info};

use crate::resolution::CategoryIps;
use crate::route::Route;

/// A /16 is emitted only above this many unclaimed members.
pub const SUBNET16_THRESHOLD: usize = 20;

/// A /24 is emitted only above this many unclaimed members.
pub const SUBNET24_THRESHOLD: usize = 5;

pub const MASK_16: Ipv4Addr = Ipv4Addr::new(255, 255, 0, 0);
pub const MASK_24: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);
pub const MASK_32: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 255);

/// Consolidate one category's addresses into routes.
///
/// Output order is /16 routes, then /24 routes, then /32 routes, each
/// ascending by network address. A /32 route is described by the first
/// domain (in name order) of the category that resolved to it.
pub fn consolidate(category: &str, ips: &CategoryIps) -> Vec<Route> {
    let mut by_16: BTreeMap<[u8; 2], Vec<Ipv4Addr>> = BTreeMap::new();
    let mut by_24: BTreeMap<[u8; 3], Vec<Ipv4Addr>> = BTreeMap::new();

    for ip in ips.ips() {
        let [a, b, c, _] = ip.octets();
        by_16.entry([a, b]).or_default().push(*ip);
        by_24.entry([a, b, c]).or_default().push(*ip);
    }

    let mut claimed: HashSet<Ipv4Addr> = HashSet::new();
    let mut routes = Vec::new();

    for ([a, b], members) in &by_16 {
        let unclaimed: Vec<Ipv4Addr> = members
            .iter()
            .filter(|ip| !claimed.contains(*ip))
            .copied()
            .collect();
        if unclaimed.len() > SUBNET16_THRESHOLD {
            routes.push(Route::new(
                Ipv4Addr::new(*a, *b, 0, 0),
                MASK_16,
                format!("{} subnet {}.{}.0.0/16", category, a, b),
            ));
            claimed.extend(unclaimed);
        }
    }

    for ([a, b, c], members) in &by_24 {
        let unclaimed: Vec<Ipv4Addr> = members
            .iter()
            .filter(|ip| !claimed.contains(*ip))
            .copied()
            .collect();
        if unclaimed.len() > SUBNET24_THRESHOLD {
            routes.push(Route::new(
                Ipv4Addr::new(*a, *b, *c, 0),
                MASK_24,
                format!("{} subnet {}.{}.{}.0/24", category, a, b, c),
            ));
            claimed.extend(unclaimed);
        }
    }

    for ip in ips.ips() {
        if claimed.contains(ip) {
            continue;
        }
        let description = match ips.owner_of(*ip) {
            Some(domain) => format!("{} {}", category, domain),
            None => format!("{} IP {}", category, ip),
        };
        routes.push(Route::host(*ip, description));
    }

    info!(
        "Category {}: consolidated {} IPs into {} routes",
        category,
        ips.len(),
        routes.len()
    );
    routes
}

/// Parse dotted-quad strings, silently dropping anything that is not IPv4.
pub fn parse_ipv4_set<'a>(values: impl IntoIterator<Item = &'a str>) -> BTreeSet<Ipv4Addr> {
    values
        .into_iter()
        .filter_map(|value| match value.trim().parse::<Ipv4Addr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                debug!("Skipping malformed IPv4 address: {}", value);
                None
            }
        })
        .collect()
}

/// Number of addresses covered by a route list.
///
/// Routes with a non-canonical mask cover nothing. Saturates on overflow.
pub fn count_covered(routes: &[Route]) -> u64 {
    routes
        .iter()
        .filter_map(Route::prefix_len)
        .map(|len| 1u64 << (32 - u32::from(len)))
        .fold(0u64, |acc, n| acc.saturating_add(n))
}
