//! Route table renderers for the supported devices and systems.
//!
//! Every format is a pure function of a route list and an optional category
//! name. Category-scoped output names the category in its header; unscoped
//! output is the combined "all routes" artifact. Formats that need a prefix
//! length derive it from the dotted mask and turn a non-canonical mask into a
//! comment line instead of failing.

mod host;
mod manual;
mod router;

use std::fmt;
use std::str::FromStr;

use crate::error::RouterusError;
use crate::route::Route;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteFormat {
    /// `route ADD` commands for cmd.exe
    Windows,
    /// `ip route add` commands
    Linux,
    /// RouterOS firewall address-list script
    Mikrotik,
    /// Keenetic CLI block
    Keenetic,
    /// OpenVPN server `push "route ..."` directives
    Openvpn,
    /// WireGuard `AllowedIPs` line
    Wireguard,
    /// Cisco IOS `ip route` with wildcard masks
    Cisco,
    /// Huawei VRP `ip route-static`
    Huawei,
    /// D-Link `create iproute`
    Dlink,
    /// OpenWrt `uci` command sequence
    Openwrt,
    /// TP-Link web UI instructions
    Tplink,
    /// ASUS web UI instructions
    Asus,
    /// Bare `network/len` list
    Cidr,
}

impl RouteFormat {
    /// Every format, in the order artifacts are generated.
    pub const ALL: [RouteFormat; 13] = [
        RouteFormat::Windows,
        RouteFormat::Linux,
        RouteFormat::Mikrotik,
        RouteFormat::Keenetic,
        RouteFormat::Openvpn,
        RouteFormat::Wireguard,
        RouteFormat::Cisco,
        RouteFormat::Huawei,
        RouteFormat::Dlink,
        RouteFormat::Openwrt,
        RouteFormat::Tplink,
        RouteFormat::Asus,
        RouteFormat::Cidr,
    ];

    /// Identifier used on the command line and as the output directory name.
    pub fn id(self) -> &'static str {
        match self {
            RouteFormat::Windows => "windows",
            RouteFormat::Linux => "linux",
            RouteFormat::Mikrotik => "mikrotik",
            RouteFormat::Keenetic => "keenetic",
            RouteFormat::Openvpn => "openvpn",
            RouteFormat::Wireguard => "wireguard",
            RouteFormat::Cisco => "cisco",
            RouteFormat::Huawei => "huawei",
            RouteFormat::Dlink => "dlink",
            RouteFormat::Openwrt => "openwrt",
            RouteFormat::Tplink => "tplink",
            RouteFormat::Asus => "asus",
            RouteFormat::Cidr => "cidr",
        }
    }

    /// One-line description for listings.
    pub fn summary(self) -> &'static str {
        match self {
            RouteFormat::Windows => "Windows route ADD commands",
            RouteFormat::Linux => "Linux ip route commands",
            RouteFormat::Mikrotik => "MikroTik RouterOS address-list script",
            RouteFormat::Keenetic => "Keenetic CLI commands",
            RouteFormat::Openvpn => "OpenVPN push route directives",
            RouteFormat::Wireguard => "WireGuard AllowedIPs list",
            RouteFormat::Cisco => "Cisco IOS ip route commands",
            RouteFormat::Huawei => "Huawei ip route-static commands",
            RouteFormat::Dlink => "D-Link create iproute commands",
            RouteFormat::Openwrt => "OpenWrt uci commands",
            RouteFormat::Tplink => "TP-Link web interface instructions",
            RouteFormat::Asus => "ASUS web interface instructions",
            RouteFormat::Cidr => "Plain CIDR list",
        }
    }

    /// Render routes in this format.
    pub fn render(self, routes: &[Route], category: Option<&str>) -> String {
        match self {
            RouteFormat::Windows => host::windows(routes, category),
            RouteFormat::Linux => host::linux(routes, category),
            RouteFormat::Mikrotik => router::mikrotik(routes, category),
            RouteFormat::Keenetic => router::keenetic(routes, category),
            RouteFormat::Openvpn => host::openvpn(routes, category),
            RouteFormat::Wireguard => host::wireguard(routes, category),
            RouteFormat::Cisco => router::cisco(routes, category),
            RouteFormat::Huawei => router::huawei(routes, category),
            RouteFormat::Dlink => router::dlink(routes, category),
            RouteFormat::Openwrt => router::openwrt(routes, category),
            RouteFormat::Tplink => manual::tplink(routes, category),
            RouteFormat::Asus => manual::asus(routes, category),
            RouteFormat::Cidr => host::cidr(routes, category),
        }
    }
}

impl fmt::Display for RouteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RouteFormat {
    type Err = RouterusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        RouteFormat::ALL
            .into_iter()
            .find(|format| format.id() == wanted)
            .ok_or_else(|| RouterusError::UnknownFormat(s.to_string()))
    }
}

/// Render routes by format identifier.
pub fn render(
    format_id: &str,
    routes: &[Route],
    category: Option<&str>,
) -> Result<String, RouterusError> {
    let format: RouteFormat = format_id.parse()?;
    Ok(format.render(routes, category))
}

/// Parse a list of format identifiers; an empty list selects every format.
pub fn parse_formats<S: AsRef<str>>(ids: &[S]) -> Result<Vec<RouteFormat>, RouterusError> {
    if ids.is_empty() {
        return Ok(RouteFormat::ALL.to_vec());
    }

    let mut formats = Vec::with_capacity(ids.len());
    for id in ids {
        let format: RouteFormat = id.as_ref().parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

/// Parse a line of the cidr format back into `(network, prefix_len)`.
pub fn parse_cidr_line(line: &str) -> Option<(std::net::Ipv4Addr, u8)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let cidr = line.split_whitespace().next()?;
    let (addr, len) = cidr.split_once('/')?;
    let len: u8 = len.parse().ok()?;
    if len > 32 {
        return None;
    }
    Some((addr.parse().ok()?, len))
}

/// Header line followed by a blank line.
fn header(marker: &str, category: Option<&str>) -> String {
    match category {
        Some(category) => format!("{} Routes for category {}\n\n", marker, category),
        None => format!("{} Routes for all categories\n\n", marker),
    }
}

/// Comment line standing in for a route whose mask has no prefix length.
fn invalid_route(marker: &str, route: &Route) -> String {
    format!(
        "{} Invalid route: {}/{} # {}\n",
        marker,
        route.network(),
        route.mask(),
        route.description()
    )
}
