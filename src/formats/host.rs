//! Host-level formats: Windows, Linux, OpenVPN, WireGuard and plain CIDR.

use super::{header, invalid_route};
use crate::route::Route;

pub(super) fn windows(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("::", category);

    for route in routes {
        content.push_str(&format!(
            "route ADD {} MASK {} 0.0.0.0 :: {}\n",
            route.network(),
            route.mask(),
            route.description()
        ));
    }

    content
}

pub(super) fn linux(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("#", category);

    for route in routes {
        match route.cidr() {
            Some(cidr) => content.push_str(&format!(
                "ip route add {} via %gateway% dev %interface% # {}\n",
                cidr,
                route.description()
            )),
            None => content.push_str(&invalid_route("#", route)),
        }
    }

    content.push_str(
        "\n# Replace %gateway% with your gateway address and %interface% with the interface name\n",
    );
    content
}

pub(super) fn openvpn(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("#", category);

    for route in routes {
        content.push_str(&format!(
            "push \"route {} {}\" # {}\n",
            route.network(),
            route.mask(),
            route.description()
        ));
    }

    content
}

pub(super) fn wireguard(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("#", category);
    content.push_str("# Add these networks to the [Peer] section of your WireGuard configuration\n");
    content.push_str("# instead of the catch-all AllowedIPs = 0.0.0.0/0, ::/0\n\n");

    let mut allowed_ips = Vec::with_capacity(routes.len());
    for route in routes {
        match route.cidr() {
            Some(cidr) => allowed_ips.push(cidr),
            None => content.push_str(&invalid_route("#", route)),
        }
    }

    content.push_str(&format!("AllowedIPs = {}\n", allowed_ips.join(", ")));
    content
}

pub(super) fn cidr(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("#", category);

    for route in routes {
        match route.cidr() {
            Some(cidr) => content.push_str(&format!("{} # {}\n", cidr, route.description())),
            None => content.push_str(&invalid_route("#", route)),
        }
    }

    content
}
