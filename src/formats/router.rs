//! Router CLI formats: MikroTik, Keenetic, Cisco, Huawei, D-Link and OpenWrt.

use super::{header, invalid_route};
use crate::route::Route;

/// Address list used by the MikroTik script when no category is given.
const DEFAULT_MIKROTIK_LIST: &str = "RU_Services";

pub(super) fn mikrotik(routes: &[Route], category: Option<&str>) -> String {
    let list_name = match category {
        Some(category) => category.replace(' ', "_"),
        None => DEFAULT_MIKROTIK_LIST.to_string(),
    };

    let mut content = header("#", category);
    content.push_str("/ip firewall address-list\n");

    for route in routes {
        match route.cidr() {
            Some(cidr) => content.push_str(&format!(
                "add list={} address={} comment=\"{}\"\n",
                list_name,
                cidr,
                route.description()
            )),
            None => content.push_str(&invalid_route("#", route)),
        }
    }

    content
}

pub(super) fn keenetic(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("!", category);
    content.push_str("! Enter configuration mode first\n");
    content.push_str("configure terminal\n\n");

    for route in routes {
        let Some(net) = route.net() else {
            content.push_str(&invalid_route("!", route));
            content.push('\n');
            continue;
        };

        let (network, mask) = (net.network(), net.netmask());
        content.push_str(&format!("! Route for {}\n", route.description()));
        content.push_str(&format!("ip route {} {} interface global\n", network, mask));
        content.push_str(&format!(
            "ip route {} {} name \"{}\"\n",
            network,
            mask,
            route.description()
        ));
        content.push_str(&format!("ip route {} {} exclusive\n\n", network, mask));
    }

    content.push_str("! Save the configuration\n");
    content.push_str("end\n");
    content.push_str("system configuration save\n");
    content
}

pub(super) fn cisco(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("!", category);
    content.push_str("configure terminal\n");

    for route in routes {
        if route.prefix_len().is_none() {
            content.push_str(&invalid_route("!", route));
            continue;
        }
        content.push_str(&format!(
            "ip route {} {} %gateway% ! {}\n",
            route.network(),
            route.wildcard(),
            route.description()
        ));
    }

    content.push_str("end\n");
    content.push_str("write memory\n");
    content
}

pub(super) fn huawei(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("#", category);
    content.push_str("system-view\n");

    for route in routes {
        content.push_str(&format!(
            "ip route-static {} {} %gateway% description \"{}\"\n",
            route.network(),
            route.mask(),
            route.description()
        ));
    }

    content.push_str("commit\n");
    content.push_str("quit\n");
    content
}

pub(super) fn dlink(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("#", category);

    for route in routes {
        content.push_str(&format!(
            "create iproute {} {} %gateway% 1 # {}\n",
            route.network(),
            route.mask(),
            route.description()
        ));
    }

    content.push_str("save\n");
    content
}

pub(super) fn openwrt(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("#", category);

    for route in routes {
        if route.prefix_len().is_none() {
            content.push_str(&invalid_route("#", route));
            content.push('\n');
            continue;
        }
        content.push_str("uci add network route\n");
        content.push_str("uci set network.@route[-1].interface='wan'\n");
        content.push_str(&format!("uci set network.@route[-1].target='{}'\n", route.network()));
        content.push_str(&format!("uci set network.@route[-1].netmask='{}'\n", route.mask()));
        content.push_str("uci set network.@route[-1].gateway='%gateway%'\n");
        content.push_str(&format!("# {}\n\n", route.description()));
    }

    content.push_str("uci commit network\n");
    content.push_str("/etc/init.d/network restart\n");
    content
}
