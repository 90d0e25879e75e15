//! Human-readable instructions for routers configured through a web UI.

use super::{header, invalid_route};
use crate::route::Route;

pub(super) fn tplink(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("#", category);
    content.push_str("# To add static routes on a TP-Link router:\n");
    content.push_str("# 1. Open the administrator web interface\n");
    content.push_str("# 2. Go to Network -> Static Routing\n");
    content.push_str("# 3. Add the following routes:\n\n");

    for (i, route) in routes.iter().enumerate() {
        content.push_str(&format!(
            "# {}. Destination: {}, Subnet mask: {}, Gateway: [your gateway], Description: {}\n",
            i + 1,
            route.network(),
            route.mask(),
            route.description()
        ));
    }

    content
}

pub(super) fn asus(routes: &[Route], category: Option<&str>) -> String {
    let mut content = header("#", category);
    content.push_str("# To add static routes on an ASUS router:\n");
    content.push_str("# 1. Open the administrator web interface\n");
    content.push_str("# 2. Go to Advanced Settings -> LAN -> Route\n");
    content.push_str("# 3. Add the following routes:\n\n");

    for (i, route) in routes.iter().enumerate() {
        match route.cidr() {
            Some(cidr) => content.push_str(&format!(
                "# {}. Network: {}, Gateway: [your gateway], Interface: WAN, Description: {}\n",
                i + 1,
                cidr,
                route.description()
            )),
            None => content.push_str(&invalid_route("#", route)),
        }
    }

    content
}
