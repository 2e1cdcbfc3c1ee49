use std::net::{Ipv4Addr, Ipv6Addr};

use orch_model::{EndpointSettings, NetworkingConfig};

use super::{DEFAULT_NETWORK, network_name};
use crate::{Flag, RunOptions, TranslateError, units};

/// Build the networking bundle.
///
/// Endpoint settings are only produced when an endpoint-scoped flag is present; they are keyed by
/// the `--network` name, or `default`.
pub fn map_network(opts: &RunOptions) -> Result<NetworkingConfig, TranslateError> {
    let mut endpoint = EndpointSettings::default();

    if let Some(ip) = opts.last(Flag::Ip) {
        let addr = ip
            .parse::<Ipv4Addr>()
            .map_err(|_| TranslateError::invalid(Flag::Ip.long(), ip, "not an IPv4 address"))?;
        endpoint.ipv4_address = Some(addr);
    }

    if let Some(ip) = opts.last(Flag::Ip6) {
        let addr = ip
            .parse::<Ipv6Addr>()
            .map_err(|_| TranslateError::invalid(Flag::Ip6.long(), ip, "not an IPv6 address"))?;
        endpoint.ipv6_address = Some(addr);
    }

    for alias in opts.values(Flag::NetworkAlias) {
        if alias.trim().is_empty() {
            return Err(TranslateError::invalid(Flag::NetworkAlias.long(), alias, "empty alias"));
        }
        endpoint.aliases.push(alias.to_string());
    }

    for link in opts.values(Flag::Link) {
        let valid = match link.split_once(':') {
            Some((name, alias)) => !name.is_empty() && !alias.is_empty(),
            None => !link.is_empty(),
        };
        if !valid {
            return Err(TranslateError::invalid(Flag::Link.long(), link, "expected name[:alias]"));
        }
        endpoint.links.push(link.to_string());
    }

    if let Some(mac) = opts.last(Flag::MacAddress) {
        if !units::is_mac_address(mac) {
            return Err(TranslateError::invalid(Flag::MacAddress.long(), mac, "not a MAC address"));
        }
        endpoint.mac_address = Some(mac.to_ascii_lowercase());
    }

    let mut cfg = NetworkingConfig::default();
    if !endpoint.is_empty() {
        let name = network_name(opts).unwrap_or(DEFAULT_NETWORK);
        cfg.endpoints.insert(name.to_string(), endpoint);
    }
    Ok(cfg)
}
