//! Host address parsing for destination hints.
//!
//! Accepts `host`, `host:port`, `[v6]` and `[v6]:port`. IPv6 literals must be bracketed
//! once a port is involved, a bare `::1` is rejected as having too many colons.
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AddrError {
    #[error("too many colons in address {0:?}")]
    TooManyColons(String),
    #[error("missing ']' in address {0:?}")]
    MissingBracket(String),
    #[error("unexpected '{1}' in address {0:?}")]
    UnexpectedBracket(String, char),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Address {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Domain(String),
}

impl Address {
    /// Never fails: anything that is not an IP literal is a domain.
    pub fn parse(raw: &str) -> Self {
        let unbracketed = raw
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(raw);

        match unbracketed.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => Address::Ipv4(ip),
            // v4-mapped addresses are treated as the v4 address they carry
            Ok(IpAddr::V6(ip)) => match ip.to_ipv4_mapped() {
                Some(v4) => Address::Ipv4(v4),
                None => Address::Ipv6(ip),
            },
            Err(_) => Address::Domain(unbracketed.to_string()),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Address::Ipv4(ip) => write!(f, "{ip}"),
            Address::Ipv6(ip) => write!(f, "[{ip}]"),
            Address::Domain(domain) => f.write_str(domain),
        }
    }
}

/// A TCP destination: address plus port.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Destination {
    pub address: Address,
    pub port: u16,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses `host` or `host:port`, falling back to `default_port` when no port is given.
pub fn parse_host(raw: &str, default_port: u16) -> Result<Destination, AddrError> {
    let (host, port) = match split_host_port(raw)? {
        Some((host, port)) => (host, port),
        None => (raw, ""),
    };

    let port = if port.is_empty() {
        default_port
    } else {
        port.parse::<u16>()
            .map_err(|_| AddrError::InvalidPort(port.to_string()))?
    };

    Ok(Destination {
        address: Address::parse(host),
        port,
    })
}

/// Splits at the last colon. `Ok(None)` means there is no port part at all.
fn split_host_port(raw: &str) -> Result<Option<(&str, &str)>, AddrError> {
    let Some(colon) = raw.rfind(':') else {
        return Ok(None);
    };

    let (host, host_start, host_end) = if raw.starts_with('[') {
        let Some(close) = raw.find(']') else {
            return Err(AddrError::MissingBracket(raw.to_string()));
        };
        if close + 1 == raw.len() {
            // [v6] without a port
            return Ok(None);
        }
        if close + 1 != colon {
            if raw.as_bytes()[close + 1] == b':' {
                return Err(AddrError::TooManyColons(raw.to_string()));
            }
            return Ok(None);
        }
        (&raw[1..close], 1, close + 1)
    } else {
        let host = &raw[..colon];
        if host.contains(':') {
            return Err(AddrError::TooManyColons(raw.to_string()));
        }
        (host, 0, 0)
    };

    if raw[host_start..].contains('[') {
        return Err(AddrError::UnexpectedBracket(raw.to_string(), '['));
    }
    if raw[host_end..].contains(']') {
        return Err(AddrError::UnexpectedBracket(raw.to_string(), ']'));
    }

    Ok(Some((host, &raw[colon + 1..])))
}
