use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::address::Destination;

/// SSH protocol generation declared by a banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    Ssh1,
    Ssh2,
}

impl Version {
    /// Protocol name handed to the routing layer.
    pub fn protocol(&self) -> &'static str {
        match self {
            Version::Ssh1 => "ssh1",
            Version::Ssh2 => "ssh2",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.protocol())
    }
}

/// Result of a successful sniff.
///
/// Built fresh on every call and holds nothing borrowed from the sniffed buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SniffHeader {
    pub version: Version,
    pub destination: Option<Destination>,
}

impl SniffHeader {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            destination: None,
        }
    }

    pub fn protocol(&self) -> &'static str {
        self.version.protocol()
    }

    /// Destination hint from the banner comment, `host:port` when displayed.
    pub fn host(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    /// Address part of the destination hint, or an empty string.
    pub fn domain(&self) -> String {
        self.destination
            .as_ref()
            .map(|dest| dest.address.to_string())
            .unwrap_or_default()
    }
}

/// Why a buffer did not classify as SSH.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize)]
pub enum SniffError {
    /// Too few bytes to decide, sniff again once more have arrived.
    #[error("not enough data to classify")]
    NoClue,
    /// The buffer is not an SSH banner.
    #[error("not SSH")]
    NotSsh,
}

impl SniffError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SniffError::NoClue)
    }
}
