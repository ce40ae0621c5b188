//! Passive SSH banner sniffing.
//!
//! [`sniffer`] classifies the leading bytes of a connection as an SSH banner (or not),
//! [`capture`] drives it over buffered traffic the way a connection router would.
pub mod capture;
pub mod sniffer;

pub use sniffer::containers::{SniffError, SniffHeader, Version};
pub use sniffer::core::sniff_ssh;
