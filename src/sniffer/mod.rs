//! The SSH banner sniffer.
//! Stateless: every call looks at the whole buffer from the start.
pub mod address;
pub mod containers;
pub mod core;
