//! Drives the sniffer over buffered connection data.
//!
//! The sniffer itself never buffers, so this is where bytes are accumulated and
//! where the decision to wait for more data or give up is made.
pub mod pcap;

use serde::Serialize;

use crate::sniffer::containers::{SniffError, SniffHeader};
use crate::sniffer::core::sniff_ssh;

/// How many leading bytes of a connection we are willing to buffer while sniffing.
pub const DEFAULT_SNIFF_WINDOW: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Ssh(SniffHeader),
    /// Ran out of data (or window) before the sniffer could decide.
    NoClue,
    NotSsh,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SniffReport {
    /// Bytes handed to the sniffer on the final attempt.
    pub bytes: usize,
    /// Chunks consumed, which is also the number of sniff attempts.
    pub chunks: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl SniffReport {
    pub fn is_ssh(&self) -> bool {
        matches!(self.outcome, Outcome::Ssh(_))
    }
}

/// Feeds chunks into a growing buffer and sniffs after each one.
///
/// Stops at the first definite answer. Bytes past `window` are never looked at.
pub fn sniff_chunks<I, C>(chunks: I, window: usize) -> SniffReport
where
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let mut buf: Vec<u8> = Vec::new();
    let mut consumed = 0;
    let mut outcome = Outcome::NoClue;

    for chunk in chunks {
        if buf.len() >= window {
            log::debug!("Sniff window of {window} bytes exhausted.");
            break;
        }

        let chunk = chunk.as_ref();
        let room = window - buf.len();
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
        consumed += 1;

        match sniff_ssh(&buf) {
            Ok(header) => {
                outcome = Outcome::Ssh(header);
                break;
            }
            Err(SniffError::NotSsh) => {
                outcome = Outcome::NotSsh;
                break;
            }
            Err(SniffError::NoClue) => {
                log::trace!("No clue after {} bytes, waiting for more.", buf.len());
            }
        }
    }

    SniffReport {
        bytes: buf.len(),
        chunks: consumed,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniffer::containers::Version;

    #[test]
    fn classifies_once_enough_bytes_arrive() {
        let chunks = ["SSH-2.0", "-foo example.com:2222\r\n", "junk"];
        let report = sniff_chunks(chunks, DEFAULT_SNIFF_WINDOW);
        assert_eq!(report.chunks, 2);
        assert_eq!(report.bytes, 30);
        match report.outcome {
            Outcome::Ssh(header) => {
                assert_eq!(header.version, Version::Ssh2);
                assert_eq!(header.host().unwrap().to_string(), "example.com:2222");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn partial_line_is_rejected_early() {
        let report = sniff_chunks(["SSH-2.0-OpenSSH_9", ".6\r\n"], DEFAULT_SNIFF_WINDOW);
        assert_eq!(report.outcome, Outcome::NotSsh);
        assert_eq!(report.chunks, 1);
    }

    #[test]
    fn running_dry_is_no_clue() {
        let report = sniff_chunks(["SSH", "-1."], DEFAULT_SNIFF_WINDOW);
        assert_eq!(report.outcome, Outcome::NoClue);
        assert_eq!(report.chunks, 2);
        assert_eq!(report.bytes, 6);

        let empty: [&[u8]; 0] = [];
        assert_eq!(sniff_chunks(empty, DEFAULT_SNIFF_WINDOW).outcome, Outcome::NoClue);
    }

    #[test]
    fn window_caps_buffering() {
        let report = sniff_chunks(["SSH-", "1.5-", "x\n"], 8);
        assert_eq!(report.outcome, Outcome::NoClue);
        assert_eq!(report.bytes, 8);
        assert_eq!(report.chunks, 2);
    }

    #[test]
    fn report_json_shape() {
        let report = sniff_chunks(["SSH-1.5-x\n"], DEFAULT_SNIFF_WINDOW);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "ssh");
        assert_eq!(json["version"], "ssh1");
        assert_eq!(json["chunks"], 1);
    }
}
