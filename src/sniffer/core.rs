//! Classification of SSH identification banners.
use super::address::parse_host;
use super::containers::{SniffError, SniffHeader, Version};

/// Below this many bytes a buffer is never classified.
pub const MIN_SNIFF_LEN: usize = 10;

pub const SSH1_PREFIX: &[u8] = b"SSH-1.5-";
pub const SSH2_PREFIX: &[u8] = b"SSH-2.0-";

/// Port assumed for a destination hint that names none.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Sniffs an SSH banner out of everything read from a connection so far.
///
/// [`SniffError::NoClue`] asks the caller to come back with more bytes,
/// [`SniffError::NotSsh`] means this buffer is not SSH. A buffer that does not end in `\n`
/// is rejected outright, even though more bytes might still complete the line.
///
/// For SSH2 banners the comment after the first space is read as a `host[:port]`
/// destination hint. A comment that does not parse simply leaves the destination empty.
pub fn sniff_ssh(buf: &[u8]) -> Result<SniffHeader, SniffError> {
    if buf.len() < MIN_SNIFF_LEN {
        log::trace!("{} bytes is too short for an SSH banner", buf.len());
        return Err(SniffError::NoClue);
    }

    if buf[buf.len() - 1] != b'\n' {
        log::trace!("Buffer does not end a line, not SSH.");
        return Err(SniffError::NotSsh);
    }

    if buf.starts_with(SSH1_PREFIX) {
        log::debug!("Sniffed SSH1 banner.");
        return Ok(SniffHeader::new(Version::Ssh1));
    }

    if !(buf.starts_with(SSH2_PREFIX) && buf[buf.len() - 2] == b'\r') {
        log::trace!("No SSH identification prefix.");
        return Err(SniffError::NotSsh);
    }

    let mut header = SniffHeader::new(Version::Ssh2);
    let ident = &buf[SSH2_PREFIX.len()..buf.len() - 2];

    let mut parts = ident.splitn(2, |&b| b == b' ');
    if let (Some(_software), Some(comment)) = (parts.next(), parts.next()) {
        // invalid UTF-8 becomes U+FFFD rather than losing the hint
        let comment = String::from_utf8_lossy(comment).trim().to_lowercase();
        header.destination = match parse_host(&comment, DEFAULT_SSH_PORT) {
            Ok(dest) => Some(dest),
            Err(e) => {
                log::debug!("Ignoring banner comment: {e}");
                None
            }
        };
    }

    log::debug!("Sniffed SSH2 banner, destination hint: {:?}", header.destination);
    Ok(header)
}
