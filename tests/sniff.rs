use bannersniff::capture::{sniff_chunks, Outcome, DEFAULT_SNIFF_WINDOW};
use bannersniff::capture::pcap::split_chunks;
use bannersniff::{sniff_ssh, SniffError, Version};
use pretty_assertions::assert_eq;

#[test]
fn anything_short_is_undecided() {
    for len in 0..10 {
        let buf = vec![b'\n'; len];
        assert_eq!(sniff_ssh(&buf), Err(SniffError::NoClue));
        assert_eq!(sniff_ssh(&b"SSH-2.0-foo example.com\r\n"[..len]), Err(SniffError::NoClue));
    }
}

#[test]
fn missing_newline_is_never_ssh() {
    let banner = b"SSH-2.0-foo example.com:2222\r\n";
    for len in 10..banner.len() {
        assert_eq!(sniff_ssh(&banner[..len]), Err(SniffError::NotSsh), "prefix of {len} bytes");
    }
}

#[test]
fn destination_hints() {
    let cases: [(&[u8], Option<&str>, &str); 4] = [
        (b"SSH-2.0-foo example.com:2222\r\n", Some("example.com:2222"), "example.com"),
        (b"SSH-2.0-foo EXAMPLE.COM\r\n", Some("example.com:22"), "example.com"),
        (
            b"SSH-2.0-OpenSSH_8.9p1 Ubuntu-3ubuntu0.6\r\n",
            Some("ubuntu-3ubuntu0.6:22"),
            "ubuntu-3ubuntu0.6",
        ),
        (b"SSH-2.0-openssh_8.1\r\n", None, ""),
    ];

    for (banner, host, domain) in cases {
        let header = sniff_ssh(banner).unwrap();
        assert_eq!(header.version, Version::Ssh2);
        assert_eq!(header.host().map(|d| d.to_string()).as_deref(), host);
        assert_eq!(header.domain(), domain);
    }
}

#[test]
fn banner_trickling_in_one_byte_at_a_time() {
    let report = sniff_chunks(split_chunks(b"SSH-1.5-x\n", 1), DEFAULT_SNIFF_WINDOW);
    assert_eq!(report.outcome, Outcome::Ssh(sniff_ssh(b"SSH-1.5-x\n").unwrap()));
    assert_eq!(report.chunks, 10);

    // a 10 byte prefix without the newline already counts as not SSH
    let report = sniff_chunks(split_chunks(b"SSH-2.0-OpenSSH_9.6\r\n", 1), DEFAULT_SNIFF_WINDOW);
    assert_eq!(report.outcome, Outcome::NotSsh);
    assert_eq!(report.chunks, 10);
}
