//! Loads connection data out of capture files, or raw byte dumps.
use chrono::{DateTime, Utc};
use rtshark::{Packet, RTShark};
use serde::Serialize;
use std::collections::HashMap;
use std::{fs, io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to spawn tshark: {0}")]
    Spawn(#[source] io::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// One direction of a TCP stream, with its payloads in capture order.
#[derive(Clone, Debug, Serialize)]
pub struct Flow {
    pub stream: u32,
    pub src: String,
    pub dst: String,
    /// Lower source port than destination port, the usual sign of a server.
    pub from_server: bool,
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub payloads: Vec<Vec<u8>>,
}

/// Loads PCAP/PCAPNG file via rtshark.
///
/// Only packets carrying TCP payload are kept, retransmissions are filtered out
/// so the payloads of a flow concatenate into what the receiver actually read.
/// With `stream` set to anything but -1 only that TCP stream is collected.
pub fn load_file(filepath: &str, stream: i32) -> Result<Vec<Flow>, CaptureError> {
    log::info!("Loading capture file.");

    let filter = String::from("\
        tcp.len > 0 &&\
        !tcp.analysis.spurious_retransmission &&\
        !tcp.analysis.retransmission &&\
        !tcp.analysis.fast_retransmission\
    ");

    let builder = rtshark::RTSharkBuilder::builder()
        .input_path(filepath)
        .display_filter(&filter);

    let mut rtshark = builder.spawn().map_err(CaptureError::Spawn)?;
    log::info!("Reading from {}", filepath);

    let flows = get_flows(&mut rtshark, stream);
    rtshark.kill();

    Ok(flows)
}

/// Treats a file as the leading bytes of a single connection, cut into `chunk` sized reads.
pub fn load_raw(filepath: &str, chunk: usize) -> Result<Flow, CaptureError> {
    let data = fs::read(Path::new(filepath)).map_err(|source| CaptureError::Read {
        path: filepath.to_string(),
        source,
    })?;
    log::info!("Read {} bytes from {}", data.len(), filepath);

    Ok(Flow {
        stream: 0,
        src: filepath.to_string(),
        dst: String::from("-"),
        from_server: false,
        first_seen: None,
        payloads: split_chunks(&data, chunk),
    })
}

/// A `chunk` of 0 keeps the data in one piece.
pub fn split_chunks(data: &[u8], chunk: usize) -> Vec<Vec<u8>> {
    if chunk == 0 {
        return vec![data.to_vec()];
    }
    data.chunks(chunk).map(<[u8]>::to_vec).collect()
}

/// Iterates through rtshark packets, grouping payloads per stream and direction.
fn get_flows(rtshark: &mut RTShark, stream: i32) -> Vec<Flow> {
    log::info!("Collecting flows.");
    let mut flows: Vec<Flow> = Vec::new();
    let mut index: HashMap<(u32, u32), usize> = HashMap::new();

    while let Some(packet) = rtshark.read().unwrap_or_else(|e| {
        log::error!("Error parsing TShark output when collecting flows: {e}");
        None
    }) {
        let Some(tcp) = packet.layer_name("tcp") else {
            continue;
        };

        let stream_id = match tcp.metadata("tcp.stream").map(|m| m.value().parse::<u32>()) {
            Some(Ok(stream_id)) => stream_id,
            _ => {
                log::warn!("Failed to parse tcp.stream metadata as u32");
                continue;
            }
        };
        if stream != -1 && i64::from(stream_id) != i64::from(stream) {
            continue;
        }

        let (Some(srcport), Some(dstport)) =
            (port(&packet, "tcp.srcport"), port(&packet, "tcp.dstport"))
        else {
            log::warn!("Skipping packet in stream {stream_id} without ports");
            continue;
        };

        let Some(payload) = payload(&packet) else {
            log::warn!("Skipping packet in stream {stream_id} with undecodable payload");
            continue;
        };

        let slot = *index.entry((stream_id, srcport)).or_insert_with(|| {
            flows.push(Flow {
                stream: stream_id,
                src: endpoint(&packet, "src", srcport),
                dst: endpoint(&packet, "dst", dstport),
                from_server: srcport < dstport,
                first_seen: timestamp(&packet),
                payloads: Vec::new(),
            });
            flows.len() - 1
        });
        flows[slot].payloads.push(payload);
    }

    flows
}

fn port(packet: &Packet, field: &str) -> Option<u32> {
    packet.layer_name("tcp")?.metadata(field)?.value().parse().ok()
}

/// TShark prints payload bytes as colon separated hex.
fn payload(packet: &Packet) -> Option<Vec<u8>> {
    let raw = packet.layer_name("tcp")?.metadata("tcp.payload")?.value();
    decode_payload(raw)
}

fn decode_payload(raw: &str) -> Option<Vec<u8>> {
    let digits: String = raw.chars().filter(|c| *c != ':').collect();
    hex::decode(digits).ok()
}

fn endpoint(packet: &Packet, side: &str, port: u32) -> String {
    let ip = ["ip", "ipv6"].iter().find_map(|layer| {
        packet
            .layer_name(layer)?
            .metadata(&format!("{layer}.{side}"))
            .map(|m| m.value().to_string())
    });

    match ip {
        Some(ip) if ip.contains(':') => format!("[{ip}]:{port}"),
        Some(ip) => format!("{ip}:{port}"),
        None => format!("?:{port}"),
    }
}

fn timestamp(packet: &Packet) -> Option<DateTime<Utc>> {
    let epoch = packet.layer_name("frame")?.metadata("frame.time_epoch")?.value();
    parse_epoch(epoch)
}

/// Parses `seconds[.fraction]` as printed by TShark.
fn parse_epoch(epoch: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = epoch.split_once('.').unwrap_or((epoch, ""));
    let secs: i64 = secs.parse().ok()?;
    let nanos = if frac.is_empty() {
        0
    } else {
        let digits: String = frac.chars().take(9).collect();
        format!("{digits:0<9}").parse::<u32>().ok()?
    };

    DateTime::from_timestamp(secs, nanos)
}
