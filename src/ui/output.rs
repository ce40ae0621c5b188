use ansi_term::Colour;
use bannersniff::capture::pcap::Flow;
use bannersniff::capture::{Outcome, SniffReport};
use serde::Serialize;
use std::{fs, io, path::Path};

#[derive(Serialize)]
struct FlowResult<'a> {
    #[serde(flatten)]
    flow: &'a Flow,
    sniff: &'a SniffReport,
}

pub fn print_results(results: &[(Flow, SniffReport)]) {
    println!("\n\u{250F}\u{2501}\u{2501}\u{2501}\u{2501} Results");
    for (flow, report) in results {
        print_flow(flow, report);
    }
    let ssh = results.iter().filter(|(_, report)| report.is_ssh()).count();
    let ssh = Colour::Green.paint(ssh.to_string());
    println!("\u{2517} {} of {} flows are SSH", ssh, results.len());
}

pub fn print_flow(flow: &Flow, report: &SniffReport) {
    let side = if flow.from_server { "server" } else { "client" };
    println!("\u{2503}");
    println!("\u{2503} Stream {} ({side})", Colour::Red.paint(flow.stream.to_string()));
    println!("\u{2503} Flow             : {} -> {}", flow.src, flow.dst);
    if let Some(seen) = flow.first_seen {
        println!("\u{2503} First seen       : {}", seen.to_rfc3339());
    }
    match &report.outcome {
        Outcome::Ssh(header) => {
            let host = header.host().map(ToString::to_string).unwrap_or_else(|| String::from("-"));
            println!("\u{2503} Protocol         : {}", Colour::Fixed(226).paint(header.protocol()));
            println!("\u{2503} Destination hint : {}", Colour::Fixed(226).paint(host));
        }
        Outcome::NotSsh => {
            println!("\u{2503} Protocol         : {}", Colour::Fixed(244).paint("not ssh"))
        }
        Outcome::NoClue => {
            println!("\u{2503} Protocol         : {}", Colour::Fixed(244).paint("undecided"))
        }
    }
    println!("\u{2503} Sniffed          : {} bytes in {} reads", report.bytes, report.chunks);
}

pub fn data_as_json(results: &[(Flow, SniffReport)]) -> serde_json::Result<String> {
    let rows: Vec<FlowResult> = results
        .iter()
        .map(|(flow, sniff)| FlowResult { flow, sniff })
        .collect();
    serde_json::to_string_pretty(&rows)
}

pub fn data_to_file(json: String, path: &Path) -> io::Result<()> {
    log::info!("Writing results to {}", path.display());
    fs::write(path, json)
}
