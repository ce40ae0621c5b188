mod ui;

use bannersniff::capture::pcap::{self, Flow};
use bannersniff::capture::{self, SniffReport, DEFAULT_SNIFF_WINDOW};
use clap::{ArgAction, Parser};
use std::{fs, process};
use ui::output;

/// bannersniff spots SSH banners, and the destination hints they carry, in captured traffic
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// pcap/pcapng file to analyze, or a raw byte dump with --raw
    #[arg(short = 'f', long, value_parser)]
    file: String,

    /// Treat the file as the leading bytes of a single connection
    #[arg(short = 'r', long, action = ArgAction::SetTrue)]
    raw: bool,

    /// Perform analysis only on stream n
    #[arg(short, long, default_value_t = -1, value_parser)]
    nstream: i32,

    /// Size of the simulated reads a raw file is split into, 0 reads it whole
    #[arg(short = 'c', long, default_value_t = 0, value_parser)]
    chunk: usize,

    /// Maximum number of leading bytes buffered per flow while sniffing
    #[arg(short = 'w', long, default_value_t = DEFAULT_SNIFF_WINDOW, value_parser)]
    window: usize,

    /// Directory to write results to
    #[arg(short = 'o', long, value_parser)]
    output_dir: Option<String>,

    /// Display output as formatted JSON
    #[arg(short = 'j', long, action = ArgAction::SetTrue)]
    json: bool,
}

fn main() {
    if let Err(e) = simple_logger::init_with_env() {
        eprintln!("Failed to initialise logging: {e}");
    }

    let args = Args::parse();

    if let Some(out_dir) = args.output_dir.as_deref() {
        log::info!("Output directory {out_dir}");
        if let Err(e) = fs::create_dir_all(out_dir) {
            log::error!("Cannot create {out_dir}: {e}");
            process::exit(1);
        }
    }

    let flows = if args.raw {
        pcap::load_raw(&args.file, args.chunk).map(|flow| vec![flow])
    } else {
        pcap::load_file(&args.file, args.nstream)
    };
    let flows = flows.unwrap_or_else(|e| {
        log::error!("{e}");
        process::exit(1);
    });

    log::info!("Sniffing {} flows.", flows.len());
    let results: Vec<(Flow, SniffReport)> = flows
        .into_iter()
        .map(|flow| {
            let report = capture::sniff_chunks(&flow.payloads, args.window);
            (flow, report)
        })
        .collect();

    // ---- Output ----
    if args.json {
        let json = match output::data_as_json(&results) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialise results: {e}");
                process::exit(1);
            }
        };
        match args.output_dir.as_deref() {
            Some(out_dir) => {
                let path = std::path::Path::new(out_dir).join("sniff_results.json");
                if let Err(e) = output::data_to_file(json, &path) {
                    log::error!("Failed to write {}: {e}", path.display());
                    process::exit(1);
                }
            }
            None => println!("{json}"),
        }
    } else {
        output::print_results(&results);
    }
}
