use std::path::Path;

use anyhow::Result;
use scraper::Html;

use vidscout::{DetectorConfig, Scanner, VideoCandidate};

use super::read_input;

pub fn cmd_scan(config: &DetectorConfig, file: &Path, page_url: &str, json: bool) -> Result<()> {
    let html = read_input(file)?;
    let doc = Html::parse_document(&html);
    let scanner = Scanner::with_config(config);
    let candidates = scanner.scan(page_url, &doc);

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }
    if candidates.is_empty() {
        println!("no media candidates");
        return Ok(());
    }
    for candidate in &candidates {
        print_candidate(candidate);
    }
    Ok(())
}

fn print_candidate(candidate: &VideoCandidate) {
    let title = candidate.title.as_deref().unwrap_or("(untitled)");
    println!("[{}] {title}", candidate.platform);
    if let Some(id) = &candidate.external_id {
        println!("    id:       {id}");
    }
    if let Some(src) = &candidate.source_url {
        println!("    source:   {src}");
    }
    if let Some(duration) = candidate.duration_seconds {
        println!("    duration: {duration}s");
    }
    for stream in &candidate.nested_streams {
        match &stream.quality {
            Some(q) => println!("    stream:   {} ({}, {q})", stream.url, stream.kind),
            None => println!("    stream:   {} ({})", stream.url, stream.kind),
        }
    }
}
