use anyhow::{bail, Result};

use vidscout::{classify, DetectorConfig, ResourceKind};

pub fn cmd_classify(
    config: &DetectorConfig,
    url: &str,
    content_type: Option<&str>,
    kind: &str,
    size: Option<u64>,
) -> Result<()> {
    let kind = parse_kind(kind)?;
    let Some(classification) = classify(url, content_type, kind, config.weak_heuristics) else {
        println!("rejected");
        return Ok(());
    };
    if let Some(len) = size {
        if len < config.min_stream_bytes && !classification.kind.is_segmented() {
            println!("rejected (below size floor of {} bytes)", config.min_stream_bytes);
            return Ok(());
        }
    }
    println!("stream: kind={}", classification.kind);
    println!("layer:  {:?}", classification.layer);
    match classification.quality {
        Some(q) => println!("quality: {q}"),
        None => println!("quality: -"),
    }
    Ok(())
}

fn parse_kind(kind: &str) -> Result<ResourceKind> {
    Ok(match kind.to_ascii_lowercase().as_str() {
        "document" => ResourceKind::Document,
        "script" => ResourceKind::Script,
        "stylesheet" => ResourceKind::Stylesheet,
        "image" => ResourceKind::Image,
        "font" => ResourceKind::Font,
        "media" => ResourceKind::Media,
        "xhr" => ResourceKind::Xhr,
        "other" => ResourceKind::Other,
        other => bail!("unknown resource kind: {other}"),
    })
}
