use std::path::Path;

use anyhow::Result;
use tracing::warn;

use vidscout::{CapturedRecord, DetectorConfig, SessionStore};

use super::read_input;

pub fn cmd_replay(config: &DetectorConfig, file: &Path, session: Option<u64>, json: bool) -> Result<()> {
    let content = read_input(file)?;
    let store = SessionStore::new(config.clone());

    let mut total = 0usize;
    let mut malformed = 0usize;
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total += 1;
        match line.parse::<CapturedRecord>() {
            Ok(record) => store.apply(&record),
            Err(e) => {
                // Captures are noisy telemetry; a bad line is skipped, not fatal.
                malformed += 1;
                warn!(line = number + 1, error = %e, "skipping malformed record");
            }
        }
    }

    let sessions = match session {
        Some(id) => vec![id],
        None => store.session_ids(),
    };

    if json {
        let report: Vec<_> = sessions
            .iter()
            .map(|id| serde_json::json!({ "session_id": id, "streams": store.streams(*id) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for id in &sessions {
        let streams = store.streams(*id);
        println!("session {id}: {} stream(s)", streams.len());
        for stream in streams {
            let quality = stream.quality.as_deref().unwrap_or("-");
            println!("    {} kind={} quality={quality}", stream.url, stream.kind);
        }
    }
    println!("{total} record(s), {malformed} malformed");
    Ok(())
}
