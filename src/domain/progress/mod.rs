//! Best-effort structured view of engine progress text
//!
//! The engine only hands us opaque text. When a line looks like an ffmpeg
//! stats line (`frame=  42 fps=30 ... time=00:00:01.40 ... speed=1.2x`) the
//! known fields are extracted; anything else is kept as raw text only.

use serde::Serialize;

/// Progress message plus whatever fields could be parsed out of it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineProgress {
    pub raw: String,
    pub frame: Option<u64>,
    /// Output position in seconds
    pub out_time: Option<f64>,
    /// Processing speed relative to real time
    pub speed: Option<f64>,
}

impl EngineProgress {
    pub fn parse(message: &str) -> Self {
        let mut progress = Self {
            raw: message.to_string(),
            frame: None,
            out_time: None,
            speed: None,
        };

        for (key, value) in stat_fields(message) {
            match key {
                "frame" => progress.frame = value.parse().ok(),
                "time" | "out_time" => progress.out_time = parse_timestamp(value),
                "speed" => progress.speed = value.trim_end_matches('x').parse().ok(),
                _ => {}
            }
        }

        progress
    }

    /// Whether any structured field was recognised
    pub fn is_structured(&self) -> bool {
        self.frame.is_some() || self.out_time.is_some() || self.speed.is_some()
    }
}

/// Split `key= value key2=value2` into pairs, tolerating padding after `=`
fn stat_fields(line: &str) -> Vec<(&str, &str)> {
    let mut fields = Vec::new();
    let mut rest = line.trim();

    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].trim();
        let key = key.rsplit(char::is_whitespace).next().unwrap_or(key);
        let after = rest[eq + 1..].trim_start();
        let end = after.find(char::is_whitespace).unwrap_or(after.len());
        let value = &after[..end];
        if !key.is_empty() && !value.is_empty() {
            fields.push((key, value));
        }
        rest = &after[end..];
    }

    fields
}

/// `HH:MM:SS.ms` to seconds
pub fn parse_timestamp(value: &str) -> Option<f64> {
    if value.starts_with('-') {
        return None;
    }
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours: u64 = parts[0].parse().ok()?;
    let minutes: u64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;
    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}
