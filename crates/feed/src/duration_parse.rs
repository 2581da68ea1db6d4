// ABOUTME: Duration string parsing for iTunes episode lengths.
// ABOUTME: Normalizes plain seconds, MM:SS, HH:MM:SS, and unit-style strings to seconds.

/// Parses an itunes:duration value into seconds.
///
/// Accepts plain integer seconds, `HH:MM:SS`, `MM:SS`, and unit-style
/// strings like "1h30m". Returns None when nothing matches or the value
/// does not fit in u32.
pub fn parse_duration_seconds(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(secs) = s.parse::<u64>() {
        return u32::try_from(secs).ok();
    }

    if s.contains(':') {
        let parts: Vec<u64> = s
            .split(':')
            .map(|p| p.parse::<u64>())
            .collect::<Result<_, _>>()
            .ok()?;
        let total = match parts.as_slice() {
            [mins, secs] => mins * 60 + secs,
            [hours, mins, secs] => hours * 3600 + mins * 60 + secs,
            _ => return None,
        };
        return u32::try_from(total).ok();
    }

    if let Ok(duration) = parse_duration::parse(s) {
        return u32::try_from(duration.as_secs()).ok();
    }

    None
}
