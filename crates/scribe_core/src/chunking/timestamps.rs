//! Subtitle timing-line arithmetic for chunk reassembly.
//!
//! Timing lines look like:
//! ```text
//! 00:00:01,000 --> 00:00:05,000          (SRT, comma separator)
//! 00:00:01.000 --> 00:00:05.000          (VTT, period separator)
//! ```
//!
//! When chunks are reassembled, every cue's timestamps must be shifted
//! forward by the start offset of the chunk it came from. The separator
//! style of the input line is preserved on re-render.

const ARROW: &str = " --> ";

/// Whether a line carries cue timing.
pub fn is_timing_line(line: &str) -> bool {
    line.contains("-->")
}

/// Parse `HH:MM:SS,mmm` or `HH:MM:SS.mmm` into milliseconds.
///
/// Returns `None` if the string does not look like a timestamp.
pub fn parse_time_ms(s: &str) -> Option<f64> {
    let s = s.trim();

    // Handle both comma and period as decimal separator
    let s = s.replace(',', ".");

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;

    let sec_parts: Vec<&str> = parts[2].split('.').collect();
    let seconds: f64 = sec_parts[0].parse().ok()?;

    let milliseconds: f64 = if sec_parts.len() > 1 {
        sec_parts[1].parse().ok()?
    } else {
        0.0
    };

    Some(hours * 3_600_000.0 + minutes * 60_000.0 + seconds * 1000.0 + milliseconds)
}

/// Format milliseconds as `HH:MM:SS<sep>mmm` with zero-padded fields.
///
/// Minutes and hours roll over correctly for arbitrarily large values.
pub fn format_time_ms(ms: f64, separator: char) -> String {
    let ms = ms.round().max(0.0) as u64;

    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, mins, secs, separator, millis
    )
}

/// Shift both endpoints of a timing line by `offset_secs`.
///
/// A zero offset returns the line byte-identical. Lines that do not
/// parse as timing lines are also returned unchanged, so callers can
/// feed every line of a cue block through without pre-filtering.
/// Trailing cue settings after the end timestamp (VTT) are preserved.
pub fn adjust_timing_line(line: &str, offset_secs: f64) -> String {
    if offset_secs == 0.0 {
        return line.to_string();
    }

    let Some((start_raw, end_raw)) = line.split_once(ARROW) else {
        return line.to_string();
    };

    // VTT cue settings may follow the end timestamp on the same line.
    let end_raw = end_raw.trim_start();
    let (end_token, suffix) = match end_raw.find(char::is_whitespace) {
        Some(pos) => end_raw.split_at(pos),
        None => (end_raw, ""),
    };

    let (Some(start_ms), Some(end_ms)) = (parse_time_ms(start_raw), parse_time_ms(end_token))
    else {
        return line.to_string();
    };

    let separator = if start_raw.contains(',') { ',' } else { '.' };
    let offset_ms = offset_secs * 1000.0;

    let start = format_time_ms(start_ms + offset_ms, separator);
    let end = format_time_ms(end_ms + offset_ms, separator);

    format!("{}{}{}{}", start, ARROW, end, suffix)
}
