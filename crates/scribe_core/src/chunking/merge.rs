//! Per-chunk transcription merging.
//!
//! Reassembles the index-ordered per-chunk outputs of the transcription
//! API into one coherent result. Four formats are supported:
//!
//! - **text**: chunks joined with a single space
//! - **json**: `text` fields extracted, joined, re-emitted as one object
//! - **srt**/**vtt**: cues renumbered from 1 across chunks, timestamps
//!   shifted by each chunk's start offset

use serde_json::{json, Value};

use super::timestamps::{adjust_timing_line, is_timing_line};
use super::types::{ChunkerError, ChunkerResult, MergeFormat};

/// Join plain-text chunks with a single space.
pub(super) fn merge_text<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merge JSON chunks by combining their `text` fields.
///
/// A chunk object without a `text` key contributes an empty string,
/// not an error. Other fields of the chunk objects are dropped.
pub(super) fn merge_json<S: AsRef<str>>(chunks: &[S]) -> ChunkerResult<String> {
    let mut texts = Vec::with_capacity(chunks.len());

    for (i, chunk) in chunks.iter().enumerate() {
        let value: Value = serde_json::from_str(chunk.as_ref())
            .map_err(|e| ChunkerError::parse_error(format!("JSON chunk {}", i), e.to_string()))?;

        let text = value
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .to_string();
        texts.push(text);
    }

    Ok(json!({ "text": texts.join(" ") }).to_string())
}

/// Merge SRT or VTT subtitle chunks.
///
/// Cues are renumbered sequentially starting at 1 across all chunks.
/// Every cue's timestamps are shifted by the start offset of its chunk
/// (`index * chunk_duration_secs`, the nominal figure used at split
/// time). For VTT, exactly one `WEBVTT` header is emitted at the start.
/// Chunks consisting only of blank lines are dropped; an all-empty
/// input merges to an empty string.
pub(super) fn merge_subtitles<S: AsRef<str>>(
    chunks: &[S],
    format: MergeFormat,
    chunk_duration_secs: f64,
) -> String {
    let mut cues: Vec<String> = Vec::new();
    let mut cue_number = 1usize;

    for (i, chunk) in chunks.iter().enumerate() {
        let offset_secs = i as f64 * chunk_duration_secs;
        let content = chunk.as_ref().replace("\r\n", "\n").replace('\r', "\n");

        for block in content.split("\n\n") {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }

            let mut lines: Vec<&str> = block.lines().map(str::trim_end).collect();

            // Per-chunk VTT headers are stripped; one is re-added at the end.
            if format == MergeFormat::Vtt {
                if let Some(first) = lines.first() {
                    if first.starts_with("WEBVTT") {
                        lines.remove(0);
                    }
                }
            }

            let Some(timing_idx) = lines.iter().position(|l| is_timing_line(l)) else {
                continue;
            };

            let timing = adjust_timing_line(lines[timing_idx], offset_secs);
            let text = lines[timing_idx + 1..].join("\n");

            let mut cue = format!("{}\n{}", cue_number, timing);
            if !text.is_empty() {
                cue.push('\n');
                cue.push_str(&text);
            }
            cues.push(cue);
            cue_number += 1;
        }
    }

    if cues.is_empty() {
        return String::new();
    }

    let body = cues.join("\n\n");
    match format {
        MergeFormat::Vtt => format!("WEBVTT\n\n{}\n", body),
        _ => format!("{}\n", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_merge_joins_with_spaces() {
        let chunks = ["Hello world", "This is a test", "Final chunk"];
        assert_eq!(
            merge_text(&chunks),
            "Hello world This is a test Final chunk"
        );
    }

    #[test]
    fn text_merge_is_associative() {
        let merged_pair = merge_text(&["a", "b"]);
        let full = merge_text(&[merged_pair.as_str(), "c"]);
        assert_eq!(full, merge_text(&["a", "b", "c"]));
    }

    #[test]
    fn json_merge_combines_text_fields() {
        let chunks = [
            r#"{"text": "First part"}"#,
            r#"{"text": "Second part"}"#,
            r#"{"text": "Third part"}"#,
        ];
        let merged = merge_json(&chunks).unwrap();
        let value: Value = serde_json::from_str(&merged).unwrap();
        assert_eq!(value["text"], "First part Second part Third part");
    }

    #[test]
    fn json_merge_treats_missing_key_as_empty() {
        let chunks = [r#"{"text": "First"}"#, "{}", r#"{"text": "Third"}"#];
        let merged = merge_json(&chunks).unwrap();
        let value: Value = serde_json::from_str(&merged).unwrap();
        // Double space from the empty middle chunk.
        assert_eq!(value["text"], "First  Third");
    }

    #[test]
    fn json_merge_rejects_invalid_chunk() {
        let err = merge_json(&["not json"]).unwrap_err();
        assert!(matches!(err, ChunkerError::ParseError { .. }));
    }

    #[test]
    fn srt_merge_renumbers_and_offsets() {
        let chunks = [
            "1\n00:00:01,000 --> 00:00:05,000\nFirst subtitle\n\n",
            "1\n00:00:01,000 --> 00:00:05,000\nSecond subtitle\n\n",
        ];
        let merged = merge_subtitles(&chunks, MergeFormat::Srt, 600.0);

        assert!(merged.starts_with("1\n00:00:01,000 --> 00:00:05,000\nFirst subtitle"));
        // Second chunk's cue is renumbered and shifted by 600s.
        assert!(merged.contains("2\n00:10:01,000 --> 00:10:05,000\nSecond subtitle"));
    }

    #[test]
    fn vtt_merge_emits_single_header() {
        let chunks = [
            "WEBVTT\n\n00:00:01.000 --> 00:00:05.000\nFirst subtitle\n\n",
            "WEBVTT\n\n00:00:01.000 --> 00:00:05.000\nSecond subtitle\n\n",
        ];
        let merged = merge_subtitles(&chunks, MergeFormat::Vtt, 600.0);

        assert!(merged.starts_with("WEBVTT"));
        assert_eq!(merged.matches("WEBVTT").count(), 1);
        assert!(merged.contains("First subtitle"));
        assert!(merged.contains("Second subtitle"));
        assert!(merged.contains("00:10:01.000 --> 00:10:05.000"));
    }

    #[test]
    fn empty_chunks_merge_to_empty_string() {
        let chunks = ["", "\n\n", ""];
        assert_eq!(merge_subtitles(&chunks, MergeFormat::Srt, 600.0), "");
    }

    #[test]
    fn srt_cue_without_index_line_still_merges() {
        let chunks = ["00:00:01,000 --> 00:00:02,000\nNo index here\n"];
        let merged = merge_subtitles(&chunks, MergeFormat::Srt, 600.0);
        assert!(merged.starts_with("1\n00:00:01,000"));
    }
}
