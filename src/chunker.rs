use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1000;

// A sentence-like segment: a run of non-terminator characters, optional
// terminators, then whitespace or end of text.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?]+[.!?]*(?:\s|$)").unwrap());

/// Which segmentation the chunker applies. The two strategies back
/// different external contracts and are deliberately not unified: the
/// multi-source pipeline packs whole sentences, the single-URL endpoint
/// slices at fixed offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    SentenceAware,
    FixedWidth,
}

#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    pub max_length: usize,
    pub strategy: ChunkStrategy,
}

impl Default for ChunkConfig {
    fn default() -> ChunkConfig {
        ChunkConfig {
            max_length: DEFAULT_MAX_CHUNK_CHARS,
            strategy: ChunkStrategy::SentenceAware,
        }
    }
}

/// Split `text` into non-empty, trimmed chunks per the configured strategy.
/// Lengths are counted in characters and splits never land inside a code
/// point.
pub fn chunk(text: &str, config: ChunkConfig) -> Vec<String> {
    let max_length = config.max_length.max(1);
    match config.strategy {
        ChunkStrategy::SentenceAware => chunk_sentences(text, max_length),
        ChunkStrategy::FixedWidth => chunk_fixed(text, max_length),
    }
}

/// Greedy sentence packing: accumulate sentence-like segments, flushing
/// the running chunk before an append would push it past `max_length`.
/// A single segment longer than `max_length` is hard-split into
/// fixed-width slices with no word-boundary awareness.
fn chunk_sentences(text: &str, max_length: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut segments: Vec<&str> = SENTENCE_BOUNDARY
        .find_iter(text)
        .map(|m| m.as_str())
        .collect();
    if segments.is_empty() {
        segments.push(text);
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let segment_len = segment.chars().count();

        if current_len > 0 && current_len + 1 + segment_len > max_length {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if segment_len > max_length {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.extend(split_fixed(segment, max_length));
        } else if current_len == 0 {
            current.push_str(segment);
            current_len = segment_len;
        } else {
            current.push(' ');
            current.push_str(segment);
            current_len += 1 + segment_len;
        }
    }

    if current_len > 0 {
        chunks.push(current);
    }

    chunks
}

/// Consecutive `max_length`-character slices; the last may be shorter.
/// Slices are trimmed after cutting, so the boundaries are unaffected.
fn chunk_fixed(text: &str, max_length: usize) -> Vec<String> {
    split_fixed(text, max_length)
        .into_iter()
        .map(|slice| slice.trim().to_string())
        .filter(|slice| !slice.is_empty())
        .collect()
}

fn split_fixed(text: &str, max_length: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_length)
        .map(|window| window.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence_chunks(text: &str, max_length: usize) -> Vec<String> {
        chunk(
            text,
            ChunkConfig {
                max_length,
                strategy: ChunkStrategy::SentenceAware,
            },
        )
    }

    fn fixed_chunks(text: &str, max_length: usize) -> Vec<String> {
        chunk(
            text,
            ChunkConfig {
                max_length,
                strategy: ChunkStrategy::FixedWidth,
            },
        )
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(sentence_chunks("", 100).is_empty());
        assert!(sentence_chunks("   \n\t ", 100).is_empty());
        assert!(fixed_chunks("", 100).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = sentence_chunks("One sentence. And another one!", 100);
        assert_eq!(chunks, vec!["One sentence. And another one!"]);
    }

    #[test]
    fn text_without_terminators_is_one_segment() {
        let chunks = sentence_chunks("no terminators at all here", 100);
        assert_eq!(chunks, vec!["no terminators at all here"]);
    }

    #[test]
    fn packs_sentences_up_to_max_length() {
        // Three 10-char sentences; two fit in 21 chars with the joining space.
        let text = "aaaa bbbb. cccc dddd. eeee ffff.";
        let chunks = sentence_chunks(text, 21);
        assert_eq!(chunks, vec!["aaaa bbbb. cccc dddd.", "eeee ffff."]);
        for c in &chunks {
            assert!(c.chars().count() <= 21);
        }
    }

    #[test]
    fn chunk_order_preserves_reading_order() {
        let text = "First one. Second one. Third one. Fourth one.";
        let chunks = sentence_chunks(text, 12);
        assert_eq!(
            chunks,
            vec!["First one.", "Second one.", "Third one.", "Fourth one."]
        );
    }

    #[test]
    fn concatenated_chunks_reproduce_the_input() {
        let text = "The quick brown fox jumps. Over the lazy dog! Was it worth it? \
                    Packing sentences should lose nothing. Not a single character.";
        let chunks = sentence_chunks(text, 48);
        let rejoined = chunks.join(" ");
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(rejoined, collapsed);
    }

    #[test]
    fn oversized_sentence_hard_splits_into_ceil_slices() {
        // 2500-char sentence, max 1000 -> exactly ceil(2500/1000) = 3 chunks.
        let long = "x".repeat(2500);
        let chunks = sentence_chunks(&long, 1000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 1000);
        assert_eq!(chunks[2].chars().count(), 500);
    }

    #[test]
    fn pending_chunk_is_flushed_before_a_hard_split() {
        let long = "y".repeat(30);
        let text = format!("Short lead. {long}");
        let chunks = sentence_chunks(&text, 12);
        assert_eq!(chunks[0], "Short lead.");
        assert_eq!(chunks[1], "y".repeat(12));
        assert_eq!(chunks[2], "y".repeat(12));
        assert_eq!(chunks[3], "y".repeat(6));
    }

    #[test]
    fn fixed_width_slices_are_exact() {
        let text = "abcdefghij".repeat(3); // 30 chars
        let chunks = fixed_chunks(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() == 10));

        let chunks = fixed_chunks(&text, 12);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].chars().count(), 6);
    }

    #[test]
    fn fixed_width_has_no_sentence_awareness() {
        let chunks = fixed_chunks("One. Two. Three.", 7);
        assert_eq!(chunks, vec!["One. Tw", "o. Thre", "e."]);
    }

    #[test]
    fn splits_respect_char_boundaries() {
        // multibyte characters must not be cut mid code point
        let text = "äöü".repeat(40); // 120 chars
        let chunks = sentence_chunks(&text, 50);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 50);
        assert_eq!(chunks[2].chars().count(), 20);
    }
}
