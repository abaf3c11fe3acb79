//! Boundary-aware text chunker.
//!
//! Splits long text into overlapping, size-bounded chunks ready for
//! indexing. Splits prefer structural boundaries and fall back to finer
//! ones only when a piece is still too large.
//!
//! # Algorithm
//!
//! 1. Split on `\n\n\n` (major sections), then on `\n\n` (paragraphs).
//!    Each section is a candidate chunk.
//! 2. A section longer than `max_chunk_size` is split on sentence
//!    boundaries (`.`, `!`, `?` followed by whitespace). Sentences are
//!    accumulated until the next one would overflow; each new chunk is
//!    seeded with the last `overlap_size / 10` words of the previous one.
//! 3. If sentence splitting leaves any chunk longer than
//!    `1.5 × max_chunk_size`, the section is re-split on words with the
//!    same accumulate/overlap rules.
//! 4. A single word longer than `max_chunk_size` is emitted whole.
//! 5. Chunks shorter than `min_chunk_size` are merged into the next chunk,
//!    or failing that into the previous one, when the result still fits.
//! 6. Chunks with an alphanumeric ratio ≤ 0.3 are dropped.
//! 7. Whitespace runs collapse to single spaces.
//!
//! All lengths are counted in characters, not bytes.
//!
//! # Example
//!
//! ```rust
//! use connector_retrieval_core::chunk::chunk;
//! use connector_retrieval_core::options::ChunkOptions;
//!
//! let opts = ChunkOptions { max_chunk_size: 100, min_chunk_size: 10, overlap_size: 0 };
//! let chunks = chunk("A.\n\nB.\n\nC.\n\nD.", &opts);
//! assert_eq!(chunks, vec!["A. B. C. D."]);
//! ```

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::options::ChunkOptions;

/// Sentence chunks above `max_chunk_size × SENTENCE_SLACK` trigger the
/// word-level fallback.
const SENTENCE_SLACK: f64 = 1.5;

/// Chunks at or below this alphanumeric ratio are dropped as noise.
const MIN_ALNUM_RATIO: f64 = 0.3;

/// A chunk with its position and a SHA-256 of its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub hash: String,
}

/// Split `text` into chunks. Empty or whitespace-only text yields none.
pub fn chunk(text: &str, options: &ChunkOptions) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let max = options.max_chunk_size;
    let mut pieces: Vec<String> = Vec::new();
    for section in split_sections(text) {
        if char_len(&section) <= max {
            pieces.push(section);
        } else {
            pieces.extend(split_oversized(&section, options));
        }
    }

    let candidates = pieces.len();
    let chunks: Vec<String> = merge_small(pieces, options)
        .into_iter()
        .filter(|c| passes_quality(c))
        .map(|c| normalize_whitespace(&c))
        .collect();

    debug!(
        input_chars = text.chars().count(),
        candidates,
        chunks = chunks.len(),
        "chunked text"
    );
    chunks
}

/// [`chunk`], with contiguous indices and content hashes attached.
pub fn chunk_document(text: &str, options: &ChunkOptions) -> Vec<Chunk> {
    chunk(text, options)
        .into_iter()
        .enumerate()
        .map(|(index, text)| make_chunk(index, text))
        .collect()
}

fn make_chunk(index: usize, text: String) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Chunk { index, text, hash }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Major sections first, then paragraphs. Sections come back normalized.
fn split_sections(text: &str) -> Vec<String> {
    let text = text.replace("\r\n", "\n");
    text.split("\n\n\n")
        .flat_map(|major| major.split("\n\n"))
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Sentence split, falling back to words when a sentence chunk is still
/// far over the limit.
fn split_oversized(section: &str, options: &ChunkOptions) -> Vec<String> {
    let sentences = split_sentences(section);
    let chunks = accumulate(&sentences, options);

    let limit = options.max_chunk_size as f64 * SENTENCE_SLACK;
    if chunks.iter().any(|c| char_len(c) as f64 > limit) {
        let words: Vec<&str> = section.split_whitespace().collect();
        return accumulate(&words, options);
    }
    chunks
}

/// Split after `.`, `!`, or `?` when followed by whitespace. The
/// punctuation stays with its sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let followed_by_space = chars.peek().is_some_and(|&(_, next)| next.is_whitespace());
        if !followed_by_space {
            continue;
        }
        sentences.push(&text[start..i + c.len_utf8()]);
        while chars.peek().is_some_and(|&(_, w)| w.is_whitespace()) {
            chars.next();
        }
        start = chars.peek().map(|&(j, _)| j).unwrap_or(text.len());
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences.retain(|s| !s.trim().is_empty());
    sentences
}

/// Greedily pack units into chunks of at most `max_chunk_size`, seeding
/// each new chunk with the tail of the previous one.
///
/// A unit that alone exceeds the limit becomes its own chunk. Overlap is
/// skipped when it would push the seeded chunk over the limit.
///
/// With sentences as units, one long sentence yields a chunk above
/// `max_chunk_size`. [`split_oversized`] keeps such chunks up to
/// `1.5 × max_chunk_size` rather than cutting mid-sentence, so the size
/// bound is soft in sentence mode. With words as units only a single
/// oversized word can exceed it.
fn accumulate(units: &[&str], options: &ChunkOptions) -> Vec<String> {
    let max = options.max_chunk_size;
    let overlap_words = options.overlap_words();

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for unit in units {
        let unit_len = char_len(unit);

        if !current.is_empty() && current_len + 1 + unit_len > max {
            let overlap = tail_words(&current, overlap_words);
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
            let overlap_len = char_len(&overlap);
            if overlap_len > 0 && overlap_len + 1 + unit_len <= max {
                current = overlap;
                current_len = overlap_len;
            }
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(unit);
        current_len += unit_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn tail_words(s: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let words: Vec<&str> = s.split_whitespace().collect();
    words[words.len().saturating_sub(n)..].join(" ")
}

/// Merge undersized chunks forward, then backward, without exceeding
/// `max_chunk_size`.
fn merge_small(chunks: Vec<String>, options: &ChunkOptions) -> Vec<String> {
    let forward = merge_pass(chunks, options, |prev_len, _next_len, min| prev_len < min);
    merge_pass(forward, options, |_prev_len, next_len, min| next_len < min)
}

fn merge_pass<F>(chunks: Vec<String>, options: &ChunkOptions, undersized: F) -> Vec<String>
where
    F: Fn(usize, usize, usize) -> bool,
{
    let min = options.min_chunk_size;
    let max = options.max_chunk_size;
    let mut merged: Vec<String> = Vec::with_capacity(chunks.len());

    for next in chunks {
        if let Some(prev) = merged.last_mut() {
            let prev_len = char_len(prev);
            let next_len = char_len(&next);
            if undersized(prev_len, next_len, min) && prev_len + 1 + next_len <= max {
                prev.push(' ');
                prev.push_str(&next);
                continue;
            }
        }
        merged.push(next);
    }
    merged
}

fn passes_quality(chunk: &str) -> bool {
    let total = char_len(chunk);
    if total == 0 {
        return false;
    }
    let alnum = chunk.chars().filter(|c| c.is_alphanumeric()).count();
    alnum as f64 / total as f64 > MIN_ALNUM_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(max: usize, min: usize, overlap: usize) -> ChunkOptions {
        ChunkOptions {
            max_chunk_size: max,
            min_chunk_size: min,
            overlap_size: overlap,
        }
    }

    #[test]
    fn test_short_chunk_kept_when_neither_neighbour_has_room() {
        let para = |c: char| {
            let word: String = std::iter::repeat(c).take(4).collect();
            format!("{}.", vec![word; 19].join(" "))
        };
        assert_eq!(para('x').chars().count(), 95);

        let text = format!("{}\n\n{}\n\n{}", para('x'), "Short one.", para('y'));
        let chunks = chunk(&text, &opts(100, 40, 0));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1], "Short one.");

        // With room on one side the short chunk is absorbed forward.
        let chunks = chunk(&text, &opts(110, 40, 0));
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].starts_with("Short one. yyyy"));
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk("", &ChunkOptions::default()).is_empty());
        assert!(chunk("  \n\n\t ", &ChunkOptions::default()).is_empty());
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk("Hello, world!", &ChunkOptions::default());
        assert_eq!(chunks, vec!["Hello, world!"]);
    }

    #[test]
    fn test_paragraphs_kept_apart_when_large_enough() {
        let a = "alpha ".repeat(10);
        let b = "bravo ".repeat(10);
        let text = format!("{}\n\n{}", a, b);
        let chunks = chunk(&text, &opts(100, 20, 0));
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("alpha"));
        assert!(chunks[1].starts_with("bravo"));
    }

    #[test]
    fn test_major_sections_split() {
        let text = "Section one body text here.\n\n\nSection two body text here.";
        let chunks = chunk(text, &opts(40, 5, 0));
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("One. Two!  Three? Four");
        assert_eq!(s, vec!["One.", "Two!", "Three?", "Four"]);
        assert_eq!(split_sentences("v1.2 is out."), vec!["v1.2 is out."]);
    }

    #[test]
    fn test_sentence_split_respects_max() {
        let text = (0..20)
            .map(|i| format!("Sentence number {} talks about things.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunk(&text, &opts(120, 0, 0));
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 120, "chunk too long: {}", c.len());
            assert!(c.ends_with('.'));
        }
    }

    #[test]
    fn test_long_sentence_within_slack_kept_whole() {
        let long = format!("{}.", vec!["word"; 28].join(" "));
        assert_eq!(long.chars().count(), 140);
        let text = format!("{} Tail sentence here.", long);
        let chunks = chunk(&text, &opts(100, 0, 0));
        assert_eq!(chunks, vec![long, "Tail sentence here.".to_string()]);

        // Past 1.5 x max the section is re-split on words.
        let longer = format!("{}.", vec!["word"; 33].join(" "));
        let text = format!("{} Tail sentence here.", longer);
        let chunks = chunk(&text, &opts(100, 0, 0));
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[test]
    fn test_overlap_carries_tail_words() {
        let text = (0..12)
            .map(|i| format!("Statement {} ends here.", i))
            .collect::<Vec<_>>()
            .join(" ");
        // overlap 20 → 2 words
        let chunks = chunk(&text, &opts(60, 0, 20));
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev_tail = tail_words(&pair[0], 2);
            assert!(
                pair[1].starts_with(&prev_tail),
                "'{}' should start with '{}'",
                pair[1],
                prev_tail
            );
        }
    }

    #[test]
    fn test_word_fallback_without_punctuation() {
        let text = "word ".repeat(400);
        let chunks = chunk(&text, &opts(100, 0, 0));
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 100);
        }
    }

    #[test]
    fn test_oversized_word_emitted_whole() {
        let giant = "x".repeat(2000);
        let text = format!("Some normal text here. {} more normal text.", giant);
        let chunks = chunk(&text, &opts(500, 0, 150));
        assert!(chunks.iter().any(|c| c == &giant));
        assert!(chunks.iter().all(|c| !c.contains(&giant) || c == &giant));
    }

    #[test]
    fn test_merge_small_fragments() {
        let chunks = chunk("A.\n\nB.\n\nC.\n\nD.", &opts(100, 10, 0));
        assert_eq!(chunks, vec!["A. B. C. D."]);
    }

    #[test]
    fn test_backward_merge_of_trailing_fragment() {
        let merged = merge_small(
            vec!["a".repeat(30), "b".repeat(30), "end".to_string()],
            &opts(100, 20, 0),
        );
        assert_eq!(merged.len(), 2);
        assert!(merged[1].ends_with(" end"));
    }

    #[test]
    fn test_merge_never_exceeds_max() {
        let merged = merge_small(vec!["short".to_string(), "y".repeat(98)], &opts(100, 50, 0));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_quality_filter_drops_noise() {
        let text = "Real content lives in this paragraph.\n\n---- **** ----\n\n=====";
        let chunks = chunk(text, &opts(1000, 0, 0));
        assert_eq!(chunks, vec!["Real content lives in this paragraph."]);
        assert!(!passes_quality("- - - a"));
        assert!(passes_quality("abc"));
    }

    #[test]
    fn test_whitespace_normalized() {
        let chunks = chunk("lots   of\tspace\nhere", &ChunkOptions::default());
        assert_eq!(chunks, vec!["lots of space here"]);
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "┌──────────────────┐ Héllo wörld ünïcödé text. ".repeat(20);
        let chunks = chunk(&text, &opts(60, 0, 10));
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_chunk_document_indices_and_hashes() {
        let text = (0..30)
            .map(|i| format!("Paragraph number {} has a few words.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let chunks = chunk_document(&text, &opts(120, 40, 0));
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
            assert_eq!(c.hash.len(), 64);
        }
        let again = chunk_document(&text, &opts(120, 40, 0));
        assert_eq!(chunks, again);
    }
}
