//! Splitting a digest into webhook-sized messages.

/// Discord's per-message content limit.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 2_000;

/// Splits `text` into chunks of at most `max_chars` characters.
///
/// Each chunk ends after the last newline that fits; a line longer than
/// `max_chars` is cut mid-line. Chunks are consecutive slices, so joining
/// them gives back `text` exactly. Empty input yields no chunks.
///
/// `max_chars` of zero is treated as one.
#[must_use]
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        // Byte offset just past `max_chars` characters, if the rest is longer.
        let Some((hard_cut, _)) = rest.char_indices().nth(max_chars) else {
            chunks.push(rest.to_owned());
            break;
        };

        let window = &rest[..hard_cut];
        let cut = window
            .rfind('\n')
            .map(|i| i + 1)
            // A whitespace-only chunk would be rejected as an empty message.
            .filter(|&i| !window[..i].trim().is_empty())
            .unwrap_or(hard_cut);

        chunks.push(rest[..cut].to_owned());
        rest = &rest[cut..];
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("hello\nworld", 2_000), vec!["hello\nworld"]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(split_message("", 2_000).is_empty());
    }

    #[test]
    fn prefers_line_boundaries() {
        let chunks = split_message("aaaa\nbbbb\ncccc", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n", "cccc"]);
    }

    #[test]
    fn hard_splits_long_lines() {
        let chunks = split_message(&"x".repeat(25), 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "ع".repeat(15);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 10);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn oversized_digest_splits_losslessly() {
        let line = "- Headline that repeats often enough to need several chunks\n";
        let text = line.repeat(100);
        let chunks = split_message(&text, DEFAULT_MAX_MESSAGE_CHARS);
        assert!(chunks.len() >= 2);
        assert!(chunks
            .iter()
            .all(|c| c.chars().count() <= DEFAULT_MAX_MESSAGE_CHARS));
        assert!(chunks.iter().all(|c| c.ends_with('\n')));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn avoids_whitespace_only_chunks() {
        let text = format!("\n{}", "y".repeat(12));
        let chunks = split_message(&text, 10);
        assert!(chunks.iter().all(|c| !c.trim().is_empty()));
        assert_eq!(chunks.concat(), text);
    }
}
