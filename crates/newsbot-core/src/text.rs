//! Text helpers shared by the source clients and the digest renderer.

/// Cuts `text` to at most `max_chars` characters, appending `...` when shortened.
///
/// Counts `char`s, not bytes, so Arabic text is never split mid-character.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate_chars("gm", 80), "gm");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let arabic = "بيتكوين يرتفع";
        assert_eq!(truncate_chars(arabic, 100), arabic);
        assert_eq!(truncate_chars(arabic, 7), "بيتكوين...");
    }
}
