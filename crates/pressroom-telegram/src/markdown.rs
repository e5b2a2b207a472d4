// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MarkdownV2 escaping and message splitting for the Telegram Bot API.
//!
//! Generated posts are plain text (bold is already Unicode), so every
//! MarkdownV2 special character in them is escaped. Only the headers the
//! channel writes itself carry formatting.

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Characters that must be escaped anywhere in MarkdownV2 text.
const SPECIAL_CHARS: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
    '!',
];

/// Escape all MarkdownV2 special characters so `text` renders literally.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        if SPECIAL_CHARS.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `*text*` with the inner text escaped.
pub fn bold(text: &str) -> String {
    format!("*{}*", escape_markdown_v2(text))
}

/// `_text_` with the inner text escaped.
pub fn italic(text: &str) -> String {
    format!("_{}_", escape_markdown_v2(text))
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Prefers breaking after a newline, then after a space, and falls back to
/// a hard cut when a single line is longer than the limit.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut parts = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(i, _)| i);
        let window = &rest[..limit];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .map_or(limit, |i| i + 1);
        parts.push(rest[..cut].trim_end().to_string());
        rest = &rest[cut..];
    }
    if !rest.is_empty() || parts.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_every_special_character() {
        assert_eq!(escape_markdown_v2("a.b"), "a\\.b");
        assert_eq!(escape_markdown_v2("(x)"), "\\(x\\)");
        assert_eq!(escape_markdown_v2("1+1=2!"), "1\\+1\\=2\\!");
        assert_eq!(escape_markdown_v2("path\\to"), "path\\\\to");
        assert_eq!(escape_markdown_v2("`code`"), "\\`code\\`");
    }

    #[test]
    fn unicode_bold_passes_through() {
        let text = "𝐁𝐨𝐥𝐝 post";
        assert_eq!(escape_markdown_v2(text), text);
    }

    #[test]
    fn bold_and_italic_escape_their_content() {
        assert_eq!(bold("v1.2"), "*v1\\.2*");
        assert_eq!(italic("google_news"), "_google\\_news_");
    }

    #[test]
    fn short_text_is_one_part() {
        assert_eq!(split_message("hello", 10), vec!["hello"]);
        assert_eq!(split_message("", 10), vec![""]);
    }

    #[test]
    fn split_prefers_newlines_then_spaces() {
        let parts = split_message("first line\nsecond line", 15);
        assert_eq!(parts, vec!["first line", "second line"]);

        let parts = split_message("aaaa bbbb cccc", 10);
        assert_eq!(parts, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn split_hard_cuts_long_words_on_char_boundaries() {
        let text = "é".repeat(25);
        let parts = split_message(&text, 10);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.chars().count() <= 10));
        assert_eq!(parts.concat(), text);
    }
}
