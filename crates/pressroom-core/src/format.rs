// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text helpers shared by the producer and the adapters.

/// Rough token estimate at four characters per token, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Map a single character to its Unicode mathematical bold form.
///
/// Characters without a bold counterpart are returned unchanged.
pub fn bold_char(c: char) -> char {
    let mapped = match c {
        'a'..='z' => 0x1D41A + (c as u32 - 'a' as u32),
        'A'..='Z' => 0x1D400 + (c as u32 - 'A' as u32),
        '0'..='9' => 0x1D7CE + (c as u32 - '0' as u32),
        _ => return c,
    };
    char::from_u32(mapped).unwrap_or(c)
}

/// Replace `**text**` spans with Unicode bold, since the publishing platform
/// does not render markdown. An unmatched `**` is left as is.
pub fn apply_unicode_bold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        out.push_str(&rest[..start]);
        out.extend(after[..end].chars().map(bold_char));
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Mask a secret for logs: keep the first four characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}****")
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
