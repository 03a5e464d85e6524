//! IRC case-mapping functions.
//!
//! Nicknames are compared with the `rfc1459` case mapping, where `[]\~` are
//! the uppercase forms of `{}|^`.

/// Convert a single character to IRC lowercase using RFC 1459 case mapping.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irc_to_lower() {
        assert_eq!(irc_to_lower("GameBot"), "gamebot");
        assert_eq!(irc_to_lower("Nick[1]"), "nick{1}");
        assert_eq!(irc_to_lower("Nick\\Away"), "nick|away");
        assert_eq!(irc_to_lower("Test~Name"), "test^name");
    }

    #[test]
    fn test_irc_eq() {
        assert!(irc_eq("Boliver", "boliver"));
        assert!(irc_eq("bot[a]", "BOT{A}"));
        assert!(!irc_eq("bot", "bots"));
        assert!(!irc_eq("alice", "alicf"));
    }
}
