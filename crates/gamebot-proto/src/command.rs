//! Outbound commands.
//!
//! Only the commands the bot emits are modelled. [`Command::Raw`] carries
//! operator-supplied perform lines verbatim.

use std::fmt;

/// A command sent from the bot to the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `USER <username> 0 * :<realname>`
    USER(String, String),
    /// `NICK <nickname>`
    NICK(String),
    /// `JOIN <channel>`
    JOIN(String),
    /// `PART <channel>`
    PART(String),
    /// `PRIVMSG <target> :<text>`
    PRIVMSG(String, String),
    /// `PONG :<token>`
    PONG(String),
    /// `QUIT [:<reason>]`
    QUIT(Option<String>),
    /// A preformatted line, sent as-is.
    Raw(String),
}

impl Command {
    /// Shorthand for [`Command::PRIVMSG`].
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::USER(user, realname) => write!(f, "USER {} 0 * :{}", user, realname),
            Command::NICK(nick) => write!(f, "NICK {}", nick),
            Command::JOIN(chan) => write!(f, "JOIN {}", chan),
            Command::PART(chan) => write!(f, "PART {}", chan),
            Command::PRIVMSG(target, text) => write!(f, "PRIVMSG {} :{}", target, text),
            Command::PONG(token) => write!(f, "PONG :{}", token),
            Command::QUIT(Some(reason)) => write!(f, "QUIT :{}", reason),
            Command::QUIT(None) => f.write_str("QUIT"),
            Command::Raw(line) => f.write_str(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_lines() {
        let user = Command::USER("GameBot".to_string(), "IRC Game Bot".to_string());
        assert_eq!(user.to_string(), "USER GameBot 0 * :IRC Game Bot");
        assert_eq!(Command::NICK("GameBot".to_string()).to_string(), "NICK GameBot");
    }

    #[test]
    fn test_channel_lines() {
        assert_eq!(Command::JOIN("#games".to_string()).to_string(), "JOIN #games");
        assert_eq!(Command::PART("#games".to_string()).to_string(), "PART #games");
        assert_eq!(
            Command::privmsg("#games", "1. Zelda (1998)").to_string(),
            "PRIVMSG #games :1. Zelda (1998)"
        );
    }

    #[test]
    fn test_pong_and_quit() {
        assert_eq!(
            Command::PONG("irc.example.net".to_string()).to_string(),
            "PONG :irc.example.net"
        );
        assert_eq!(
            Command::QUIT(Some("Bot shutting down".to_string())).to_string(),
            "QUIT :Bot shutting down"
        );
        assert_eq!(Command::QUIT(None).to_string(), "QUIT");
    }

    #[test]
    fn test_raw_passthrough() {
        let raw = Command::Raw("MODE GameBot +B".to_string());
        assert_eq!(raw.to_string(), "MODE GameBot +B");
    }
}
