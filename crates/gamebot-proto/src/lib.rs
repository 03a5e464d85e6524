//! # gamebot-proto
//!
//! The slice of the IRC client protocol that irc-gamebot speaks: CRLF line
//! framing, parsing of incoming lines, and serialization of the handful of
//! commands a channel bot ever sends.
//!
//! ## Quick Start
//!
//! ```rust
//! use gamebot_proto::{Command, Message};
//!
//! let msg: Message = ":alice!a@host PRIVMSG #games :!game zelda".parse().unwrap();
//! assert_eq!(msg.source_nickname(), Some("alice"));
//! assert_eq!(msg.text(), Some("!game zelda"));
//!
//! let reply = Command::privmsg("#games", "No games found for 'zelda'");
//! assert_eq!(reply.to_string(), "PRIVMSG #games :No games found for 'zelda'");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod nick;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::{Message, Prefix};
pub use self::nick::{NickExt, DEFAULT_NICK_MAX_LEN};

/// Maximum accepted length of a single incoming line, terminator included.
pub const MAX_IRC_LINE_LEN: usize = 8191;
