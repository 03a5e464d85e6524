//! Incoming IRC lines.
//!
//! A [`Message`] is one parsed line: `[@tags] [:prefix] COMMAND params... [:trailing]`.
//! Message tags are accepted and skipped; the bot never negotiates IRCv3
//! capabilities, but some servers send tags regardless.

use std::fmt;
use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};

/// Source of a message (`nick!user@host` or a server name).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
    /// Nickname or server name.
    pub name: String,
    /// Username, when the source is a user.
    pub user: Option<String>,
    /// Hostname, when the source is a user.
    pub host: Option<String>,
}

impl Prefix {
    /// Parse a prefix without its leading `:`.
    pub fn parse(s: &str) -> Self {
        let (rest, host) = match s.split_once('@') {
            Some((rest, host)) => (rest, Some(host.to_string())),
            None => (s, None),
        };
        let (name, user) = match rest.split_once('!') {
            Some((name, user)) => (name, Some(user.to_string())),
            None => (rest, None),
        };

        Self {
            name: name.to_string(),
            user,
            host,
        }
    }

    /// The nickname, if this prefix names a user rather than a server.
    ///
    /// Server names always contain a `.`; nicknames never do.
    pub fn nickname(&self) -> Option<&str> {
        if self.user.is_some() || self.host.is_some() || !self.name.contains('.') {
            Some(&self.name)
        } else {
            None
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(user) = &self.user {
            write!(f, "!{}", user)?;
        }
        if let Some(host) = &self.host {
            write!(f, "@{}", host)?;
        }
        Ok(())
    }
}

/// A single parsed protocol line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Message source, if present.
    pub prefix: Option<Prefix>,
    /// Command name (uppercased) or three-digit numeric.
    pub command: String,
    /// Middle parameters, in order.
    pub params: Vec<String>,
    /// Trailing parameter (the text after ` :`), if present.
    pub trailing: Option<String>,
}

impl Message {
    /// Numeric reply code, if the command is a three-digit numeric.
    pub fn numeric(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }

    /// True if the command is `name` (case-insensitive).
    pub fn is(&self, name: &str) -> bool {
        self.command.eq_ignore_ascii_case(name)
    }

    /// Nth argument, counting the trailing parameter as the last one.
    pub fn arg(&self, index: usize) -> Option<&str> {
        match self.params.get(index) {
            Some(p) => Some(p.as_str()),
            None if index == self.params.len() => self.trailing.as_deref(),
            None => None,
        }
    }

    /// The free text of the line: the trailing parameter, or the last middle
    /// parameter for servers that omit the `:`.
    pub fn text(&self) -> Option<&str> {
        self.trailing
            .as_deref()
            .or_else(|| self.params.last().map(String::as_str))
    }

    /// Nickname of the sender, if the source is a user.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nickname)
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        let mut rest = s.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        if rest.is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        if rest.starts_with('@') {
            rest = match rest.split_once(' ') {
                Some((_, r)) => r.trim_start_matches(' '),
                None => return Err(invalid(MessageParseError::MissingCommandAfterTags)),
            };
        }

        let mut prefix = None;
        if let Some(p) = rest.strip_prefix(':') {
            let (raw_prefix, r) = match p.split_once(' ') {
                Some(parts) => parts,
                None => return Err(invalid(MessageParseError::MissingCommand)),
            };
            prefix = Some(Prefix::parse(raw_prefix));
            rest = r.trim_start_matches(' ');
        }

        let (middle, trailing) = match rest.find(" :") {
            Some(pos) => (&rest[..pos], Some(rest[pos + 2..].to_string())),
            None => (rest, None),
        };

        let mut words = middle.split(' ').filter(|w| !w.is_empty());
        let command = match words.next() {
            Some(c) => c.to_ascii_uppercase(),
            None => return Err(invalid(MessageParseError::MissingCommand)),
        };
        let params = words.map(str::to_string).collect();

        Ok(Message {
            prefix,
            command,
            params,
            trailing,
        })
    }
}
