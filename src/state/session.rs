//! Per-connection session state.
//!
//! One [`Session`] exists per connection. The event loop owns it and lends it
//! by `&mut` to the protocol machine and the command dispatcher in turn.

use gamebot_proto::irc_eq;
use tracing::info;

use super::channels::ChannelSet;
use super::machine::ConnectionState;

/// Mutable state of the current connection.
#[derive(Debug)]
pub struct Session {
    /// Nickname most recently accepted (or requested, before 001).
    pub nick: String,
    /// Configured primary nickname; collision suffixes are appended to this.
    pub base_nick: String,
    state: ConnectionState,
    /// Set once the server has welcomed us.
    pub registered: bool,
    /// The alternate nickname has been tried during this registration.
    pub alt_nick_tried: bool,
    /// Nickname collisions seen so far.
    pub nick_attempts: u32,
    /// Channels to be in.
    pub channels: ChannelSet,
}

impl Session {
    pub fn new(nick: impl Into<String>, channels: ChannelSet) -> Self {
        let nick = nick.into();
        Self {
            base_nick: nick.clone(),
            nick,
            state: ConnectionState::Disconnected,
            registered: false,
            alt_nick_tried: false,
            nick_attempts: 0,
            channels,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Ready
    }

    /// Move to `next`, logging the transition.
    pub fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            info!(from = ?self.state, to = ?next, nick = %self.nick, "Connection state changed");
            self.state = next;
        }
    }

    /// True if `nick` is ours (RFC 1459 case-insensitive).
    pub fn is_own_nick(&self, nick: &str) -> bool {
        irc_eq(&self.nick, nick)
    }

    pub fn set_nick(&mut self, nick: impl Into<String>) {
        let nick = nick.into();
        if nick != self.nick {
            info!(old = %self.nick, new = %nick, "Nickname changed");
            self.nick = nick;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_disconnected() {
        let session = Session::new("GameBot", ChannelSet::default());
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(!session.registered);
        assert_eq!(session.base_nick, "GameBot");
    }

    #[test]
    fn test_own_nick_uses_irc_casemapping() {
        let mut session = Session::new("Game[Bot]", ChannelSet::default());
        assert!(session.is_own_nick("game{bot}"));
        assert!(!session.is_own_nick("GameBot"));

        session.set_nick("GameBot_");
        assert!(session.is_own_nick("gamebot_"));
        assert_eq!(session.base_nick, "Game[Bot]");
    }

    #[test]
    fn test_transition() {
        let mut session = Session::new("GameBot", ChannelSet::default());
        session.transition(ConnectionState::Ready);
        assert!(session.is_ready());
    }
}
