//! Command dispatch.
//!
//! The [`Dispatcher`] classifies a `PRIVMSG` from a ready session and
//! returns the [`Effect`]s to apply. It never writes to the wire itself; the
//! event loop applies effects in order through the paced writer.
//!
//! - Channel messages: `!game` searches, open to everyone.
//! - Private messages to the bot: admin commands. Non-admins get silence.

mod admin;
pub mod game;
mod identity;

pub use admin::HELP_TEXT;
pub use game::{GAME_USAGE, GameQuery, format_reply, parse_game_args};
pub use identity::{AccessList, Identity};

use std::sync::Arc;

use gamebot_proto::{Command, Message};
use tracing::{Instrument, debug};

use crate::search::Filters;
use crate::state::{ChannelStore, Session};
use crate::telemetry::spans;

/// A search to run off the event loop. Its reply batch goes to `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub target: String,
    pub query: String,
    pub filters: Filters,
}

/// Output of dispatch, applied by the event loop in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Write a command.
    Send(Command),
    /// Start a catalog search.
    Search(SearchRequest),
    /// End the session after the preceding effects.
    Shutdown,
}

/// Routes user commands to their handlers.
pub struct Dispatcher {
    access: AccessList,
    store: Arc<dyn ChannelStore>,
}

impl Dispatcher {
    pub fn new(access: AccessList, store: Arc<dyn ChannelStore>) -> Self {
        Self { access, store }
    }

    /// Handle one line from a ready session.
    pub async fn dispatch(&self, session: &mut Session, msg: &Message) -> Vec<Effect> {
        if !msg.is("PRIVMSG") {
            return Vec::new();
        }
        let (Some(sender), Some(target), Some(text)) =
            (msg.source_nickname(), msg.arg(0), msg.arg(1))
        else {
            return Vec::new();
        };

        let span = spans::command(sender, target);
        async {
            if target.starts_with('#') {
                self.channel_message(target, text)
            } else if session.is_own_nick(target) {
                self.private_message(session, sender, text).await
            } else {
                Vec::new()
            }
        }
        .instrument(span)
        .await
    }

    fn channel_message(&self, channel: &str, text: &str) -> Vec<Effect> {
        let Some(args) = text.strip_prefix("!game ") else {
            return Vec::new();
        };

        let GameQuery { query, filters } = parse_game_args(args);
        if query.is_empty() {
            return vec![Effect::Send(Command::privmsg(channel, GAME_USAGE))];
        }

        debug!(query = %query, ?filters, "Game search requested");
        vec![Effect::Search(SearchRequest {
            target: channel.to_string(),
            query,
            filters,
        })]
    }

    async fn private_message(&self, session: &mut Session, sender: &str, text: &str) -> Vec<Effect> {
        let identity = self.access.identify(sender);
        if !identity.is_admin {
            debug!(sender = %sender, "Ignoring private message from non-admin");
            return Vec::new();
        }

        let text = text.trim();
        let (command, arg) = text
            .split_once(char::is_whitespace)
            .map_or((text, ""), |(c, a)| (c, a.trim()));

        match command {
            "!join" => admin::join(session, self.store.as_ref(), &identity, arg).await,
            "!part" => admin::part(session, self.store.as_ref(), &identity, arg).await,
            "!help" => admin::help(&identity),
            "!restart" => admin::restart(&identity),
            _ => Vec::new(),
        }
    }
}
