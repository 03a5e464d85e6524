//! Private-message admin commands.

use gamebot_proto::Command;
use tracing::{info, warn};

use super::Effect;
use super::identity::Identity;
use crate::state::{ChannelStore, Session, is_valid_channel, normalize_channel};

pub const HELP_TEXT: &str =
    "Admin commands: !restart (owner only), !join #channel, !part #channel, !help";

fn reply(identity: &Identity, text: impl Into<String>) -> Effect {
    Effect::Send(Command::privmsg(identity.nick.clone(), text))
}

/// `!join <channel>`: add to the set, join, persist, acknowledge.
pub(super) async fn join(
    session: &mut Session,
    store: &dyn ChannelStore,
    identity: &Identity,
    arg: &str,
) -> Vec<Effect> {
    let channel = normalize_channel(arg);
    if !is_valid_channel(&channel) {
        return vec![reply(identity, "Usage: !join #channel")];
    }
    let changed = session.channels.insert(&channel);
    info!(admin = %identity.nick, channel = %channel, "Joining channel on request");

    let mut effects = vec![Effect::Send(Command::JOIN(channel.clone()))];
    effects.push(reply(identity, persist(session, store, changed, format!("Joined {}", channel)).await));
    effects
}

/// `!part <channel>`: mirror of `join`.
pub(super) async fn part(
    session: &mut Session,
    store: &dyn ChannelStore,
    identity: &Identity,
    arg: &str,
) -> Vec<Effect> {
    let channel = normalize_channel(arg);
    if !is_valid_channel(&channel) {
        return vec![reply(identity, "Usage: !part #channel")];
    }
    let changed = session.channels.remove(&channel);
    info!(admin = %identity.nick, channel = %channel, "Leaving channel on request");

    let mut effects = vec![Effect::Send(Command::PART(channel.clone()))];
    effects.push(reply(identity, persist(session, store, changed, format!("Left {}", channel)).await));
    effects
}

/// Save the set if it changed; the acknowledgement names any failure.
async fn persist(session: &Session, store: &dyn ChannelStore, changed: bool, ack: String) -> String {
    if !changed {
        return ack;
    }
    match store.save(session.channels.as_slice()).await {
        Ok(()) => ack,
        Err(e) => {
            warn!(error = %e, "Failed to save channel list");
            format!("{} (failed to save channel list: {})", ack, e)
        }
    }
}

pub(super) fn help(identity: &Identity) -> Vec<Effect> {
    vec![reply(identity, HELP_TEXT)]
}

/// `!restart`: owner only. Anyone else is ignored.
pub(super) fn restart(identity: &Identity) -> Vec<Effect> {
    if !identity.is_owner {
        return Vec::new();
    }
    info!(owner = %identity.nick, "Restart requested");
    vec![reply(identity, "Restarting bot..."), Effect::Shutdown]
}
