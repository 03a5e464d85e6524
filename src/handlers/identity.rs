//! Sender authorization.

use std::collections::HashSet;

use gamebot_proto::irc_to_lower;

use crate::config::BotConfig;

/// Who sent a command, as far as the bot cares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub nick: String,
    pub is_owner: bool,
    pub is_admin: bool,
}

/// Owner and admin nicknames, stored in RFC 1459 lower case.
#[derive(Clone, Debug, Default)]
pub struct AccessList {
    owner: String,
    admins: HashSet<String>,
}

impl AccessList {
    /// The owner is always an admin.
    pub fn new(owner: &str, admins: &[String]) -> Self {
        let owner = irc_to_lower(owner.trim());
        let mut set: HashSet<String> = admins
            .iter()
            .map(|a| irc_to_lower(a.trim()))
            .filter(|a| !a.is_empty())
            .collect();
        if !owner.is_empty() {
            set.insert(owner.clone());
        }
        Self { owner, admins: set }
    }

    pub fn from_config(bot: &BotConfig) -> Self {
        Self::new(&bot.owner, &bot.admins)
    }

    pub fn identify(&self, nick: &str) -> Identity {
        let folded = irc_to_lower(nick);
        Identity {
            nick: nick.to_string(),
            is_owner: !self.owner.is_empty() && folded == self.owner,
            is_admin: self.admins.contains(&folded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_admin() {
        let access = AccessList::new("boliver", &[]);
        let id = access.identify("BOLIVER");
        assert!(id.is_owner);
        assert!(id.is_admin);
    }

    #[test]
    fn test_admin_is_not_owner() {
        let access = AccessList::new("boliver", &["Alice".to_string()]);
        let id = access.identify("alice");
        assert!(id.is_admin);
        assert!(!id.is_owner);
    }

    #[test]
    fn test_rfc1459_folding() {
        let access = AccessList::new("boliver", &["[Mod]".to_string()]);
        assert!(access.identify("{mod}").is_admin);
        assert!(!access.identify("mod").is_admin);
    }

    #[test]
    fn test_strangers_have_no_rights() {
        let access = AccessList::new("boliver", &["alice".to_string()]);
        let id = access.identify("mallory");
        assert_eq!(
            id,
            Identity {
                nick: "mallory".to_string(),
                is_owner: false,
                is_admin: false
            }
        );
    }
}
