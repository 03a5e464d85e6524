//! Client-side connection lifecycle.
//!
//! ```text
//! Disconnected ─► Connecting ─► Registering ─► AwaitingMotd ─► JoiningChannels ─► Ready
//!                                 ▲     │ 433 (new NICK)
//!                                 └─────┘
//! ```
//!
//! The machine does no I/O. [`ProtocolMachine::feed`] takes one parsed line
//! and returns the [`Action`]s the caller must perform, in order. PING is
//! answered in every live state before anything else is looked at.

use gamebot_proto::{Command, Message};
use rand::Rng;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use super::session::Session;
use crate::config::BotConfig;

const RPL_WELCOME: u16 = 1;
const RPL_ENDOFMOTD: u16 = 376;
const ERR_NOMOTD: u16 = 422;
const ERR_NICKNAMEINUSE: u16 = 433;
const ERR_NOTREGISTERED: u16 = 451;

/// Lifecycle state of the connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection, or the connection has ended.
    #[default]
    Disconnected,
    /// Stream open, nothing sent yet.
    Connecting,
    /// USER/NICK sent, waiting for 001.
    Registering,
    /// Welcomed, waiting for the end of the MOTD.
    AwaitingMotd,
    /// Sending autojoins and perform lines.
    JoiningChannels,
    /// Normal operation; user commands are dispatched.
    Ready,
}

/// Something the caller must do on behalf of the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Write this command through the paced writer.
    Send(Command),
    /// Sleep before carrying on with the next action.
    Pause(Duration),
    /// Hand the line to the command dispatcher.
    Dispatch,
    /// End the session.
    Stop,
}

/// Registration settings the machine needs.
#[derive(Clone, Debug)]
pub struct MachineConfig {
    pub realname: String,
    pub alt_nick: Option<String>,
    pub join_delay: Duration,
    pub perform: Vec<String>,
}

impl From<&BotConfig> for MachineConfig {
    fn from(bot: &BotConfig) -> Self {
        Self {
            realname: bot.realname().to_string(),
            alt_nick: bot.alt_nick.clone().filter(|n| !n.is_empty()),
            join_delay: bot.join_delay(),
            perform: bot.perform_lines(),
        }
    }
}

/// Sans-IO protocol state machine.
#[derive(Clone, Debug)]
pub struct ProtocolMachine {
    config: MachineConfig,
}

impl ProtocolMachine {
    pub fn new(config: MachineConfig) -> Self {
        Self { config }
    }

    /// Begin registration on a freshly opened stream.
    ///
    /// Does nothing if a registration is already under way.
    pub fn start(&self, session: &mut Session) -> Vec<Action> {
        if session.state() != ConnectionState::Disconnected
            && session.state() != ConnectionState::Connecting
        {
            debug!(state = ?session.state(), "Registration already in progress");
            return Vec::new();
        }

        session.transition(ConnectionState::Connecting);
        session.registered = false;
        session.alt_nick_tried = false;
        session.nick_attempts = 0;
        session.transition(ConnectionState::Registering);
        self.registration(session)
    }

    /// Feed one incoming line.
    pub fn feed(&self, session: &mut Session, msg: &Message) -> Vec<Action> {
        if session.state() == ConnectionState::Disconnected {
            return Vec::new();
        }

        if msg.is("PING") {
            let token = msg.arg(0).unwrap_or_default();
            return vec![Action::Send(Command::PONG(token.to_string()))];
        }

        if msg.is("ERROR") {
            warn!(reason = msg.text().unwrap_or_default(), "Server closed the link");
            session.transition(ConnectionState::Disconnected);
            return vec![Action::Stop];
        }

        if msg.is("NICK") {
            self.on_nick_change(session, msg);
            return Vec::new();
        }

        match msg.numeric() {
            Some(RPL_WELCOME) if !session.registered => return self.on_welcome(session, msg),
            Some(RPL_ENDOFMOTD | ERR_NOMOTD) => return self.on_motd_end(session),
            Some(ERR_NICKNAMEINUSE) => return self.on_nick_in_use(session),
            Some(ERR_NOTREGISTERED) if session.state() == ConnectionState::Registering => {
                debug!("Server says we are not registered, resending USER/NICK");
                return self.registration(session);
            }
            _ => {}
        }

        if !session.registered && msg.text().is_some_and(|t| t.contains("Welcome")) {
            return self.on_welcome(session, msg);
        }

        if session.is_ready() {
            vec![Action::Dispatch]
        } else {
            debug!(state = ?session.state(), command = %msg.command, "Dropping line before ready");
            Vec::new()
        }
    }

    /// The stream has gone away.
    pub fn connection_lost(&self, session: &mut Session) {
        session.transition(ConnectionState::Disconnected);
    }

    fn registration(&self, session: &Session) -> Vec<Action> {
        vec![
            Action::Send(Command::USER(
                session.nick.clone(),
                self.config.realname.clone(),
            )),
            Action::Send(Command::NICK(session.nick.clone())),
        ]
    }

    fn on_welcome(&self, session: &mut Session, msg: &Message) -> Vec<Action> {
        if msg.numeric() == Some(RPL_WELCOME) {
            if let Some(nick) = msg.arg(0).filter(|n| !n.is_empty() && *n != "*") {
                session.set_nick(nick);
            }
        }
        session.registered = true;
        info!(nick = %session.nick, "Registered with server");
        session.transition(ConnectionState::AwaitingMotd);
        Vec::new()
    }

    fn on_motd_end(&self, session: &mut Session) -> Vec<Action> {
        match session.state() {
            ConnectionState::AwaitingMotd | ConnectionState::Registering => {}
            state => {
                debug!(?state, "Ignoring repeated end of MOTD");
                return Vec::new();
            }
        }

        session.registered = true;
        session.transition(ConnectionState::JoiningChannels);
        info!(count = session.channels.len(), "MOTD complete, joining channels");

        let mut actions = Vec::with_capacity(session.channels.len() * 2 + self.config.perform.len());
        for channel in session.channels.iter() {
            actions.push(Action::Send(Command::JOIN(channel.to_string())));
            actions.push(Action::Pause(self.config.join_delay));
        }
        for line in &self.config.perform {
            actions.push(Action::Send(Command::Raw(line.clone())));
        }

        session.transition(ConnectionState::Ready);
        actions
    }

    fn on_nick_in_use(&self, session: &mut Session) -> Vec<Action> {
        if session.state() != ConnectionState::Registering {
            debug!(state = ?session.state(), "Ignoring 433 outside registration");
            return Vec::new();
        }

        session.nick_attempts += 1;
        let next = match &self.config.alt_nick {
            Some(alt) if !session.alt_nick_tried && !session.is_own_nick(alt) => {
                session.alt_nick_tried = true;
                alt.clone()
            }
            _ => format!(
                "{}{}",
                session.base_nick,
                rand::thread_rng().gen_range(100..=999)
            ),
        };

        warn!(
            taken = %session.nick,
            next = %next,
            attempt = session.nick_attempts,
            "Nickname in use"
        );
        session.set_nick(next.clone());
        vec![Action::Send(Command::NICK(next))]
    }

    fn on_nick_change(&self, session: &mut Session, msg: &Message) {
        let Some(source) = msg.source_nickname() else {
            return;
        };
        if session.is_own_nick(source) {
            if let Some(new_nick) = msg.arg(0).filter(|n| !n.is_empty()) {
                session.set_nick(new_nick);
            }
        }
    }
}
