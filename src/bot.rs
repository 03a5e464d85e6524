//! The bot event loop.
//!
//! One task owns the connection. It reads lines in arrival order, feeds them
//! through the protocol machine and the dispatcher, and performs every write
//! through the single paced writer. Searches run on worker tasks bounded by a
//! semaphore and hand their reply batch back over a channel, so workers never
//! touch the wire.

use std::future::Future;
use std::sync::Arc;

use gamebot_proto::{Command, Message};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, warn};

use crate::config::Config;
use crate::error::{BotError, TransportError};
use crate::handlers::{AccessList, Dispatcher, Effect, SearchRequest, format_reply};
use crate::network::{self, LineReader, LineWriter};
use crate::search::SearchGateway;
use crate::state::{Action, ChannelSet, ChannelStore, MachineConfig, ProtocolMachine, Session};
use crate::telemetry::spans;

/// QUIT message sent on every orderly stop.
pub const QUIT_REASON: &str = "Bot shutting down";

/// Queue depth for finished search replies.
const REPLY_QUEUE: usize = 32;

/// Why a session ended without a transport error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The owner sent `!restart`.
    Restart,
    /// The process was asked to stop (Ctrl-C).
    Interrupted,
    /// The server sent `ERROR`.
    ServerClosed,
    /// The server closed the stream.
    ConnectionClosed,
}

impl StopReason {
    /// True when the stop was requested rather than imposed by the server.
    pub fn is_requested(self) -> bool {
        matches!(self, Self::Restart | Self::Interrupted)
    }
}

/// Formatted reply batch from a finished search.
#[derive(Debug)]
struct SearchReply {
    target: String,
    lines: Vec<String>,
}

/// The IRC game bot.
pub struct Bot {
    config: Config,
    store: Arc<dyn ChannelStore>,
    gateway: Arc<dyn SearchGateway>,
}

impl Bot {
    pub fn new(
        config: Config,
        store: Arc<dyn ChannelStore>,
        gateway: Arc<dyn SearchGateway>,
    ) -> Self {
        Self {
            config,
            store,
            gateway,
        }
    }

    /// Run one session until it stops or Ctrl-C is pressed.
    pub async fn run(&self) -> Result<StopReason, BotError> {
        self.run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run one session until it stops or `shutdown` resolves.
    pub async fn run_with_shutdown<F>(&self, shutdown: F) -> Result<StopReason, BotError>
    where
        F: Future<Output = ()> + Send,
    {
        let server = &self.config.server;
        let span = spans::session(&server.host, server.port, &self.config.bot.nick);
        self.session(shutdown).instrument(span).await
    }

    async fn session<F>(&self, shutdown: F) -> Result<StopReason, BotError>
    where
        F: Future<Output = ()> + Send,
    {
        let channels = ChannelSet::from_names(self.store.load().await?);
        info!(channels = channels.len(), "Starting IRC game bot");

        let mut session = Session::new(self.config.bot.nick.clone(), channels);
        let machine = ProtocolMachine::new(MachineConfig::from(&self.config.bot));
        let dispatcher = Dispatcher::new(AccessList::from_config(&self.config.bot), self.store.clone());

        let server = &self.config.server;
        let (mut reader, mut writer) = network::connect(
            &server.host,
            server.port,
            server.tls,
            self.config.bot.message_delay(),
        )
        .await?;

        let mut workers = JoinSet::new();
        let result = self
            .drive(
                &mut session,
                &machine,
                &dispatcher,
                &mut reader,
                &mut writer,
                &mut workers,
                shutdown,
            )
            .await;

        machine.connection_lost(&mut session);
        if !workers.is_empty() {
            debug!(count = workers.len(), "Aborting in-flight searches");
        }
        workers.abort_all();
        writer.close(QUIT_REASON).await;

        match &result {
            Ok(reason) => info!(?reason, "Session ended"),
            Err(BotError::Transport(e)) => warn!(code = e.error_code(), error = %e, "Session failed"),
            Err(e) => warn!(error = %e, "Session failed"),
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn drive<S, F>(
        &self,
        session: &mut Session,
        machine: &ProtocolMachine,
        dispatcher: &Dispatcher,
        reader: &mut LineReader<S>,
        writer: &mut LineWriter<S>,
        workers: &mut JoinSet<()>,
        shutdown: F,
    ) -> Result<StopReason, BotError>
    where
        S: AsyncRead + AsyncWrite,
        F: Future<Output = ()> + Send,
    {
        let (reply_tx, mut reply_rx) = mpsc::channel::<SearchReply>(REPLY_QUEUE);
        let permits = Arc::new(Semaphore::new(self.config.igdb.max_concurrent.max(1)));
        let mut shutdown = std::pin::pin!(shutdown);

        for action in machine.start(session) {
            if let Action::Send(cmd) = action {
                writer.send(&cmd).await?;
            }
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    return Ok(StopReason::Interrupted);
                }

                Some(reply) = reply_rx.recv() => {
                    debug!(
                        to = %reply.target,
                        lines = reply.lines.len(),
                        wait_ms = writer.pending_delay().as_millis() as u64,
                        "Sending search reply"
                    );
                    for line in reply.lines {
                        writer.send(&Command::privmsg(reply.target.clone(), line)).await?;
                    }
                }

                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            warn!(error = %e, "Search worker panicked");
                        }
                    }
                }

                line = reader.next_line() => {
                    let Some(line) = line? else {
                        info!("Server closed the connection");
                        return Ok(StopReason::ConnectionClosed);
                    };
                    debug!(line = %line, "RECV");

                    let msg: Message = match line.parse() {
                        Ok(msg) => msg,
                        Err(e) => {
                            debug!(error = %e, "Dropping malformed line");
                            continue;
                        }
                    };

                    for action in machine.feed(session, &msg) {
                        match action {
                            Action::Send(cmd) => writer.send(&cmd).await?,
                            Action::Pause(delay) => tokio::time::sleep(delay).await,
                            Action::Stop => return Ok(StopReason::ServerClosed),
                            Action::Dispatch => {
                                let effects = dispatcher.dispatch(session, &msg).await;
                                if let Some(reason) =
                                    self.apply(effects, writer, workers, &permits, &reply_tx).await?
                                {
                                    return Ok(reason);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Apply dispatcher effects in order. Returns a stop reason if one was requested.
    async fn apply<S: AsyncWrite>(
        &self,
        effects: Vec<Effect>,
        writer: &mut LineWriter<S>,
        workers: &mut JoinSet<()>,
        permits: &Arc<Semaphore>,
        replies: &mpsc::Sender<SearchReply>,
    ) -> Result<Option<StopReason>, TransportError> {
        let mut stop = None;
        for effect in effects {
            match effect {
                Effect::Send(cmd) => writer.send(&cmd).await?,
                Effect::Search(request) => {
                    self.spawn_search(request, workers, permits.clone(), replies.clone())
                }
                Effect::Shutdown => stop = Some(StopReason::Restart),
            }
        }
        Ok(stop)
    }

    fn spawn_search(
        &self,
        request: SearchRequest,
        workers: &mut JoinSet<()>,
        permits: Arc<Semaphore>,
        replies: mpsc::Sender<SearchReply>,
    ) {
        let gateway = self.gateway.clone();
        let span = spans::search(&request.target, &request.query);
        workers.spawn(
            async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                let outcome = gateway.search(&request.query, &request.filters).await;
                match &outcome {
                    Ok(games) => debug!(hits = games.len(), "Search finished"),
                    Err(e) => warn!(error = %e, "Search failed"),
                }
                let lines = format_reply(&request.query, &outcome);
                let _ = replies
                    .send(SearchReply {
                        target: request.target,
                        lines,
                    })
                    .await;
            }
            .instrument(span),
        );
    }
}
