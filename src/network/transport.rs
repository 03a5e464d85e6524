//! Framed line transport to the IRC server.
//!
//! [`connect`] opens the stream and splits it into a [`LineReader`] and a
//! paced [`LineWriter`]. Both halves are generic over the stream so tests can
//! run them over an in-memory duplex pipe.

use futures_util::{SinkExt, StreamExt};
use gamebot_proto::{Command, LineCodec};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::time::Duration;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info};

use super::limit::SendPacer;
use super::stream::BotStream;
use super::tls::upgrade_to_tls;
use crate::error::TransportError;

/// Read half: yields decoded lines in arrival order.
pub struct LineReader<S = BotStream> {
    framed: FramedRead<ReadHalf<S>, LineCodec>,
}

/// Write half: every line passes through the pacer.
pub struct LineWriter<S = BotStream> {
    framed: FramedWrite<WriteHalf<S>, LineCodec>,
    pacer: SendPacer,
}

/// Connect to `host:port`, optionally over TLS, and split the stream.
pub async fn connect(
    host: &str,
    port: u16,
    tls: bool,
    min_interval: Duration,
) -> Result<(LineReader, LineWriter), TransportError> {
    let addr = format!("{}:{}", host, port);
    info!(addr = %addr, tls, "Connecting");

    let tcp_stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| TransportError::Connect {
            addr: addr.clone(),
            source,
        })?;
    if let Err(e) = tcp_stream.set_nodelay(true) {
        debug!(error = %e, "failed to set TCP_NODELAY");
    }

    let stream = if tls {
        BotStream::Tls(Box::new(upgrade_to_tls(tcp_stream, host).await?))
    } else {
        BotStream::Plain(tcp_stream)
    };

    info!(addr = %addr, tls = stream.is_tls(), "Connected");
    Ok(split(stream, min_interval))
}

/// Split any byte stream into a line reader and a paced line writer.
pub fn split<S>(stream: S, min_interval: Duration) -> (LineReader<S>, LineWriter<S>)
where
    S: AsyncRead + AsyncWrite,
{
    let (read_half, write_half) = tokio::io::split(stream);
    (
        LineReader {
            framed: FramedRead::new(read_half, LineCodec::new()),
        },
        LineWriter {
            framed: FramedWrite::new(write_half, LineCodec::new()),
            pacer: SendPacer::new(min_interval),
        },
    )
}

impl<S: AsyncRead> LineReader<S> {
    /// Next complete line, `None` once the server closes the connection.
    pub async fn next_line(&mut self) -> Result<Option<String>, TransportError> {
        match self.framed.next().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(TransportError::Read(e)),
            None => Ok(None),
        }
    }
}

impl<S: AsyncWrite> LineWriter<S> {
    /// Send one line, waiting for the pacer first. CRLF is appended here.
    pub async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.pacer.ready().await;
        self.framed
            .send(line)
            .await
            .map_err(TransportError::Write)?;
        self.pacer.record_send();
        debug!(line = %LineCodec::sanitize(line), "SENT");
        Ok(())
    }

    /// Send a command.
    pub async fn send(&mut self, command: &Command) -> Result<(), TransportError> {
        self.send_line(&command.to_string()).await
    }

    /// Time until the next send would be allowed.
    pub fn pending_delay(&self) -> Duration {
        self.pacer.delay()
    }

    /// Best-effort `QUIT`, then shut the stream down. Never fails.
    pub async fn close(mut self, reason: &str) {
        if let Err(e) = self.send(&Command::QUIT(Some(reason.to_string()))).await {
            debug!(error = %e, "QUIT not delivered");
        }
        if let Err(e) = SinkExt::<&str>::close(&mut self.framed).await {
            debug!(error = %e, "stream shutdown failed");
        }
        info!("Disconnected from IRC server");
    }
}
