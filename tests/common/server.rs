//! Mock IRC server.
//!
//! Listens on an ephemeral loopback port and hands back the server side of
//! the bot's connection so tests can script the conversation line by line.

use std::time::Duration;

use gamebot_proto::Message;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

/// Server name used in scripted numerics.
pub const SERVER_NAME: &str = "mock.server";

/// A listening mock server.
pub struct MockServer {
    listener: TcpListener,
}

impl MockServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<BotConnection> {
        let (stream, _) = timeout(Duration::from_secs(5), self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(BotConnection {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }
}

/// Server side of the bot's connection.
pub struct BotConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl BotConnection {
    /// Send one line to the bot. CRLF is appended.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a numeric from the mock server.
    pub async fn numeric(&mut self, code: &str, rest: &str) -> anyhow::Result<()> {
        self.send_raw(&format!(":{} {} {}", SERVER_NAME, code, rest)).await
    }

    /// Send a PRIVMSG as `from`.
    pub async fn privmsg(&mut self, from: &str, target: &str, text: &str) -> anyhow::Result<()> {
        self.send_raw(&format!(":{from}!{from}@users.example PRIVMSG {target} :{text}"))
            .await
    }

    /// Next raw line from the bot, without the CRLF.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        self.recv_line_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_line_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("bot closed the connection");
        }
        if !line.ends_with("\r\n") {
            anyhow::bail!("line not CRLF terminated: {:?}", line);
        }
        Ok(line.trim_end_matches("\r\n").to_string())
    }

    /// Next line from the bot, parsed.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        let line = self.recv_line().await?;
        line.parse::<Message>()
            .map_err(|e| anyhow::anyhow!("Parse error: {}", e))
    }

    /// Receive lines until one satisfies `predicate`; returns all of them.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv_line().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Assert the bot sends nothing for `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.recv_line_timeout(dur).await {
            Ok(line) => anyhow::bail!("expected silence, got {:?}", line),
            Err(_) => Ok(()),
        }
    }

    /// Wait for the bot to close its side.
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = timeout(Duration::from_secs(5), self.reader.read_line(&mut line)).await??;
            if n == 0 {
                return Ok(());
            }
        }
    }

    /// Consume USER and NICK, then welcome the bot and end the MOTD.
    /// Returns the registration lines.
    pub async fn complete_registration(&mut self, nick: &str) -> anyhow::Result<Vec<String>> {
        let user = self.recv_line().await?;
        let nick_line = self.recv_line().await?;
        self.numeric("001", &format!("{nick} :Welcome to the MockNet IRC Network {nick}"))
            .await?;
        self.numeric("376", &format!("{nick} :End of /MOTD command."))
            .await?;
        Ok(vec![user, nick_line])
    }
}
