//! Network module.
//!
//! Contains the server connection (plain or TLS), CRLF line framing and the
//! outbound send pacer.

pub mod limit;
mod stream;
mod tls;
pub mod transport;

pub use limit::SendPacer;
pub use stream::BotStream;
pub use transport::{LineReader, LineWriter, connect, split};
