//! Connection state.
//!
//! Contains the session struct, the protocol lifecycle machine and the
//! channel membership set with its persistence.

pub mod channels;
pub mod machine;
mod session;

pub use channels::{
    ChannelSet, ChannelStore, FileChannelStore, MemoryChannelStore, is_valid_channel,
    normalize_channel,
};
pub use machine::{Action, ConnectionState, MachineConfig, ProtocolMachine};
pub use session::Session;
