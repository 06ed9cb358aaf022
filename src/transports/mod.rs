//! Concrete transport sessions.
//!
//! - [`TcpTransport`]: live line-delimited JSON over TCP
//! - [`ReplayTransport`]: paced playback of a `.jsonl` recording

mod replay;
mod tcp;

pub use replay::{DEFAULT_REPLAY_HZ, ReplayTransport};
pub use tcp::TcpTransport;
