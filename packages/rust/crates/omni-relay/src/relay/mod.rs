//! Relay: access gate, local commands, completion call, reply.

mod commands;
mod handler;
mod traits;

pub use commands::{REFUSAL_MESSAGE, RelayCommand};
pub use handler::RelayHandler;
pub use traits::{Completer, InboundEvent, MessageSink};
