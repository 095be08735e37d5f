//! Domain models for notebot.
//!
//! - [`Note`]: a user's note, persisted by the [`store`](crate::store).
//! - [`InboundEvent`] and [`Payload`]: what the chat platform delivers and how
//!   button payloads are encoded.
//! - [`OutboundAction`]: what the bot hands back for rendering.

mod event;
mod note;
mod outbound;

pub use event::*;
pub use note::*;
pub use outbound::*;
