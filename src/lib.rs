//! notebot: a conversational note-taking bot.
//!
//! Users create, list, complete and delete short notes through button menus
//! and a two-step capture dialogue (title, then content).
//!
//! - [`store`]: per-user note collections persisted as one JSON snapshot.
//! - [`conversation`]: per-user capture dialogue state.
//! - [`view`]: pagination and rendering of replies.
//! - [`bot`]: turns inbound events into store mutations and replies.
//! - [`max`] and [`api`]: adapters feeding events in from the outside.

pub mod api;
pub mod bot;
pub mod config;
pub mod conversation;
pub mod max;
pub mod models;
pub mod store;
pub mod view;
