//! trello
//!
//! Minimal Trello REST client for the fixed set of board, card, list and
//! comment operations the hook performs.
//!
//! # Architecture
//!
//! The [`TrelloApi`] trait defines the interface; the engine only ever
//! sees `&dyn TrelloApi`. The REST implementation degrades API-level
//! failures (non-2xx, unparseable bodies) to empty results so callers
//! must check for absence rather than catch errors; only transport
//! failures surface as `TrelloError`.
//!
//! # Modules
//!
//! - `traits`: Core `TrelloApi` trait and domain types
//! - [`rest`]: HTTPS implementation against `api.trello.com`
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use git_trello::trello::{Credentials, TrelloApi, TrelloClient};
//!
//! let client = TrelloClient::new(
//!     Credentials::new("key", "token"),
//!     "board-id",
//! );
//!
//! if let Some(card) = client.get_card(&number).await? {
//!     client.add_comment(&card.id, "hello from the hook").await?;
//! }
//! ```

pub mod mock;
pub mod rest;
mod traits;

pub use rest::{Credentials, TrelloClient};
pub use traits::*;
