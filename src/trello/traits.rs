//! Core Trello API trait and domain types.
//!
//! Defines the narrow interface the hook needs: resolve cards by their
//! short number, read and write comments, move cards between lists, and
//! create/drain lists for releases.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::CardNumber;

// =============================================================================
// Errors
// =============================================================================

/// Errors from Trello operations.
///
/// API-level failures (non-2xx responses, bodies that fail to parse) are
/// deliberately **not** errors: they come back as `None`/empty results
/// and the caller decides whether absence matters. Only failures to talk
/// to the service at all are raised.
#[derive(Debug, Error)]
pub enum TrelloError {
    /// The request never completed (DNS, connect, TLS, interrupted body).
    #[error("network error: {0}")]
    Network(String),
}

// =============================================================================
// Domain types
// =============================================================================

/// A Trello card, reduced to the attributes the hook touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Opaque API id.
    pub id: String,
    /// Id of the list the card currently sits in.
    pub id_list: String,
}

/// A list (column) on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrelloList {
    /// Opaque API id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A comment on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardComment {
    /// Id of the comment action (used for deletion).
    pub id: String,
    /// Comment text.
    pub text: String,
}

/// Position within a list for card placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPosition {
    /// Top of the list.
    Top,
    /// Bottom of the list.
    Bottom,
}

impl CardPosition {
    /// The wire value the API expects.
    pub fn as_str(self) -> &'static str {
        match self {
            CardPosition::Top => "top",
            CardPosition::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for CardPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// TrelloApi trait
// =============================================================================

/// Interface to the Trello API, scoped to one board.
///
/// Implementations must be `Send + Sync` so the trait object can live in
/// the engine across await points.
#[async_trait]
pub trait TrelloApi: Send + Sync {
    /// All lists on the board.
    ///
    /// # Errors
    ///
    /// `TrelloError::Network` if the service was unreachable; `Ok(None)`
    /// if the API refused or returned garbage.
    async fn get_lists(&self) -> Result<Option<Vec<TrelloList>>, TrelloError>;

    /// First list on the board with the given name.
    async fn find_list(&self, name: &str) -> Result<Option<TrelloList>, TrelloError> {
        let lists = self.get_lists().await?;
        Ok(lists.and_then(|lists| lists.into_iter().find(|list| list.name == name)))
    }

    /// Resolve a card by its short per-board number.
    ///
    /// `Ok(None)` covers both "no such card" and a degraded API.
    async fn get_card(&self, number: &CardNumber) -> Result<Option<Card>, TrelloError>;

    /// All comments on a card, newest first (API order).
    async fn get_comments(&self, card_id: &str) -> Result<Option<Vec<CardComment>>, TrelloError>;

    /// Post a comment; returns the created comment when the API
    /// acknowledged it.
    async fn add_comment(
        &self,
        card_id: &str,
        text: &str,
    ) -> Result<Option<CardComment>, TrelloError>;

    /// Delete each of the given comments. Individual API refusals are
    /// swallowed; only transport failures abort.
    async fn delete_comments(&self, comments: &[CardComment]) -> Result<(), TrelloError>;

    /// Move a card to another list at the given position.
    async fn move_card(
        &self,
        card_id: &str,
        list_id: &str,
        position: CardPosition,
    ) -> Result<(), TrelloError>;

    /// Create a new list on the board.
    async fn create_list(&self, name: &str) -> Result<Option<TrelloList>, TrelloError>;

    /// Move every card from one list to another; returns the moved cards
    /// when the API reports them.
    async fn move_all_cards(
        &self,
        from_list_id: &str,
        to_list_id: &str,
    ) -> Result<Option<Vec<Card>>, TrelloError>;
}
