//! Mock Trello implementation for deterministic testing.
//!
//! Holds board state in memory and records every operation so tests can
//! assert both outcomes and call patterns (including that no calls were
//! made at all).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::types::CardNumber;
use crate::trello::traits::{
    Card, CardComment, CardPosition, TrelloApi, TrelloError, TrelloList,
};

/// Operation a test can pick as degraded: the mock answers `None` for it
/// while everything else works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    GetLists,
    GetCard,
    GetComments,
    AddComment,
    CreateList,
    MoveAllCards,
}

/// A recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetLists,
    GetCard {
        number: String,
    },
    GetComments {
        card_id: String,
    },
    AddComment {
        card_id: String,
        text: String,
    },
    DeleteComments {
        comment_ids: Vec<String>,
    },
    MoveCard {
        card_id: String,
        list_id: String,
        position: CardPosition,
    },
    CreateList {
        name: String,
    },
    MoveAllCards {
        from_list_id: String,
        to_list_id: String,
    },
}

#[derive(Debug, Default)]
struct MockTrelloInner {
    lists: Vec<TrelloList>,
    /// Keyed by short card number.
    cards: HashMap<String, Card>,
    /// Keyed by opaque card id.
    comments: HashMap<String, Vec<CardComment>>,
    operations: Vec<MockOperation>,
    next_id: u64,
    fail_on: Option<FailOn>,
    network_down: bool,
}

/// In-memory [`TrelloApi`] double.
///
/// # Example
///
/// ```
/// use git_trello::core::types::CardNumber;
/// use git_trello::trello::mock::MockTrello;
/// use git_trello::trello::{Card, TrelloApi};
///
/// let trello = MockTrello::new();
/// trello.insert_card("42", Card { id: "c42".into(), id_list: "doing".into() });
///
/// tokio_test::block_on(async {
///     let number = CardNumber::new("42").unwrap();
///     let card = trello.get_card(&number).await.unwrap().unwrap();
///     assert_eq!(card.id, "c42");
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTrello {
    inner: Arc<Mutex<MockTrelloInner>>,
}

impl MockTrello {
    /// Empty board, everything working.
    pub fn new() -> Self {
        Self::default()
    }

    /// Board where the chosen operation answers `None`.
    pub fn with_failure(fail_on: FailOn) -> Self {
        let mock = Self::new();
        mock.lock().fail_on = Some(fail_on);
        mock
    }

    /// Board behind a dead network: every call errors.
    pub fn with_network_failure() -> Self {
        let mock = Self::new();
        mock.lock().network_down = true;
        mock
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockTrelloInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // -------------------------------------------------------------------------
    // Seeding
    // -------------------------------------------------------------------------

    /// Register a card under its short number.
    pub fn insert_card(&self, number: &str, card: Card) {
        self.lock().cards.insert(number.to_string(), card);
    }

    /// Register a list.
    pub fn insert_list(&self, list: TrelloList) {
        self.lock().lists.push(list);
    }

    /// Put an existing comment on a card.
    pub fn insert_comment(&self, card_id: &str, comment: CardComment) {
        self.lock()
            .comments
            .entry(card_id.to_string())
            .or_default()
            .push(comment);
    }

    // -------------------------------------------------------------------------
    // Assertions
    // -------------------------------------------------------------------------

    /// Every call made so far, in order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Current comments on a card.
    pub fn comments_on(&self, card_id: &str) -> Vec<CardComment> {
        self.lock()
            .comments
            .get(card_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Current state of a card, by short number.
    pub fn card(&self, number: &str) -> Option<Card> {
        self.lock().cards.get(number).cloned()
    }

    /// Current lists on the board.
    pub fn board_lists(&self) -> Vec<TrelloList> {
        self.lock().lists.clone()
    }

    // -------------------------------------------------------------------------
    // Shared behavior
    // -------------------------------------------------------------------------

    fn check_network(&self) -> Result<(), TrelloError> {
        if self.lock().network_down {
            return Err(TrelloError::Network("mock network down".into()));
        }
        Ok(())
    }

    fn degraded(&self, op: FailOn) -> bool {
        self.lock().fail_on == Some(op)
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut inner = self.lock();
        inner.next_id += 1;
        format!("{prefix}-{}", inner.next_id)
    }
}

#[async_trait]
impl TrelloApi for MockTrello {
    async fn get_lists(&self) -> Result<Option<Vec<TrelloList>>, TrelloError> {
        self.record(MockOperation::GetLists);
        self.check_network()?;
        if self.degraded(FailOn::GetLists) {
            return Ok(None);
        }
        Ok(Some(self.lock().lists.clone()))
    }

    async fn get_card(&self, number: &CardNumber) -> Result<Option<Card>, TrelloError> {
        self.record(MockOperation::GetCard {
            number: number.to_string(),
        });
        self.check_network()?;
        if self.degraded(FailOn::GetCard) {
            return Ok(None);
        }
        Ok(self.lock().cards.get(number.as_str()).cloned())
    }

    async fn get_comments(&self, card_id: &str) -> Result<Option<Vec<CardComment>>, TrelloError> {
        self.record(MockOperation::GetComments {
            card_id: card_id.to_string(),
        });
        self.check_network()?;
        if self.degraded(FailOn::GetComments) {
            return Ok(None);
        }
        Ok(Some(self.comments_on(card_id)))
    }

    async fn add_comment(
        &self,
        card_id: &str,
        text: &str,
    ) -> Result<Option<CardComment>, TrelloError> {
        self.record(MockOperation::AddComment {
            card_id: card_id.to_string(),
            text: text.to_string(),
        });
        self.check_network()?;
        if self.degraded(FailOn::AddComment) {
            return Ok(None);
        }
        let comment = CardComment {
            id: self.fresh_id("comment"),
            text: text.to_string(),
        };
        self.insert_comment(card_id, comment.clone());
        Ok(Some(comment))
    }

    async fn delete_comments(&self, comments: &[CardComment]) -> Result<(), TrelloError> {
        self.record(MockOperation::DeleteComments {
            comment_ids: comments.iter().map(|c| c.id.clone()).collect(),
        });
        self.check_network()?;
        let mut inner = self.lock();
        for doomed in comments {
            for list in inner.comments.values_mut() {
                list.retain(|c| c.id != doomed.id);
            }
        }
        Ok(())
    }

    async fn move_card(
        &self,
        card_id: &str,
        list_id: &str,
        position: CardPosition,
    ) -> Result<(), TrelloError> {
        self.record(MockOperation::MoveCard {
            card_id: card_id.to_string(),
            list_id: list_id.to_string(),
            position,
        });
        self.check_network()?;
        let mut inner = self.lock();
        for card in inner.cards.values_mut() {
            if card.id == card_id {
                card.id_list = list_id.to_string();
            }
        }
        Ok(())
    }

    async fn create_list(&self, name: &str) -> Result<Option<TrelloList>, TrelloError> {
        self.record(MockOperation::CreateList {
            name: name.to_string(),
        });
        self.check_network()?;
        if self.degraded(FailOn::CreateList) {
            return Ok(None);
        }
        let list = TrelloList {
            id: self.fresh_id("list"),
            name: name.to_string(),
        };
        self.lock().lists.push(list.clone());
        Ok(Some(list))
    }

    async fn move_all_cards(
        &self,
        from_list_id: &str,
        to_list_id: &str,
    ) -> Result<Option<Vec<Card>>, TrelloError> {
        self.record(MockOperation::MoveAllCards {
            from_list_id: from_list_id.to_string(),
            to_list_id: to_list_id.to_string(),
        });
        self.check_network()?;
        if self.degraded(FailOn::MoveAllCards) {
            return Ok(None);
        }
        let mut inner = self.lock();
        let mut moved = Vec::new();
        for card in inner.cards.values_mut() {
            if card.id_list == from_list_id {
                card.id_list = to_list_id.to_string();
                moved.push(card.clone());
            }
        }
        Ok(Some(moved))
    }
}
