//! Trello REST implementation.
//!
//! Talks to `https://api.trello.com/1`. Every request carries the `key`
//! and `token` credentials as parameters: GET and DELETE in the query
//! string, POST and PUT form-encoded in the body. Non-2xx responses and
//! unparseable bodies degrade to empty results per the [`TrelloApi`]
//! contract.

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::types::CardNumber;
use crate::trello::traits::{
    Card, CardComment, CardPosition, TrelloApi, TrelloError, TrelloList,
};

/// Production API base.
const DEFAULT_API_BASE: &str = "https://api.trello.com/1";

// =============================================================================
// Credentials
// =============================================================================

/// API key + OAuth token pair sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    oauth_token: String,
}

impl Credentials {
    /// Bundle an API key and OAuth token.
    pub fn new(api_key: impl Into<String>, oauth_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            oauth_token: oauth_token.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("oauth_token", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Client
// =============================================================================

/// Reqwest-backed [`TrelloApi`] implementation scoped to one board.
pub struct TrelloClient {
    client: Client,
    credentials: Credentials,
    board_id: String,
    api_base: String,
}

impl TrelloClient {
    /// Create a client against the production API.
    pub fn new(credentials: Credentials, board_id: impl Into<String>) -> Self {
        Self::with_api_base(credentials, board_id, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base (used by tests to point
    /// at a local mock server).
    pub fn with_api_base(
        credentials: Credentials,
        board_id: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            credentials,
            board_id: board_id.into(),
            api_base: api_base.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Append the credential parameters every endpoint requires.
    fn params_with_credentials<'a>(
        &'a self,
        params: &[(&'a str, &'a str)],
    ) -> Vec<(&'a str, &'a str)> {
        let mut all = Vec::with_capacity(params.len() + 2);
        all.extend_from_slice(params);
        all.push(("key", self.credentials.api_key.as_str()));
        all.push(("token", self.credentials.oauth_token.as_str()));
        all
    }

    /// GET with query-string parameters.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, TrelloError> {
        let response = self
            .client
            .get(self.url(path))
            .query(&self.params_with_credentials(params))
            .send()
            .await
            .map_err(|e| TrelloError::Network(e.to_string()))?;
        Ok(parse_body(response).await)
    }

    /// POST/PUT with form-encoded body parameters.
    async fn send_form<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, TrelloError> {
        let response = self
            .client
            .request(method, self.url(path))
            .form(&self.params_with_credentials(params))
            .send()
            .await
            .map_err(|e| TrelloError::Network(e.to_string()))?;
        Ok(parse_body(response).await)
    }
}

impl std::fmt::Debug for TrelloClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloClient")
            .field("board_id", &self.board_id)
            .field("api_base", &self.api_base)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Success + parseable body, or nothing.
async fn parse_body<T: DeserializeOwned>(response: Response) -> Option<T> {
    if !response.status().is_success() {
        return None;
    }
    response.json::<T>().await.ok()
}

// =============================================================================
// TrelloApi implementation
// =============================================================================

#[async_trait]
impl TrelloApi for TrelloClient {
    async fn get_lists(&self) -> Result<Option<Vec<TrelloList>>, TrelloError> {
        let path = format!("/boards/{}/lists", self.board_id);
        let lists: Option<Vec<ListResponse>> = self.get_json(&path, &[]).await?;
        Ok(lists.map(|lists| lists.into_iter().map(TrelloList::from).collect()))
    }

    async fn get_card(&self, number: &CardNumber) -> Result<Option<Card>, TrelloError> {
        let path = format!("/boards/{}/cards/{}", self.board_id, number);
        let card: Option<CardResponse> = self.get_json(&path, &[]).await?;
        Ok(card.map(Card::from))
    }

    async fn get_comments(&self, card_id: &str) -> Result<Option<Vec<CardComment>>, TrelloError> {
        let path = format!("/cards/{card_id}/actions");
        let actions: Option<Vec<CommentActionResponse>> =
            self.get_json(&path, &[("filter", "commentCard")]).await?;
        Ok(actions.map(|actions| actions.into_iter().map(CardComment::from).collect()))
    }

    async fn add_comment(
        &self,
        card_id: &str,
        text: &str,
    ) -> Result<Option<CardComment>, TrelloError> {
        let path = format!("/cards/{card_id}/actions/comments");
        let created: Option<CommentActionResponse> = self
            .send_form(Method::POST, &path, &[("text", text)])
            .await?;
        Ok(created.map(CardComment::from))
    }

    async fn delete_comments(&self, comments: &[CardComment]) -> Result<(), TrelloError> {
        for comment in comments {
            let path = format!("/actions/{}", comment.id);
            // API refusal for a single comment is swallowed like any
            // other non-2xx; the remaining deletions still run.
            self.client
                .delete(self.url(&path))
                .query(&self.params_with_credentials(&[]))
                .send()
                .await
                .map_err(|e| TrelloError::Network(e.to_string()))?;
        }
        Ok(())
    }

    async fn move_card(
        &self,
        card_id: &str,
        list_id: &str,
        position: CardPosition,
    ) -> Result<(), TrelloError> {
        let path = format!("/cards/{card_id}");
        let _: Option<CardResponse> = self
            .send_form(
                Method::PUT,
                &path,
                &[("idList", list_id), ("pos", position.as_str())],
            )
            .await?;
        Ok(())
    }

    async fn create_list(&self, name: &str) -> Result<Option<TrelloList>, TrelloError> {
        let created: Option<ListResponse> = self
            .send_form(
                Method::POST,
                "/lists",
                &[("name", name), ("idBoard", self.board_id.as_str())],
            )
            .await?;
        Ok(created.map(TrelloList::from))
    }

    async fn move_all_cards(
        &self,
        from_list_id: &str,
        to_list_id: &str,
    ) -> Result<Option<Vec<Card>>, TrelloError> {
        let path = format!("/lists/{from_list_id}/moveAllCards");
        let moved: Option<Vec<CardResponse>> = self
            .send_form(
                Method::POST,
                &path,
                &[("idBoard", self.board_id.as_str()), ("idList", to_list_id)],
            )
            .await?;
        Ok(moved.map(|cards| cards.into_iter().map(Card::from).collect()))
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CardResponse {
    id: String,
    #[serde(rename = "idList")]
    id_list: String,
}

impl From<CardResponse> for Card {
    fn from(card: CardResponse) -> Self {
        Card {
            id: card.id,
            id_list: card.id_list,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    id: String,
    name: String,
}

impl From<ListResponse> for TrelloList {
    fn from(list: ListResponse) -> Self {
        TrelloList {
            id: list.id,
            name: list.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommentActionResponse {
    id: String,
    data: CommentActionData,
}

#[derive(Debug, Deserialize)]
struct CommentActionData {
    #[serde(default)]
    text: String,
}

impl From<CommentActionResponse> for CardComment {
    fn from(action: CommentActionResponse) -> Self {
        CardComment {
            id: action.id,
            text: action.data.text,
        }
    }
}
