//! Direct-message conversations.

use reqwest::Method;

use crate::api::client::{segment, Client};
use crate::api::id::Id;
use crate::api::pagination::Pagination;
use crate::api::types::Conversation;
use crate::context::Context;
use crate::error::Result;

impl Client {
    pub async fn get_conversations(
        &self,
        ctx: &Context,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Conversation>> {
        self.call(ctx, Method::GET, "/api/v1/conversations", None, pg)
            .await
    }

    pub async fn delete_conversation(&self, ctx: &Context, id: &Id) -> Result<()> {
        let path = format!("/api/v1/conversations/{}", segment(id.as_str()));
        self.call_discard(ctx, Method::DELETE, &path, None, None).await
    }

    pub async fn mark_conversation_as_read(&self, ctx: &Context, id: &Id) -> Result<Conversation> {
        let path = format!("/api/v1/conversations/{}/read", segment(id.as_str()));
        self.call(ctx, Method::POST, &path, None, None).await
    }
}
