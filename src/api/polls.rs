//! Polls.

use reqwest::Method;

use crate::api::client::{segment, Client, Params};
use crate::api::id::Id;
use crate::api::types::Poll;
use crate::context::Context;
use crate::error::Result;

impl Client {
    pub async fn get_poll(&self, ctx: &Context, id: &Id) -> Result<Poll> {
        let path = format!("/api/v1/polls/{}", segment(id.as_str()));
        self.call(ctx, Method::GET, &path, None, None).await
    }

    /// Vote for the options at `choices` (zero-based indices).
    pub async fn poll_vote(&self, ctx: &Context, id: &Id, choices: &[u32]) -> Result<Poll> {
        let path = format!("/api/v1/polls/{}/votes", segment(id.as_str()));
        let mut params = Params::new();
        for choice in choices {
            params.add("choices[]", choice.to_string());
        }
        self.call(ctx, Method::POST, &path, Some(&params), None).await
    }
}
