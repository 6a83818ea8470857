//! Full-text search across accounts, statuses and hashtags.

use reqwest::Method;

use crate::api::client::{Client, Params};
use crate::api::types::Results;
use crate::context::Context;
use crate::error::Result;

impl Client {
    /// `resolve` asks the server to look up remote accounts and statuses by URL or handle.
    pub async fn search(&self, ctx: &Context, q: &str, resolve: bool) -> Result<Results> {
        let mut params = Params::new().with("q", q);
        if resolve {
            params.add("resolve", "true");
        }
        self.call(ctx, Method::GET, "/api/v2/search", Some(&params), None)
            .await
    }
}
