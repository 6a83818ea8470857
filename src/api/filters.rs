//! Keyword filters (v1).

use chrono::{DateTime, Utc};
use reqwest::Method;

use crate::api::client::{segment, Client, Params};
use crate::api::id::Id;
use crate::api::types::Filter;
use crate::context::Context;
use crate::error::{Error, Result};

/// Input for creating or replacing a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInput {
    pub phrase: String,
    /// home, notifications, public, thread and/or account. At least one is required.
    pub context: Vec<String>,
    pub irreversible: bool,
    pub whole_word: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl FilterInput {
    fn to_params(&self) -> Result<Params> {
        if self.phrase.is_empty() {
            return Err(Error::Config("filter phrase is empty".into()));
        }
        if self.context.is_empty() {
            return Err(Error::Config("filter needs at least one context".into()));
        }
        let mut params = Params::new().with("phrase", self.phrase.as_str());
        for c in &self.context {
            params.add("context[]", c.as_str());
        }
        params
            .add("irreversible", self.irreversible.to_string())
            .add("whole_word", self.whole_word.to_string());
        if let Some(at) = self.expires_at {
            let secs = (at - Utc::now()).num_seconds().max(0);
            params.add("expires_in", secs.to_string());
        }
        Ok(params)
    }
}

fn filter_path(id: &Id) -> String {
    format!("/api/v1/filters/{}", segment(id.as_str()))
}

impl Client {
    pub async fn get_filters(&self, ctx: &Context) -> Result<Vec<Filter>> {
        self.call(ctx, Method::GET, "/api/v1/filters", None, None).await
    }

    pub async fn get_filter(&self, ctx: &Context, id: &Id) -> Result<Filter> {
        self.call(ctx, Method::GET, &filter_path(id), None, None).await
    }

    pub async fn create_filter(&self, ctx: &Context, filter: &FilterInput) -> Result<Filter> {
        let params = filter.to_params()?;
        self.call(ctx, Method::POST, "/api/v1/filters", Some(&params), None)
            .await
    }

    pub async fn update_filter(&self, ctx: &Context, id: &Id, filter: &FilterInput) -> Result<Filter> {
        let params = filter.to_params()?;
        self.call(ctx, Method::PUT, &filter_path(id), Some(&params), None)
            .await
    }

    pub async fn delete_filter(&self, ctx: &Context, id: &Id) -> Result<()> {
        self.call_discard(ctx, Method::DELETE, &filter_path(id), None, None)
            .await
    }
}
