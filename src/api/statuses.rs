//! Statuses: posting, editing, reading and the per-status actions.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;

use crate::api::client::{segment, Client, Params};
use crate::api::id::Id;
use crate::api::pagination::Pagination;
use crate::api::types::{
    Account, Card, Status, StatusContext, StatusHistory, StatusSource, Visibility,
};
use crate::context::Context;
use crate::error::Result;

/// A status to post or an edit to apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Toot {
    pub status: String,
    pub in_reply_to_id: Option<Id>,
    pub media_ids: Vec<Id>,
    pub sensitive: bool,
    pub spoiler_text: String,
    /// Server default when `None`.
    pub visibility: Option<Visibility>,
    pub language: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub poll: Option<TootPoll>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TootPoll {
    pub options: Vec<String>,
    /// Seconds the poll stays open.
    pub expires_in: u64,
    pub multiple: bool,
    pub hide_totals: bool,
}

impl Toot {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn reply_to(mut self, id: Id) -> Self {
        self.in_reply_to_id = Some(id);
        self
    }

    fn to_params(&self) -> Params {
        let mut params = Params::new().with("status", self.status.as_str());
        params.add_opt("in_reply_to_id", self.in_reply_to_id.as_ref());
        for id in &self.media_ids {
            params.add("media_ids[]", id.as_str());
        }
        if self.sensitive {
            params.add("sensitive", "true");
        }
        params.add_opt("spoiler_text", Some(self.spoiler_text.as_str()));
        if let Some(v) = self.visibility {
            params.add("visibility", v.as_str());
        }
        params.add_opt("language", self.language.as_deref());
        if let Some(at) = self.scheduled_at {
            params.add("scheduled_at", at.to_rfc3339_opts(SecondsFormat::Millis, true));
        }
        if let Some(poll) = &self.poll {
            for option in &poll.options {
                params.add("poll[options][]", option.as_str());
            }
            params.add("poll[expires_in]", poll.expires_in.to_string());
            if poll.multiple {
                params.add("poll[multiple]", "true");
            }
            if poll.hide_totals {
                params.add("poll[hide_totals]", "true");
            }
        }
        params
    }
}

fn status_path(id: &Id, action: &str) -> String {
    let base = format!("/api/v1/statuses/{}", segment(id.as_str()));
    if action.is_empty() {
        base
    } else {
        format!("{base}/{action}")
    }
}

impl Client {
    pub async fn get_status(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.call(ctx, Method::GET, &status_path(id, ""), None, None)
            .await
    }

    /// Ancestors and descendants of a status.
    pub async fn get_status_context(&self, ctx: &Context, id: &Id) -> Result<StatusContext> {
        self.call(ctx, Method::GET, &status_path(id, "context"), None, None)
            .await
    }

    pub async fn get_status_card(&self, ctx: &Context, id: &Id) -> Result<Card> {
        self.call(ctx, Method::GET, &status_path(id, "card"), None, None)
            .await
    }

    /// Earlier revisions of an edited status, oldest first.
    pub async fn get_status_history(&self, ctx: &Context, id: &Id) -> Result<Vec<StatusHistory>> {
        self.call(ctx, Method::GET, &status_path(id, "history"), None, None)
            .await
    }

    pub async fn get_status_source(&self, ctx: &Context, id: &Id) -> Result<StatusSource> {
        self.call(ctx, Method::GET, &status_path(id, "source"), None, None)
            .await
    }

    pub async fn get_reblogged_by(
        &self,
        ctx: &Context,
        id: &Id,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Account>> {
        self.call(ctx, Method::GET, &status_path(id, "reblogged_by"), None, pg)
            .await
    }

    pub async fn get_favourited_by(
        &self,
        ctx: &Context,
        id: &Id,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Account>> {
        self.call(ctx, Method::GET, &status_path(id, "favourited_by"), None, pg)
            .await
    }

    pub async fn post_status(&self, ctx: &Context, toot: &Toot) -> Result<Status> {
        let params = toot.to_params();
        self.call(ctx, Method::POST, "/api/v1/statuses", Some(&params), None)
            .await
    }

    /// Edit an existing status; returns the new revision.
    pub async fn update_status(&self, ctx: &Context, id: &Id, toot: &Toot) -> Result<Status> {
        let params = toot.to_params();
        self.call(ctx, Method::PUT, &status_path(id, ""), Some(&params), None)
            .await
    }

    pub async fn delete_status(&self, ctx: &Context, id: &Id) -> Result<()> {
        self.call_discard(ctx, Method::DELETE, &status_path(id, ""), None, None)
            .await
    }

    pub async fn reblog(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "reblog").await
    }

    pub async fn unreblog(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "unreblog").await
    }

    pub async fn favourite(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "favourite").await
    }

    pub async fn unfavourite(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "unfavourite").await
    }

    pub async fn bookmark(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "bookmark").await
    }

    pub async fn unbookmark(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "unbookmark").await
    }

    /// Pin to the authenticated user's profile.
    pub async fn pin(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "pin").await
    }

    pub async fn unpin(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "unpin").await
    }

    /// Stop notifications for the thread containing `id`.
    pub async fn mute_conversation(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "mute").await
    }

    pub async fn unmute_conversation(&self, ctx: &Context, id: &Id) -> Result<Status> {
        self.status_action(ctx, id, "unmute").await
    }

    async fn status_action(&self, ctx: &Context, id: &Id, action: &str) -> Result<Status> {
        self.call(ctx, Method::POST, &status_path(id, action), None, None)
            .await
    }

    pub async fn get_favourites(
        &self,
        ctx: &Context,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Status>> {
        self.call(ctx, Method::GET, "/api/v1/favourites", None, pg).await
    }

    pub async fn get_bookmarks(
        &self,
        ctx: &Context,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Status>> {
        self.call(ctx, Method::GET, "/api/v1/bookmarks", None, pg).await
    }
}
