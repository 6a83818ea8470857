//! Hashtags and followed tags.

use reqwest::Method;

use crate::api::client::{segment, Client};
use crate::api::pagination::Pagination;
use crate::api::types::Tag;
use crate::context::Context;
use crate::error::Result;

fn tag_path(name: &str, action: &str) -> String {
    let base = format!("/api/v1/tags/{}", segment(name.trim_start_matches('#')));
    if action.is_empty() {
        base
    } else {
        format!("{base}/{action}")
    }
}

impl Client {
    pub async fn tag_info(&self, ctx: &Context, name: &str) -> Result<Tag> {
        self.call(ctx, Method::GET, &tag_path(name, ""), None, None)
            .await
    }

    pub async fn tag_follow(&self, ctx: &Context, name: &str) -> Result<Tag> {
        self.call(ctx, Method::POST, &tag_path(name, "follow"), None, None)
            .await
    }

    pub async fn tag_unfollow(&self, ctx: &Context, name: &str) -> Result<Tag> {
        self.call(ctx, Method::POST, &tag_path(name, "unfollow"), None, None)
            .await
    }

    /// Tags followed by the authenticated user.
    pub async fn tags_followed(&self, ctx: &Context, pg: Option<&mut Pagination>) -> Result<Vec<Tag>> {
        self.call(ctx, Method::GET, "/api/v1/followed_tags", None, pg)
            .await
    }
}
