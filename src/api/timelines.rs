//! Timelines. All are paged with a [`Pagination`] cursor and come back newest first.

use reqwest::Method;

use crate::api::client::{segment, Client, Params};
use crate::api::id::Id;
use crate::api::pagination::Pagination;
use crate::api::types::Status;
use crate::context::Context;
use crate::error::Result;

fn local_params(local: bool) -> Option<Params> {
    local.then(|| Params::new().with("local", "true"))
}

impl Client {
    pub async fn get_timeline_home(
        &self,
        ctx: &Context,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Status>> {
        self.call(ctx, Method::GET, "/api/v1/timelines/home", None, pg)
            .await
    }

    /// Federated timeline, or only this server's posts when `local`.
    pub async fn get_timeline_public(
        &self,
        ctx: &Context,
        local: bool,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Status>> {
        let params = local_params(local);
        self.call(
            ctx,
            Method::GET,
            "/api/v1/timelines/public",
            params.as_ref(),
            pg,
        )
        .await
    }

    pub async fn get_timeline_hashtag(
        &self,
        ctx: &Context,
        tag: &str,
        local: bool,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Status>> {
        let path = format!("/api/v1/timelines/tag/{}", segment(tag.trim_start_matches('#')));
        let params = local_params(local);
        self.call(ctx, Method::GET, &path, params.as_ref(), pg).await
    }

    pub async fn get_timeline_list(
        &self,
        ctx: &Context,
        list_id: &Id,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Status>> {
        let path = format!("/api/v1/timelines/list/{}", segment(list_id.as_str()));
        self.call(ctx, Method::GET, &path, None, pg).await
    }

    /// Public timeline restricted to statuses with media attachments.
    pub async fn get_timeline_media(
        &self,
        ctx: &Context,
        local: bool,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Status>> {
        let mut params = Params::new().with("only_media", "true");
        if local {
            params.add("local", "true");
        }
        self.call(
            ctx,
            Method::GET,
            "/api/v1/timelines/public",
            Some(&params),
            pg,
        )
        .await
    }
}
