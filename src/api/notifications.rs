//! Notifications.

use reqwest::Method;

use crate::api::client::{segment, Client};
use crate::api::id::Id;
use crate::api::pagination::Pagination;
use crate::api::types::Notification;
use crate::context::Context;
use crate::error::Result;

impl Client {
    /// Notifications for the authenticated user, newest first.
    ///
    /// Servers differ on whether this endpoint pages; without a caller cursor an empty
    /// one is sent, and a response without a `Link` header simply leaves it empty.
    pub async fn get_notifications(
        &self,
        ctx: &Context,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Notification>> {
        let mut fallback = Pagination::default();
        let pg = pg.unwrap_or(&mut fallback);
        self.call(ctx, Method::GET, "/api/v1/notifications", None, Some(pg))
            .await
    }

    pub async fn get_notification(&self, ctx: &Context, id: &Id) -> Result<Notification> {
        let path = format!("/api/v1/notifications/{}", segment(id.as_str()));
        self.call(ctx, Method::GET, &path, None, None).await
    }

    pub async fn clear_notifications(&self, ctx: &Context) -> Result<()> {
        self.call_discard(ctx, Method::POST, "/api/v1/notifications/clear", None, None)
            .await
    }

    pub async fn dismiss_notification(&self, ctx: &Context, id: &Id) -> Result<()> {
        let path = format!("/api/v1/notifications/{}/dismiss", segment(id.as_str()));
        self.call_discard(ctx, Method::POST, &path, None, None).await
    }
}
