//! Reports to the server's moderators.

use reqwest::Method;

use crate::api::client::{Client, Params};
use crate::api::id::Id;
use crate::api::types::Report;
use crate::context::Context;
use crate::error::Result;

impl Client {
    /// Reports filed by the authenticated user.
    pub async fn get_reports(&self, ctx: &Context) -> Result<Vec<Report>> {
        self.call(ctx, Method::GET, "/api/v1/reports", None, None).await
    }

    /// Report `account_id`, optionally attaching offending statuses.
    pub async fn report(
        &self,
        ctx: &Context,
        account_id: &Id,
        status_ids: &[Id],
        comment: &str,
    ) -> Result<Report> {
        let mut params = Params::new().with("account_id", account_id.as_str());
        for id in status_ids {
            params.add("status_ids[]", id.as_str());
        }
        params.add_opt("comment", Some(comment));
        self.call(ctx, Method::POST, "/api/v1/reports", Some(&params), None)
            .await
    }
}
