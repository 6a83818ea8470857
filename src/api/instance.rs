//! Server information. These endpoints work without a token.

use reqwest::Method;

use crate::api::client::Client;
use crate::api::types::{Instance, WeeklyActivity};
use crate::context::Context;
use crate::error::Result;

impl Client {
    pub async fn get_instance(&self, ctx: &Context) -> Result<Instance> {
        self.call(ctx, Method::GET, "/api/v1/instance", None, None).await
    }

    /// Weekly activity for the last twelve weeks.
    pub async fn get_instance_activity(&self, ctx: &Context) -> Result<Vec<WeeklyActivity>> {
        self.call(ctx, Method::GET, "/api/v1/instance/activity", None, None)
            .await
    }

    /// Domains this server is aware of.
    pub async fn get_instance_peers(&self, ctx: &Context) -> Result<Vec<String>> {
        self.call(ctx, Method::GET, "/api/v1/instance/peers", None, None)
            .await
    }
}
