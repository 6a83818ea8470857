//! Lists and their members.

use reqwest::Method;

use crate::api::client::{segment, Client, Params};
use crate::api::id::Id;
use crate::api::pagination::Pagination;
use crate::api::types::{Account, List};
use crate::context::Context;
use crate::error::Result;

fn list_path(id: &Id) -> String {
    format!("/api/v1/lists/{}", segment(id.as_str()))
}

fn account_ids(ids: &[Id]) -> Params {
    let mut params = Params::new();
    for id in ids {
        params.add("account_ids[]", id.as_str());
    }
    params
}

impl Client {
    pub async fn get_lists(&self, ctx: &Context) -> Result<Vec<List>> {
        self.call(ctx, Method::GET, "/api/v1/lists", None, None).await
    }

    pub async fn get_list(&self, ctx: &Context, id: &Id) -> Result<List> {
        self.call(ctx, Method::GET, &list_path(id), None, None).await
    }

    pub async fn get_list_accounts(
        &self,
        ctx: &Context,
        id: &Id,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Account>> {
        let path = format!("{}/accounts", list_path(id));
        self.call(ctx, Method::GET, &path, None, pg).await
    }

    pub async fn create_list(&self, ctx: &Context, title: &str) -> Result<List> {
        let params = Params::new().with("title", title);
        self.call(ctx, Method::POST, "/api/v1/lists", Some(&params), None)
            .await
    }

    pub async fn rename_list(&self, ctx: &Context, id: &Id, title: &str) -> Result<List> {
        let params = Params::new().with("title", title);
        self.call(ctx, Method::PUT, &list_path(id), Some(&params), None)
            .await
    }

    pub async fn delete_list(&self, ctx: &Context, id: &Id) -> Result<()> {
        self.call_discard(ctx, Method::DELETE, &list_path(id), None, None)
            .await
    }

    /// Accounts must be followed by the authenticated user.
    pub async fn add_to_list(&self, ctx: &Context, list: &Id, accounts: &[Id]) -> Result<()> {
        let path = format!("{}/accounts", list_path(list));
        let params = account_ids(accounts);
        self.call_discard(ctx, Method::POST, &path, Some(&params), None)
            .await
    }

    pub async fn remove_from_list(&self, ctx: &Context, list: &Id, accounts: &[Id]) -> Result<()> {
        let path = format!("{}/accounts", list_path(list));
        let params = account_ids(accounts);
        self.call_discard(ctx, Method::DELETE, &path, Some(&params), None)
            .await
    }
}
