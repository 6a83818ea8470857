//! Accounts, relationships, blocks, mutes and follow requests.

use reqwest::Method;

use crate::api::client::{segment, Client, Params};
use crate::api::id::Id;
use crate::api::pagination::Pagination;
use crate::api::types::{Account, Field, List, Relationship, Status, Visibility};
use crate::context::Context;
use crate::error::Result;

/// Changes to the authenticated user's profile. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub display_name: Option<String>,
    pub note: Option<String>,
    pub locked: Option<bool>,
    pub bot: Option<bool>,
    pub discoverable: Option<bool>,
    /// Replaces all profile metadata when set.
    pub fields: Option<Vec<Field>>,
    pub privacy: Option<Visibility>,
    pub sensitive: Option<bool>,
    pub language: Option<String>,
}

impl Profile {
    fn to_params(&self) -> Params {
        let mut params = Params::new();
        if let Some(name) = &self.display_name {
            params.add("display_name", name.as_str());
        }
        if let Some(note) = &self.note {
            params.add("note", note.as_str());
        }
        let flags = [
            ("locked", self.locked),
            ("bot", self.bot),
            ("discoverable", self.discoverable),
            ("source[sensitive]", self.sensitive),
        ];
        for (key, value) in flags {
            if let Some(v) = value {
                params.add(key, v.to_string());
            }
        }
        if let Some(fields) = &self.fields {
            for (i, field) in fields.iter().enumerate() {
                params.add(format!("fields_attributes[{i}][name]"), field.name.as_str());
                params.add(format!("fields_attributes[{i}][value]"), field.value.as_str());
            }
        }
        if let Some(privacy) = self.privacy {
            params.add("source[privacy]", privacy.as_str());
        }
        params.add_opt("source[language]", self.language.as_deref());
        params
    }
}

fn account_path(id: &Id, action: &str) -> String {
    let base = format!("/api/v1/accounts/{}", segment(id.as_str()));
    if action.is_empty() {
        base
    } else {
        format!("{base}/{action}")
    }
}

impl Client {
    pub async fn get_account(&self, ctx: &Context, id: &Id) -> Result<Account> {
        self.call(ctx, Method::GET, &account_path(id, ""), None, None)
            .await
    }

    /// The authenticated user.
    pub async fn get_account_current_user(&self, ctx: &Context) -> Result<Account> {
        self.call(
            ctx,
            Method::GET,
            "/api/v1/accounts/verify_credentials",
            None,
            None,
        )
        .await
    }

    pub async fn account_update(&self, ctx: &Context, profile: &Profile) -> Result<Account> {
        let params = profile.to_params();
        self.call(
            ctx,
            Method::PATCH,
            "/api/v1/accounts/update_credentials",
            Some(&params),
            None,
        )
        .await
    }

    pub async fn get_account_statuses(
        &self,
        ctx: &Context,
        id: &Id,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Status>> {
        self.call(ctx, Method::GET, &account_path(id, "statuses"), None, pg)
            .await
    }

    pub async fn get_account_followers(
        &self,
        ctx: &Context,
        id: &Id,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Account>> {
        self.call(ctx, Method::GET, &account_path(id, "followers"), None, pg)
            .await
    }

    pub async fn get_account_following(
        &self,
        ctx: &Context,
        id: &Id,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Account>> {
        self.call(ctx, Method::GET, &account_path(id, "following"), None, pg)
            .await
    }

    /// Lists of the authenticated user that contain account `id`.
    pub async fn get_account_lists(&self, ctx: &Context, id: &Id) -> Result<Vec<List>> {
        self.call(ctx, Method::GET, &account_path(id, "lists"), None, None)
            .await
    }

    pub async fn account_follow(&self, ctx: &Context, id: &Id) -> Result<Relationship> {
        self.relationship_action(ctx, id, "follow").await
    }

    pub async fn account_unfollow(&self, ctx: &Context, id: &Id) -> Result<Relationship> {
        self.relationship_action(ctx, id, "unfollow").await
    }

    pub async fn account_block(&self, ctx: &Context, id: &Id) -> Result<Relationship> {
        self.relationship_action(ctx, id, "block").await
    }

    pub async fn account_unblock(&self, ctx: &Context, id: &Id) -> Result<Relationship> {
        self.relationship_action(ctx, id, "unblock").await
    }

    pub async fn account_mute(&self, ctx: &Context, id: &Id) -> Result<Relationship> {
        self.relationship_action(ctx, id, "mute").await
    }

    pub async fn account_unmute(&self, ctx: &Context, id: &Id) -> Result<Relationship> {
        self.relationship_action(ctx, id, "unmute").await
    }

    async fn relationship_action(&self, ctx: &Context, id: &Id, action: &str) -> Result<Relationship> {
        self.call(ctx, Method::POST, &account_path(id, action), None, None)
            .await
    }

    pub async fn get_account_relationships(
        &self,
        ctx: &Context,
        ids: &[Id],
    ) -> Result<Vec<Relationship>> {
        let mut params = Params::new();
        for id in ids {
            params.add("id[]", id.as_str());
        }
        self.call(
            ctx,
            Method::GET,
            "/api/v1/accounts/relationships",
            Some(&params),
            None,
        )
        .await
    }

    pub async fn accounts_search(
        &self,
        ctx: &Context,
        q: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Account>> {
        let mut params = Params::new().with("q", q);
        if let Some(limit) = limit {
            params.add("limit", limit.to_string());
        }
        self.call(
            ctx,
            Method::GET,
            "/api/v1/accounts/search",
            Some(&params),
            None,
        )
        .await
    }

    /// Resolve a `user` or `user@host` handle.
    pub async fn account_lookup(&self, ctx: &Context, acct: &str) -> Result<Account> {
        let params = Params::new().with("acct", acct);
        self.call(
            ctx,
            Method::GET,
            "/api/v1/accounts/lookup",
            Some(&params),
            None,
        )
        .await
    }

    pub async fn get_blocks(&self, ctx: &Context, pg: Option<&mut Pagination>) -> Result<Vec<Account>> {
        self.call(ctx, Method::GET, "/api/v1/blocks", None, pg).await
    }

    pub async fn get_mutes(&self, ctx: &Context, pg: Option<&mut Pagination>) -> Result<Vec<Account>> {
        self.call(ctx, Method::GET, "/api/v1/mutes", None, pg).await
    }

    pub async fn get_follow_requests(
        &self,
        ctx: &Context,
        pg: Option<&mut Pagination>,
    ) -> Result<Vec<Account>> {
        self.call(ctx, Method::GET, "/api/v1/follow_requests", None, pg)
            .await
    }

    pub async fn follow_request_authorize(&self, ctx: &Context, id: &Id) -> Result<()> {
        let path = format!("/api/v1/follow_requests/{}/authorize", segment(id.as_str()));
        self.call_discard(ctx, Method::POST, &path, None, None).await
    }

    pub async fn follow_request_reject(&self, ctx: &Context, id: &Id) -> Result<()> {
        let path = format!("/api/v1/follow_requests/{}/reject", segment(id.as_str()));
        self.call_discard(ctx, Method::POST, &path, None, None).await
    }
}
