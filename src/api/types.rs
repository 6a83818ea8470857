//! Mastodon API entities.
//!
//! Every struct defaults its missing fields, so servers that omit optional parts (or
//! older versions that never had them) still decode. Timestamps that the server sends as
//! `null` decode to the zero time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::id::{nullable_time, tolerant_u64, Id, TolerantBool};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub id: Id,
    pub username: String,
    /// `user` for local accounts, `user@host` for remote ones.
    pub acct: String,
    pub display_name: String,
    pub locked: TolerantBool,
    pub bot: TolerantBool,
    pub discoverable: Option<bool>,
    #[serde(deserialize_with = "nullable_time")]
    pub created_at: DateTime<Utc>,
    pub followers_count: u64,
    pub following_count: u64,
    pub statuses_count: u64,
    pub note: String,
    pub url: String,
    pub avatar: String,
    pub avatar_static: String,
    pub header: String,
    pub header_static: String,
    pub emojis: Vec<Emoji>,
    pub moved: Option<Box<Account>>,
    pub fields: Vec<Field>,
    pub source: Option<AccountSource>,
    pub last_status_at: Option<String>,
}

/// Profile metadata entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Extra account data only returned for the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSource {
    pub privacy: Option<Visibility>,
    pub sensitive: Option<bool>,
    pub language: Option<String>,
    pub note: Option<String>,
    pub fields: Vec<Field>,
    pub follow_requests_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emoji {
    pub shortcode: String,
    pub static_url: String,
    pub url: String,
    pub visible_in_picker: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
            Self::Direct => "direct",
        }
    }
}

/// A post ("toot").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub id: Id,
    pub uri: String,
    pub url: Option<String>,
    pub account: Account,
    pub in_reply_to_id: Option<Id>,
    pub in_reply_to_account_id: Option<Id>,
    pub reblog: Option<Box<Status>>,
    /// HTML fragment.
    pub content: String,
    #[serde(deserialize_with = "nullable_time")]
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub emojis: Vec<Emoji>,
    pub replies_count: u64,
    pub reblogs_count: u64,
    pub favourites_count: u64,
    pub reblogged: Option<bool>,
    pub favourited: Option<bool>,
    pub bookmarked: Option<bool>,
    pub muted: Option<bool>,
    pub pinned: Option<bool>,
    pub sensitive: bool,
    pub spoiler_text: String,
    pub visibility: Visibility,
    pub media_attachments: Vec<Attachment>,
    pub mentions: Vec<Mention>,
    pub tags: Vec<Tag>,
    pub card: Option<Card>,
    pub poll: Option<Poll>,
    pub application: Option<Application>,
    pub language: Option<String>,
}

impl Status {
    /// The status whose content should be shown: the boosted one for a reblog.
    pub fn original(&self) -> &Status {
        self.reblog.as_deref().unwrap_or(self)
    }
}

/// A previous revision of an edited status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusHistory {
    pub content: String,
    pub spoiler_text: String,
    pub sensitive: bool,
    #[serde(deserialize_with = "nullable_time")]
    pub created_at: DateTime<Utc>,
    pub account: Account,
    pub poll: Option<Poll>,
    pub media_attachments: Vec<Attachment>,
    pub emojis: Vec<Emoji>,
}

/// The plain-text source of a status, for editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusSource {
    pub id: Id,
    pub text: String,
    pub spoiler_text: String,
}

/// Ancestors and descendants of a status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusContext {
    pub ancestors: Vec<Status>,
    pub descendants: Vec<Status>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mention {
    pub id: Id,
    pub url: String,
    pub username: String,
    pub acct: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
    pub url: String,
    pub history: Vec<History>,
    /// Whether the authenticated user follows this tag.
    pub following: Option<bool>,
}

/// Daily usage of a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
    pub day: String,
    pub uses: String,
    pub accounts: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub id: Id,
    /// image, gifv, video, audio or unknown
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub remote_url: Option<String>,
    pub preview_url: Option<String>,
    pub text_url: Option<String>,
    pub description: Option<String>,
    pub blurhash: Option<String>,
    pub meta: Option<AttachmentMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentMeta {
    pub original: Option<AttachmentSize>,
    pub small: Option<AttachmentSize>,
    pub focus: Option<Focus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentSize {
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub size: Option<String>,
    pub aspect: Option<f64>,
    pub duration: Option<f64>,
}

/// Focal point of an image, each axis in `-1.0..=1.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Focus {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    pub url: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub author_name: String,
    pub author_url: String,
    pub provider_name: String,
    pub provider_url: String,
    pub html: String,
    pub width: u64,
    pub height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub name: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Poll {
    pub id: Id,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub multiple: bool,
    pub votes_count: u64,
    pub voters_count: Option<u64>,
    pub options: Vec<PollOption>,
    pub voted: Option<bool>,
    pub own_votes: Vec<u32>,
    pub emojis: Vec<Emoji>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollOption {
    pub title: String,
    /// `None` while the results are hidden.
    pub votes_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(deserialize_with = "nullable_time")]
    pub created_at: DateTime<Utc>,
    pub account: Account,
    pub status: Option<Box<Status>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Mention,
    Status,
    Reblog,
    Follow,
    FollowRequest,
    Favourite,
    Poll,
    Update,
    #[serde(rename = "admin.sign_up")]
    AdminSignUp,
    #[serde(rename = "admin.report")]
    AdminReport,
    /// Types introduced by newer servers.
    #[serde(untagged)]
    Other(String),
}

impl Default for NotificationType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relationship {
    pub id: Id,
    pub following: bool,
    pub showing_reblogs: bool,
    pub notifying: bool,
    pub followed_by: bool,
    pub blocking: bool,
    pub blocked_by: bool,
    pub muting: bool,
    pub muting_notifications: bool,
    pub requested: bool,
    pub domain_blocking: bool,
    pub endorsed: bool,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct List {
    pub id: Id,
    pub title: String,
    /// followed, list or none
    pub replies_policy: Option<String>,
}

/// A v1 keyword filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub id: Id,
    pub phrase: String,
    /// Where the filter applies: home, notifications, public, thread, account.
    pub context: Vec<String>,
    pub whole_word: TolerantBool,
    pub irreversible: TolerantBool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub id: Id,
    pub action_taken: TolerantBool,
    pub category: Option<String>,
    pub comment: String,
    pub forwarded: bool,
    pub status_ids: Option<Vec<Id>>,
    pub created_at: Option<DateTime<Utc>>,
    pub target_account: Option<Account>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub uri: String,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub email: String,
    pub version: String,
    pub thumbnail: Option<String>,
    pub urls: Option<InstanceUrls>,
    pub stats: Option<InstanceStats>,
    pub languages: Vec<String>,
    pub registrations: bool,
    pub approval_required: bool,
    pub invites_enabled: bool,
    pub contact_account: Option<Account>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceUrls {
    pub streaming_api: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceStats {
    pub user_count: u64,
    pub status_count: u64,
    pub domain_count: u64,
}

/// One week of instance activity. Counts arrive as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyActivity {
    /// Unix timestamp of the start of the week.
    #[serde(deserialize_with = "tolerant_u64")]
    pub week: u64,
    #[serde(deserialize_with = "tolerant_u64")]
    pub statuses: u64,
    #[serde(deserialize_with = "tolerant_u64")]
    pub logins: u64,
    #[serde(deserialize_with = "tolerant_u64")]
    pub registrations: u64,
}

/// A direct-message thread.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversation {
    pub id: Id,
    pub accounts: Vec<Account>,
    pub unread: bool,
    pub last_status: Option<Box<Status>>,
}

/// Results of a full-text search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Results {
    pub accounts: Vec<Account>,
    pub statuses: Vec<Status>,
    pub hashtags: Vec<Tag>,
}
