//! Mastodon REST API, OAuth 2.0 flow and streaming.

mod accounts;
mod client;
mod conversations;
mod filters;
mod id;
mod instance;
mod lists;
mod media;
mod notifications;
mod oauth;
mod pagination;
mod polls;
mod reports;
mod search;
mod statuses;
pub mod streaming;
mod tags;
mod timelines;
mod types;

pub use accounts::Profile;
pub use client::{Client, Params};
pub use filters::FilterInput;
pub use id::{from_json, Id, TolerantBool};
pub use media::{sniff, Media};
pub use oauth::{App, AppConfig, DEFAULT_SCOPES, OOB_REDIRECT_URI};
pub use pagination::Pagination;
pub use statuses::{Toot, TootPoll};
pub use streaming::Event;
pub use types::{
    Account, AccountSource, Application, Attachment, AttachmentMeta, AttachmentSize, Card,
    Conversation, Emoji, Field, Filter, Focus, History, Instance, InstanceStats, InstanceUrls,
    List, Mention, Notification, NotificationType, Poll, PollOption, Relationship, Report,
    Results, Status, StatusContext, StatusHistory, StatusSource, Tag, Visibility,
    WeeklyActivity,
};
