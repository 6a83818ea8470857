//! App state and key handling for the terminal front-end.
//!
//! All network work is driven from the UI thread through a private tokio runtime; the
//! only background task is the user stream, drained on every tick.

use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::Frame;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::{
    AppConfig, Event, Id, Notification, Pagination, Status, Toot, DEFAULT_SCOPES,
    OOB_REDIRECT_URI,
};
use crate::config::{load_config, save_config, Config};
use crate::context::Context;
use crate::credential::{self, instance_host_from_url, Secret};
use crate::error::{Error, ErrorKind, Result};
use crate::tui::{
    draw_compose, draw_instance_picker, draw_login, draw_notifications, draw_timeline,
    draw_toot_detail, DetailInfo, TimelineInfo,
};
use crate::Client;

pub const CHAR_LIMIT: usize = 500;
const APP_NAME: &str = "tootline";
const PAGE_SIZE: u32 = 20;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SERVER: &str = "https://mastodon.social";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Timeline,
    TootDetail,
    Compose,
    Notifications,
    /// Pick a server to browse anonymously.
    InstancePicker,
}

/// Why a compose buffer cannot be posted.
pub fn validate_toot(text: &str) -> std::result::Result<(), String> {
    let text = text.trim();
    if text.is_empty() {
        Err("Cannot post empty toot.".to_string())
    } else if text.chars().count() > CHAR_LIMIT {
        Err(format!("Over {CHAR_LIMIT} character limit."))
    } else {
        Ok(())
    }
}

pub struct App {
    pub view: View,
    pub config: Option<Config>,
    pub client: Option<Client>,
    pub statuses: Vec<Status>,
    pub selected: usize,
    pub scroll: usize,
    pub loading: bool,
    /// Cursor for the next older page.
    pub pagination: Pagination,

    pub instance_url: String,
    pub auth_url: String,
    pub login_code: String,
    pub login_message: String,
    /// Registered but not yet authorized.
    pending_login: Option<Client>,

    pub detail_status: Option<Status>,
    /// Ancestor and descendant counts of the open toot.
    pub detail_thread: Option<(usize, usize)>,
    pub detail_message: String,

    pub compose_buffer: String,
    pub compose_reply_to_id: Option<Id>,
    pub compose_error: String,

    /// Shown on Timeline when a load failed (so we don't retry every tick).
    pub timeline_message: String,
    /// Last stream error or reconnect notice.
    pub stream_message: String,

    /// Timeline content area height in rows (updated each draw); used so scroll follows selection.
    pub timeline_visible_rows: usize,

    pub notifications: Vec<Notification>,
    pub notifications_selected: usize,
    pub unread_notifications: usize,

    /// When set, we are viewing this instance's public timeline without login (read-only).
    pub anonymous_instance_url: Option<String>,

    /// View to restore when the instance picker is cancelled.
    pub return_to_view: View,
    pub instance_picker_input: String,
    pub instance_picker_known: Vec<String>,
    pub instance_picker_selected: usize,
    pub instance_picker_message: String,

    ctx: Context,
    stream: Option<(Context, mpsc::Receiver<Event>)>,
    runtime: Runtime,
}

impl App {
    pub fn new() -> Result<Self> {
        Self::with_config(load_config()?)
    }

    /// Start from an already loaded config instead of the one on disk.
    pub fn with_config(config: Option<Config>) -> Result<Self> {
        let runtime = Runtime::new()?;
        let client = config.as_ref().and_then(client_from_keyring);
        let view = if client.is_some() {
            View::Timeline
        } else {
            View::Login
        };

        let mut app = Self {
            view,
            config: config.clone(),
            client,
            statuses: Vec::new(),
            selected: 0,
            scroll: 0,
            loading: false,
            pagination: Pagination::with_limit(PAGE_SIZE),
            instance_url: config
                .as_ref()
                .map_or_else(|| DEFAULT_SERVER.to_string(), |c| c.server.clone()),
            auth_url: String::new(),
            login_code: String::new(),
            login_message: String::new(),
            pending_login: None,
            detail_status: None,
            detail_thread: None,
            detail_message: String::new(),
            compose_buffer: String::new(),
            compose_reply_to_id: None,
            compose_error: String::new(),
            timeline_message: String::new(),
            stream_message: String::new(),
            timeline_visible_rows: 20,
            notifications: Vec::new(),
            notifications_selected: 0,
            unread_notifications: 0,
            anonymous_instance_url: None,
            return_to_view: View::Login,
            instance_picker_input: String::new(),
            instance_picker_known: config
                .as_ref()
                .map(|c| vec![c.server.clone()])
                .unwrap_or_default(),
            instance_picker_selected: 0,
            instance_picker_message: String::new(),
            ctx: Context::new(),
            stream: None,
            runtime,
        };

        if app.client.is_some() {
            app.start_stream();
        }
        Ok(app)
    }

    fn request_ctx(&self) -> Context {
        self.ctx.with_timeout(REQUEST_TIMEOUT)
    }

    fn open_instance_picker(&mut self, return_to: View) {
        self.return_to_view = return_to;
        self.view = View::InstancePicker;
        self.instance_picker_input.clear();
        let mut known = self
            .config
            .as_ref()
            .map(|c| vec![c.server.clone()])
            .unwrap_or_default();
        if let Some(ref u) = self.anonymous_instance_url {
            if !known.contains(u) {
                known.push(u.clone());
            }
        }
        self.instance_picker_known = known;
        self.instance_picker_selected = 0;
        self.instance_picker_message.clear();
    }

    /// Register the app (or reuse the stored registration) and build the authorize URL.
    fn start_login_flow(&mut self) -> Result<()> {
        let server = self.instance_url.trim().trim_end_matches('/').to_string();
        if server.is_empty() {
            return Err(Error::Config("Instance URL is empty".into()));
        }
        let host = instance_host_from_url(&server)?;
        let ctx = self.request_ctx();

        let known_id = self
            .config
            .as_ref()
            .filter(|c| c.server == server && !c.client_id.is_empty())
            .map(|c| c.client_id.clone());
        let stored_secret = match known_id {
            Some(_) => credential::load(Secret::ClientSecret, &host)?,
            None => None,
        };
        let config = match (known_id, stored_secret) {
            (Some(id), Some(secret)) => Config::new(&server).with_client(id, secret),
            _ => {
                let anonymous = Client::new(Config::new(&server))?;
                let app = self
                    .runtime
                    .block_on(anonymous.register_app(&ctx, &AppConfig::new(APP_NAME)))?;
                credential::store(Secret::ClientSecret, &host, &app.client_secret)?;
                info!(%server, "registered application");
                Config::new(&server).with_client(app.client_id, app.client_secret)
            }
        };

        let client = Client::new(config.clone())?;
        self.auth_url =
            client.authorization_url(&config.client_id, OOB_REDIRECT_URI, DEFAULT_SCOPES)?;
        self.instance_url = server;
        self.config = Some(config);
        self.pending_login = Some(client);
        Ok(())
    }

    /// Trade the pasted code for a token, persist it and switch to the home timeline.
    fn finish_login(&mut self, code: &str) -> Result<()> {
        let mut client = self
            .pending_login
            .take()
            .ok_or_else(|| Error::Config("No login in progress".into()))?;
        let ctx = self.request_ctx();
        if let Err(e) = self
            .runtime
            .block_on(client.get_user_access_token(&ctx, code, OOB_REDIRECT_URI))
        {
            self.pending_login = Some(client);
            return Err(e);
        }

        let host = instance_host_from_url(&client.config().server)?;
        credential::store(Secret::AccessToken, &host, &client.config().access_token)?;
        if let Some(ref config) = self.config {
            save_config(config)?;
        }
        info!(%host, "logged in");

        self.client = Some(client);
        self.anonymous_instance_url = None;
        self.auth_url.clear();
        self.view = View::Timeline;
        self.start_stream();
        self.load_timeline(false);
        Ok(())
    }

    /// Forget the token after the server rejected it and go back to the login screen.
    fn session_expired(&mut self) {
        self.stop_stream();
        if let Some(client) = self.client.take() {
            if let Ok(host) = instance_host_from_url(&client.config().server) {
                if let Err(e) = credential::delete(Secret::AccessToken, &host) {
                    warn!(error = %e, "could not delete stored token");
                }
            }
        }
        self.view = View::Login;
        self.login_message = "Session expired. Please log in again.".to_string();
        if let Err(e) = self.start_login_flow() {
            self.login_message = format!("Session expired; failed to restart login: {e}");
        }
    }

    fn start_stream(&mut self) {
        self.stop_stream();
        let Some(ref client) = self.client else {
            return;
        };
        let ctx = self.ctx.child();
        match self.runtime.block_on(client.streaming_user(&ctx)) {
            Ok(rx) => self.stream = Some((ctx, rx)),
            Err(e) => self.stream_message = format!("Live updates unavailable: {e}"),
        }
    }

    fn stop_stream(&mut self) {
        if let Some((ctx, _)) = self.stream.take() {
            ctx.cancel();
        }
    }

    /// Fold one stream event into the timeline and notification state.
    pub fn apply_event(&mut self, event: Event) {
        match event {
            Event::Update(status) => {
                if self.statuses.iter().any(|s| s.id == status.id) {
                    return;
                }
                self.statuses.insert(0, *status);
                if self.statuses.len() > 1 {
                    self.selected += 1;
                    self.scroll += 1;
                }
            }
            Event::StatusUpdate(status) => {
                if let Some(slot) = self.statuses.iter_mut().find(|s| s.id == status.id) {
                    *slot = *status;
                }
            }
            Event::Delete(id) => {
                if let Some(pos) = self.statuses.iter().position(|s| s.id == id) {
                    self.statuses.remove(pos);
                    if pos < self.selected {
                        self.selected -= 1;
                    }
                    self.selected = self.selected.min(self.statuses.len().saturating_sub(1));
                    self.scroll = self.scroll.min(self.selected);
                }
            }
            Event::Notification(n) => {
                self.notifications.insert(0, *n);
                self.unread_notifications += 1;
            }
            Event::Error(e) => self.stream_message = format!("Live updates: {e}"),
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        if self.view == View::Timeline {
            let content_height = frame.area().height as usize;
            let content_height = content_height.saturating_sub(2).max(1);
            self.timeline_visible_rows = (content_height / 2).max(1);
            if !self.statuses.is_empty() {
                if self.selected >= self.scroll + self.timeline_visible_rows {
                    self.scroll = self.selected - self.timeline_visible_rows + 1;
                } else if self.selected < self.scroll {
                    self.scroll = self.selected;
                }
            }
        }
        match self.view {
            View::Login => draw_login(
                frame,
                &self.instance_url,
                &self.auth_url,
                &self.login_code,
                &self.login_message,
            ),
            View::Timeline => draw_timeline(
                frame,
                &self.statuses,
                &TimelineInfo {
                    title: self.timeline_title(),
                    selected: self.selected,
                    scroll: self.scroll,
                    loading: self.loading,
                    message: &self.timeline_message,
                    stream_message: &self.stream_message,
                    unread_notifications: self.unread_notifications,
                    last_page: self.pagination.is_last_page(),
                },
            ),
            View::TootDetail => {
                if let Some(ref s) = self.detail_status {
                    draw_toot_detail(
                        frame,
                        s,
                        &DetailInfo {
                            thread: self.detail_thread,
                            message: &self.detail_message,
                            can_act: self.client.is_some(),
                        },
                    );
                }
            }
            View::Compose => draw_compose(
                frame,
                &self.compose_buffer,
                self.compose_reply_to_id.as_ref().map(Id::as_str),
                &self.compose_error,
                CHAR_LIMIT,
            ),
            View::Notifications => {
                draw_notifications(frame, &self.notifications, self.notifications_selected);
            }
            View::InstancePicker => draw_instance_picker(
                frame,
                &self.instance_picker_input,
                &self.instance_picker_known,
                self.instance_picker_selected,
                &self.instance_picker_message,
            ),
        }
    }

    fn timeline_title(&self) -> String {
        match self.anonymous_instance_url {
            Some(ref url) if self.client.is_none() => format!(" Public timeline · {url} "),
            _ => " Home timeline ".to_string(),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Result<bool> {
        let mut quit = false;
        match self.view {
            View::Login => match key {
                KeyCode::Esc => quit = true,
                KeyCode::Tab => self.open_instance_picker(View::Login),
                KeyCode::Enter => self.login_enter(),
                KeyCode::Char(c) => self.login_code.push(c),
                KeyCode::Backspace => {
                    self.login_code.pop();
                }
                _ => {}
            },
            View::Timeline => match key {
                KeyCode::Char('q') => quit = true,
                KeyCode::Up | KeyCode::Char('k') => {
                    if self.selected > 0 {
                        self.selected -= 1;
                        if self.selected < self.scroll {
                            self.scroll = self.selected;
                        }
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.selected + 1 < self.statuses.len() {
                        self.selected += 1;
                        if self.selected >= self.scroll + self.timeline_visible_rows {
                            self.scroll =
                                (self.selected + 1).saturating_sub(self.timeline_visible_rows);
                        }
                    }
                }
                KeyCode::Enter => {
                    if let Some(s) = self.statuses.get(self.selected).cloned() {
                        self.open_detail(s);
                    }
                }
                KeyCode::Char('n') => {
                    if self.client.is_some() {
                        self.open_compose(None);
                    }
                }
                KeyCode::Char('N') => {
                    if self.client.is_some() {
                        self.open_notifications();
                    }
                }
                KeyCode::Char('r') => self.load_timeline(false),
                KeyCode::Char('m') => self.load_timeline(true),
                KeyCode::Char('i') => self.open_instance_picker(View::Timeline),
                _ => {}
            },
            View::TootDetail => match key {
                KeyCode::Esc => {
                    self.view = View::Timeline;
                    self.detail_message.clear();
                }
                KeyCode::Char('r') => {
                    if self.client.is_some() {
                        if let Some(id) = self.detail_status.as_ref().map(|s| s.original().id.clone())
                        {
                            self.open_compose(Some(id));
                        }
                    }
                }
                KeyCode::Char('b') => self.toggle_boost(),
                KeyCode::Char('f') => self.toggle_favourite(),
                KeyCode::Char('i') => self.open_instance_picker(View::TootDetail),
                _ => {}
            },
            View::Compose => match key {
                KeyCode::Esc => {
                    self.view = if self.compose_reply_to_id.is_some() {
                        View::TootDetail
                    } else {
                        View::Timeline
                    };
                    self.compose_error.clear();
                }
                KeyCode::Enter => self.submit_compose(),
                KeyCode::Char(c) => self.compose_buffer.push(c),
                KeyCode::Backspace => {
                    self.compose_buffer.pop();
                }
                _ => {}
            },
            View::Notifications => match key {
                KeyCode::Esc | KeyCode::Char('q') => self.view = View::Timeline,
                KeyCode::Up | KeyCode::Char('k') => {
                    self.notifications_selected = self.notifications_selected.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.notifications_selected + 1 < self.notifications.len() {
                        self.notifications_selected += 1;
                    }
                }
                KeyCode::Enter => {
                    let status = self
                        .notifications
                        .get(self.notifications_selected)
                        .and_then(|n| n.status.as_deref())
                        .cloned();
                    if let Some(s) = status {
                        self.open_detail(s);
                    }
                }
                KeyCode::Char('r') => self.open_notifications(),
                _ => {}
            },
            View::InstancePicker => match key {
                KeyCode::Esc => {
                    self.view = self.return_to_view;
                    self.instance_picker_message.clear();
                }
                KeyCode::Enter => self.submit_instance_picker(),
                KeyCode::Backspace => {
                    self.instance_picker_input.pop();
                    self.instance_picker_message.clear();
                }
                KeyCode::Up => {
                    self.instance_picker_selected = self.instance_picker_selected.saturating_sub(1);
                }
                KeyCode::Down => {
                    if self.instance_picker_selected + 1 < self.instance_picker_known.len() {
                        self.instance_picker_selected += 1;
                    }
                }
                KeyCode::Char(c) => {
                    self.instance_picker_input.push(c);
                    self.instance_picker_message.clear();
                }
                _ => {}
            },
        }
        Ok(quit)
    }

    fn login_enter(&mut self) {
        let input = self.login_code.trim().to_string();
        self.login_code.clear();
        if self.auth_url.is_empty() {
            if !input.is_empty() {
                self.instance_url = input;
            }
            if self.instance_url.is_empty() {
                self.login_message =
                    "Enter instance URL (e.g. https://mastodon.social) first.".to_string();
                return;
            }
            match self.start_login_flow() {
                Ok(()) => self.login_message.clear(),
                Err(e) => self.login_message = format!("Failed to start login: {e}"),
            }
        } else if input.is_empty() {
            self.login_message = "Enter the authorization code first.".to_string();
        } else {
            match self.finish_login(&input) {
                Ok(()) => self.login_message.clear(),
                Err(e) => self.login_message = format!("Login failed: {e}"),
            }
        }
    }

    fn open_detail(&mut self, status: Status) {
        self.detail_thread = None;
        self.detail_message.clear();
        if let Some(ref client) = self.client {
            let ctx = self.request_ctx();
            let id = status.original().id.clone();
            match self.runtime.block_on(client.get_status_context(&ctx, &id)) {
                Ok(thread) => {
                    self.detail_thread = Some((thread.ancestors.len(), thread.descendants.len()));
                }
                Err(e) => self.detail_message = format!("Could not load thread: {e}"),
            }
        }
        self.detail_status = Some(status);
        self.view = View::TootDetail;
    }

    fn open_compose(&mut self, reply_to: Option<Id>) {
        self.compose_buffer.clear();
        self.compose_reply_to_id = reply_to;
        self.compose_error.clear();
        self.view = View::Compose;
    }

    fn open_notifications(&mut self) {
        let Some(ref client) = self.client else {
            return;
        };
        let ctx = self.request_ctx();
        let mut pg = Pagination::with_limit(PAGE_SIZE);
        match self
            .runtime
            .block_on(client.get_notifications(&ctx, Some(&mut pg)))
        {
            Ok(list) => {
                self.notifications = list;
                self.notifications_selected = 0;
                self.unread_notifications = 0;
                self.view = View::Notifications;
            }
            Err(e) if e.kind() == ErrorKind::Unauthorized => self.session_expired(),
            Err(e) => self.timeline_message = format!("Failed to load notifications: {e}"),
        }
    }

    fn toggle_boost(&mut self) {
        let (Some(client), Some(status)) = (self.client.as_ref(), self.detail_status.as_ref())
        else {
            return;
        };
        let original = status.original();
        let id = original.id.clone();
        let boost = !original.reblogged.unwrap_or(false);
        let ctx = self.request_ctx();
        let result = if boost {
            self.runtime.block_on(client.reblog(&ctx, &id))
        } else {
            self.runtime.block_on(client.unreblog(&ctx, &id))
        };
        match result {
            Ok(updated) => {
                self.detail_status = Some(updated);
                self.detail_message = if boost { "Boosted." } else { "Unboosted." }.to_string();
            }
            Err(e) => self.detail_message = format!("Error: {e}"),
        }
    }

    fn toggle_favourite(&mut self) {
        let (Some(client), Some(status)) = (self.client.as_ref(), self.detail_status.as_ref())
        else {
            return;
        };
        let original = status.original();
        let id = original.id.clone();
        let fav = !original.favourited.unwrap_or(false);
        let ctx = self.request_ctx();
        let result = if fav {
            self.runtime.block_on(client.favourite(&ctx, &id))
        } else {
            self.runtime.block_on(client.unfavourite(&ctx, &id))
        };
        match result {
            Ok(updated) => {
                self.detail_status = Some(updated);
                self.detail_message = if fav { "Favourited." } else { "Unfavourited." }.to_string();
            }
            Err(e) => self.detail_message = format!("Error: {e}"),
        }
    }

    fn submit_compose(&mut self) {
        if let Err(msg) = validate_toot(&self.compose_buffer) {
            self.compose_error = msg;
            return;
        }
        let Some(ref client) = self.client else {
            return;
        };
        let mut toot = Toot::new(self.compose_buffer.trim());
        if let Some(ref id) = self.compose_reply_to_id {
            toot = toot.reply_to(id.clone());
        }
        let ctx = self.request_ctx();
        match self.runtime.block_on(client.post_status(&ctx, &toot)) {
            Ok(posted) => {
                let replied = self.compose_reply_to_id.take().is_some();
                self.compose_buffer.clear();
                self.compose_error.clear();
                if replied {
                    self.view = View::TootDetail;
                } else {
                    if !self.statuses.iter().any(|s| s.id == posted.id) {
                        self.statuses.insert(0, posted);
                    }
                    self.selected = 0;
                    self.scroll = 0;
                    self.view = View::Timeline;
                }
            }
            Err(e) => self.compose_error = format!("Post failed: {e}"),
        }
    }

    fn submit_instance_picker(&mut self) {
        let typed = self.instance_picker_input.trim();
        let url = if typed.is_empty() {
            self.instance_picker_known
                .get(self.instance_picker_selected)
                .map_or("", |s| s.trim())
        } else {
            typed
        };
        if url.is_empty() {
            self.instance_picker_message = "Enter a URL or pick an instance.".to_string();
            return;
        }
        if let Err(e) = instance_host_from_url(url).and_then(|_| Config::new(url).server_url()) {
            self.instance_picker_message = format!("Invalid URL: {e}");
            return;
        }
        let url = url.trim_end_matches('/').to_string();
        self.stop_stream();
        self.anonymous_instance_url = Some(url);
        self.client = None;
        self.statuses.clear();
        self.selected = 0;
        self.scroll = 0;
        self.pagination = Pagination::with_limit(PAGE_SIZE);
        self.timeline_message.clear();
        self.stream_message.clear();
        self.view = View::Timeline;
        self.instance_picker_message.clear();
        self.load_timeline(false);
    }

    /// Refresh from the newest toot, or with `more` fetch the page older than the last one.
    fn load_timeline(&mut self, more: bool) {
        if more && self.pagination.is_last_page() {
            self.timeline_message = "No more toots.".to_string();
            return;
        }
        let mut pg = if more {
            Pagination {
                max_id: self.pagination.max_id.clone(),
                ..Pagination::with_limit(PAGE_SIZE)
            }
        } else {
            Pagination::with_limit(PAGE_SIZE)
        };
        let ctx = self.request_ctx();
        let result = if let Some(ref client) = self.client {
            self.runtime
                .block_on(client.get_timeline_home(&ctx, Some(&mut pg)))
        } else if let Some(ref url) = self.anonymous_instance_url {
            Client::new(Config::new(url)).and_then(|anonymous| {
                self.runtime
                    .block_on(anonymous.get_timeline_public(&ctx, false, Some(&mut pg)))
            })
        } else {
            return;
        };

        self.loading = false;
        match result {
            Ok(page) => {
                self.timeline_message.clear();
                if more {
                    self.statuses.extend(page);
                } else {
                    self.statuses = page;
                    self.selected = 0;
                    self.scroll = 0;
                }
                self.pagination = pg;
            }
            Err(e) if e.kind() == ErrorKind::Unauthorized && self.client.is_some() => {
                self.session_expired();
            }
            Err(e) => self.timeline_message = format!("Failed to load timeline: {e}"),
        }
    }

    /// Called each loop iteration: drain live events, and fetch the timeline when the view
    /// is empty and no earlier attempt failed.
    pub fn tick(&mut self) {
        let mut events = Vec::new();
        if let Some((_, rx)) = self.stream.as_mut() {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }
        for event in events {
            self.apply_event(event);
        }

        let has_source = self.client.is_some() || self.anonymous_instance_url.is_some();
        if self.view == View::Timeline
            && has_source
            && !self.loading
            && self.statuses.is_empty()
            && self.timeline_message.is_empty()
        {
            self.loading = true;
            self.load_timeline(false);
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.ctx.cancel();
    }
}

/// A ready client when both the registration and a token are in the keyring.
fn client_from_keyring(config: &Config) -> Option<Client> {
    let host = instance_host_from_url(&config.server).ok()?;
    let load = |secret| match credential::load(secret, &host) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "keyring unavailable");
            None
        }
    };
    let token = load(Secret::AccessToken)?;
    let secret = load(Secret::ClientSecret).unwrap_or_default();
    let config = config
        .clone()
        .with_client(config.client_id.clone(), secret)
        .with_access_token(token);
    Client::new(config).ok()
}
