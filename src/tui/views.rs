//! TUI view rendering.

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::api::{Account, Notification, NotificationType, Status};

pub const EMPTY_TIMELINE_MESSAGE: &str = "No toots — timeline is empty.";

/// Timeline screen state that is not the statuses themselves.
#[derive(Debug, Clone, Default)]
pub struct TimelineInfo<'a> {
    pub title: String,
    pub selected: usize,
    pub scroll: usize,
    pub loading: bool,
    pub message: &'a str,
    pub stream_message: &'a str,
    pub unread_notifications: usize,
    pub last_page: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DetailInfo<'a> {
    /// Ancestors and replies, once loaded.
    pub thread: Option<(usize, usize)>,
    pub message: &'a str,
    /// Logged in, so boost/favourite/reply are available.
    pub can_act: bool,
}

/// Strip HTML tags from Mastodon content for plain-text display.
///
/// Paragraphs and `<br>` become line breaks; entities are decoded by the parser.
pub fn strip_html(html: &str) -> String {
    let fragment = scraper::Html::parse_fragment(html);
    let mut out = String::new();
    for node in fragment.root_element().descendants() {
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = node.value().as_element() {
            match el.name() {
                "br" => out.push('\n'),
                "p" if !out.is_empty() => out.push_str("\n\n"),
                _ => {}
            }
        }
    }
    out.trim().to_string()
}

fn handle(account: &Account) -> &str {
    if account.acct.is_empty() {
        account.username.as_str()
    } else {
        account.acct.as_str()
    }
}

fn display_name(account: &Account) -> &str {
    if account.display_name.is_empty() {
        handle(account)
    } else {
        account.display_name.as_str()
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn title_bar(frame: &mut Frame, area: Rect, title: &str) {
    let title = Paragraph::new(title.to_string()).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(title, area);
}

fn help_bar(frame: &mut Frame, area: Rect, help: &str) {
    let help = Line::from(Span::styled(help.to_string(), Style::default().dim()));
    frame.render_widget(Paragraph::new(help), area);
}

/// Login / add instance screen.
pub fn draw_login(
    frame: &mut Frame,
    instance_url: &str,
    auth_url: &str,
    code_buffer: &str,
    message: &str,
) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .split(frame.area());

    title_bar(frame, chunks[0], "tootline — Mastodon in the terminal");

    let mut lines = vec![
        Line::from(format!("Instance URL: {instance_url}")),
        Line::from(""),
    ];
    if auth_url.is_empty() {
        lines.push(Line::from(
            "Type an instance URL (or leave empty for the one above) and press Enter.",
        ));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Input: {code_buffer}▌"),
            Style::default().fg(Color::Green),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Open in browser: ",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(auth_url.to_string()));
        lines.push(Line::from(""));
        lines.push(Line::from(
            "After authorizing, paste the code and press Enter.",
        ));
        lines.push(Line::from(Span::styled(
            format!("Code: {code_buffer}▌"),
            Style::default().fg(Color::Green),
        )));
    }
    lines.push(Line::from(""));
    if !message.is_empty() {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }
    let block = Block::default().borders(Borders::ALL).title(" Login ");
    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(para, chunks[1]);

    help_bar(frame, chunks[2], " Enter: continue  Tab: browse anonymously  Esc: quit ");
}

/// Home or public timeline, two rows per toot.
pub fn draw_timeline(frame: &mut Frame, statuses: &[Status], info: &TimelineInfo<'_>) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let mut title = info.title.clone();
    if info.unread_notifications > 0 {
        title.push_str(&format!(" · {} new notifications", info.unread_notifications));
    }
    title_bar(frame, chunks[0], &title);

    let content_area = chunks[1];
    if info.loading {
        let para = Paragraph::new("Loading…").block(Block::default().borders(Borders::ALL));
        frame.render_widget(para, content_area);
    } else if statuses.is_empty() {
        let para = Paragraph::new(EMPTY_TIMELINE_MESSAGE)
            .block(Block::default().borders(Borders::ALL).title(" Timeline "))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, content_area);
    } else {
        let rows = (content_area.height.saturating_sub(2) as usize / 2).max(1);
        let start = info.scroll.min(statuses.len().saturating_sub(1));
        let end = (start + rows).min(statuses.len());
        let mut lines: Vec<Line> = Vec::with_capacity((end - start) * 2);
        for (idx, s) in statuses.iter().enumerate().take(end).skip(start) {
            let shown = s.original();
            let style = if idx == info.selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            let mut header = vec![
                Span::styled(
                    format!(" {} ", display_name(&shown.account)),
                    Style::default().add_modifier(Modifier::BOLD).fg(Color::Green),
                ),
                Span::styled(
                    format!("@{} · {}", handle(&shown.account), timestamp(&shown.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if s.reblog.is_some() {
                header.push(Span::styled(
                    format!("  ⟲ {}", handle(&s.account)),
                    Style::default().fg(Color::Magenta),
                ));
            }
            lines.push(Line::from(header));
            let text = if shown.spoiler_text.is_empty() {
                strip_html(&shown.content)
            } else {
                format!("CW: {}", shown.spoiler_text)
            };
            let preview: String = text.lines().next().unwrap_or("").chars().take(100).collect();
            lines.push(Line::from(Span::styled(format!("   {preview}"), style)));
        }
        let para = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Timeline "));
        frame.render_widget(para, content_area);
    }

    let notice = if !info.message.is_empty() {
        Span::styled(info.message.to_string(), Style::default().fg(Color::Yellow))
    } else if !info.stream_message.is_empty() {
        Span::styled(info.stream_message.to_string(), Style::default().fg(Color::DarkGray))
    } else if info.last_page && !statuses.is_empty() {
        Span::styled("End of timeline.", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw("")
    };
    frame.render_widget(Paragraph::new(Line::from(notice)), chunks[2]);

    help_bar(
        frame,
        chunks[3],
        " ↑/↓: select  Enter: open  n: new toot  N: notifications  r: refresh  m: more  i: instance  q: quit ",
    );
}

/// Single toot with full content and actions.
pub fn draw_toot_detail(frame: &mut Frame, status: &Status, info: &DetailInfo<'_>) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(5),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .split(frame.area());

    title_bar(frame, chunks[0], " Toot ");

    let shown = status.original();
    let acc = &shown.account;
    let mut lines = Vec::new();
    if status.reblog.is_some() {
        lines.push(Line::from(Span::styled(
            format!("Boosted by @{}", handle(&status.account)),
            Style::default().fg(Color::Magenta),
        )));
    }
    lines.push(Line::from(Span::styled(
        display_name(acc).to_string(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!("@{} · {} · {}", handle(acc), timestamp(&shown.created_at), shown.visibility.as_str()),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
    if !shown.spoiler_text.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("CW: {}", shown.spoiler_text),
            Style::default().fg(Color::Yellow),
        )));
    }
    for text_line in strip_html(&shown.content).lines() {
        lines.push(Line::from(text_line.to_string()));
    }
    for media in &shown.media_attachments {
        let label = media.description.as_deref().unwrap_or(media.url.as_str());
        lines.push(Line::from(Span::styled(
            format!("[{}] {label}", media.kind),
            Style::default().fg(Color::Blue),
        )));
    }
    lines.push(Line::from(""));
    let mark = |on: Option<bool>| if on.unwrap_or(false) { "●" } else { "○" };
    lines.push(Line::from(Span::styled(
        format!(
            "{} {} boosts  {} {} favourites  {} replies",
            mark(shown.reblogged),
            shown.reblogs_count,
            mark(shown.favourited),
            shown.favourites_count,
            shown.replies_count
        ),
        Style::default().fg(Color::DarkGray),
    )));
    if let Some((above, below)) = info.thread {
        lines.push(Line::from(Span::styled(
            format!("Thread: {above} before, {below} after"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let block = Block::default().borders(Borders::ALL);
    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(para, chunks[1]);

    if !info.message.is_empty() {
        let msg = Paragraph::new(info.message.to_string()).style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, chunks[2]);
    }

    let help = if info.can_act {
        " b: boost  f: favourite  r: reply  Esc: back "
    } else {
        " Esc: back "
    };
    help_bar(frame, chunks[3], help);
}

/// Compose new toot or reply, with a live character count.
pub fn draw_compose(
    frame: &mut Frame,
    buffer: &str,
    in_reply_to: Option<&str>,
    error_message: &str,
    char_limit: usize,
) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(5),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .split(frame.area());

    let title = match in_reply_to {
        Some(id) => format!(" Reply to {id} "),
        None => " New toot ".to_string(),
    };
    title_bar(frame, chunks[0], &title);

    let len = buffer.chars().count();
    let count_style = if len > char_limit {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!("{len}/{char_limit}"), count_style));
    let para = Paragraph::new(format!("{buffer}▌"))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(para, chunks[1]);

    if !error_message.is_empty() {
        let err = Paragraph::new(error_message.to_string()).style(Style::default().fg(Color::Red));
        frame.render_widget(err, chunks[2]);
    }

    help_bar(frame, chunks[3], " Enter: post  Esc: cancel (no post) ");
}

fn notification_summary(n: &Notification) -> String {
    let who = handle(&n.account);
    match &n.kind {
        NotificationType::Mention => format!("@{who} mentioned you"),
        NotificationType::Status => format!("@{who} posted"),
        NotificationType::Reblog => format!("@{who} boosted your toot"),
        NotificationType::Follow => format!("@{who} followed you"),
        NotificationType::FollowRequest => format!("@{who} requested to follow you"),
        NotificationType::Favourite => format!("@{who} favourited your toot"),
        NotificationType::Poll => "A poll has ended".to_string(),
        NotificationType::Update => format!("@{who} edited a toot"),
        NotificationType::AdminSignUp => format!("@{who} signed up"),
        NotificationType::AdminReport => format!("@{who} filed a report"),
        NotificationType::Other(kind) => format!("{kind} from @{who}"),
    }
}

pub fn draw_notifications(frame: &mut Frame, notifications: &[Notification], selected: usize) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(frame.area());

    title_bar(frame, chunks[0], " Notifications ");

    let area = chunks[1];
    if notifications.is_empty() {
        let para = Paragraph::new("Nothing new.")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, area);
    } else {
        let rows = (area.height.saturating_sub(2) as usize / 2).max(1);
        let start = (selected + 1).saturating_sub(rows);
        let mut lines = Vec::new();
        for (idx, n) in notifications.iter().enumerate().skip(start).take(rows) {
            let style = if idx == selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(notification_summary(n), style.add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  {}", timestamp(&n.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            let preview = n
                .status
                .as_deref()
                .map(|s| strip_html(&s.content))
                .unwrap_or_default();
            let preview: String = preview.lines().next().unwrap_or("").chars().take(100).collect();
            lines.push(Line::from(format!("   {preview}")));
        }
        let para = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        frame.render_widget(para, area);
    }

    help_bar(frame, chunks[2], " ↑/↓: select  Enter: open toot  r: refresh  Esc: back ");
}

/// Dialog to type or pick an instance for anonymous browsing.
pub fn draw_instance_picker(
    frame: &mut Frame,
    input: &str,
    known: &[String],
    selected: usize,
    message: &str,
) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(frame.area());

    title_bar(frame, chunks[0], " Browse an instance ");

    let input_box = Paragraph::new(format!("{input}▌"))
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL).title(" URL "));
    frame.render_widget(input_box, chunks[1]);

    let lines: Vec<Line> = known
        .iter()
        .enumerate()
        .map(|(i, url)| {
            if i == selected {
                Line::from(Span::styled(
                    format!("> {url}"),
                    Style::default().add_modifier(Modifier::REVERSED),
                ))
            } else {
                Line::from(format!("  {url}"))
            }
        })
        .collect();
    let list = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Known "));
    frame.render_widget(list, chunks[2]);

    if !message.is_empty() {
        let msg = Paragraph::new(message.to_string()).style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, chunks[3]);
    }

    help_bar(
        frame,
        chunks[4],
        " Enter: browse typed URL (or selected)  ↑/↓: pick  Esc: cancel ",
    );
}
