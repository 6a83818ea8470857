//! TUI views and rendering.

mod views;

pub use views::strip_html;
pub use views::{
    draw_compose, draw_instance_picker, draw_login, draw_notifications, draw_timeline,
    draw_toot_detail, DetailInfo, TimelineInfo, EMPTY_TIMELINE_MESSAGE,
};
