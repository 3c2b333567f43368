//! Chrome around the active pane: tab header and status line.

use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use lumen_core::editor::EditorPhase;

use super::style::{Color, Style};
use super::{StatusEvent, StatusLevel};
use crate::state::AppState;

/// Info messages fade after this long; warnings and errors stay until replaced.
const INFO_TTL: Duration = Duration::from_secs(4);

const TABS: [(&str, &str); 3] = [("chains", "F1 Chains"), ("events", "F2 Events"), ("live", "F3 Live")];

pub struct Frame {
    status: Option<(StatusEvent, Instant)>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    pub fn new() -> Self {
        Self { status: None }
    }

    pub fn set_status(&mut self, event: StatusEvent) {
        self.status = Some((event, Instant::now()));
    }

    pub fn status(&self) -> Option<&StatusEvent> {
        self.status.as_ref().map(|(event, _)| event)
    }

    /// The area left for panes once the header and status line are drawn.
    pub fn content_area(area: Rect) -> Rect {
        Rect::new(area.x, area.y + 1, area.width, area.height.saturating_sub(2))
    }

    pub fn render_buf(&mut self, area: Rect, buf: &mut Buffer, state: &AppState, active_pane: &str) {
        if area.height < 3 {
            return;
        }
        self.expire(Instant::now());
        self.render_header(area, buf, state, active_pane);
        self.render_status(Rect::new(area.x, area.y + area.height - 1, area.width, 1), buf, state);
    }

    fn expire(&mut self, now: Instant) {
        let stale = matches!(&self.status, Some((event, at))
            if event.level == StatusLevel::Info && now.duration_since(*at) > INFO_TTL);
        if stale {
            self.status = None;
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer, state: &AppState, active_pane: &str) {
        let bar: ratatui::style::Style = Style::new().fg(Color::WHITE).bg(Color::new(25, 25, 35)).into();
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), bar);

        let mut x = area.x;
        let title = " lumen ";
        buf.set_stringn(x, area.y, title, area.width as usize, Style::new().fg(Color::CYAN).bg(Color::new(25, 25, 35)).bold());
        x += title.len() as u16;

        for (id, label) in TABS {
            let style: ratatui::style::Style = if id == active_pane {
                Style::new().fg(Color::BLACK).bg(Color::CYAN).bold().into()
            } else {
                Style::new().fg(Color::GRAY).bg(Color::new(25, 25, 35)).into()
            };
            let text = format!(" {} ", label);
            let remaining = (area.x + area.width).saturating_sub(x) as usize;
            buf.set_stringn(x, area.y, &text, remaining, style);
            x += text.len() as u16 + 1;
        }

        let url = &state.settings.base_url;
        let url_x = (area.x + area.width).saturating_sub(url.len() as u16 + 1);
        if url_x > x {
            buf.set_stringn(url_x, area.y, url, url.len(), Style::new().fg(Color::DARK_GRAY).bg(Color::new(25, 25, 35)));
        }
    }

    fn render_status(&self, line: Rect, buf: &mut Buffer, state: &AppState) {
        let (marker, marker_style) = session_marker(state);
        let marker_width = marker.len() as u16;
        let marker_x = (line.x + line.width).saturating_sub(marker_width + 1);

        if let Some(event) = self.status() {
            let color = match event.level {
                StatusLevel::Info => Color::WHITE,
                StatusLevel::Warn => Color::AMBER,
                StatusLevel::Error => Color::RED,
            };
            let width = marker_x.saturating_sub(line.x + 1) as usize;
            buf.set_stringn(line.x + 1, line.y, &event.message, width, Style::new().fg(color));
        }
        if !marker.is_empty() && marker_x > line.x {
            buf.set_stringn(marker_x, line.y, &marker, marker.len(), marker_style);
        }
    }
}

/// Right-hand status marker: load phase, save progress or unsaved changes.
fn session_marker(state: &AppState) -> (String, ratatui::style::Style) {
    let editor = &state.editor;
    match editor.phase() {
        EditorPhase::Loading => ("loading...".into(), Style::new().fg(Color::GRAY).into()),
        EditorPhase::Failed(_) => ("editor unavailable".into(), Style::new().fg(Color::RED).bold().into()),
        EditorPhase::Ready if editor.is_saving() => ("saving...".into(), Style::new().fg(Color::YELLOW).into()),
        EditorPhase::Ready if editor.is_dirty() => ("[modified]".into(), Style::new().fg(Color::ORANGE).bold().into()),
        EditorPhase::Ready => (String::new(), ratatui::style::Style::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(message: &str) -> StatusEvent {
        StatusEvent { level: StatusLevel::Info, message: message.into() }
    }

    #[test]
    fn info_expires_but_errors_stay() {
        let mut frame = Frame::new();
        frame.set_status(info("Saved"));
        frame.expire(Instant::now() + INFO_TTL + Duration::from_millis(1));
        assert!(frame.status().is_none());

        frame.set_status(StatusEvent { level: StatusLevel::Error, message: "Save failed".into() });
        frame.expire(Instant::now() + INFO_TTL * 10);
        assert_eq!(frame.status().map(|s| s.message.as_str()), Some("Save failed"));
    }

    #[test]
    fn content_area_leaves_room_for_chrome() {
        assert_eq!(Frame::content_area(Rect::new(0, 0, 80, 24)), Rect::new(0, 1, 80, 22));
    }
}
