use std::any::Any;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders, Widget};

use lumen_core::live::ChainView;

use crate::state::AppState;
use crate::ui::style::{Color, Style};
use crate::ui::theme::LumenTheme;
use crate::ui::{Action, InputEvent, Keymap, LiveAction, Pane};

/// Read-only view of what the pipeline is running, plus tempo and triggers.
pub struct LivePane {
    keymap: Keymap,
    selected_event: usize,
}

impl LivePane {
    pub fn new(keymap: Keymap) -> Self {
        Self { keymap, selected_event: 0 }
    }

    fn selected_event<'a>(&self, state: &'a AppState) -> Option<&'a str> {
        let events = &state.live.view.events;
        events.get(self.selected_event.min(events.len().saturating_sub(1))).map(String::as_str)
    }
}

impl Pane for LivePane {
    fn id(&self) -> &'static str {
        "live"
    }

    fn handle_action(&mut self, action: &str, _event: &InputEvent, state: &AppState) -> Action {
        let count = state.live.view.events.len();
        match action {
            "up" => {
                self.selected_event = self.selected_event.min(count.saturating_sub(1)).saturating_sub(1);
                Action::None
            }
            "down" => {
                if count > 0 {
                    self.selected_event = (self.selected_event + 1).min(count - 1);
                }
                Action::None
            }
            "trigger" => match self.selected_event(state) {
                Some(name) => Action::Live(LiveAction::Trigger(name.to_string())),
                None => Action::None,
            },
            "tempo_up" => Action::Live(LiveAction::AdjustTempo(1)),
            "tempo_down" => Action::Live(LiveAction::AdjustTempo(-1)),
            "refresh" => Action::Live(LiveAction::Refresh),
            _ => Action::None,
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, state: &AppState) {
        let view = &state.live.view;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[1]);

        // Tempo
        let tempo_block = titled(" Tempo ");
        let inner = tempo_block.inner(rows[0]);
        tempo_block.render(rows[0], buf);
        let step = state.settings.tempo_step;
        buf.set_stringn(inner.x + 1, inner.y, format!("{} bpm", view.tempo_text()), 16, Style::new().fg(Color::YELLOW).bold());
        buf.set_stringn(
            inner.x + 18,
            inner.y,
            format!("+/- adjust by {}", step),
            inner.width.saturating_sub(18) as usize,
            LumenTheme::muted(),
        );

        // Chains
        let chains_block = titled(" Running chains ");
        let inner = chains_block.inner(cols[0]);
        chains_block.render(cols[0], buf);
        let mut y = inner.y;
        let bottom = inner.y + inner.height;
        if view.chains.is_empty() {
            buf.set_stringn(inner.x + 1, y, "(no chains reported)", inner.width as usize, LumenTheme::muted());
        }
        for chain in &view.chains {
            for (text, style) in chain_lines(chain) {
                if y >= bottom {
                    break;
                }
                buf.set_stringn(inner.x + 1, y, &text, inner.width.saturating_sub(2) as usize, style);
                y += 1;
            }
        }

        // Events
        let events_block = titled(" Events ");
        let inner = events_block.inner(cols[1]);
        events_block.render(cols[1], buf);
        if view.events.is_empty() {
            buf.set_stringn(inner.x + 1, inner.y, "(no events)", inner.width as usize, LumenTheme::muted());
        }
        let selected = self.selected_event.min(view.events.len().saturating_sub(1));
        for (i, name) in view.events.iter().enumerate().take(inner.height as usize) {
            let y = inner.y + i as u16;
            let style = if i == selected { LumenTheme::selected_row() } else { LumenTheme::value() };
            if i == selected {
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), style);
            }
            buf.set_stringn(inner.x + 1, y, name, inner.width.saturating_sub(2) as usize, style);
        }
    }

    fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn titled(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(ratatui::style::Style::from(Style::new().fg(Color::DARK_GRAY)))
        .title_style(LumenTheme::header())
}

/// Summary lines for one chain: header, output, then each effect.
fn chain_lines(chain: &ChainView) -> Vec<(String, ratatui::style::Style)> {
    let mut lines = vec![(
        format!("{}  prio {}  {} Hz  {} lamps", chain.id, chain.priority, chain.tick_rate, chain.num_lamps),
        LumenTheme::header(),
    )];
    if let Some(output) = &chain.output {
        lines.push((
            format!("  -> {} ({}, {} ch/lamp)", output.output_type, output.channel_mapping, output.num_channels_per_lamp),
            LumenTheme::label(),
        ));
    }
    for effect in &chain.effects {
        let (mark, style) = if effect.is_enabled() {
            ("[x]", LumenTheme::value())
        } else {
            ("[ ]", LumenTheme::muted())
        };
        let group = effect.group.as_deref().map(|g| format!("  @{}", g)).unwrap_or_default();
        lines.push((format!("  {} {} : {}{}", mark, effect.id, effect.effect_type, group), style));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panes::test_support::dummy_event;
    use lumen_core::live::LiveRenderer;
    use lumen_core::settings::Settings;

    #[test]
    fn trigger_uses_selected_event() {
        let mut state = AppState::new(Settings::default());
        state.live.view.render_events(&["intro".to_string(), "drop".to_string()]);
        let mut pane = LivePane::new(Keymap::new());
        let ev = dummy_event();

        pane.handle_action("down", &ev, &state);
        pane.handle_action("down", &ev, &state);
        assert_eq!(pane.handle_action("trigger", &ev, &state), Action::Live(LiveAction::Trigger("drop".into())));
        pane.handle_action("up", &ev, &state);
        assert_eq!(pane.handle_action("trigger", &ev, &state), Action::Live(LiveAction::Trigger("intro".into())));
    }

    #[test]
    fn trigger_without_events_does_nothing() {
        let state = AppState::new(Settings::default());
        let mut pane = LivePane::new(Keymap::new());
        assert_eq!(pane.handle_action("trigger", &dummy_event(), &state), Action::None);
        assert_eq!(pane.handle_action("tempo_up", &dummy_event(), &state), Action::Live(LiveAction::AdjustTempo(1)));
    }

    #[test]
    fn disabled_effects_are_marked() {
        let chain: ChainView = serde_json::from_str(
            r#"{"ID": "c1", "Output": {"Type": "artnet"}, "Effects": [{"ID": "e1", "Type": "strobe", "Enabled": false}]}"#,
        )
        .unwrap();
        let lines = chain_lines(&chain);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].0.contains("[ ] e1 : strobe"));
    }
}
