pub(crate) mod battle;
pub(crate) mod landing;
pub(crate) mod layout;
pub(crate) mod loading;
pub(crate) mod logs;
pub(crate) mod playlists;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};
use smol_str::ToSmolStr as _;
use songbattle_core::{View, tournament::TournamentState};
use unicode_width::UnicodeWidthChar as _;

pub use crate::style::string_to_color;
use crate::{app::App, keys};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    // Fill entire terminal with background color.
    let bg = Block::default().style(Style::default().bg(app.config.style.background_color()));
    frame.render_widget(bg, size);

    let main = layout::split_main(size);
    let view = app.view();

    draw_header(frame, app, &view, main.header);

    if app.show_logs {
        logs::draw(frame, &mut app.logs, &app.config.style, main.content);
    } else {
        match view {
            View::Landing => landing::draw(frame, app, main.content),
            View::Playlists => playlists::draw(frame, app, main.content),
            View::Battle { .. } => battle::draw(frame, app, main.content),
        }
    }

    draw_error_bar(frame, app, main.error_bar);
    draw_help_bar(frame, app, &view, main.help_bar);

    // Draw quit confirmation dialog on top of everything.
    if app.quit_confirming {
        let yes = keys::KEY_CONFIRM_YES.to_smolstr();
        let no = keys::KEY_CONFIRM_NO.to_smolstr();
        let prompt = format!("Quit? {yes}/{no}");
        let popup_width = prompt.len() as u16 + 4; // border (2) + padding (2)
        let popup_area = layout::centered(size, popup_width, 3);

        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(format!(" {prompt}"))
            .block(Block::bordered().style(Style::default().fg(app.config.style.text_color())))
            .style(
                Style::default()
                    .fg(app.config.style.text_color())
                    .bg(app.config.style.background_color()),
            );
        frame.render_widget(popup, popup_area);
    }
}

fn draw_header(frame: &mut Frame, app: &App, view: &View, area: Rect) {
    let style = &app.config.style;
    let location = match view {
        View::Landing => "log in".to_string(),
        View::Playlists => "playlists".to_string(),
        View::Battle { playlist_id } => {
            let state = app.logic.get_state();
            let state = state.read().unwrap();
            state
                .playlists
                .playlists()
                .iter()
                .find(|p| &p.id == playlist_id)
                .map(|p| format!("battle: {}", p.name))
                .unwrap_or_else(|| "battle".to_string())
        }
    };

    let header = Line::from(vec![
        Span::styled(
            " song battle ",
            Style::default()
                .fg(style.accent_color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            truncate_to_width(&location, (area.width as usize).saturating_sub(14)),
            Style::default().fg(style.dim_color()),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn draw_error_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.logic.get_state();
    let state = state.read().unwrap();
    let Some(error) = &state.error else {
        return;
    };

    let style = &app.config.style;
    let line = Line::from(vec![
        Span::styled(
            format!(" {}: ", error.display_name()),
            Style::default()
                .fg(style.error_color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(error.display_message(), Style::default().fg(style.error_color())),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help_bar(frame: &mut Frame, app: &App, view: &View, area: Rect) {
    let style = &app.config.style;

    let help_actions: &[keys::Action] = if app.show_logs {
        keys::LOGS_HELP
    } else {
        match view {
            View::Landing => keys::LANDING_HELP,
            View::Playlists => keys::PLAYLISTS_HELP,
            View::Battle { .. } => {
                let state = app.logic.get_state();
                let state = state.read().unwrap();
                match state.tournament.state() {
                    TournamentState::Complete { .. } | TournamentState::Stalled { .. } => {
                        keys::FINISHED_HELP
                    }
                    _ => keys::MATCHUP_HELP,
                }
            }
        }
    };

    let mut spans: Vec<Span> = Vec::new();
    spans.push(Span::raw(" "));

    for action in help_actions {
        if let Some((key, label)) = action.help_label() {
            spans.push(Span::styled(
                String::from(key),
                Style::default().fg(style.accent_color()),
            ));
            spans.push(Span::styled(
                format!(":{label} "),
                Style::default().fg(style.text_color()),
            ));
        }
    }

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(style.background_color()));
    frame.render_widget(help, area);
}

/// Cuts `text` to fit in `width` terminal columns, marking the cut with an
/// ellipsis, and pads it with spaces to exactly `width`.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();

    if total <= width {
        out.push_str(text);
        used = total;
    } else if width > 0 {
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w + 1 > width {
                break;
            }
            out.push(c);
            used += w;
        }
        out.push('\u{2026}');
        used += 1;
    }

    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_padded() {
        assert_eq!(truncate_to_width("abc", 5), "abc  ");
    }

    #[test]
    fn long_text_is_cut_with_an_ellipsis() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc\u{2026}");
        assert_eq!(truncate_to_width("abcdef", 0), "");
    }

    #[test]
    fn wide_characters_count_double() {
        // Each of these takes two columns.
        assert_eq!(truncate_to_width("\u{65E5}\u{672C}\u{8A9E}", 4), "\u{65E5}\u{2026} ");
    }
}
