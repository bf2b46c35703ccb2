use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{app::App, keys::Action};

use super::layout;

/// The redirect URL being typed or pasted.
#[derive(Debug, Default)]
pub struct LandingState {
    pub input: String,
}

pub enum LandingAction {
    Quit,
    ToggleLogs,
}

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let style = &app.config.style;
    let landing = layout::split_landing(area);

    let intro = vec![
        Line::from(Span::styled(
            "Song Battle",
            Style::default()
                .fg(style.accent_color())
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::styled(
            "Pit the songs of one of your playlists against each other, two at a time, \
             until a single favourite is left standing.",
            Style::default().fg(style.text_color()),
        ),
        Line::raw(""),
        Line::styled(
            "Open this address in a browser and log in:",
            Style::default().fg(style.dim_color()),
        ),
        Line::styled(app.logic.login_url(), Style::default().fg(style.accent_color())),
        Line::raw(""),
        Line::styled(
            "Then paste the address you were sent back to below and press Enter.",
            Style::default().fg(style.dim_color()),
        ),
    ];
    let intro = Paragraph::new(intro).wrap(Wrap { trim: false });
    frame.render_widget(intro, landing.intro);

    let block = Block::default()
        .title(" Redirect URL ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(style.border_color()));
    let inner = block.inner(landing.input);
    frame.render_widget(block, landing.input);

    // Show the tail of long input so the cursor stays visible.
    let visible = (inner.width as usize).saturating_sub(3);
    let skip = app.landing.input.chars().count().saturating_sub(visible);
    let shown: String = app.landing.input.chars().skip(skip).collect();

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(style.accent_color())),
        Span::styled(shown, Style::default().fg(style.text_color())),
        Span::styled("\u{2588}", Style::default().fg(style.accent_color())),
    ]));
    frame.render_widget(input, inner);
}

pub fn handle_key(app: &mut App, action: Action) -> Option<LandingAction> {
    match action {
        Action::Exit => return Some(LandingAction::Quit),
        Action::LandingLogs => return Some(LandingAction::ToggleLogs),
        Action::Select => {
            let input = std::mem::take(&mut app.landing.input);
            if !input.trim().is_empty() {
                app.logic.submit_redirect(input.trim());
            }
        }
        Action::Char(c) => app.landing.input.push(c),
        Action::DeleteChar => {
            app.landing.input.pop();
        }
        Action::ClearLine => app.landing.input.clear(),
        _ => {}
    }
    None
}

/// Pasted text goes straight into the input, without line breaks.
pub fn handle_paste(app: &mut App, text: &str) {
    app.landing
        .input
        .extend(text.chars().filter(|c| !c.is_control()));
}
