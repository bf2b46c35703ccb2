use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{keys::Action, log_buffer::LogBuffer, style};

use super::layout;

pub struct LogsState {
    pub log_buffer: LogBuffer,
    pub scroll_offset: usize,
}

impl LogsState {
    pub fn new(log_buffer: LogBuffer) -> Self {
        Self {
            log_buffer,
            scroll_offset: 0,
        }
    }

    pub fn scroll_to_end(&mut self) {
        self.scroll_offset = self.log_buffer.len().saturating_sub(1);
    }

    /// Move by `delta` lines, staying within the buffer.
    pub fn scroll_by(&mut self, delta: i32) {
        let max = self.log_buffer.len().saturating_sub(1);
        let steps = delta.unsigned_abs() as usize;
        self.scroll_offset = if delta < 0 {
            self.scroll_offset.saturating_sub(steps)
        } else {
            (self.scroll_offset + steps).min(max)
        };
    }
}

pub enum LogsAction {
    Close,
}

pub fn draw(frame: &mut Frame, logs: &mut LogsState, style: &style::Style, area: Rect) {
    let entries = logs.log_buffer.get_entries();

    let block = Block::default()
        .title(format!(" Logs ({}) ", entries.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(style.border_color()));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if entries.is_empty() {
        let empty = Paragraph::new("No log entries").style(Style::default().fg(style.dim_color()));
        frame.render_widget(empty, inner);
        return;
    }

    let text_color = style.text_color();
    let dim_color = style.dim_color();

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            // Keep semantic colors for log levels.
            let (level_str, level_color) = match entry.level {
                tracing::Level::ERROR => ("ERR", Color::Red),
                tracing::Level::WARN => ("WRN", Color::Yellow),
                tracing::Level::INFO => ("INF", Color::Cyan),
                tracing::Level::DEBUG => ("DBG", Color::Green),
                tracing::Level::TRACE => ("TRC", dim_color),
            };

            let target = if entry.target.len() > layout::LOG_TARGET_WIDTH {
                let cut = entry.target.len() - layout::LOG_TARGET_SUFFIX_LEN;
                format!("...{}", entry.target.get(cut..).unwrap_or_default())
            } else {
                entry.target.clone()
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    entry.time.format("%H:%M:%S ").to_string(),
                    Style::default().fg(dim_color),
                ),
                Span::styled(
                    level_str,
                    Style::default()
                        .fg(level_color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{target:width$}", width = layout::LOG_TARGET_WIDTH),
                    Style::default().fg(dim_color),
                ),
                Span::raw(" "),
                Span::styled(entry.message.clone(), Style::default().fg(text_color)),
            ]))
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(style.selected_color())
            .add_modifier(Modifier::BOLD),
    );

    let offset = logs.scroll_offset.min(entries.len() - 1);
    logs.scroll_offset = offset;

    let mut state = ListState::default();
    state.select(Some(offset));
    frame.render_stateful_widget(list, inner, &mut state);
}

pub fn handle_key(logs: &mut LogsState, action: Action) -> Option<LogsAction> {
    let page = layout::PAGE_SCROLL_SIZE as i32;
    match action {
        Action::Back => return Some(LogsAction::Close),
        Action::MoveUp => logs.scroll_by(-1),
        Action::MoveDown => logs.scroll_by(1),
        Action::PageUp => logs.scroll_by(-page),
        Action::PageDown => logs.scroll_by(page),
        Action::GotoTop => logs.scroll_offset = 0,
        Action::GotoBottom => logs.scroll_to_end(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;
    use crate::log_buffer::LogBufferLayer;

    fn filled(count: usize) -> LogsState {
        let buffer = LogBuffer::new(100);
        let subscriber = tracing_subscriber::registry().with(LogBufferLayer::new(buffer.clone()));
        tracing::subscriber::with_default(subscriber, || {
            for i in 0..count {
                tracing::info!("entry {i}");
            }
        });
        LogsState::new(buffer)
    }

    #[test]
    fn scrolling_stays_in_bounds() {
        let mut logs = filled(5);
        logs.scroll_by(-3);
        assert_eq!(logs.scroll_offset, 0);
        logs.scroll_by(10);
        assert_eq!(logs.scroll_offset, 4);

        assert!(handle_key(&mut logs, Action::GotoTop).is_none());
        assert_eq!(logs.scroll_offset, 0);
        assert!(matches!(
            handle_key(&mut logs, Action::Back),
            Some(LogsAction::Close)
        ));
    }
}
