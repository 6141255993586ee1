use crate::feeling_entry::{FeelingEntry, Mood};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub const DEFAULT_CHAR_LIMIT: usize = 1000;

/// Presentation state owned by the controller. Entries are passed to
/// [`render`] separately, straight from the store.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub input: String,
    /// Cursor position in chars, not bytes.
    pub cursor: usize,
    pub mood: Mood,
    pub selected: Option<usize>,
    pub dark_mode: bool,
    pub alert: Option<String>,
    pub char_limit: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            input: String::new(),
            cursor: 0,
            mood: Mood::Happy,
            selected: None,
            dark_mode: false,
            alert: None,
            char_limit: DEFAULT_CHAR_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub like: Color,
}

impl Theme {
    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Theme {
                bg: Color::Black,
                fg: Color::Gray,
                accent: Color::Cyan,
                muted: Color::DarkGray,
                like: Color::LightRed,
            }
        } else {
            Theme {
                bg: Color::White,
                fg: Color::Black,
                accent: Color::Blue,
                muted: Color::DarkGray,
                like: Color::Red,
            }
        }
    }
}

pub fn counter_text(input: &str, limit: usize) -> String {
    format!("{} / {} characters", input.chars().count(), limit)
}

pub fn like_label(likes: u64) -> String {
    format!("[♥ {likes}]")
}

/// One list item per entry, in stored order.
pub fn entry_items(entries: &[FeelingEntry], theme: Theme) -> Vec<ListItem<'static>> {
    entries
        .iter()
        .map(|entry| {
            let mut lines = vec![Line::from(vec![
                Span::styled(
                    format!("{} {}", entry.mood.emoji(), entry.mood.name()),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(entry.time.clone(), Style::default().fg(theme.muted)),
            ])];
            lines.extend(entry.text.lines().map(|l| Line::from(Span::raw(l.to_string()))));
            lines.push(Line::from(Span::styled(
                like_label(entry.likes),
                Style::default().fg(theme.like),
            )));
            lines.push(Line::default());
            ListItem::new(lines)
        })
        .collect()
}

/// Horizontal scroll that keeps the cursor inside a box `width` cells wide.
fn input_scroll(input: &str, cursor: usize, width: u16) -> u16 {
    let before: String = input.chars().take(cursor).collect();
    let used = u16::try_from(before.width()).unwrap_or(u16::MAX);
    let room = width.saturating_sub(1);
    used.saturating_sub(room)
}

fn input_with_cursor(input: &str, cursor: usize) -> String {
    let byte = input
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    let mut shown = input.to_string();
    shown.insert(byte, '|');
    shown
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Redraws the whole screen from `entries` and `view`.
pub fn render(f: &mut Frame, entries: &[FeelingEntry], view: &ViewState) {
    let theme = Theme::for_mode(view.dark_mode);
    let surface = Style::default().bg(theme.bg).fg(theme.fg);
    f.render_widget(Block::default().style(surface), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.area());

    let title = Paragraph::new(if view.dark_mode {
        "Feelings Journal ☾"
    } else {
        "Feelings Journal ☀"
    })
    .style(
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let inner_width = chunks[1].width.saturating_sub(2);
    let input = Paragraph::new(input_with_cursor(&view.input, view.cursor))
        .scroll((0, input_scroll(&view.input, view.cursor, inner_width)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("How are you feeling?"),
        );
    f.render_widget(input, chunks[1]);

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(chunks[2]);

    let moods: Vec<Span> = Mood::ALL
        .iter()
        .flat_map(|mood| {
            let style = if *mood == view.mood {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(theme.muted)
            };
            [Span::styled(format!(" {} ", mood.name()), style), Span::raw(" ")]
        })
        .collect();
    let mood_selector =
        Paragraph::new(Line::from(moods)).block(Block::default().borders(Borders::ALL).title("Mood"));
    f.render_widget(mood_selector, row[0]);

    let used = view.input.chars().count();
    let counter_style = if used > view.char_limit {
        Style::default().fg(theme.like).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let counter = Paragraph::new(counter_text(&view.input, view.char_limit))
        .style(counter_style)
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(counter, row[1]);

    let entries_block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Entries ({})", entries.len()));
    if entries.is_empty() {
        let empty = Paragraph::new("No entries yet. Write how you feel and press Enter.")
            .style(Style::default().fg(theme.muted))
            .block(entries_block);
        f.render_widget(empty, chunks[3]);
    } else {
        let list = List::new(entry_items(entries, theme))
            .block(entries_block)
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let selected = view.selected.filter(|i| *i < entries.len());
        f.render_stateful_widget(
            list,
            chunks[3],
            &mut ListState::default().with_selected(selected),
        );
    }

    let controls = Line::from(vec![
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" submit, "),
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" mood, "),
        Span::styled("Up/Down", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" select, "),
        Span::styled("Ctrl+L", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" like, "),
        Span::styled("Ctrl+D", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" dark mode, "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ]);
    let controls_paragraph = Paragraph::new(controls)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(controls_paragraph, chunks[4]);

    if let Some(message) = &view.alert {
        let popup = centered(f.area(), 50, 5);
        f.render_widget(Clear, popup);
        let alert = Paragraph::new(vec![
            Line::from(Span::raw(message.clone())),
            Line::from(Span::styled(
                "Press any key",
                Style::default().fg(theme.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(surface)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Alert")
                .border_style(Style::default().fg(theme.like)),
        );
        f.render_widget(alert, popup);
    }
}
