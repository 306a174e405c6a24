pub mod charting;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState, MenuItem},
    ledger::{LetterTypo, TypoLedger, WordTypo},
    metrics::Timespan,
    session::{Session, SessionEnd},
    thok::Glyph,
    ui::charting::{bar_width, finger_bars, format_speed, letter_bars, palette_color, top_words, MUTED},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const TOP_WORDS: usize = 5;

fn title() -> Line<'static> {
    Line::from(vec![
        Span::styled("TYP", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            "0",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Draw the current screen. `session` is the running session while typing.
pub fn draw(f: &mut Frame, app: &App, session: Option<&Session>) {
    match (app.state, session) {
        (AppState::Typing, Some(session)) => draw_session(f, session),
        (AppState::Typing, None) | (AppState::Menu, _) => draw_menu(f, app),
        (AppState::Settings, _) => draw_settings(f, app),
        (AppState::Results, _) => draw_results(f, app),
        (AppState::History, _) => draw_history(f, app),
    }
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

fn draw_choices(f: &mut Frame, labels: Vec<String>, selected: usize, notice: Option<&str>) {
    let widest = labels
        .iter()
        .map(|l| l.width())
        .chain(notice.map(|n| n.width()))
        .max()
        .unwrap_or(0) as u16;
    let area = centered(f.area(), (widest + 6).max(24), labels.len() as u16 + 2);
    let items: Vec<ListItem> = labels.into_iter().map(ListItem::new).collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title()))
        .highlight_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);

    if let Some(notice) = notice {
        let below = Rect {
            y: (area.y + area.height).min(f.area().height.saturating_sub(1)),
            height: 1,
            ..f.area()
        };
        f.render_widget(
            Paragraph::new(Span::styled(notice.to_string(), Style::default().fg(Color::Yellow)))
                .alignment(Alignment::Center),
            below,
        );
    }
}

fn draw_menu(f: &mut Frame, app: &App) {
    let labels = MenuItem::ALL.iter().map(|item| item.to_string()).collect();
    draw_choices(f, labels, app.menu_index, app.notice.as_deref());
}

fn draw_settings(f: &mut Frame, app: &App) {
    let labels = Timespan::CHOICES
        .iter()
        .map(|secs| format!("{secs}s"))
        .collect();
    draw_choices(f, labels, app.settings_index, None);
}

/// Styled spans for the prompt: typed text white, mistakes red, the rest grey.
pub fn prompt_spans(glyphs: &[Glyph]) -> Vec<Span<'static>> {
    let typed = Style::default().fg(Color::White);
    let wrong = Style::default().fg(Color::Red);
    let untyped = Style::default().fg(Color::DarkGray);

    glyphs
        .iter()
        .map(|glyph| match *glyph {
            Glyph::Typed(c) => Span::styled(c.to_string(), typed),
            Glyph::Wrong(c) => Span::styled(
                match c {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                wrong,
            ),
            Glyph::Cursor { expected, errored } => Span::styled(
                expected.to_string(),
                (if errored { wrong } else { typed }).add_modifier(Modifier::UNDERLINED),
            ),
            Glyph::Untyped(c) => Span::styled(c.to_string(), untyped),
        })
        .collect()
}

pub fn draw_session(f: &mut Frame, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(f.area());

    let thok = session.thok();
    let text = if thok.is_empty() {
        Line::from(Span::styled(
            "no words available, wait for the timer or press Esc",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from(prompt_spans(&thok.glyphs()))
    };

    let panel = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title()))
        .wrap(Wrap { trim: false });
    f.render_widget(panel, chunks[0]);

    let timer = Paragraph::new(Span::styled(
        session.remaining().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(timer, centered(chunks[1], 10, 3));
}

fn bar_chart<'a>(title: &'a str, data: &[(String, u64)], width: u16) -> BarChart<'a> {
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(idx, (label, value))| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.clone()))
                .style(Style::default().fg(palette_color(idx)))
        })
        .collect();

    BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, Style::default().fg(MUTED))),
        )
        .bar_width(bar_width(data.len(), width.saturating_sub(2)))
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars))
}

fn words_table<'a>(words: &TypoLedger<WordTypo>) -> Table<'a> {
    let rows: Vec<Row> = top_words(words, TOP_WORDS)
        .into_iter()
        .enumerate()
        .map(|(idx, (word, count))| {
            Row::new(vec![
                Cell::from(word).style(Style::default().fg(palette_color(idx))),
                Cell::from(count.to_string()),
            ])
        })
        .collect();

    Table::new(rows, [Constraint::Percentage(70), Constraint::Percentage(30)])
        .header(
            Row::new(vec!["Word", "Failures"])
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled("Most failed words", Style::default().fg(MUTED))),
        )
}

/// Shared layout of results and history: charts on top, words, summary, hint.
fn draw_report(f: &mut Frame, letters: &TypoLedger<LetterTypo>, words: &TypoLedger<WordTypo>, summary: Vec<Line>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(TOP_WORDS as u16 + 3),
            Constraint::Length(summary.len() as u16 + 2),
            Constraint::Length(1),
        ])
        .split(f.area());

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    let letter_data = letter_bars(letters);
    let finger_data = finger_bars(letters);
    f.render_widget(bar_chart("Wrong letters", &letter_data, charts[0].width), charts[0]);
    f.render_widget(bar_chart("Finger failures", &finger_data, charts[1].width), charts[1]);

    f.render_widget(words_table(words), chunks[1]);
    f.render_widget(
        Paragraph::new(summary).block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );
    f.render_widget(
        Paragraph::new(Span::styled("Press Tab to go back", Style::default().fg(MUTED)))
            .alignment(Alignment::Center),
        chunks[3],
    );
}

fn draw_results(f: &mut Frame, app: &App) {
    let Some(result) = &app.last_result else {
        draw_menu(f, app);
        return;
    };

    let mut summary = vec![Line::from(format!(
        "cpm: {}   wpm: {}   correct: {}   wrong: {}",
        format_speed(result.cpm),
        format_speed(result.wpm),
        result.correct_count,
        result.wrong_count
    ))];
    if result.end == SessionEnd::Cancelled {
        summary.push(Line::from(Span::styled(
            "session cancelled, results were not saved",
            Style::default().fg(Color::Yellow),
        )));
    }

    draw_report(f, &result.letters, &result.words, summary);
}

fn draw_history(f: &mut Frame, app: &App) {
    let Some(history) = &app.history else {
        draw_menu(f, app);
        return;
    };

    let speed = match history.averages() {
        Some(avg) => format!(
            "average cpm: {}   average wpm: {}",
            format_speed(avg.cpm),
            format_speed(avg.wpm)
        ),
        None => "no history yet".to_string(),
    };
    let played = match &history.last_played {
        Some(last) => format!("sessions: {}   last played: {}", history.sessions_played, last),
        None => format!("sessions: {}", history.sessions_played),
    };

    draw_report(
        f,
        &history.letters,
        &history.words,
        vec![Line::from(speed), Line::from(played)],
    );
}
