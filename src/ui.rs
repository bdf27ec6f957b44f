use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Preview, Screen};
use crate::form::Control;
use crate::session::Signal;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

pub const PREVIEW_TITLE: &str = "Forhåndsvisning";
pub const REMAINING_LABEL: &str = "Gjenstår";

/// Norwegian label for a form control
fn label(control: &str) -> &str {
    match control {
        "comma" => "Komma",
        "growth" => "Vekstfaktor",
        "reverse" => "Omvendt",
        "from" => "Fra %",
        "to" => "Til %",
        "timeout" => "Tid (s)",
        "names" => "Navn",
        other => other,
    }
}

fn card_style(signal: Signal) -> Style {
    match signal {
        Signal::Neutral => Style::default(),
        Signal::Success => Style::default().bg(Color::Green).fg(Color::Black),
        Signal::Failure => Style::default().bg(Color::LightRed).fg(Color::Black),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen() {
            Screen::Setup => render_setup(self, area, buf),
            Screen::Game => render_game(self, area, buf),
        }
    }
}

fn render_setup(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let focus_style = Style::default().patch(bold_style).fg(Color::Magenta);

    let form_lines = app.form().len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(form_lines + 1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled("Faktorquiz", bold_style)).render(chunks[0], buf);

    let label_width = app
        .form()
        .controls()
        .map(|(name, _)| label(name).width())
        .max()
        .unwrap_or(0);

    let rows = app
        .form()
        .controls()
        .enumerate()
        .map(|(idx, (name, control))| {
            let focused = idx == app.focus();
            let text = label(name);
            let padding = " ".repeat(label_width.saturating_sub(text.width()) + 1);
            let value = match control {
                Control::Checkbox(true) => "[x]".to_string(),
                Control::Checkbox(false) => "[ ]".to_string(),
                Control::Number(v) | Control::Text(v) if focused => format!("{v}_"),
                Control::Number(v) | Control::Text(v) => v.clone(),
            };
            let style = if focused { focus_style } else { Style::default() };
            Line::from(vec![
                Span::styled(if focused { "› " } else { "  " }, style),
                Span::styled(format!("{text}{padding}"), style),
                Span::raw(value),
            ])
        })
        .collect::<Vec<_>>();
    Paragraph::new(rows).render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "tab/↑↓ flytt · mellomrom kryss av · enter start · esc avslutt",
        dim_style,
    ))
    .render(chunks[2], buf);

    if let Some(notice) = app.notice() {
        Paragraph::new(Span::styled(
            notice,
            Style::default().patch(bold_style).fg(Color::Red),
        ))
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);
    }

    let preview = match app.preview() {
        Preview::Empty => Text::from(Span::styled("Ingen navn ennå", dim_style)),
        Preview::Invalid(reason) => Text::from(Span::styled(
            reason.as_str(),
            Style::default().fg(Color::Red),
        )),
        Preview::Question(question) => {
            let shown = question.display(true);
            Text::from(vec![
                Line::from(Span::styled(shown.title, bold_style)),
                Line::from(shown.who),
                Line::from(shown.equation),
            ])
        }
    };
    Paragraph::new(preview)
        .block(Block::bordered().title(PREVIEW_TITLE))
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);
}

fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(7),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let Some(session) = app.session() else {
        return;
    };

    if let Some(question) = session.question() {
        let shown = question.display(session.answer_visible());
        let card = Paragraph::new(vec![
            Line::from(Span::styled(shown.title, bold_style)),
            Line::default(),
            Line::from(Span::styled(
                shown.who,
                Style::default().patch(bold_style).fg(Color::Magenta),
            )),
            Line::default(),
            Line::from(Span::styled(shown.equation, bold_style)),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::bordered())
        .style(card_style(session.signal()));
        card.render(chunks[0], buf);

        if !question.names_remaining.is_empty() {
            let names = question
                .names_remaining
                .iter()
                .map(|p| p.name.as_str())
                .join(", ");
            Paragraph::new(format!("{REMAINING_LABEL}: {names}"))
                .wrap(Wrap { trim: true })
                .render(chunks[2], buf);
        }
    }

    if let Some(left) = app.time_remaining() {
        Paragraph::new(Span::styled(
            format!("{:.1} s", left.as_secs_f64()),
            Style::default().fg(Color::Yellow),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }

    Paragraph::new(Span::styled(
        "r riktig · f feil · v vis svar · n nytt spill · esc avslutt",
        dim_style,
    ))
    .render(chunks[3], buf);

    if let Some(fragment) = app.fragment() {
        Paragraph::new(Span::styled(fragment, dim_style)).render(chunks[4], buf);
    }
}
