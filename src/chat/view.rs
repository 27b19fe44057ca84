//! Terminal layout of the chat view.

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::types::Role;

use super::markdown::render_markdown;
use super::panel::{case_panels, CasePanel};
use super::ChatState;

pub const TITLE: &str = "Medical Information Assistant (Demo)";
pub const INPUT_PLACEHOLDER: &str = "Describe your symptoms (for demonstration only)...";
pub const DISCLAIMER: &str = "This is a demonstration tool only and should not be used for actual \
medical diagnosis. The information provided is for educational purposes only. Always consult with \
qualified healthcare professionals for medical advice, diagnosis, or treatment.";

const ACCENT: Color = Color::Magenta;
const PANEL_HEIGHT: u16 = 12;

/// Draw the whole chat view.
pub fn draw(frame: &mut Frame, state: &ChatState) {
    let panels = case_panels(state.sources());
    let areas = Layout::vertical([
        Constraint::Length(5),
        Constraint::Min(6),
        Constraint::Length(if panels.is_empty() { 0 } else { PANEL_HEIGHT }),
        Constraint::Length(if state.error().is_some() { 3 } else { 0 }),
        Constraint::Length(3),
    ])
    .split(frame.area());

    draw_disclaimer(frame, areas[0]);
    draw_transcript(frame, areas[1], state);
    if !panels.is_empty() {
        draw_case_panels(frame, areas[2], &panels);
    }
    if let Some(banner) = state.error() {
        let error = Paragraph::new(Line::from(vec![
            Span::styled("Error: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(banner.message.clone()),
            Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
        ]))
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));
        frame.render_widget(error, areas[3]);
    }
    draw_input(frame, areas[4], state);
}

fn draw_disclaimer(frame: &mut Frame, area: Rect) {
    let disclaimer = Paragraph::new(DISCLAIMER)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    " Medical Disclaimer ",
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(disclaimer, area);
}

fn draw_transcript(frame: &mut Frame, area: Rect, state: &ChatState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(Span::styled(
            format!(" {TITLE} "),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    let transcript = Paragraph::new(transcript_lines(state)).wrap(Wrap { trim: false });
    let total = rendered_rows(&transcript, inner.width);
    let offset = transcript_scroll(total, inner.height, state.scroll_back());

    frame.render_widget(transcript.block(block).scroll((offset, 0)), area);
}

/// Lines of the transcript: messages in order, then the loading indicator.
pub fn transcript_lines(state: &ChatState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in state.messages() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        match message.role {
            Role::User => {
                let style = Style::default().fg(Color::White).bg(ACCENT);
                for text in message.content.lines() {
                    lines.push(
                        Line::from(Span::styled(format!(" {text} "), style))
                            .alignment(Alignment::Right),
                    );
                }
            }
            Role::Assistant => {
                lines.extend(
                    render_markdown(&message.content, Style::default())
                        .into_iter()
                        .map(|line| line.alignment(Alignment::Left)),
                );
            }
        }
    }

    if state.is_loading() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(loading_line(state.tick()));
    }
    lines
}

fn loading_line(tick: usize) -> Line<'static> {
    let lit = tick % 3;
    let dots: Vec<Span<'static>> = (0..3)
        .map(|i| {
            let style = if i == lit {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled("● ", style)
        })
        .collect();
    Line::from(dots).alignment(Alignment::Left)
}

/// Rows `lines` occupy once word-wrapped to `width`, as the transcript draws them.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let paragraph = Paragraph::new(lines.to_vec()).wrap(Wrap { trim: false });
    rendered_rows(&paragraph, width)
}

fn rendered_rows(paragraph: &Paragraph<'_>, width: u16) -> u16 {
    u16::try_from(paragraph.line_count(width.max(1))).unwrap_or(u16::MAX)
}

/// Scroll offset that shows the newest rows, moved back by `scroll_back`.
pub fn transcript_scroll(total: u16, viewport: u16, scroll_back: u16) -> u16 {
    total.saturating_sub(viewport).saturating_sub(scroll_back)
}

fn draw_case_panels(frame: &mut Frame, area: Rect, panels: &[CasePanel]) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(Span::styled(
            " Similar Cases: ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let count = u32::try_from(panels.len()).unwrap_or(1).max(1);
    let columns = Layout::horizontal(
        panels
            .iter()
            .map(|_| Constraint::Ratio(1, count))
            .collect::<Vec<_>>(),
    )
    .split(inner);

    for (panel, column) in panels.iter().zip(columns.iter()) {
        frame.render_widget(case_panel_widget(panel), *column);
    }
}

fn case_panel_widget(panel: &CasePanel) -> Paragraph<'static> {
    let label_style = Style::default().fg(ACCENT);
    let rows: Vec<Line<'static>> = panel
        .rows
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label}: "), label_style),
                Span::raw(value.clone()),
            ])
        })
        .collect();
    Paragraph::new(rows).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                panel.title(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
    )
}

fn draw_input(frame: &mut Frame, area: Rect, state: &ChatState) {
    let content = if state.input().is_empty() {
        Line::from(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(state.input().to_string())
    };
    let hint = if state.is_loading() { " Send (answering...) " } else { " Send: Enter " };
    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title_bottom(Line::from(hint).alignment(Alignment::Right)),
    );
    frame.render_widget(input, area);

    let typed = u16::try_from(Line::from(state.input()).width()).unwrap_or(u16::MAX);
    let max_x = area.x + area.width.saturating_sub(2);
    frame.set_cursor_position(((area.x + 1).saturating_add(typed).min(max_x), area.y + 1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionObserver;
    use crate::types::{Message, SourceRecord};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;

    fn render(state: &ChatState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(usize::from(width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn user_lines_right_assistant_lines_left() {
        let mut state = ChatState::new();
        state.on_message_change(vec![
            Message::user("I have a cough"),
            Message::assistant("You may have **a cold**."),
        ]);
        let lines = transcript_lines(&state);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].alignment, Some(Alignment::Right));
        assert_eq!(plain(&lines[0]).trim(), "I have a cough");
        assert_eq!(lines[2].alignment, Some(Alignment::Left));
        assert_eq!(plain(&lines[2]), "You may have a cold.");
    }

    #[test]
    fn loading_indicator_follows_loading_flag() {
        let mut state = ChatState::new();
        assert!(transcript_lines(&state).is_empty());
        state.on_message_loading(true);
        let lines = transcript_lines(&state);
        assert_eq!(lines.len(), 1);
        assert!(plain(&lines[0]).contains('●'));
        state.on_message_loading(false);
        assert!(transcript_lines(&state).is_empty());
    }

    #[test]
    fn scroll_pins_to_newest_rows() {
        assert_eq!(transcript_scroll(50, 20, 0), 30);
        assert_eq!(transcript_scroll(50, 20, 10), 20);
        assert_eq!(transcript_scroll(50, 20, 99), 0);
        assert_eq!(transcript_scroll(5, 20, 0), 0);
    }

    #[test]
    fn wrapped_height_counts_wrapped_and_blank_rows() {
        let lines = vec![Line::from("a".repeat(25)), Line::default(), Line::from("short")];
        assert_eq!(wrapped_height(&lines, 10), 5);
    }

    #[test]
    fn wrapped_height_breaks_on_word_boundaries() {
        let word = "w".repeat(6);
        let lines = vec![Line::from(format!("{word} {word} {word}"))];
        // 20 columns of text, but no two 6-char words plus a space fit in 10.
        assert_eq!(wrapped_height(&lines, 10), 3);
    }

    #[test]
    fn long_word_wrapped_reply_keeps_newest_line_in_view() {
        let word = "x".repeat(49);
        let paragraph = vec![word.as_str(); 20].join(" ");
        let mut reply = vec![paragraph; 8].join("\n\n");
        reply.push_str("\n\nNEWESTLINEMARKER");

        let mut state = ChatState::new();
        state.on_message_change(vec![
            Message::user("tell me everything"),
            Message::assistant(reply),
        ]);

        let screen = render(&state, 100, 40);
        assert!(screen.contains("NEWESTLINEMARKER"));
    }

    #[test]
    fn draws_at_most_three_case_panels_with_placeholders() {
        let mut state = ChatState::new();
        let mut sources: Vec<SourceRecord> = (1..=4)
            .map(|i| SourceRecord::new(i.to_string(), 0.9, json!({"Disease": format!("D{i}"), "Age": 40})))
            .collect();
        sources[0].document = json!({"Disease": "Flu"});
        state.on_source_change(sources);

        let screen = render(&state, 120, 40);
        assert!(screen.contains("Similar Cases:"));
        assert!(screen.contains("Case 1: Flu"));
        assert!(screen.contains("Case 3: D3"));
        assert!(!screen.contains("Case 4"));
        assert!(screen.contains("Age: n/a"));
        assert!(screen.contains("Cholesterol: n/a"));
    }

    #[test]
    fn draws_placeholder_and_error_banner() {
        let mut state = ChatState::new();
        let screen = render(&state, 120, 30);
        assert!(screen.contains(INPUT_PLACEHOLDER));
        assert!(!screen.contains("Error:"));

        state.ask_failed(&crate::error::MedchatError::Stream("reset".into()));
        let screen = render(&state, 120, 30);
        assert!(screen.contains("Error:"));
        assert!(screen.contains("Esc to dismiss"));
    }
}
