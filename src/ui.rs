use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::coordinator::{QuestionView, QuizEvent};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Modal message with a single action, confirmed with `r`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub button_text: String,
}

impl Dialog {
    pub fn round_over(summary: String) -> Self {
        Self {
            title: "This round is over!".to_string(),
            message: summary,
            button_text: "Play again".to_string(),
        }
    }

    pub fn load_error(message: String) -> Self {
        Self {
            title: "Loading error".to_string(),
            message,
            button_text: "Try again".to_string(),
        }
    }
}

/// Everything the screen shows, rebuilt from coordinator events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub loading: bool,
    pub question: Option<QuestionView>,
    /// Result of the last answer, cleared when the next question shows
    pub feedback: Option<bool>,
    pub dialog: Option<Dialog>,
}

impl ViewState {
    pub fn apply(&mut self, event: QuizEvent) {
        match event {
            QuizEvent::LoadingStarted => {
                self.loading = true;
                self.dialog = None;
            }
            QuizEvent::LoadingFinished => self.loading = false,
            QuizEvent::QuestionReady(view) => {
                self.question = Some(view);
                self.feedback = None;
            }
            QuizEvent::AnswerJudged { is_correct } => self.feedback = Some(is_correct),
            QuizEvent::RoundComplete { summary, .. } => {
                self.dialog = Some(Dialog::round_over(summary));
            }
            QuizEvent::LoadFailed { message } => {
                self.loading = false;
                self.dialog = Some(Dialog::load_error(message));
            }
        }
    }

    /// Answers are only accepted while a question is up and unanswered
    pub fn accepts_answer(&self) -> bool {
        self.question.is_some() && self.feedback.is_none() && self.dialog.is_none() && !self.loading
    }
}

impl Widget for &ViewState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // question number
                Constraint::Min(5),    // poster
                Constraint::Length(3), // question text
                Constraint::Length(1), // legend
            ])
            .split(area);

        if self.loading && self.question.is_none() {
            Paragraph::new(Span::styled("Loading questions...", italic_style))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
        }

        if let Some(question) = &self.question {
            Paragraph::new(Line::from(vec![
                Span::styled("Question: ", dim_style),
                Span::styled(question.number.clone(), bold_style),
            ]))
            .alignment(Alignment::Right)
            .render(chunks[0], buf);

            let border_style = match self.feedback {
                Some(true) => Style::default().fg(Color::Green),
                Some(false) => Style::default().fg(Color::Red),
                None => dim_style,
            };
            let border_type = if self.feedback.is_some() {
                BorderType::Thick
            } else {
                BorderType::Rounded
            };

            Paragraph::new(Span::styled(question.image_ref.clone(), bold_style))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(border_type)
                        .border_style(border_style),
                )
                .render(chunks[1], buf);

            Paragraph::new(Span::styled(question.text.clone(), bold_style))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(chunks[2], buf);
        }

        Paragraph::new(Span::styled("(n)o / (y)es / (r)estart / (esc)ape", italic_style))
            .render(chunks[3], buf);

        if let Some(dialog) = &self.dialog {
            render_dialog(dialog, area, buf);
        }
    }
}

fn render_dialog(dialog: &Dialog, area: Rect, buf: &mut Buffer) {
    let width = area.width.saturating_sub(4).min(50);
    let height = (dialog.message.lines().count() as u16 + 4).min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };

    let mut lines: Vec<Line> = dialog.message.lines().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("(r) {}", dialog.button_text),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(dialog.title.clone()),
        )
        .render(popup, buf);
}
