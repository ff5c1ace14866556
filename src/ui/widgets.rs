//! Custom widgets for the vocab TUI.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Paragraph, Widget, Wrap},
};

use super::theme::Theme;
use crate::models::{LibraryStats, Word};
use crate::review::QuizOption;

// ══════════════════════════════════════════════════════════════════════════
// Logo Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct Logo<'a> {
    theme: &'a Theme,
}

impl<'a> Logo<'a> {
    const ART: &'static str = r#"
 _    __                 __       ______           __
| |  / /___  _________ _/ /_     / ____/_  _______/ /__
| | / / __ \/ ___/ __ `/ __ \   / /   / / / / ___/ / _ \
| |/ / /_/ / /__/ /_/ / /_/ /  / /__/ /_/ / /__/ /  __/
|___/\____/\___/\__,_/_.___/   \____/\__, /\___/_/\___/
                                    /____/"#;

    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    pub fn render_to(theme: &Theme, area: Rect, buf: &mut Buffer) {
        let mut lines: Vec<Line> = Self::ART
            .lines()
            .skip(1)
            .map(|line| {
                Line::from(vec![Span::styled(
                    line,
                    Style::default().fg(theme.colors.primary),
                )])
            })
            .collect();
        lines.push(Line::from(Span::styled(
            "offline vocabulary review",
            Style::default().fg(theme.colors.text_dim),
        )));

        let para = Paragraph::new(lines).alignment(Alignment::Center);

        para.render(area, buf);
    }
}

impl Widget for Logo<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_to(self.theme, area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Library Bar Widget
// ══════════════════════════════════════════════════════════════════════════

/// One-line mastery breakdown of the whole library.
pub struct LibraryBar<'a> {
    stats: LibraryStats,
    theme: &'a Theme,
}

impl<'a> LibraryBar<'a> {
    pub fn new(stats: LibraryStats, theme: &'a Theme) -> Self {
        Self { stats, theme }
    }
}

impl Widget for LibraryBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::horizontal([
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ])
        .split(area);

        let cells: [(&str, String, Style); 5] = [
            (
                "New: ",
                self.stats.unseen.to_string(),
                self.theme.stats_unseen(),
            ),
            (
                "Learning: ",
                self.stats.learning.to_string(),
                self.theme.stats_learning(),
            ),
            (
                "Solid: ",
                self.stats.solid.to_string(),
                self.theme.highlight(),
            ),
            (
                "Mastered: ",
                self.stats.mastered.to_string(),
                self.theme.stats_mastered(),
            ),
            (
                "Total: ",
                self.stats.total_words.to_string(),
                Style::default().fg(self.theme.colors.text_dim),
            ),
        ];

        for (i, (label, value, style)) in cells.iter().enumerate() {
            let line = Line::from(vec![
                Span::styled("● ", *style),
                Span::styled(*label, Style::default().fg(self.theme.colors.text_muted)),
                Span::styled(value.clone(), *style),
            ]);
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(chunks[i], buf);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Word Panel Widget
// ══════════════════════════════════════════════════════════════════════════

/// The quiz prompt: the target word with its part of speech, IPA, tags and
/// a context sentence.
pub struct WordPanel<'a> {
    word: &'a Word,
    theme: &'a Theme,
}

impl<'a> WordPanel<'a> {
    pub fn new(word: &'a Word, theme: &'a Theme) -> Self {
        Self { word, theme }
    }
}

impl Widget for WordPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.accent))
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "WORD",
                    Style::default()
                        .fg(self.theme.colors.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let mut meta_spans: Vec<Span> = Vec::new();
        if let Some(pos) = &self.word.pos {
            meta_spans.push(Span::styled(
                pos.clone(),
                Style::default().fg(self.theme.colors.text_muted),
            ));
        }
        if let Some(ipa) = &self.word.pronunciation.ipa {
            if !meta_spans.is_empty() {
                meta_spans.push(Span::styled(
                    "  •  ",
                    Style::default().fg(self.theme.colors.text_dim),
                ));
            }
            meta_spans.push(Span::styled(
                ipa.clone(),
                Style::default().fg(self.theme.colors.text_muted),
            ));
        }

        let mut lines = vec![
            Line::from(Span::styled(
                self.word.word.clone(),
                Style::default()
                    .fg(self.theme.colors.text)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(meta_spans),
        ];

        if !self.word.tags.is_empty() {
            lines.push(Line::from(Span::styled(
                self.word.tags.join(" • "),
                Style::default().fg(self.theme.colors.text_dim),
            )));
        }

        if let Some(context) = self.word.context_sentence() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                context.to_string(),
                Style::default()
                    .fg(self.theme.colors.text_muted)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Option List Widget
// ══════════════════════════════════════════════════════════════════════════

/// The lettered answer choices. Once an answer is chosen the correct option
/// turns green, a wrong choice turns red, and the rest dim out.
pub struct OptionList<'a> {
    options: &'a [QuizOption],
    chosen: Option<usize>,
    theme: &'a Theme,
}

impl<'a> OptionList<'a> {
    pub fn new(options: &'a [QuizOption], chosen: Option<usize>, theme: &'a Theme) -> Self {
        Self {
            options,
            chosen,
            theme,
        }
    }
}

impl Widget for OptionList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines: Vec<Line> = Vec::with_capacity(self.options.len() * 2);

        for (i, opt) in self.options.iter().enumerate() {
            let letter = (b'A' + i as u8) as char;

            let (letter_style, text_style, marker) = match self.chosen {
                None => (
                    self.theme.option_letter(),
                    Style::default().fg(self.theme.colors.text),
                    "",
                ),
                Some(chosen) => {
                    if opt.is_correct {
                        (self.theme.correct(), self.theme.correct(), "  ✓")
                    } else if chosen == i {
                        (self.theme.wrong(), self.theme.wrong(), "  ✗")
                    } else {
                        (
                            Style::default().fg(self.theme.colors.text_dim),
                            Style::default().fg(self.theme.colors.text_dim),
                            "",
                        )
                    }
                }
            };

            lines.push(Line::from(vec![
                Span::styled(format!("{}. ", letter), letter_style),
                Span::styled(opt.text.clone(), text_style),
                Span::styled(marker, letter_style),
            ]));
            lines.push(Line::from(""));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Key Hints Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct KeyHints<'a> {
    hints: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { hints, theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .hints
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(*key, self.theme.key_highlight()),
                    Span::styled(format!(" {} ", desc), self.theme.key_hint()),
                    Span::styled("│ ", Style::default().fg(self.theme.colors.text_dim)),
                ]
            })
            .collect();

        let line = Line::from(spans);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Sense rendering helper
// ══════════════════════════════════════════════════════════════════════════

/// Lines describing every sense of a word: definition, optional English
/// gloss, note and examples. Used by the quiz explanation panel and the
/// library detail pane.
pub fn sense_lines(word: &Word, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, sense) in word.senses.iter().enumerate() {
        let marker = if idx == word.core_sense && word.senses.len() > 1 {
            " (core)"
        } else {
            ""
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("Sense {}{}: ", idx + 1, marker),
                Style::default()
                    .fg(theme.colors.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                sense.definition_cn.clone(),
                Style::default().fg(theme.colors.text),
            ),
        ]));

        if let Some(en) = &sense.definition_en {
            lines.push(Line::from(Span::styled(
                format!("  {}", en),
                Style::default().fg(theme.colors.text_muted),
            )));
        }
        if let Some(note) = &sense.cycle_note {
            lines.push(Line::from(Span::styled(
                format!("  {}", note),
                Style::default().fg(theme.colors.text_dim),
            )));
        }
        for example in &sense.examples {
            lines.push(Line::from(vec![
                Span::styled("  • ", Style::default().fg(theme.colors.text_dim)),
                Span::styled(
                    example.clone(),
                    Style::default()
                        .fg(theme.colors.text_muted)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]));
        }
    }

    lines
}
