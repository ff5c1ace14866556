//! Main application state and logic.

use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::theme::Theme;
use super::widgets::{sense_lines, KeyHints, LibraryBar, Logo, OptionList, WordPanel};
use crate::config::Config;
use crate::models::{all_tags, normalize_id, LibraryStats, Pronunciation, Sense, Word};
use crate::review::{self, QuizOption};
use crate::storage::WordStore;

// ══════════════════════════════════════════════════════════════════════════
// Application State
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Review,
    Library,
    AddWord,
    Stats,
}

/// One dealt quiz round. Owned by the app for exactly one cycle: dealt from
/// a fresh store snapshot, answered once, then replaced.
pub struct QuizState {
    pub word: Word,
    pub options: Vec<QuizOption>,
    pub chosen: Option<usize>,
    pub was_correct: bool,
    pub show_explanation: bool,
}

/// Manual entry form. The senses are edited as a JSON array, the same shape
/// the import/export format uses, so multi-sense words survive editing.
#[derive(Default)]
pub struct WordForm {
    pub editing_id: Option<String>,
    pub word: String,
    pub pos: String,
    pub tags: String,
    pub ipa: String,
    pub senses: String,
    pub focus: usize,
    pub error: Option<String>,
}

const FORM_FIELD_COUNT: usize = 5;
const FORM_LABELS: [&str; FORM_FIELD_COUNT] = [
    " Word ",
    " Part of speech ",
    " Tags (comma separated) ",
    " IPA ",
    " Senses (JSON array) ",
];

const SENSE_TEMPLATE: &str = r#"[{"definition_cn": "中文释义（核心）", "definition_en": "English definition (optional)", "examples": ["Example sentence."], "cycle_note": "一句周期提示（可选）"}]"#;

impl WordForm {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn fill_from(&mut self, word: &Word) {
        self.editing_id = Some(word.id.clone());
        self.word = word.word.clone();
        self.pos = word.pos.clone().unwrap_or_default();
        self.tags = word.tags.join(", ");
        self.ipa = word.pronunciation.ipa.clone().unwrap_or_default();
        self.senses = serde_json::to_string(&word.senses).unwrap_or_default();
        self.focus = 0;
        self.error = None;
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.word,
            1 => &mut self.pos,
            2 => &mut self.tags,
            3 => &mut self.ipa,
            _ => &mut self.senses,
        }
    }

    fn field(&self, idx: usize) -> &str {
        match idx {
            0 => &self.word,
            1 => &self.pos,
            2 => &self.tags,
            3 => &self.ipa,
            _ => &self.senses,
        }
    }
}

pub struct App {
    pub screen: Screen,
    pub running: bool,

    // Config and theme
    pub config: Config,
    pub theme: Theme,

    // Storage and randomness
    pub store: WordStore,
    rng: rand::rngs::ThreadRng,

    // Review state
    pub words: Vec<Word>,
    pub quiz: Option<QuizState>,
    pub rounds_answered: usize,

    // Library state
    pub word_list_state: ListState,
    pub tag_filter: Option<String>,

    // Add/edit form state
    pub form: WordForm,

    // Status message (shown temporarily)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(store: WordStore, config: Config) -> Self {
        let theme = Theme::from_name(&config.theme);

        let mut app = Self {
            screen: Screen::Review,
            running: true,
            config,
            theme,
            store,
            rng: rand::rng(),
            words: Vec::new(),
            quiz: None,
            rounds_answered: 0,
            word_list_state: ListState::default(),
            tag_filter: None,
            form: WordForm::default(),
            status_message: None,
        };
        app.next_round();
        app
    }

    fn refresh_words(&mut self) {
        self.words = self.store.get_all().unwrap_or_default();
    }

    /// Deal the next quiz round: reload the library snapshot, pick the word
    /// with the highest review score and build its answer options.
    pub fn next_round(&mut self) {
        self.refresh_words();

        let n = self.config.option_count.clamp(2, 6);
        let target = review::select_next(&self.words, &mut self.rng).cloned();
        self.quiz = target.map(|word| {
            let round = review::build_options(&word, &self.words, n, &mut self.rng);
            QuizState {
                word,
                options: round.options,
                chosen: None,
                was_correct: false,
                show_explanation: false,
            }
        });
    }

    /// Apply the learner's choice: record it on the word's statistics and
    /// persist that single record. Wrong answers auto-open the explanation.
    pub fn answer(&mut self, idx: usize) {
        let Some(quiz) = self.quiz.as_mut() else {
            return;
        };
        if quiz.chosen.is_some() || idx >= quiz.options.len() {
            return;
        }

        quiz.chosen = Some(idx);
        quiz.was_correct = quiz.options[idx].is_correct;
        quiz.show_explanation = !quiz.was_correct;
        quiz.word.stats.record_answer(quiz.was_correct);
        let answered = quiz.word.clone();

        self.rounds_answered += 1;
        if let Err(e) = self.store.put(&answered) {
            self.set_status(format!("Save failed: {}", e));
        }
    }

    pub fn toggle_explanation(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.show_explanation = !quiz.show_explanation;
        }
    }

    pub fn cycle_theme(&mut self) {
        let new_theme_name = self.theme.name.next();
        self.theme = Theme::new(new_theme_name);
        self.config.theme = new_theme_name.as_str().to_string();
        let _ = self.config.save();
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    pub fn export_backup(&mut self) {
        let path = WordStore::default_export_path();
        match self.store.export_json() {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => self.set_status(format!("Exported library to {}", path.display())),
                Err(e) => self.set_status(format!("Export failed: {}", e)),
            },
            Err(e) => self.set_status(format!("Export failed: {}", e)),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Library
    // ══════════════════════════════════════════════════════════════════════

    pub fn enter_library(&mut self) {
        self.refresh_words();
        let selected = if self.filtered_library().is_empty() {
            None
        } else {
            Some(0)
        };
        self.word_list_state = ListState::default().with_selected(selected);
        self.screen = Screen::Library;
    }

    /// Library view of the snapshot: tag-filtered, alphabetical.
    fn filtered_library(&self) -> Vec<&Word> {
        let mut list: Vec<&Word> = self
            .words
            .iter()
            .filter(|w| {
                self.tag_filter
                    .as_ref()
                    .map_or(true, |t| w.tags.contains(t))
            })
            .collect();
        list.sort_by(|a, b| a.word.cmp(&b.word));
        list
    }

    pub fn cycle_tag_filter(&mut self) {
        let tags = all_tags(&self.words);
        self.tag_filter = match &self.tag_filter {
            None => tags.first().cloned(),
            Some(current) => tags
                .iter()
                .position(|t| t == current)
                .and_then(|i| tags.get(i + 1))
                .cloned(),
        };
        let selected = if self.filtered_library().is_empty() {
            None
        } else {
            Some(0)
        };
        self.word_list_state.select(selected);
    }

    fn move_library_selection(&mut self, delta: isize) {
        let len = self.filtered_library().len();
        if len == 0 {
            return;
        }
        let i = self.word_list_state.selected().unwrap_or(0) as isize;
        let new_i = (i + delta).rem_euclid(len as isize) as usize;
        self.word_list_state.select(Some(new_i));
    }

    fn selected_library_word(&self) -> Option<Word> {
        let filtered = self.filtered_library();
        self.word_list_state
            .selected()
            .and_then(|i| filtered.get(i))
            .map(|w| (*w).clone())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Add / edit form
    // ══════════════════════════════════════════════════════════════════════

    pub fn start_add_word(&mut self) {
        self.form.clear();
        self.screen = Screen::AddWord;
    }

    pub fn start_edit_word(&mut self) {
        if let Some(word) = self.selected_library_word() {
            self.form.fill_from(&word);
            self.screen = Screen::AddWord;
        }
    }

    pub fn insert_sense_template(&mut self) {
        if self.form.senses.trim().is_empty() {
            self.form.senses = SENSE_TEMPLATE.to_string();
        }
    }

    /// Validate and persist the form. A word with zero senses is rejected
    /// here and never reaches the store or the quiz. Editing keeps the
    /// existing statistics.
    pub fn save_word_form(&mut self) {
        let word_text = self.form.word.trim().to_string();
        if word_text.is_empty() {
            self.form.error = Some("Word is required.".to_string());
            return;
        }

        let senses: Vec<Sense> = match serde_json::from_str(self.form.senses.trim()) {
            Ok(senses) => senses,
            Err(e) => {
                self.form.error = Some(format!("Invalid senses JSON: {}", e));
                return;
            }
        };
        if senses.is_empty() {
            self.form.error = Some("Senses must be a non-empty array.".to_string());
            return;
        }

        let editing = self.form.editing_id.is_some();
        let id = self
            .form
            .editing_id
            .clone()
            .unwrap_or_else(|| normalize_id(&word_text));

        // Keep the learning statistics when overwriting an existing word.
        let stats = match self.store.get(&id) {
            Ok(existing) => existing.map(|w| w.stats).unwrap_or_default(),
            Err(e) => {
                self.form.error = Some(format!("Load failed: {}", e));
                return;
            }
        };

        let tags: Vec<String> = self
            .form
            .tags
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let pos = Some(self.form.pos.trim().to_string()).filter(|s| !s.is_empty());
        let ipa = Some(self.form.ipa.trim().to_string()).filter(|s| !s.is_empty());

        let mut word = Word {
            id,
            word: word_text,
            pos,
            tags,
            core_sense: 0,
            senses,
            pronunciation: Pronunciation { ipa, tts: true },
            stats,
        };
        word.normalize();

        match self.store.put(&word) {
            Ok(()) => {
                self.set_status(if editing {
                    "Updated.".to_string()
                } else {
                    "Saved.".to_string()
                });
                self.form.clear();
                self.enter_library();
            }
            Err(e) => self.form.error = Some(format!("Save failed: {}", e)),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ══════════════════════════════════════════════════════════════════════

    pub fn handle_events(&mut self) -> anyhow::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }

                match self.screen {
                    Screen::Review => self.handle_review_keys(key),
                    Screen::Library => self.handle_library_keys(key),
                    Screen::AddWord => self.handle_form_keys(key),
                    Screen::Stats => self.handle_stats_keys(key),
                }
            }
        }
        Ok(())
    }

    fn awaiting_answer(&self, c: char) -> bool {
        self.quiz.as_ref().is_some_and(|q| {
            q.chosen.is_none() && ((c as u8 - b'a') as usize) < q.options.len()
        })
    }

    fn handle_review_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Char(c @ 'a'..='f') if self.awaiting_answer(c) => {
                self.answer((c as u8 - b'a') as usize);
            }
            KeyCode::Char('n') | KeyCode::Enter => self.next_round(),
            KeyCode::Char('e') => self.toggle_explanation(),
            KeyCode::Char('l') => self.enter_library(),
            KeyCode::Char('w') => self.start_add_word(),
            KeyCode::Char('s') => {
                self.refresh_words();
                self.screen = Screen::Stats;
            }
            KeyCode::Char('x') => self.export_backup(),
            KeyCode::Char('t') => self.cycle_theme(),
            _ => {}
        }
    }

    fn handle_library_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.screen = Screen::Review,
            KeyCode::Up | KeyCode::Char('k') => self.move_library_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_library_selection(1),
            KeyCode::Char('f') => self.cycle_tag_filter(),
            KeyCode::Char('e') => self.start_edit_word(),
            KeyCode::Char('a') | KeyCode::Char('w') => self.start_add_word(),
            KeyCode::Char('t') => self.cycle_theme(),
            _ => {}
        }
    }

    fn handle_form_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.form.clear();
                self.enter_library();
            }
            KeyCode::Tab => {
                self.form.focus = (self.form.focus + 1) % FORM_FIELD_COUNT;
            }
            KeyCode::BackTab => {
                self.form.focus = (self.form.focus + FORM_FIELD_COUNT - 1) % FORM_FIELD_COUNT;
            }
            KeyCode::Enter => self.save_word_form(),
            KeyCode::F(2) => self.insert_sense_template(),
            KeyCode::Char(c) => {
                self.form.error = None;
                self.form.focused_mut().push(c);
            }
            KeyCode::Backspace => {
                self.form.focused_mut().pop();
            }
            _ => {}
        }
    }

    fn handle_stats_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.screen = Screen::Review,
            KeyCode::Char('t') => self.cycle_theme(),
            _ => {}
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Rendering
    // ══════════════════════════════════════════════════════════════════════

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Clear with background
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.colors.bg_dark)),
            area,
        );

        match self.screen {
            Screen::Review => self.render_review(frame, area),
            Screen::Library => self.render_library(frame, area),
            Screen::AddWord => self.render_form(frame, area),
            Screen::Stats => self.render_stats(frame, area),
        }
    }

    fn render_review(&mut self, frame: &mut Frame, area: Rect) {
        let Some(ref quiz) = self.quiz else {
            self.render_empty_library(frame, area);
            return;
        };

        let explanation_height = if quiz.show_explanation { 10 } else { 0 };
        let chunks = Layout::vertical([
            Constraint::Length(2),                  // Header
            Constraint::Length(1),                  // Library bar
            Constraint::Length(1),                  // Separator
            Constraint::Length(8),                  // Word panel
            Constraint::Min(6),                     // Options
            Constraint::Length(1),                  // Result
            Constraint::Length(explanation_height), // Explanation
            Constraint::Length(2),                  // Hints
        ])
        .split(area);

        // Header
        let header = Paragraph::new(Line::from(vec![
            Span::styled("Vocab Cycle", self.theme.title()),
            Span::styled(
                format!("  ·  {} answered this session", self.rounds_answered),
                self.theme.subtitle(),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        frame.render_widget(
            LibraryBar::new(LibraryStats::gather(&self.words), &self.theme),
            chunks[1],
        );

        // Word being quizzed
        let word_area = centered_rect(80, 100, chunks[3]);
        frame.render_widget(WordPanel::new(&quiz.word, &self.theme), word_area);

        // Options
        let options_area = centered_rect(80, 100, chunks[4]);
        frame.render_widget(
            OptionList::new(&quiz.options, quiz.chosen, &self.theme),
            options_area,
        );

        // Result line
        if quiz.chosen.is_some() {
            let result = if quiz.was_correct {
                Paragraph::new("✓ Correct").style(self.theme.correct())
            } else {
                Paragraph::new("✗ Wrong").style(self.theme.wrong())
            };
            frame.render_widget(result.alignment(Alignment::Center), chunks[5]);
        }

        // Explanation panel (auto-opened on a wrong answer)
        if quiz.show_explanation {
            let explanation = Paragraph::new(sense_lines(&quiz.word, &self.theme))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(self.theme.colors.info))
                        .title(" Explanation ")
                        .title_style(Style::default().fg(self.theme.colors.info)),
                );
            frame.render_widget(explanation, centered_rect(80, 100, chunks[6]));
        }

        // Key hints
        let theme_hint = format!("[{}]", self.theme.name.display_name());
        let answered_hints = [
            ("n/Enter", "next"),
            ("e", "details"),
            ("l", "library"),
            ("w", "add"),
            ("s", "stats"),
            ("q", "quit"),
        ];
        let open_hints = [
            ("a-d", "answer"),
            ("n", "skip"),
            ("l", "library"),
            ("w", "add"),
            ("s", "stats"),
            ("x", "export"),
            ("t", theme_hint.as_str()),
            ("q", "quit"),
        ];
        let hints = if quiz.chosen.is_some() {
            KeyHints::new(&answered_hints, &self.theme)
        } else {
            KeyHints::new(&open_hints, &self.theme)
        };
        frame.render_widget(hints, chunks[7]);

        self.render_status(frame, chunks[7]);
    }

    fn render_empty_library(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2), // Top padding
            Constraint::Length(8), // Logo
            Constraint::Length(2), // Spacing
            Constraint::Min(4),    // Message
            Constraint::Length(3), // Help
        ])
        .split(area);

        frame.render_widget(Logo::new(&self.theme), chunks[1]);

        let message = Paragraph::new(vec![
            Line::from(Span::styled("No words yet.", self.theme.title())),
            Line::from(""),
            Line::from(Span::styled(
                "Press w to add your first word, or import a list with --import.",
                self.theme.subtitle(),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(message, chunks[3]);

        let hints = KeyHints::new(&[("w", "add word"), ("q", "quit")], &self.theme);
        frame.render_widget(hints, chunks[4]);
    }

    fn render_library(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Hints
        ])
        .split(area);

        let filter_label = self
            .tag_filter
            .as_ref()
            .map(|t| format!(" [{}]", t))
            .unwrap_or_default();
        let title = Paragraph::new(format!("Library{}", filter_label))
            .alignment(Alignment::Center)
            .style(self.theme.title());
        frame.render_widget(title, chunks[0]);

        let main_chunks = Layout::horizontal([
            Constraint::Percentage(35), // Word list
            Constraint::Percentage(65), // Word details
        ])
        .split(chunks[1]);

        let filtered = self.filtered_library();
        let items: Vec<ListItem> = filtered
            .iter()
            .map(|w| {
                let status = if w.is_unseen() {
                    "(new)".to_string()
                } else {
                    format!("(m{})", w.stats.mastery)
                };
                let tags = w.tags.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
                ListItem::new(Line::from(vec![
                    Span::styled(w.word.clone(), Style::default().fg(self.theme.colors.text)),
                    Span::styled(
                        format!(" {}", status),
                        Style::default().fg(self.theme.colors.text_muted),
                    ),
                    Span::styled(
                        format!("  {}", tags),
                        Style::default().fg(self.theme.colors.text_dim),
                    ),
                ]))
            })
            .collect();
        let selected = self.selected_library_word();
        drop(filtered);

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.primary))
                    .title(" Words ")
                    .title_style(self.theme.highlight()),
            )
            .highlight_style(self.theme.selected())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, main_chunks[0], &mut self.word_list_state);

        if let Some(word) = selected {
            self.render_word_details(frame, main_chunks[1], &word);
        }

        let hints = KeyHints::new(
            &[
                ("j/k", "nav"),
                ("f", "filter"),
                ("e", "edit"),
                ("a", "add"),
                ("Esc", "review"),
            ],
            &self.theme,
        );
        frame.render_widget(hints, chunks[2]);

        self.render_status(frame, chunks[2]);
    }

    fn render_word_details(&self, frame: &mut Frame, area: Rect, word: &Word) {
        let chunks = Layout::vertical([
            Constraint::Min(8),    // Senses
            Constraint::Length(7), // Learning stats
        ])
        .split(area);

        let mut meta = String::new();
        if let Some(pos) = &word.pos {
            meta.push_str(pos);
        }
        if let Some(ipa) = &word.pronunciation.ipa {
            if !meta.is_empty() {
                meta.push_str("  •  ");
            }
            meta.push_str(ipa);
        }

        let mut lines = vec![Line::from(Span::styled(word.word.clone(), self.theme.title()))];
        if !meta.is_empty() {
            lines.push(Line::from(Span::styled(meta, self.theme.subtitle())));
        }
        if !word.tags.is_empty() {
            lines.push(Line::from(Span::styled(
                word.tags.join(" • "),
                Style::default().fg(self.theme.colors.text_dim),
            )));
        }
        lines.push(Line::from(""));
        lines.extend(sense_lines(word, &self.theme));

        let senses_block = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(self.theme.colors.accent))
                .title(" Word ")
                .title_style(Style::default().fg(self.theme.colors.accent)),
        );
        frame.render_widget(senses_block, chunks[0]);

        let last_seen = word
            .stats
            .last_seen
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        let stats_lines = vec![
            Line::from(vec![
                Span::styled("Seen: ", self.theme.subtitle()),
                Span::styled(
                    word.stats.seen.to_string(),
                    Style::default().fg(self.theme.colors.text),
                ),
                Span::styled("   Correct: ", self.theme.subtitle()),
                Span::styled(word.stats.correct.to_string(), self.theme.correct()),
                Span::styled("   Wrong: ", self.theme.subtitle()),
                Span::styled(word.stats.wrong.to_string(), self.theme.wrong()),
            ]),
            Line::from(vec![
                Span::styled("Mastery: ", self.theme.subtitle()),
                Span::styled(
                    format!("{}/10", word.stats.mastery),
                    Style::default().fg(self.theme.colors.primary),
                ),
            ]),
            Line::from(vec![
                Span::styled("Last seen: ", self.theme.subtitle()),
                Span::styled(last_seen, Style::default().fg(self.theme.colors.text)),
            ]),
        ];
        let stats_block = Paragraph::new(stats_lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(self.theme.colors.text_dim))
                .title(" Learning ")
                .title_style(Style::default().fg(self.theme.colors.text_muted)),
        );
        frame.render_widget(stats_block, chunks[1]);
    }

    fn render_form(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2),  // Title
            Constraint::Length(3),  // Word
            Constraint::Length(3),  // Pos
            Constraint::Length(3),  // Tags
            Constraint::Length(3),  // IPA
            Constraint::Length(3),  // Senses
            Constraint::Length(1),  // Error
            Constraint::Min(0),     // Spacer
            Constraint::Length(2),  // Hints
        ])
        .split(centered_rect(70, 100, area));

        let title = if self.form.editing_id.is_some() {
            format!("Edit: {}", self.form.word)
        } else {
            "Add Word".to_string()
        };
        frame.render_widget(
            Paragraph::new(title)
                .alignment(Alignment::Center)
                .style(self.theme.title()),
            chunks[0],
        );

        for idx in 0..FORM_FIELD_COUNT {
            self.render_form_field(frame, chunks[idx + 1], idx);
        }

        if let Some(ref err) = self.form.error {
            frame.render_widget(
                Paragraph::new(err.as_str())
                    .alignment(Alignment::Center)
                    .style(self.theme.wrong()),
                chunks[6],
            );
        }

        let hints = KeyHints::new(
            &[
                ("Tab", "next field"),
                ("F2", "sense template"),
                ("Enter", "save"),
                ("Esc", "cancel"),
            ],
            &self.theme,
        );
        frame.render_widget(hints, chunks[8]);
    }

    fn render_form_field(&self, frame: &mut Frame, area: Rect, idx: usize) {
        let focused = self.form.focus == idx;
        let style = if focused {
            Style::default().fg(self.theme.colors.accent)
        } else {
            Style::default().fg(self.theme.colors.text_muted)
        };

        let value = self.form.field(idx);
        let field = Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style)
                .title(FORM_LABELS[idx])
                .title_style(style),
        );
        frame.render_widget(field, area);

        // Blinking cursor at the end of the focused field (accounting for wrap)
        if focused {
            let inner_width = area.width.saturating_sub(2) as usize;
            let text_len = value.chars().count();
            let (cursor_x, cursor_y) = if inner_width > 0 {
                let row = text_len / inner_width;
                let col = text_len % inner_width;
                (area.x + 1 + col as u16, area.y + 1 + row as u16)
            } else {
                (area.x + 1, area.y + 1)
            };
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn render_stats(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2), // Title
            Constraint::Length(1), // Spacing
            Constraint::Min(10),   // Stats content
            Constraint::Length(2), // Hints
        ])
        .split(area);

        frame.render_widget(
            Paragraph::new("Stats")
                .alignment(Alignment::Center)
                .style(self.theme.title()),
            chunks[0],
        );

        let stats = LibraryStats::gather(&self.words);

        let content_area = centered_rect(70, 100, chunks[2]);
        let stat_chunks = Layout::vertical([
            Constraint::Length(7), // Overview
            Constraint::Length(1), // Spacing
            Constraint::Min(7),    // Mastery breakdown
        ])
        .split(content_area);

        let accuracy = stats
            .accuracy_percent()
            .map(|p| format!("{}%", p))
            .unwrap_or_else(|| "—".to_string());
        let overview_lines = vec![
            Line::from(vec![
                Span::styled("Words: ", self.theme.subtitle()),
                Span::styled(stats.total_words.to_string(), self.theme.highlight()),
            ]),
            Line::from(vec![
                Span::styled("Answers: ", self.theme.subtitle()),
                Span::styled(stats.total_seen.to_string(), self.theme.highlight()),
            ]),
            Line::from(vec![
                Span::styled("Correct: ", self.theme.subtitle()),
                Span::styled(stats.total_correct.to_string(), self.theme.correct()),
                Span::styled("   Wrong: ", self.theme.subtitle()),
                Span::styled(stats.total_wrong.to_string(), self.theme.wrong()),
            ]),
            Line::from(vec![
                Span::styled("Accuracy: ", self.theme.subtitle()),
                Span::styled(accuracy, Style::default().fg(self.theme.colors.text)),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(overview_lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.primary))
                    .title(" Overview ")
                    .title_style(self.theme.highlight()),
            ),
            stat_chunks[0],
        );

        let breakdown_lines = vec![
            Line::from(vec![
                Span::styled("New: ", self.theme.subtitle()),
                Span::styled(stats.unseen.to_string(), self.theme.stats_unseen()),
                Span::styled(" never quizzed", self.theme.key_hint()),
            ]),
            Line::from(vec![
                Span::styled("Learning: ", self.theme.subtitle()),
                Span::styled(stats.learning.to_string(), self.theme.stats_learning()),
                Span::styled(" mastery below 5", self.theme.key_hint()),
            ]),
            Line::from(vec![
                Span::styled("Solid: ", self.theme.subtitle()),
                Span::styled(stats.solid.to_string(), self.theme.highlight()),
                Span::styled(" mastery 5-9", self.theme.key_hint()),
            ]),
            Line::from(vec![
                Span::styled("Mastered: ", self.theme.subtitle()),
                Span::styled(stats.mastered.to_string(), self.theme.stats_mastered()),
                Span::styled(" mastery 10", self.theme.key_hint()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(breakdown_lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.accent))
                    .title(" Words by Mastery ")
                    .title_style(Style::default().fg(self.theme.colors.accent)),
            ),
            stat_chunks[2],
        );

        let hints = KeyHints::new(&[("t", "theme"), ("Esc", "back")], &self.theme);
        frame.render_widget(hints, chunks[3]);
    }

    /// Show the transient status message just above the hint row.
    fn render_status(&self, frame: &mut Frame, hints_area: Rect) {
        if let Some((ref msg, time)) = self.status_message {
            if time.elapsed().as_secs() < 5 {
                let status = Paragraph::new(msg.as_str())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.colors.success));
                let status_area = Rect {
                    x: hints_area.x,
                    y: hints_area.y.saturating_sub(1),
                    width: hints_area.width,
                    height: 1,
                };
                frame.render_widget(status, status_area);
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Helper Functions
// ══════════════════════════════════════════════════════════════════════════

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
