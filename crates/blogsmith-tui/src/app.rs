use std::path::PathBuf;
use std::time::{Duration, Instant};

use blogsmith_core::config::ApiKeySource;
use blogsmith_core::export;
use blogsmith_core::request::{
    clamp_temperature, clamp_word_count, TEMPERATURE_STEP, WORD_COUNT_STEP,
};
use blogsmith_core::state::{GenerateOutcome, EMPTY_TOPIC_WARNING};
use blogsmith_core::{
    BlogSession, Config, EmojiIntensity, GeminiClient, GenerationRequest, Language, TextGenerator,
    Tone,
};

const STATUS_TTL: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Form,
    Output,
}

/// Form controls in the order they are visited with j/k.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Topic,
    Temperature,
    WordCount,
    Tone,
    Language,
    Tldr,
    Emoji,
}

impl Field {
    pub fn all() -> [Field; 7] {
        [
            Field::Topic,
            Field::Temperature,
            Field::WordCount,
            Field::Tone,
            Field::Language,
            Field::Tldr,
            Field::Emoji,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Topic => "Topic",
            Field::Temperature => "Creativity (Temperature)",
            Field::WordCount => "Target Word Count",
            Field::Tone => "Tone",
            Field::Language => "Language",
            Field::Tldr => "Include TL;DR Summary",
            Field::Emoji => "Emoji Usage",
        }
    }

    fn offset(self, step: isize) -> Field {
        let fields = Field::all();
        let idx = fields.iter().position(|f| *f == self).unwrap_or(0) as isize;
        let len = fields.len() as isize;
        fields[(idx + step).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    expires_at: Instant,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub field: Field,

    // Form state
    pub topic_input: String,
    pub topic_cursor: usize,
    pub temperature: f32,
    pub word_count: u32,
    pub tone: Tone,
    pub language: Language,
    pub include_tldr: bool,
    pub emoji: EmojiIntensity,

    // Generation state
    pub session: BlogSession,
    pub generating: bool,
    pub status: Option<StatusMessage>,
    generator: Option<Box<dyn TextGenerator>>,
    pub key_source: Option<ApiKeySource>,
    pub model: String,

    // Output pane
    pub output_scroll: u16,
    pub output_height: u16,
    pub output_lines: u16,

    // API key popup
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,
    generate_after_key: bool,

    config: Config,
    config_path: Option<PathBuf>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let generator: Option<(Box<dyn TextGenerator>, ApiKeySource)> =
            config.resolve_api_key().map(|(key, source)| {
                let client = GeminiClient::with_model(&key, config.model())
                    .with_base_url(config.base_url());
                (Box::new(client) as Box<dyn TextGenerator>, source)
            });

        match generator {
            Some((generator, source)) => Self::with_generator(config, Some(generator), Some(source)),
            None => Self::with_generator(config, None, None),
        }
    }

    pub fn with_generator(
        config: Config,
        generator: Option<Box<dyn TextGenerator>>,
        key_source: Option<ApiKeySource>,
    ) -> Self {
        let defaults = config.defaults.clone().normalized();
        let model = generator
            .as_ref()
            .map(|g| g.model_name().to_string())
            .unwrap_or_else(|| config.model().to_string());

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Form,
            field: Field::Topic,

            topic_input: String::new(),
            topic_cursor: 0,
            temperature: defaults.temperature,
            word_count: defaults.word_count,
            tone: defaults.tone,
            language: defaults.language,
            include_tldr: defaults.include_tldr,
            emoji: defaults.emoji,

            session: BlogSession::new(),
            generating: false,
            status: None,
            generator,
            key_source,
            model,

            output_scroll: 0,
            output_height: 0,
            output_lines: 0,

            show_api_key_input: false,
            api_key_input: String::new(),
            api_key_input_cursor: 0,
            generate_after_key: false,

            config,
            config_path: None,
        }
    }

    /// Save API keys to this file instead of the user config directory.
    #[cfg(test)]
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn build_request(&self) -> GenerationRequest {
        GenerationRequest::new(&self.topic_input)
            .with_temperature(self.temperature)
            .with_word_count(self.word_count)
            .with_tone(self.tone)
            .with_language(self.language)
            .with_tldr(self.include_tldr)
            .with_emoji(self.emoji)
    }

    // Form navigation
    pub fn next_field(&mut self) {
        self.field = self.field.offset(1);
    }

    pub fn prev_field(&mut self) {
        self.field = self.field.offset(-1);
    }

    /// Move the focused control one step. Positive is right/up.
    pub fn adjust_field(&mut self, step: i8) {
        match self.field {
            Field::Topic => {}
            Field::Temperature => {
                self.temperature =
                    clamp_temperature(self.temperature + TEMPERATURE_STEP * f32::from(step));
            }
            Field::WordCount => {
                let delta = WORD_COUNT_STEP as i64 * i64::from(step);
                let next = (i64::from(self.word_count) + delta).max(0) as u32;
                self.word_count = clamp_word_count(next);
            }
            Field::Tone => {
                self.tone = if step >= 0 { self.tone.next() } else { self.tone.prev() };
            }
            Field::Language => {
                self.language = if step >= 0 {
                    self.language.next()
                } else {
                    self.language.prev()
                };
            }
            Field::Tldr => self.include_tldr = !self.include_tldr,
            Field::Emoji => {
                self.emoji = if step >= 0 { self.emoji.next() } else { self.emoji.prev() };
            }
        }
    }

    // Topic editing
    pub fn insert_topic_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.topic_input, self.topic_cursor);
        self.topic_input.insert(byte_pos, c);
        self.topic_cursor += 1;
    }

    pub fn delete_topic_char_before_cursor(&mut self) {
        if self.topic_cursor > 0 {
            self.topic_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.topic_input, self.topic_cursor);
            self.topic_input.remove(byte_pos);
        }
    }

    pub fn delete_topic_char_at_cursor(&mut self) {
        if self.topic_cursor < self.topic_input.chars().count() {
            let byte_pos = char_to_byte_index(&self.topic_input, self.topic_cursor);
            self.topic_input.remove(byte_pos);
        }
    }

    pub fn move_topic_cursor(&mut self, step: isize) {
        let char_count = self.topic_input.chars().count() as isize;
        self.topic_cursor = (self.topic_cursor as isize + step).clamp(0, char_count) as usize;
    }

    pub fn topic_cursor_to_end(&mut self) {
        self.topic_cursor = self.topic_input.chars().count();
    }

    /// Handle the generate action. The request itself runs on the next pass of
    /// the main loop so the loading state is drawn first.
    pub fn request_generation(&mut self) {
        if self.generating {
            return;
        }
        if self.topic_input.trim().is_empty() {
            self.set_status(StatusKind::Warning, EMPTY_TOPIC_WARNING);
            return;
        }
        if self.generator.is_none() {
            self.generate_after_key = true;
            self.open_api_key_input();
            return;
        }
        self.status = None;
        self.generating = true;
    }

    /// Run the pending generation, if any. Blocks until the service answers.
    pub async fn run_generation(&mut self) {
        if !self.generating {
            return;
        }
        let request = self.build_request();

        let outcome = match self.generator.as_deref() {
            Some(generator) => {
                tracing::info!(
                    tone = request.tone.as_str(),
                    language = request.language.as_str(),
                    words = request.target_word_count,
                    "generating blog"
                );
                Some(self.session.generate(generator, &request).await)
            }
            None => None,
        };

        match outcome {
            Some(GenerateOutcome::Generated) => {
                self.set_status(StatusKind::Info, "Blog generated. Press s to download.");
            }
            Some(GenerateOutcome::Failed) => {
                self.set_status(StatusKind::Error, "Generation failed. See the output pane.");
            }
            Some(GenerateOutcome::EmptyTopic) => {
                self.set_status(StatusKind::Warning, EMPTY_TOPIC_WARNING);
            }
            None => {}
        }

        self.generating = false;
        self.output_scroll = 0;
    }

    /// Write the displayed post to `<output_dir>/<topic>.md`.
    pub fn download(&mut self) {
        if !self.session.has_content() {
            self.set_status(StatusKind::Warning, "Nothing to download yet.");
            return;
        }

        match export::save_markdown(
            &self.config.output_dir(),
            &self.topic_input,
            self.session.content(),
        ) {
            Ok(path) => {
                self.set_status(StatusKind::Info, &format!("Saved {}", path.display()));
            }
            Err(e) => {
                tracing::error!("download failed: {e:#}");
                self.set_status(StatusKind::Error, &format!("Could not save file: {e}"));
            }
        }
    }

    // API key popup
    pub fn open_api_key_input(&mut self) {
        self.show_api_key_input = true;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    pub fn cancel_api_key_input(&mut self) {
        self.show_api_key_input = false;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
        self.generate_after_key = false;
    }

    pub fn submit_api_key(&mut self) {
        let key = self.api_key_input.trim().to_string();
        self.show_api_key_input = false;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;

        if let Err(e) = self.config.set_api_key(&key) {
            self.generate_after_key = false;
            self.set_status(StatusKind::Warning, &e.to_string());
            return;
        }

        let saved = match &self.config_path {
            Some(path) => self.config.save_to(path),
            None => self.config.save(),
        };
        if let Err(e) = saved {
            tracing::warn!("could not persist API key: {e:#}");
            self.set_status(StatusKind::Warning, &format!("Key used for this session only: {e}"));
        }

        let client = GeminiClient::with_model(&key, self.config.model())
            .with_base_url(self.config.base_url());
        self.model = client.model_name().to_string();
        self.generator = Some(Box::new(client));
        self.key_source = Some(ApiKeySource::Config);

        if std::mem::take(&mut self.generate_after_key) {
            self.request_generation();
        }
    }

    #[cfg(test)]
    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    // Output scrolling
    pub fn scroll_down(&mut self) {
        let max_scroll = self.output_lines.saturating_sub(self.output_height);
        self.output_scroll = (self.output_scroll + 1).min(max_scroll);
    }

    pub fn scroll_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.output_height / 2).max(1);
        let max_scroll = self.output_lines.saturating_sub(self.output_height);
        self.output_scroll = (self.output_scroll + half).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = (self.output_height / 2).max(1);
        self.output_scroll = self.output_scroll.saturating_sub(half);
    }

    pub fn set_status(&mut self, kind: StatusKind, text: &str) {
        self.status = Some(StatusMessage {
            kind,
            text: text.to_string(),
            expires_at: Instant::now() + STATUS_TTL,
        });
    }

    /// Called on every Tick event; expires the status line.
    pub fn tick(&mut self) {
        self.expire_status(Instant::now());
    }

    fn expire_status(&mut self, now: Instant) {
        if self.status.as_ref().is_some_and(|s| now >= s.expires_at) {
            self.status = None;
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
