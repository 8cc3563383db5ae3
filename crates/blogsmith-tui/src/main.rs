use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};

use blogsmith_core::config::API_KEY_ENV;
use blogsmith_core::state::EMPTY_TOPIC_WARNING;
use blogsmith_core::{
    export, BlogSession, Config, EmojiIntensity, GeminiClient, GenerateOutcome,
    GenerationRequest, Language, Tone,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "blogsmith", version)]
#[command(about = "Generate beautiful, ready-to-upload blog posts with Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one blog post without opening the TUI
    Generate {
        /// Blog topic
        #[arg(short, long)]
        topic: String,
        /// Creativity, 0.0 to 1.0
        #[arg(long)]
        temperature: Option<f32>,
        /// Target word count (the prompt asks for twice this)
        #[arg(short, long)]
        words: Option<u32>,
        #[arg(long, value_parser = parse_tone)]
        tone: Option<Tone>,
        #[arg(short, long, value_parser = parse_language)]
        language: Option<Language>,
        /// Leave out the TL;DR summary
        #[arg(long)]
        no_tldr: bool,
        /// light, moderate or heavy
        #[arg(long, value_parser = parse_emoji)]
        emoji: Option<EmojiIntensity>,
        /// Write <topic>.md into this directory instead of printing
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Manage the stored Gemini API key
    Key {
        /// Store a new key in the config file
        #[arg(long, conflicts_with = "clear")]
        set: Option<String>,
        /// Remove the stored key
        #[arg(long)]
        clear: bool,
    },
}

fn parse_tone(s: &str) -> Result<Tone, String> {
    Tone::from_str(s).ok_or_else(|| {
        let options: Vec<&str> = Tone::all().iter().map(|t| t.as_str()).collect();
        format!("unknown tone '{s}', expected one of: {}", options.join(", "))
    })
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_str(s).ok_or_else(|| {
        let options: Vec<&str> = Language::all().iter().map(|l| l.as_str()).collect();
        format!("unknown language '{s}', expected one of: {}", options.join(", "))
    })
}

fn parse_emoji(s: &str) -> Result<EmojiIntensity, String> {
    EmojiIntensity::from_str(s)
        .ok_or_else(|| format!("unknown emoji level '{s}', expected light, moderate or heavy"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config()?;
            if let Err(e) = logging::init_file_logging() {
                eprintln!("Logging disabled: {e}");
            }
            run_tui(config).await
        }
        Some(Commands::Generate {
            topic,
            temperature,
            words,
            tone,
            language,
            no_tldr,
            emoji,
            out,
        }) => {
            logging::init_stderr_logging();
            let config = load_config()?;
            let defaults = config.defaults.clone().normalized();
            let request = GenerationRequest::new(&topic)
                .with_temperature(temperature.unwrap_or(defaults.temperature))
                .with_word_count(words.unwrap_or(defaults.word_count))
                .with_tone(tone.unwrap_or(defaults.tone))
                .with_language(language.unwrap_or(defaults.language))
                .with_tldr(!no_tldr && defaults.include_tldr)
                .with_emoji(emoji.unwrap_or(defaults.emoji));
            generate_once(&config, &request, out).await
        }
        Some(Commands::Key { set, clear }) => {
            logging::init_stderr_logging();
            // --set and --clear rewrite the file, so they also repair a broken one
            let config = if set.is_some() || clear {
                Config::load_or_reset()?
            } else {
                load_config()?
            };
            manage_key(config, set, clear)
        }
    }
}

fn load_config() -> Result<Config> {
    Config::load().context(
        "Fix or delete the config file, or run `blogsmith key --set <KEY>` to rewrite it",
    )
}

async fn run_tui(config: Config) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(config);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        // The loading state is on screen; now block on the request
        if app.generating {
            app.run_generation().await;
            continue;
        }

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

async fn generate_once(
    config: &Config,
    request: &GenerationRequest,
    out: Option<PathBuf>,
) -> Result<()> {
    let (api_key, source) = config.resolve_api_key().ok_or_else(|| {
        anyhow!(
            "No Gemini API key. Set {} or run `blogsmith key --set <KEY>`.",
            API_KEY_ENV
        )
    })?;
    tracing::debug!("using API key from {}", source.description());

    let client = GeminiClient::with_model(&api_key, config.model()).with_base_url(config.base_url());
    let mut session = BlogSession::new();

    match session.generate(&client, request).await {
        GenerateOutcome::EmptyTopic => bail!(EMPTY_TOPIC_WARNING),
        GenerateOutcome::Failed => bail!("{}", session.content()),
        GenerateOutcome::Generated => {}
    }

    match out {
        Some(dir) => {
            let path = export::save_markdown(&dir, &request.topic, session.content())?;
            println!("Saved {}", path.display());
        }
        None => println!("{}", session.content()),
    }
    Ok(())
}

fn manage_key(mut config: Config, set: Option<String>, clear: bool) -> Result<()> {
    if let Some(key) = set {
        config.set_api_key(&key)?;
        config.save()?;
        println!("API key saved to {}", Config::get_config_path()?.display());
        return Ok(());
    }

    if clear {
        let had_key = config.gemini_api_key.take().is_some();
        config.save()?;
        println!("{}", if had_key { "API key removed" } else { "No stored API key" });
        return Ok(());
    }

    match config.resolve_api_key() {
        Some((_, source)) => println!("API key configured via {}", source.description()),
        None => println!("No API key. Set {API_KEY_ENV} or run `blogsmith key --set <KEY>`."),
    }
    Ok(())
}
