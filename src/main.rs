//! siftly is a CLI tool that summarizes YouTube videos and web pages with an LLM model.
//!
//! Given `--url` it summarizes that page once and exits. Otherwise it prompts
//! for an API key and a URL in a loop, keeping the previous answers as
//! defaults, and summarizes on every Enter.

use std::cell::RefCell;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use env_logger::Builder;
use indicatif::{ProgressBar, ProgressStyle};
use log::{LevelFilter, debug};

use siftly::{
    LlmModelFactory, Pipeline, Session, TextBy,
    constants::{DEFAULT_CAPTION_LANGUAGE, DEFAULT_MODEL, MODEL_API_KEY_ENV_NAME},
    page::HttpPageLoader,
    pipeline::{Activity, FlowState, Observer},
    youtube::{InnertubeCaptions, WatchPageTranscripts},
};

/// A CLI tool to summarize YouTube videos and websites with an LLM
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL to summarize once; prompts interactively when omitted
    #[arg(long, short)]
    url: Option<String>,

    /// API key of the LLM provider
    #[arg(long, env = MODEL_API_KEY_ENV_NAME, hide_env_values = true)]
    api_key: Option<String>,

    /// URL of the LLM model to use, as backend://model
    #[arg(long, short, default_value = DEFAULT_MODEL)]
    model: String,

    /// Timeout of every network call in seconds (default: none)
    #[arg(long, short, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Text extraction method: "dom_smoothie" (default) or "fast_html2md"
    #[arg(long, default_value = "dom_smoothie")]
    text_by: TextBy,

    /// Preferred caption language
    #[arg(long, default_value = DEFAULT_CAPTION_LANGUAGE)]
    lang: String,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", default_value_t = 1)]
    verbose: u8,
}

/// Collaborators shared by every request of the process.
struct Services {
    transcripts: WatchPageTranscripts,
    captions: InnertubeCaptions,
    pages: HttpPageLoader,
    models: LlmModelFactory,
}

impl Services {
    fn new(cli: &Cli) -> Result<Self> {
        let timeout = cli.timeout.map(Duration::from_secs);

        Ok(Self {
            transcripts: WatchPageTranscripts::new(&cli.lang, timeout)?,
            captions: InnertubeCaptions::new(&cli.lang, timeout)?,
            pages: HttpPageLoader::new(cli.text_by.clone(), timeout)?,
            models: LlmModelFactory::from_model_url(&cli.model, timeout)?,
        })
    }

    /// Runs one request and prints its outcome. Returns whether it succeeded.
    async fn summarize(&self, session: &Session) -> bool {
        let spinner = Spinner::default();
        let pipeline = Pipeline {
            transcripts: &self.transcripts,
            captions: &self.captions,
            pages: &self.pages,
            models: &self.models,
            observer: &spinner,
        };

        match pipeline.run(session).await {
            Ok(summary) => {
                println!("\n{summary}\n");
                true
            }
            Err(error) => {
                debug!("Request failed: {error}");
                eprintln!("{}", error.user_message());
                false
            }
        }
    }
}

/// Busy indicator shown while a network call is pending.
#[derive(Default)]
struct Spinner {
    bar: RefCell<Option<ProgressBar>>,
}

impl Observer for Spinner {
    fn on_state(&self, state: FlowState) {
        debug!("State: {state:?}");
        if matches!(state, FlowState::Idle | FlowState::Displaying)
            && let Some(bar) = self.bar.borrow_mut().take()
        {
            bar.finish_and_clear();
        }
    }

    fn on_activity(&self, activity: Activity) {
        let mut bar = self.bar.borrow_mut();
        let bar = bar.get_or_insert_with(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        bar.set_message(activity.to_string());
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    let services = Services::new(&cli)?;
    let mut session = Session::new(cli.api_key.clone().unwrap_or_default(), "");

    if let Some(url) = cli.url {
        session.url = url;
        let succeeded = services.summarize(&session).await;
        return Ok(if succeeded {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    println!("Summarize YouTube Videos & Websites ({})", services.models.model());
    println!("Press Enter to keep the value in brackets, Esc or Ctrl-D to quit.\n");

    loop {
        let Some(api_key) = prompt_secret("API Key", &session.api_key)? else {
            break;
        };
        session.api_key = api_key;

        let Some(url) = prompt_line("Enter YouTube or Website URL", &session.url)? else {
            break;
        };
        session.url = url;

        services.summarize(&session).await;
    }

    Ok(ExitCode::SUCCESS)
}

/// Reads a line, keeping `previous` on empty input. `None` on end of input.
fn prompt_line(label: &str, previous: &str) -> Result<Option<String>> {
    print!("{label} [{previous}]: ");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let line = line.trim();
    Ok(Some(if line.is_empty() {
        previous.to_owned()
    } else {
        line.to_owned()
    }))
}

/// Restores cooked mode when dropped.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("Unable to enable raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads a secret echoing `*`, keeping `previous` on empty input.
/// `None` when the user quits.
fn prompt_secret(label: &str, previous: &str) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        return prompt_line(label, previous);
    }

    let hint = if previous.is_empty() { "" } else { "saved" };
    print!("{label} [{hint}]: ");
    io::stdout().flush()?;

    let mut secret = String::new();
    {
        let _raw = RawMode::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Enter => break,
                KeyCode::Esc => {
                    print!("\r\n");
                    return Ok(None);
                }
                KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    print!("\r\n");
                    return Ok(None);
                }
                KeyCode::Backspace => {
                    if secret.pop().is_some() {
                        print!("\u{8} \u{8}");
                    }
                }
                KeyCode::Char(c) => {
                    secret.push(c);
                    print!("*");
                }
                _ => {}
            }
            io::stdout().flush()?;
        }
    }
    println!();

    Ok(Some(if secret.trim().is_empty() {
        previous.to_owned()
    } else {
        secret.trim().to_owned()
    }))
}
