mod commands;
mod render;
mod repl;

use std::fmt;

use services::{Clock, TutorServices};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tutor_core::model::LessonId;

use crate::commands::Command;
use crate::repl::{Reaction, Repl};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLessonId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLessonId { raw } => write!(f, "invalid --lesson value: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--lesson <id>]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TUTOR_AI_API_KEY    API key for the evaluator and tutor (required for judging)");
    eprintln!("  TUTOR_AI_BASE_URL   OpenAI-compatible endpoint (default https://api.openai.com/v1)");
    eprintln!("  TUTOR_AI_MODEL      model name (default gpt-4o-mini)");
    eprintln!("  RUST_LOG            log filter (default warn)");
}

#[derive(Debug, Default)]
struct Args {
    lesson: Option<LessonId>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--lesson" => {
                    let value = require_value(args, "--lesson")?;
                    let id = LessonId::new(value.clone())
                        .map_err(|_| ArgsError::InvalidLessonId { raw: value })?;
                    parsed.lesson = Some(id);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn write_out(stdout: &mut tokio::io::Stdout, text: &str) -> std::io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    let services = TutorServices::from_env(Clock::default())?;
    let player = services.player(args.lesson.as_ref())?;
    tracing::debug!(lesson_id = %player.current_lesson().id(), "starting session");
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut repl = Repl::new(services, player, events_tx);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    write_out(&mut stdout, &repl.intro()).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                // EOF ends the session like `:quit`.
                let Some(line) = line? else { break };
                match repl.handle(Command::parse(&line)) {
                    Reaction::Print(text) => write_out(&mut stdout, &text).await?,
                    Reaction::Quit => break,
                }
            }
            Some(event) = events_rx.recv() => {
                let text = repl.on_event(event);
                write_out(&mut stdout, &text).await?;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_string());
        Args::parse(&mut iter)
    }

    #[test]
    fn defaults_to_first_lesson() {
        assert!(parse(&[]).unwrap().lesson.is_none());
    }

    #[test]
    fn reads_lesson_flag() {
        let args = parse(&["--lesson", "i1"]).unwrap();
        assert_eq!(args.lesson, Some(LessonId::new("i1").unwrap()));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            parse(&["--lesson"]),
            Err(ArgsError::MissingValue { flag: "--lesson" })
        ));
        assert!(matches!(
            parse(&["--lesson", "  "]),
            Err(ArgsError::InvalidLessonId { .. })
        ));
        assert!(matches!(
            parse(&["--verbose"]),
            Err(ArgsError::UnknownArg(arg)) if arg == "--verbose"
        ));
    }
}
