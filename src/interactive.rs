//! Line-based interactive session.
//!
//! Reads commands from stdin, one per line, and drives a [`Session`]. A line
//! that is not a command but looks like a path (what a terminal pastes when
//! a file is dropped onto it) is treated as `load <path>`.
//!
//! Commands run to completion before the next line is read, so at most one
//! caption request is ever outstanding.

use crate::captioning::CaptionProvider;
use crate::compositing::{RenderBackend, RenderOptions};
use crate::config::ExportConfig;
use crate::output;
use crate::session::{Session, SessionError};
use crate::source::parse_dropped_path;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Regenerate,
    /// Save into the given directory, or the configured one.
    Download(Option<PathBuf>),
    Show,
    Reset,
    Help,
    Quit,
    /// Blank line.
    Nothing,
    Unknown(String),
}

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything a command needs besides the session itself.
pub struct Context<'a, B: RenderBackend> {
    pub provider: &'a dyn CaptionProvider,
    pub backend: &'a B,
    pub options: RenderOptions,
    pub export: ExportConfig,
}

fn looks_like_path(line: &str) -> bool {
    line.starts_with(['/', '~', '.', '"', '\''])
        || line.starts_with("file://")
        || line.contains(['/', '\\'])
        || Path::new(line).extension().is_some()
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Nothing;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "load" | "open" | "l" if !rest.is_empty() => Command::Load(parse_dropped_path(rest)),
        "regenerate" | "r" if rest.is_empty() => Command::Regenerate,
        "download" | "d" | "save" => match rest {
            "" => Command::Download(None),
            dir => Command::Download(Some(parse_dropped_path(dir))),
        },
        "show" | "s" if rest.is_empty() => Command::Show,
        "reset" if rest.is_empty() => Command::Reset,
        "help" | "h" | "?" if rest.is_empty() => Command::Help,
        "quit" | "q" | "exit" if rest.is_empty() => Command::Quit,
        _ if looks_like_path(line) => Command::Load(parse_dropped_path(line)),
        _ => Command::Unknown(line.to_string()),
    }
}

fn error_lines(error: &SessionError) -> Vec<String> {
    vec![format!("Error: {}", error)]
}

/// Run one command against `session`, returning what to print.
pub async fn execute<B: RenderBackend>(
    session: &mut Session,
    command: Command,
    ctx: &Context<'_, B>,
) -> (Vec<String>, Flow) {
    let lines = match command {
        Command::Load(path) => match session.load(&path, ctx.provider).await {
            Ok(outcome) => {
                let mut lines = session
                    .image()
                    .map(output::format_loaded)
                    .unwrap_or_default();
                lines.extend(output::format_outcome(&outcome, session.caption()));
                lines
            }
            Err(e) => error_lines(&e),
        },
        Command::Regenerate => match session.regenerate(ctx.provider).await {
            Ok(outcome) => output::format_outcome(&outcome, session.caption()),
            Err(e) => error_lines(&e),
        },
        Command::Download(dir) => {
            let dir = dir.as_deref().unwrap_or(ctx.export.directory.as_path());
            match session.export(ctx.backend, &ctx.options, dir, &ctx.export.file_name) {
                Ok(path) => output::format_saved(&path),
                Err(e) => error_lines(&e),
            }
        }
        Command::Show => output::format_session(session),
        Command::Reset => {
            session.reset();
            vec!["Session cleared".to_string()]
        }
        Command::Help => output::format_help(),
        Command::Quit => return (Vec::new(), Flow::Quit),
        Command::Nothing => Vec::new(),
        Command::Unknown(line) => vec![format!("Unknown command: {} (try 'help')", line)],
    };
    (lines, Flow::Continue)
}

/// Read commands from stdin until `quit` or end of input.
///
/// `initial`, if given, is loaded before the first prompt.
pub async fn run<B: RenderBackend>(
    ctx: &Context<'_, B>,
    initial: Option<&Path>,
) -> std::io::Result<()> {
    let mut session = Session::new();
    let mut stdout = tokio::io::stdout();

    if let Some(path) = initial {
        let (lines, _) = execute(&mut session, Command::Load(path.to_path_buf()), ctx).await;
        output::print_lines(&lines);
    } else {
        output::print_lines(&output::format_help());
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = input.next_line().await? else {
            break;
        };
        let (lines, flow) = execute(&mut session, parse_command(&line), ctx).await;
        output::print_lines(&lines);
        if flow == Flow::Quit {
            break;
        }
    }
    tracing::debug!("interactive session ended");
    Ok(())
}
