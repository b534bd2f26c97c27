//! oxline demo: a raw-mode echo shell on top of the line editor.
use anyhow::{Context, Result};
use clap::Parser;
use core_completion::WordListCompleter;
use core_config::{CharsetName, Config, load_from};
use core_readline::Readline;
use core_state::Prompt;
use core_terminal::{
    Charset, CloseReason, Connection, CrosstermBackend, Signal, TerminalBackend,
    TerminalConnection,
};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE_NAME: &str = "oxline.log";
const LINE_BREAK: &str = "\r\n";
const BUILTIN_COMMANDS: &[&str] = &["exit", "help", "history", "clear"];

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxline", version, about = "Line editor demo shell")]
struct Args {
    /// Configuration file path (overrides discovery of `oxline.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Directory for `oxline.log`.
    #[arg(long = "log-dir", default_value = ".")]
    log_dir: PathBuf,
}

/// What the reader thread reports to the main loop.
#[derive(Debug)]
enum SessionEvent {
    Line(String),
    Interrupt,
    Closed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    ExitCommand,
    StreamClosed,
    ChannelClosed,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownReason::ExitCommand => "exit_command",
            ShutdownReason::StreamClosed => "stream_closed",
            ShutdownReason::ChannelClosed => "channel_closed",
        })
    }
}

/// Result of running one accepted line.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Print(String),
    Clear,
    Exit,
}

fn evaluate(line: &str, history: &[String]) -> Reply {
    match line.trim() {
        "exit" => Reply::Exit,
        "clear" => Reply::Clear,
        "help" => Reply::Print(format!("commands: {}", BUILTIN_COMMANDS.join(" "))),
        "history" => Reply::Print(
            history
                .iter()
                .enumerate()
                .map(|(i, entry)| format!("{:>4}  {entry}", i + 1))
                .collect::<Vec<_>>()
                .join(LINE_BREAK),
        ),
        "" => Reply::Print(String::new()),
        _ => Reply::Print(format!("echo: {line}")),
    }
}

fn charset(name: CharsetName) -> Charset {
    match name {
        CharsetName::Utf8 => Charset::Utf8,
        CharsetName::Latin1 => Charset::Latin1,
    }
}

fn configure_logging(log_dir: &Path) -> Result<Option<WorkerGuard>> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Ok(Some(guard)),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn arm(readline: &Readline, conn: &dyn Connection, prompt: &str, tx: &Sender<SessionEvent>) {
    let tx = tx.clone();
    readline.readline(conn, Prompt::new(prompt), move |line| {
        let _ = tx.send(SessionEvent::Line(line));
    });
}

fn write(conn: &dyn Connection, text: &str) {
    if let Err(e) = conn.write_str(text) {
        warn!(target: "runtime", error = %e, "write_failed");
    }
}

fn run_shell(
    readline: &Readline,
    conn: &dyn Connection,
    prompt: &str,
    tx: &Sender<SessionEvent>,
    rx: &Receiver<SessionEvent>,
) -> ShutdownReason {
    arm(readline, conn, prompt, tx);
    loop {
        let event = match rx.recv() {
            Ok(event) => event,
            Err(_) => return ShutdownReason::ChannelClosed,
        };
        match event {
            SessionEvent::Line(line) => {
                debug!(target: "runtime", len = line.len(), "line_received");
                let history = readline.with_processor(|p| p.history().get_all());
                match evaluate(&line, &history) {
                    Reply::Exit => return ShutdownReason::ExitCommand,
                    Reply::Clear => write(conn, "\x1b[2J\x1b[H"),
                    Reply::Print(text) if text.is_empty() => {}
                    Reply::Print(text) => write(conn, &format!("{text}{LINE_BREAK}")),
                }
            }
            SessionEvent::Interrupt => {
                debug!(target: "runtime", "interrupt");
                readline.with_processor(|p| p.console_mut().reset());
                write(conn, &format!("^C{LINE_BREAK}"));
            }
            SessionEvent::Closed(reason) => {
                info!(target: "runtime", %reason, "connection_closed");
                return ShutdownReason::StreamClosed;
            }
        }
        arm(readline, conn, prompt, tx);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(&args.log_dir)?;
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config: Config = load_from(args.config.clone())?;
    let readline = Readline::new(&config).context("opening history")?;
    readline.add_completer(Box::new(WordListCompleter::new(BUILTIN_COMMANDS.iter().copied())));
    let prompt = config.file.editing.prompt.clone();

    let mut backend = CrosstermBackend::new();
    backend.set_title("oxline")?;
    let guard = backend.enter_guard()?;

    let conn = Arc::new(TerminalConnection::stdio(charset(config.file.terminal.charset)));
    info!(
        target: "runtime.startup",
        term = conn.terminal_type(),
        columns = conn.size().columns,
        config_override = args.config.is_some(),
        "bootstrap_complete"
    );

    let (tx, rx) = unbounded();
    let signal_tx = tx.clone();
    conn.set_signal_handler(Some(Arc::new(move |signal: Signal| {
        if signal == Signal::Int {
            let _ = signal_tx.send(SessionEvent::Interrupt);
        }
    })));
    let close_tx = tx.clone();
    conn.set_close_handler(Some(Box::new(move |reason: CloseReason| {
        let _ = close_tx.send(SessionEvent::Closed(reason.to_string()));
    })));
    // The reader blocks on stdin until the process exits; it is never joined.
    let _reader = Arc::clone(&conn).spawn_reader().context("spawning reader thread")?;

    let reason = run_shell(&readline, &*conn, &prompt, &tx, &rx);
    info!(target: "runtime.shutdown", %reason, "shutdown");

    drop(guard);
    if let Err(e) = readline.stop() {
        eprintln!("oxline: could not save history: {e}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_commands() {
        assert_eq!(evaluate(" exit ", &[]), Reply::Exit);
        assert_eq!(evaluate("clear", &[]), Reply::Clear);
        assert_eq!(evaluate("", &[]), Reply::Print(String::new()));
        assert!(matches!(evaluate("help", &[]), Reply::Print(t) if t.contains("history")));
    }

    #[test]
    fn other_lines_are_echoed() {
        assert_eq!(evaluate("ls -l", &[]), Reply::Print("echo: ls -l".to_string()));
    }

    #[test]
    fn history_is_numbered() {
        let history = vec!["ls".to_string(), "pwd".to_string()];
        assert_eq!(
            evaluate("history", &history),
            Reply::Print("   1  ls\r\n   2  pwd".to_string())
        );
    }

    #[test]
    fn charset_names_map() {
        assert_eq!(charset(CharsetName::Latin1), Charset::Latin1);
        assert_eq!(charset(CharsetName::Utf8), Charset::Utf8);
    }
}
