//! Interactive terminal chat and the `search` command.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::adapter::SessionAdapter;
use crate::chat::{view, ChatState, Submission};
use crate::client::OramaClient;
use crate::config::MedchatConfig;
use crate::error::{MedchatError, Result};
use crate::session::{SessionEvent, SessionEventSink};
use crate::types::SearchParams;

use super::SearchArgs;

const SCROLL_STEP: u16 = 5;

/// Everything the chat loop reacts to besides keystrokes, on one queue.
#[derive(Debug)]
pub enum AppEvent {
    Session(SessionEvent),
    AskFailed(MedchatError),
}

impl AppEvent {
    /// Fold this event into the view state.
    pub fn apply(self, state: &mut ChatState) {
        match self {
            Self::Session(event) => event.dispatch(state),
            Self::AskFailed(err) => state.ask_failed(&err),
        }
    }
}

/// Whether the chat loop keeps going after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Sink that forwards session events onto the app queue.
pub fn session_sink(tx: mpsc::UnboundedSender<AppEvent>) -> SessionEventSink {
    Arc::new(move |event| {
        let _ = tx.send(AppEvent::Session(event));
    })
}

/// Restores the terminal when dropped, including on early return.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Run the interactive chat until the user quits.
///
/// The client is built before the terminal is touched, so a missing endpoint
/// or key fails with a plain error message.
pub async fn run_chat(config: MedchatConfig) -> Result<()> {
    let client = OramaClient::new(&config)?;
    info!(endpoint = client.endpoint(), "Starting chat");

    let (tx, rx) = mpsc::unbounded_channel();
    let sink = session_sink(tx.clone());
    let adapter = SessionAdapter::from_config(Arc::new(client), &config, sink);
    info!(
        conversation_id = adapter.session().conversation_id(),
        "Answer session created"
    );

    let mut guard = TerminalGuard::enter()?;
    event_loop(&mut guard.terminal, &adapter, tx, rx).await
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    adapter: &SessionAdapter,
    tx: mpsc::UnboundedSender<AppEvent>,
    mut rx: mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let mut state = ChatState::new();
    let mut keys = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(300));

    loop {
        terminal.draw(|frame| view::draw(frame, &state))?;

        tokio::select! {
            _ = ticker.tick() => {
                if state.is_loading() {
                    state.advance_tick();
                }
            }
            Some(event) = rx.recv() => event.apply(&mut state),
            key = keys.next() => match key {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if handle_key(&mut state, key, adapter, &tx) == Flow::Quit {
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }
    }
    Ok(())
}

/// React to one key press. Questions are spawned onto the runtime and report
/// failure back through `tx`.
pub fn handle_key(
    state: &mut ChatState,
    key: KeyEvent,
    adapter: &SessionAdapter,
    tx: &mpsc::UnboundedSender<AppEvent>,
) -> Flow {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => return Flow::Quit,
        KeyCode::Esc => state.dismiss_error(),
        KeyCode::Enter => match state.submit() {
            Some(Submission::Ask(term)) => spawn_ask(adapter.clone(), term, tx.clone()),
            Some(Submission::Clear) => adapter.clear(),
            None => {}
        },
        KeyCode::Backspace => state.backspace(),
        KeyCode::PageUp => state.scroll_up(SCROLL_STEP),
        KeyCode::PageDown => state.scroll_down(SCROLL_STEP),
        KeyCode::Up => state.scroll_up(1),
        KeyCode::Down => state.scroll_down(1),
        KeyCode::Char(c) if !ctrl => state.push_char(c),
        _ => {}
    }
    Flow::Continue
}

// Pending asks are not awaited or guarded; a second submit runs alongside.
fn spawn_ask(adapter: SessionAdapter, term: String, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        if let Err(err) = adapter.ask(&term).await {
            error!(error = %err, "Error asking question");
            let _ = tx.send(AppEvent::AskFailed(err));
        }
    });
}

/// Run a direct search and print the hits as JSON.
pub async fn run_search(config: MedchatConfig, args: SearchArgs) -> Result<()> {
    let client = OramaClient::new(&config)?;
    let sink: SessionEventSink = Arc::new(|_| {});
    let adapter = SessionAdapter::from_config(Arc::new(client), &config, sink);

    let params = SearchParams::builder()
        .term(args.term)
        .mode(args.mode)
        .maybe_limit(args.limit)
        .build();
    let results = adapter.search_with(params).await?;
    info!(hits = results.count, "Search finished");

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
