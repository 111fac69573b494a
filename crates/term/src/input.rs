//! Terminal events as signals and raw input.
//!
//! Control keys that a line discipline would normally turn into signals are
//! mapped to [`Signal`]s here; everything else becomes Unicode code points
//! for whoever holds the input slot.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pl_protocol::Signal;
use std::pin::Pin;
use tokio_stream::{Stream, StreamExt};

/// Input delivered by the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermInput {
    /// A signal for the signal slot.
    Signal(Signal),
    /// Code points for the raw input slot.
    Keys(Vec<u32>),
}

const ENTER: u32 = 13;
const TAB: u32 = 9;
const BACKSPACE: u32 = 127;
const ESCAPE: u32 = 27;

/// Map a crossterm event to terminal input. Returns `None` for events that
/// carry nothing for the session (key releases, focus changes, mouse).
pub fn classify(event: &Event) -> Option<TermInput> {
    match event {
        Event::Key(key) => classify_key(key),
        Event::Paste(text) => Some(TermInput::Keys(text.chars().map(u32::from).collect())),
        Event::Resize(_, _) => Some(TermInput::Signal(Signal::Winch)),
        _ => None,
    }
}

fn classify_key(key: &KeyEvent) -> Option<TermInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = key.code {
            return Some(control(c));
        }
    }

    let code = match key.code {
        KeyCode::Char(c) => u32::from(c),
        KeyCode::Enter => ENTER,
        KeyCode::Tab => TAB,
        KeyCode::Backspace => BACKSPACE,
        KeyCode::Esc => ESCAPE,
        _ => return None,
    };
    Some(TermInput::Keys(vec![code]))
}

fn control(c: char) -> TermInput {
    let c = c.to_ascii_lowercase();
    let signal = match c {
        'c' => Signal::Int,
        // Some terminals report Ctrl-\ as Ctrl-4.
        '\\' | '4' => Signal::Quit,
        'z' => Signal::Susp,
        'd' => Signal::Eof,
        't' => Signal::Info,
        'a'..='z' => return TermInput::Keys(vec![u32::from(c) - u32::from('a') + 1]),
        _ => return TermInput::Keys(vec![u32::from(c)]),
    };
    TermInput::Signal(signal)
}

/// Stream of terminal input read from crossterm's event stream.
///
/// The stream ends when the terminal reports a read error.
pub fn input_stream() -> Pin<Box<dyn Stream<Item = TermInput> + Send + 'static>> {
    let mut crossterm_events = EventStream::new();

    let input_stream = async_stream::stream! {
        while let Some(event) = crossterm_events.next().await {
            match event {
                Ok(event) => {
                    if let Some(input) = classify(&event) {
                        yield input;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "terminal input failed");
                    break;
                }
            }
        }
    };

    Box::pin(input_stream)
}
