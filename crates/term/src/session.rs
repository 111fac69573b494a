//! Interactive session: prompt, line editing and the foreground process.
//!
//! While no process runs, the session owns both handler slots of the
//! connection. Raw input is collected into a [`LineBuffer`]; submitted lines
//! are started as processes on the session's [`ProcessTable`]. A running
//! process takes over the signal slot, so Ctrl-C reaches it instead of the
//! prompt, while the input slot stays with the session and type-ahead is
//! queued until the process finishes.

use anyhow::Result;
use pl_core::commands::CommandRegistry;
use pl_core::connection::{Connection, HandlerGuard, InputConsumer, SignalConsumer};
use pl_core::state::{ProcessHandle, ProcessTable};
use pl_protocol::{CommandResult, Event, SessionConfig, Signal};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_stream::{Stream, StreamExt};

use crate::input::TermInput;

const CARRIAGE_RETURN: u32 = 13;
const LINE_FEED: u32 = 10;
const BACKSPACE: u32 = 127;
const CTRL_H: u32 = 8;

/// How long to wait for a stopping process before interrupting it again.
const STOP_RETRY: Duration = Duration::from_millis(20);

/// Result of feeding one code point to a [`LineBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEdit {
    /// A character was appended.
    Insert(char),
    /// The last character was removed.
    Erase,
    /// The line was submitted; the buffer is empty again.
    Submit(String),
    /// Nothing changed.
    Ignore,
}

/// The line being typed at the prompt.
#[derive(Debug, Default)]
pub struct LineBuffer {
    line: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one code point of raw input.
    pub fn feed(&mut self, code: u32) -> LineEdit {
        match code {
            CARRIAGE_RETURN | LINE_FEED => LineEdit::Submit(std::mem::take(&mut self.line)),
            BACKSPACE | CTRL_H => match self.line.pop() {
                Some(_) => LineEdit::Erase,
                None => LineEdit::Ignore,
            },
            code => match char::from_u32(code) {
                Some(c) if !c.is_control() => {
                    self.line.push(c);
                    LineEdit::Insert(c)
                }
                _ => LineEdit::Ignore,
            },
        }
    }

    pub fn clear(&mut self) {
        self.line.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }
}

/// Receiver for lifecycle events, e.g. to print them.
pub type EventSink = Box<dyn FnMut(&Event) + Send>;

/// Whether the session keeps going after handling something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Commands handled by the session itself rather than by a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Exit,
    Help,
    Jobs,
}

impl Builtin {
    const NAMES: [&'static str; 3] = ["exit", "help", "jobs"];

    fn parse(line: &str) -> Option<Self> {
        match line.split_whitespace().next()? {
            "exit" => Some(Builtin::Exit),
            "help" => Some(Builtin::Help),
            "jobs" => Some(Builtin::Jobs),
            _ => None,
        }
    }
}

/// An interactive session on a connection.
pub struct Session {
    connection: Arc<dyn Connection>,
    config: SessionConfig,
    registry: CommandRegistry,
    table: Arc<ProcessTable>,
    events_rx: UnboundedReceiver<Event>,
    event_sink: Option<EventSink>,
    line: LineBuffer,
    pending: VecDeque<String>,
    foreground: Option<ProcessHandle>,
}

impl Session {
    /// Create a session running commands from `registry` on `connection`.
    pub fn new(
        connection: Arc<dyn Connection>,
        config: SessionConfig,
        registry: CommandRegistry,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let table = ProcessTable::new(Arc::clone(&connection), &config, events_tx);

        Self {
            connection,
            config,
            registry,
            table,
            events_rx,
            event_sink: None,
            line: LineBuffer::new(),
            pending: VecDeque::new(),
            foreground: None,
        }
    }

    /// Hand every lifecycle event to `sink` as the session observes it.
    pub fn with_event_sink(mut self, sink: impl FnMut(&Event) + Send + 'static) -> Self {
        self.event_sink = Some(Box::new(sink));
        self
    }

    /// The session's process table.
    pub fn table(&self) -> &Arc<ProcessTable> {
        &self.table
    }

    /// Run the prompt loop until `exit`, Ctrl-D on an empty line, or the end
    /// of `inputs`.
    ///
    /// The session's handlers are installed for the duration of the call and
    /// the previous ones are restored when it returns. A foreground process
    /// still running at that point is interrupted and joined first, so its
    /// own restore cannot outlive the session's.
    pub async fn run<S>(&mut self, mut inputs: S) -> Result<()>
    where
        S: Stream<Item = TermInput> + Unpin,
    {
        let (idle_tx, mut idle_rx) = mpsc::unbounded_channel::<TermInput>();
        let signals_tx = idle_tx.clone();

        let on_signal: SignalConsumer = Arc::new(move |signal| {
            let _ = signals_tx.send(TermInput::Signal(signal));
        });
        let on_input: InputConsumer = Arc::new(move |codes: &[u32]| {
            let _ = idle_tx.send(TermInput::Keys(codes.to_vec()));
        });

        let connection = Arc::clone(&self.connection);
        let _handlers = HandlerGuard::install(connection.as_ref(), on_signal);
        connection.set_stdin_handler(Some(on_input));

        tracing::debug!("session started");
        self.prompt();

        loop {
            // Whatever the handlers already received is handled before the
            // next terminal input is read.
            let flow = select! {
                biased;

                Some(input) = idle_rx.recv() => match input {
                    TermInput::Signal(signal) => self.handle_signal(signal),
                    TermInput::Keys(codes) => self.handle_keys(&codes),
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event),
                input = inputs.next() => match input {
                    Some(TermInput::Signal(signal)) => {
                        connection.deliver_signal(signal);
                        Flow::Continue
                    }
                    Some(TermInput::Keys(codes)) => {
                        connection.deliver_input(&codes);
                        Flow::Continue
                    }
                    None => Flow::Exit,
                },
            };

            if flow == Flow::Exit {
                break;
            }
        }

        if let Some(handle) = self.foreground.take() {
            self.stop_foreground(handle).await?;
        }
        tracing::debug!("session ended");
        Ok(())
    }

    /// Interrupt `handle` and wait for its run to end.
    async fn stop_foreground(&mut self, handle: ProcessHandle) -> Result<()> {
        let pid = handle.pid();
        let process = Arc::clone(handle.process());
        let mut joined = tokio::task::spawn_blocking(move || handle.join());

        // A process that has not started running drops the interrupt.
        let result = loop {
            process.accept(Signal::Int);
            if let Ok(outcome) = tokio::time::timeout(STOP_RETRY, &mut joined).await {
                break outcome?;
            }
        };
        tracing::debug!(pid, ?result, "foreground process stopped");

        while let Ok(event) = self.events_rx.try_recv() {
            self.publish(&event);
        }
        Ok(())
    }

    /// Run a single line to completion without the prompt loop.
    ///
    /// Lines the registry rejects are reported on the connection and count
    /// as a failure.
    pub async fn run_once(&mut self, line: &str) -> Result<CommandResult> {
        if let Some(builtin) = Builtin::parse(line) {
            self.run_builtin(builtin);
            return Ok(CommandResult::Success);
        }

        let execution = match self.registry.parse(line) {
            Ok(Some(execution)) => execution,
            Ok(None) => return Ok(CommandResult::Success),
            Err(e) => {
                self.write_line(&e.to_string());
                return Ok(CommandResult::Failure);
            }
        };

        let handle = self.table.start(Box::new(execution))?;
        let result = tokio::task::spawn_blocking(move || handle.join()).await?;

        while let Ok(event) = self.events_rx.try_recv() {
            self.publish(&event);
        }
        Ok(result.unwrap_or(CommandResult::Failure))
    }

    fn handle_keys(&mut self, codes: &[u32]) -> Flow {
        for &code in codes {
            match self.line.feed(code) {
                LineEdit::Insert(c) => self.connection.write(c.encode_utf8(&mut [0; 4])),
                LineEdit::Erase => self.connection.write("\u{8} \u{8}"),
                LineEdit::Submit(line) => {
                    self.connection.write(&self.config.line_separator);
                    if self.foreground.is_some() {
                        self.pending.push_back(line);
                    } else if self.dispatch(&line) == Flow::Exit || self.settle() == Flow::Exit {
                        return Flow::Exit;
                    }
                }
                LineEdit::Ignore => {}
            }
        }
        Flow::Continue
    }

    /// Signals that reach the session's own handler.
    fn handle_signal(&mut self, signal: Signal) -> Flow {
        if self.foreground.is_some() {
            // Arrived between the process restoring the slot and its
            // finished event.
            tracing::debug!(%signal, "signal dropped while a process finishes");
            return Flow::Continue;
        }

        match signal {
            Signal::Int => {
                self.line.clear();
                self.connection.write("^C");
                self.connection.write(&self.config.line_separator);
                self.prompt();
                Flow::Continue
            }
            Signal::Eof if self.line.is_empty() => {
                self.connection.write(&self.config.line_separator);
                Flow::Exit
            }
            signal => {
                tracing::debug!(%signal, "signal ignored at the prompt");
                Flow::Continue
            }
        }
    }

    fn handle_event(&mut self, event: Event) -> Flow {
        self.publish(&event);

        match event {
            Event::ProcessFinished { pid, .. }
                if self.foreground.as_ref().map(ProcessHandle::pid) == Some(pid) =>
            {
                self.foreground = None;
                self.settle()
            }
            _ => Flow::Continue,
        }
    }

    /// Start queued lines until one becomes the foreground process, then
    /// show the prompt if the session is idle.
    fn settle(&mut self) -> Flow {
        while self.foreground.is_none() {
            let Some(line) = self.pending.pop_front() else {
                self.prompt();
                self.connection.write(self.line.as_str());
                return Flow::Continue;
            };

            self.prompt();
            self.write_line(&line);
            if self.dispatch(&line) == Flow::Exit {
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    /// Handle one submitted line while idle.
    fn dispatch(&mut self, line: &str) -> Flow {
        if let Some(builtin) = Builtin::parse(line) {
            return self.run_builtin(builtin);
        }

        match self.registry.parse(line) {
            Ok(Some(execution)) => match self.table.start(Box::new(execution)) {
                Ok(handle) => {
                    self.foreground = Some(handle);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to start process");
                    self.write_line(&e.to_string());
                }
            },
            Ok(None) => {}
            Err(e) => self.write_line(&e.to_string()),
        }
        Flow::Continue
    }

    fn run_builtin(&mut self, builtin: Builtin) -> Flow {
        match builtin {
            Builtin::Exit => return Flow::Exit,
            Builtin::Help => {
                self.write_line(&format!("session: {}", Builtin::NAMES.join(" ")));
                self.write_line(&format!("commands: {}", self.registry.names().join(" ")));
            }
            Builtin::Jobs => {
                for info in self.table.active_processes() {
                    self.write_line(&format!("[{}] {} {}", info.pid, info.status, info.command));
                }
            }
        }
        Flow::Continue
    }

    fn publish(&mut self, event: &Event) {
        if let Some(sink) = self.event_sink.as_mut() {
            sink(event);
        }
    }

    fn prompt(&self) {
        self.connection.write(&self.config.prompt);
    }

    fn write_line(&self, text: &str) {
        self.connection
            .write(&format!("{text}{}", self.config.line_separator));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(buffer: &mut LineBuffer, text: &str) -> Vec<LineEdit> {
        text.chars().map(|c| buffer.feed(u32::from(c))).collect()
    }

    #[test]
    fn test_line_buffer_inserts_printable_chars() {
        let mut buffer = LineBuffer::new();
        let edits = feed_all(&mut buffer, "ls é");

        assert_eq!(edits.len(), 4);
        assert_eq!(edits[3], LineEdit::Insert('é'));
        assert_eq!(buffer.as_str(), "ls é");
    }

    #[test]
    fn test_line_buffer_erase() {
        let mut buffer = LineBuffer::new();
        feed_all(&mut buffer, "ab");

        assert_eq!(buffer.feed(BACKSPACE), LineEdit::Erase);
        assert_eq!(buffer.feed(CTRL_H), LineEdit::Erase);
        assert_eq!(buffer.feed(BACKSPACE), LineEdit::Ignore);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_line_buffer_submit_resets() {
        let mut buffer = LineBuffer::new();
        feed_all(&mut buffer, "echo hi");

        assert_eq!(buffer.feed(CARRIAGE_RETURN), LineEdit::Submit("echo hi".to_string()));
        assert!(buffer.is_empty());
        assert_eq!(buffer.feed(LINE_FEED), LineEdit::Submit(String::new()));
    }

    #[test]
    fn test_line_buffer_ignores_control_codes() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.feed(9), LineEdit::Ignore);
        assert_eq!(buffer.feed(27), LineEdit::Ignore);
        assert_eq!(buffer.feed(1), LineEdit::Ignore);
        assert_eq!(buffer.feed(0xD800), LineEdit::Ignore);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_builtin_parse() {
        assert_eq!(Builtin::parse("exit"), Some(Builtin::Exit));
        assert_eq!(Builtin::parse("  help "), Some(Builtin::Help));
        assert_eq!(Builtin::parse("jobs -l"), Some(Builtin::Jobs));
        assert_eq!(Builtin::parse("echo exit"), None);
        assert_eq!(Builtin::parse(""), None);
    }

    #[test]
    fn test_line_buffer_clear() {
        let mut buffer = LineBuffer::new();
        feed_all(&mut buffer, "partial");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.as_str(), "");
    }
}
