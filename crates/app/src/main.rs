//! agent-input entrypoint: the interactive multi-line terminal front-end
//! that collects an agent prompt and emits exactly one clean payload to
//! stdout on submit.

use std::io::{self, Write, stderr};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;

use core_badge::render_for_display;
use core_buffer::Buffer;
use core_commands::{CommandMatcher, CommandRegistry};
use core_config::Config;
use core_errors::EngineError;
use core_events::{Event, InputEvent, KeyEventExt, KeyToken, ModMask, NamedKey};
use core_format::format_output;
use core_history::HistoryStore;
use core_render::box_style::BoxStyle;
use core_render::screen::Screen;
use core_render::theme::{Role, Theme};
use core_render::window::Window;
use core_render::{CellFlags, Frame};
use core_terminal::{CrosstermBackend, TerminalBackend, TerminalCapabilities, TerminalGuard};
use core_text::display::visible_len;
use core_text::pathlike::looks_like_path;

const EVENT_CHANNEL_CAP: usize = core_events::EVENT_CHANNEL_CAP;
const READ_POLL: Duration = Duration::from_millis(100);
const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);
const PASTE_NEWLINE_THRESHOLD: usize = 5;
const PASTE_CHAR_THRESHOLD: usize = 100;
const MAX_VIEWPORT_LINES: usize = 5;
const SUBMIT_MARKER: &str = ">>>";

/// CLI surface: a banner, a prompt label, an optional fixed choice
/// list, and the knobs a shippable binary needs for debugging without
/// touching stdout/stderr purity.
#[derive(Parser, Debug)]
#[command(name = "agent-input", version, about = "Multi-line terminal input front-end for agent prompts")]
struct Args {
    /// Banner text shown above the input box.
    #[arg(long)]
    header: Option<String>,
    /// Label drawn at the start of the input box.
    #[arg(long, default_value = "> ")]
    prompt: String,
    /// Turn the input box into a fixed selection list instead of free text.
    #[arg(long, num_args = 1..)]
    options: Vec<String>,
    /// Suppress the header banner even when --header is set.
    #[arg(long)]
    skip_welcome: bool,
    /// Explicit config file path (overrides discovery).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Explicit log file path. Defaults to `agent-input.log` in the current directory.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("agent-input").join("history.log"))
        .or_else(|| Some(PathBuf::from("agent-input-history.log")))
}

struct AppStartup {
    backend: CrosstermBackend,
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            log_guard: None,
        }
    }

    fn configure_logging(&mut self, log_file: Option<&Path>) {
        let path = log_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("agent-input.log"));
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("agent-input.log")
            .to_string();

        let file_appender = tracing_appender::rolling::never(dir, file_name);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(()) => self.log_guard = Some(guard),
            Err(_) => {
                // Global subscriber already installed (e.g. under a test harness); drop
                // the guard so the non-blocking writer thread shuts down cleanly.
            }
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

    /// Acquire raw mode / alt screen and return a guard that restores the
    /// terminal on drop, even through a panic unwind.
    fn enter(&mut self) -> Result<TerminalGuard<'_>> {
        self.backend.set_title("agent-input")?;
        self.backend.enter_guard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Input,
    Paste,
    History,
    Search,
}

enum ExitOutcome {
    Submit(String),
    Cancel,
}

/// Unwrap a `Chord` token into its base key plus modifier mask; a plain
/// (non-chord) token carries no modifiers.
fn chord_parts(token: &KeyToken) -> (&KeyToken, ModMask) {
    match token {
        KeyToken::Chord { base, mods } => (base.as_ref(), *mods),
        other => (other, ModMask::empty()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PasteClassification {
    Marker,
    FilePath,
    Text,
}

/// Decide how a collected paste blob should land in the buffer.
fn classify_paste_kind(payload: &str) -> PasteClassification {
    let newline_count = payload.matches('\n').count();
    let char_count = payload.chars().count();
    if newline_count >= PASTE_NEWLINE_THRESHOLD || char_count >= PASTE_CHAR_THRESHOLD {
        PasteClassification::Marker
    } else if !payload.contains('\n') && looks_like_path(payload) {
        PasteClassification::FilePath
    } else {
        PasteClassification::Text
    }
}

/// True when `line`'s cursor sits exactly at its end and the line ends with
/// the trailing-`>>>` auto-submit marker.
fn ends_with_submit_marker(line: &str, col: usize) -> bool {
    col == line.chars().count() && line.ends_with(SUBMIT_MARKER)
}

struct App<'a> {
    args: Args,
    config: Config,
    theme: Theme,
    registry: CommandRegistry,
    matcher: CommandMatcher,
    history: HistoryStore,
    buffer: Buffer,
    mode: Mode,
    search_query: String,
    search_status: Option<String>,
    selected_option: usize,
    paste_buffer: Option<String>,
    resize_deadline: Option<Instant>,
    clipboard: Option<arboard::Clipboard>,
    _terminal_guard: TerminalGuard<'a>,
}

impl<'a> App<'a> {
    fn using_options(&self) -> bool {
        !self.args.options.is_empty()
    }

    async fn run(&mut self, mut rx: mpsc::Receiver<Event>, mut screen: Screen<io::Stderr>) -> Result<ExitOutcome> {
        self.render(&mut screen)?;
        loop {
            if let Some(deadline) = self.resize_deadline {
                if Instant::now() >= deadline {
                    self.resize_deadline = None;
                    self.render(&mut screen)?;
                }
            }

            let event = match tokio::time::timeout(READ_POLL, rx.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => return Ok(ExitOutcome::Cancel),
                Err(_) => continue,
            };

            let mut needs_render = true;
            match event {
                Event::Shutdown => return Ok(ExitOutcome::Cancel),
                Event::Input(InputEvent::CtrlC) => return Ok(ExitOutcome::Cancel),
                Event::Input(InputEvent::Resize(w, h)) => {
                    screen.resize(w, h);
                    self.resize_deadline = Some(Instant::now() + RESIZE_DEBOUNCE);
                    needs_render = false;
                }
                Event::Input(InputEvent::PasteStart) => self.handle_paste_start(),
                Event::Input(InputEvent::PasteChunk(chunk)) => self.handle_paste_chunk(chunk),
                Event::Input(InputEvent::PasteEnd) => self.handle_paste_end(),
                Event::Input(InputEvent::KeyPress(key)) => {
                    let outcome = if self.using_options() {
                        self.handle_options_key(key)
                    } else {
                        self.handle_key(key)
                    };
                    if let Some(outcome) = outcome {
                        return Ok(outcome);
                    }
                }
            }

            if needs_render {
                self.render(&mut screen)?;
            }
        }
    }

    fn handle_paste_start(&mut self) {
        if self.using_options() {
            return;
        }
        self.paste_buffer = Some(String::new());
        self.mode = Mode::Paste;
    }

    fn handle_paste_chunk(&mut self, chunk: String) {
        if self.using_options() {
            return;
        }
        match self.paste_buffer.as_mut() {
            Some(buf) => buf.push_str(&chunk),
            None => self.paste_buffer = Some(chunk),
        }
    }

    fn handle_paste_end(&mut self) {
        if self.using_options() {
            return;
        }
        let payload = self.paste_buffer.take().unwrap_or_default();
        self.classify_and_insert_paste(&payload);
        self.mode = Mode::Input;
    }

    fn classify_and_insert_paste(&mut self, payload: &str) {
        match classify_paste_kind(payload) {
            PasteClassification::Marker => match core_badge::create_paste_marker(payload) {
                Ok(marker) => self.buffer.insert_text(&marker),
                Err(err) => {
                    debug!(target: "paste", error = %err, "paste_marker_rejected");
                    self.buffer.insert_formatted_paste(payload);
                }
            },
            PasteClassification::FilePath => match core_badge::create_file_marker(payload) {
                Ok(marker) => self.buffer.insert_text(&marker),
                Err(err) => {
                    debug!(target: "paste", error = %err, "file_marker_rejected");
                    self.buffer.insert_formatted_paste(payload);
                }
            },
            PasteClassification::Text => self.buffer.insert_formatted_paste(payload),
        }
    }

    fn paste_from_clipboard(&mut self) {
        if self.using_options() {
            return;
        }
        let text = self.clipboard.as_mut().and_then(|cb| cb.get_text().ok());
        match text {
            Some(text) if !text.is_empty() => self.classify_and_insert_paste(&text),
            _ => {
                let err = EngineError::ClipboardUnavailable("no text on clipboard".to_string());
                debug!(target: "clipboard", error = %err, "clipboard_unavailable");
            }
        }
    }

    fn refresh_matcher(&mut self) {
        if self.matcher.is_active() {
            let (row, _) = self.buffer.cursor();
            let line = self.buffer.line(row).to_string();
            self.matcher.update(&line, &self.registry);
        }
    }

    /// Replace the whole content of the current line with `text`.
    fn replace_current_line(&mut self, text: &str) {
        self.buffer.home();
        self.buffer.kill_to_line_end();
        self.buffer.insert_text(text);
    }

    fn load_text_into_buffer(&mut self, text: &str) {
        self.buffer.clear();
        self.buffer.insert_text(text);
    }

    fn handle_enter(&mut self) {
        if self.matcher.is_active() {
            if let Some(name) = self.matcher.complete() {
                let completed = format!("{name} ");
                self.replace_current_line(&completed);
            }
            self.matcher.deactivate();
        } else {
            self.buffer.newline();
        }
    }

    fn handle_tab(&mut self) {
        if self.matcher.is_active() {
            if let Some(completed) = self.matcher.tab_complete() {
                self.replace_current_line(&completed);
            }
        }
    }

    fn handle_escape(&mut self) {
        if self.matcher.is_active() {
            self.matcher.deactivate();
        }
    }

    fn handle_up(&mut self) {
        if self.matcher.is_active() {
            self.matcher.move_up();
            return;
        }
        let (row, _) = self.buffer.cursor();
        if row == 0 {
            self.mode = Mode::History;
            let current = self.buffer.lines().join("\n");
            if let Some(entry) = self.history.go_back(&current) {
                let entry = entry.to_string();
                self.load_text_into_buffer(&entry);
            }
        } else {
            self.buffer.move_up();
        }
    }

    fn handle_down(&mut self) {
        if self.matcher.is_active() {
            self.matcher.move_down();
            return;
        }
        if self.mode == Mode::History {
            let last_row = self.buffer.line_count().saturating_sub(1);
            let (row, _) = self.buffer.cursor();
            if row == last_row {
                if let Some(entry) = self.history.go_forward() {
                    let entry = entry.to_string();
                    self.load_text_into_buffer(&entry);
                }
                if self.history.browse_pos() == self.history.len() {
                    self.mode = Mode::Input;
                }
                return;
            }
        }
        self.buffer.move_down();
    }

    fn handle_printable(&mut self, c: char) -> bool {
        let (row, col) = self.buffer.cursor();
        if !self.matcher.is_active() && c == '/' && col == 0 && self.buffer.line(row).is_empty() {
            self.buffer.insert_char(c);
            self.matcher.update("/", &self.registry);
            return false;
        }
        self.buffer.insert_char(c);
        self.refresh_matcher();

        let (row, col) = self.buffer.cursor();
        let line = self.buffer.line(row).to_string();
        if ends_with_submit_marker(&line, col) {
            for _ in 0..SUBMIT_MARKER.len() {
                self.buffer.backspace();
            }
            return true;
        }
        false
    }

    fn enter_or_advance_search(&mut self) {
        if self.mode == Mode::Search {
            self.advance_search();
        } else {
            self.mode = Mode::Search;
            self.search_query.clear();
            self.search_status = None;
        }
    }

    fn run_search(&mut self, start_exclusive: usize) {
        if self.search_query.is_empty() {
            self.search_status = None;
            return;
        }
        let start = start_exclusive.saturating_sub(1);
        match self.history.search_backward(&self.search_query, start) {
            Some((_, entry)) => {
                let entry = entry.to_string();
                self.load_text_into_buffer(&entry);
                self.search_status = None;
            }
            None => {
                self.search_status = Some(format!("no match for '{}'", self.search_query));
            }
        }
    }

    fn advance_search(&mut self) {
        let pos = self.history.browse_pos();
        self.run_search(pos);
    }

    fn exit_search(&mut self) {
        self.mode = Mode::Input;
        self.search_query.clear();
        self.search_status = None;
    }

    fn handle_search_key(&mut self, key: &KeyEventExt) {
        let (base, mods) = chord_parts(&key.token);
        match base {
            KeyToken::Char('r') if mods.contains(ModMask::CTRL) => self.advance_search(),
            KeyToken::Named(NamedKey::Esc) => self.exit_search(),
            KeyToken::Named(NamedKey::Enter) => self.exit_search(),
            KeyToken::Named(NamedKey::Backspace) => {
                self.search_query.pop();
                self.run_search(self.history.len());
            }
            KeyToken::Char(c) if !mods.contains(ModMask::CTRL) && !mods.contains(ModMask::ALT) => {
                self.search_query.push(*c);
                self.run_search(self.history.len());
            }
            _ => {}
        }
    }

    fn submit(&mut self) -> Option<ExitOutcome> {
        let joined = self.buffer.lines().join("\n");
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.history.add(trimmed);
        let output = format_output(trimmed, &self.registry);
        Some(ExitOutcome::Submit(output))
    }

    fn submit_selected_option(&mut self) -> Option<ExitOutcome> {
        let choice = self.args.options.get(self.selected_option).cloned().unwrap_or_default();
        if choice.is_empty() {
            return None;
        }
        self.history.add(&choice);
        let output = format_output(&choice, &self.registry);
        Some(ExitOutcome::Submit(output))
    }

    fn handle_options_key(&mut self, key: KeyEventExt) -> Option<ExitOutcome> {
        let (base, mods) = chord_parts(&key.token);
        match base {
            KeyToken::Char('d') if mods.contains(ModMask::CTRL) => return self.submit_selected_option(),
            KeyToken::Named(NamedKey::Enter) => return self.submit_selected_option(),
            KeyToken::Named(NamedKey::Up) => {
                self.selected_option = self.selected_option.saturating_sub(1);
            }
            KeyToken::Named(NamedKey::Down) => {
                let max = self.args.options.len().saturating_sub(1);
                self.selected_option = (self.selected_option + 1).min(max);
            }
            _ => {}
        }
        None
    }

    fn handle_key(&mut self, key: KeyEventExt) -> Option<ExitOutcome> {
        if self.mode == Mode::Search {
            self.handle_search_key(&key);
            return None;
        }

        let (base, mods) = chord_parts(&key.token);
        let submit_now = match base {
            KeyToken::Char('d') if mods.contains(ModMask::CTRL) => return self.submit(),
            KeyToken::Char('u') if mods.contains(ModMask::CTRL) => {
                self.buffer.clear_line();
                self.refresh_matcher();
                false
            }
            KeyToken::Char('k') if mods.contains(ModMask::CTRL) => {
                self.buffer.kill_to_line_end();
                self.refresh_matcher();
                false
            }
            KeyToken::Char('r') if mods.contains(ModMask::CTRL) => {
                self.enter_or_advance_search();
                false
            }
            KeyToken::Char('v') if mods.contains(ModMask::CTRL) => {
                self.paste_from_clipboard();
                false
            }
            KeyToken::Named(NamedKey::Enter) => {
                self.handle_enter();
                false
            }
            KeyToken::Named(NamedKey::Tab) => {
                self.handle_tab();
                false
            }
            KeyToken::Named(NamedKey::Esc) => {
                self.handle_escape();
                false
            }
            KeyToken::Named(NamedKey::Up) => {
                self.handle_up();
                false
            }
            KeyToken::Named(NamedKey::Down) => {
                self.handle_down();
                false
            }
            KeyToken::Named(NamedKey::Left) if mods.contains(ModMask::CTRL) => {
                self.buffer.word_left();
                false
            }
            KeyToken::Named(NamedKey::Right) if mods.contains(ModMask::CTRL) => {
                self.buffer.word_right();
                false
            }
            KeyToken::Named(NamedKey::Left) => {
                self.buffer.move_left();
                false
            }
            KeyToken::Named(NamedKey::Right) => {
                self.buffer.move_right();
                false
            }
            KeyToken::Named(NamedKey::Home) => {
                self.buffer.home();
                false
            }
            KeyToken::Named(NamedKey::End) => {
                self.buffer.end();
                false
            }
            KeyToken::Named(NamedKey::Backspace) => {
                self.buffer.backspace();
                self.refresh_matcher();
                false
            }
            KeyToken::Named(NamedKey::Delete) => {
                self.buffer.delete();
                self.refresh_matcher();
                false
            }
            KeyToken::Char(c) if !mods.contains(ModMask::CTRL) && !mods.contains(ModMask::ALT) => {
                self.handle_printable(*c)
            }
            other => {
                debug!(target: "input", token = ?other, mods = ?mods, "unhandled_key");
                false
            }
        };

        if submit_now { self.submit() } else { None }
    }

    fn render(&mut self, screen: &mut Screen<io::Stderr>) -> Result<()> {
        let caps = TerminalCapabilities::new(screen.width(), screen.height());
        if caps.too_small() {
            screen.render_resize_notice()?;
            return Ok(());
        }

        let width = screen.width();
        let height = screen.height();
        let mut frame = Frame::new(width, height);
        let box_style = if self.config.unicode_box { BoxStyle::Rounded } else { BoxStyle::Ascii };

        let mut y = 0u16;
        if !self.args.skip_welcome {
            if let Some(header) = self.args.header.clone() {
                let mut win = Window::new(y, 0, 1, width);
                win.write_text(0, 0, &header, CellFlags::empty());
                win.refresh(&mut frame);
                y += 1;
            }
        }

        let prompt = self.args.prompt.clone();
        let indent = visible_len(&prompt);
        let using_options = self.using_options();

        let content_lines: Vec<String> = if using_options {
            self.args
                .options
                .iter()
                .enumerate()
                .map(|(i, opt)| {
                    let marker = if i == self.selected_option { "> " } else { "  " };
                    format!("{marker}{opt}")
                })
                .collect()
        } else {
            self.buffer
                .get_visible_lines(MAX_VIEWPORT_LINES)
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let displayed = render_for_display(line);
                    if i == 0 {
                        format!("{prompt}{displayed}")
                    } else {
                        format!("{}{}", " ".repeat(indent), displayed)
                    }
                })
                .collect()
        };

        let max_content_rows = (height.saturating_sub(2)).max(1) as usize;
        let content_height = content_lines.len().clamp(1, MAX_VIEWPORT_LINES.min(max_content_rows)) as u16;
        let box_height = content_height + 2;

        let mut win = Window::new(y, 0, box_height, width);
        win.draw_box(box_style, CellFlags::empty());
        for (i, line) in content_lines.iter().take(content_height as usize).enumerate() {
            win.write_text(i as u16 + 1, 1, line, CellFlags::empty());
        }
        win.refresh(&mut frame);

        let (cursor_x, cursor_y) = if using_options {
            let row = self.selected_option.min(content_height.saturating_sub(1) as usize) as u16;
            (1u16, y + 1 + row)
        } else {
            let (row, col) = self.buffer.cursor();
            let scroll = self.buffer.scroll_offset();
            let visible_row = row.saturating_sub(scroll) as u16;
            let line = self.buffer.line(row);
            let prefix: String = line.chars().take(col).collect();
            let col_width = visible_len(&prefix);
            let col_offset = indent;
            ((1 + col_offset + col_width) as u16, y + 1 + visible_row)
        };

        let mut next_y = y + box_height;
        if !using_options && self.matcher.is_active() && next_y < height {
            let dropdown = self.matcher.render_dropdown(width.saturating_sub(2) as usize);
            let dh = (dropdown.len() as u16).min(height - next_y);
            if dh > 0 {
                let mut dwin = Window::new(next_y, 0, dh, width);
                for (i, line) in dropdown.iter().enumerate().take(dh as usize) {
                    dwin.write_text(i as u16, 0, line, CellFlags::empty());
                }
                dwin.refresh(&mut frame);
                next_y += dh;
            }
        }
        if self.mode == Mode::Search && next_y < height {
            let status = self.search_status.clone().unwrap_or_default();
            let text = format!("(reverse-i-search)`{}': {}", self.search_query, status);
            let mut swin = Window::new(next_y, 0, 1, width);
            swin.write_text(0, 0, &text, CellFlags::empty());
            swin.refresh(&mut frame);
        }

        screen.render(frame)?;
        screen.show_cursor_at(cursor_x, cursor_y)?;
        Ok(())
    }

    fn goodbye(&self) {
        let mut out = stderr();
        let message = self.theme.styled_text("cancelled", Role::Warning);
        let _ = writeln!(out, "\r\n{message}");
        let _ = out.flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut startup = AppStartup::new();
    startup.configure_logging(args.log_file.as_deref());
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let terminal_guard = startup.enter()?;
    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    let screen = Screen::new(io::stderr(), width, height);

    let config = Config::load(args.config.as_deref());
    let theme = Theme::by_name(&config.theme);
    let history = HistoryStore::load(default_history_path(), config.history_max_entries);
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let registry = CommandRegistry::discover(&cwd);
    let clipboard = arboard::Clipboard::new().ok();
    if clipboard.is_none() {
        debug!(target: "clipboard", "clipboard_init_failed");
    }

    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = core_input::spawn_async_input(tx.clone());
    drop(tx);

    let mut app = App {
        args,
        config,
        theme,
        registry,
        matcher: CommandMatcher::new(),
        history,
        buffer: Buffer::new(),
        mode: Mode::Input,
        search_query: String::new(),
        search_status: None,
        selected_option: 0,
        paste_buffer: None,
        resize_deadline: None,
        clipboard,
        _terminal_guard: terminal_guard,
    };

    let outcome = app.run(rx, screen).await;

    input_shutdown.signal();
    let _ = input_task.await;

    match outcome {
        Ok(ExitOutcome::Submit(text)) => {
            drop(app);
            let mut stdout = io::stdout();
            writeln!(stdout, "{text}")?;
            stdout.flush()?;
            info!(target: "runtime", "submit");
            std::process::exit(0);
        }
        Ok(ExitOutcome::Cancel) => {
            app.goodbye();
            info!(target: "runtime", "cancel");
            drop(app);
            std::process::exit(130);
        }
        Err(err) => {
            error!(target: "runtime", error = %err, "fatal_error");
            eprintln!("agent-input: {err}");
            drop(app);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chord_parts_unwraps_chord() {
        let token = KeyToken::Chord {
            base: Box::new(KeyToken::Char('d')),
            mods: ModMask::CTRL,
        };
        let (base, mods) = chord_parts(&token);
        assert_eq!(*base, KeyToken::Char('d'));
        assert!(mods.contains(ModMask::CTRL));
    }

    #[test]
    fn chord_parts_plain_token_has_no_mods() {
        let token = KeyToken::Named(NamedKey::Enter);
        let (base, mods) = chord_parts(&token);
        assert_eq!(*base, KeyToken::Named(NamedKey::Enter));
        assert!(mods.is_empty());
    }

    #[test]
    fn classify_paste_by_newline_count() {
        let payload = "a\nb\nc\nd\ne\nf";
        assert_eq!(classify_paste_kind(payload), PasteClassification::Marker);
    }

    #[test]
    fn classify_paste_by_char_count() {
        let payload = "x".repeat(150);
        assert_eq!(classify_paste_kind(&payload), PasteClassification::Marker);
    }

    #[test]
    fn classify_paste_single_line_path() {
        let payload = "/usr/local/bin/notes.md";
        assert_eq!(classify_paste_kind(payload), PasteClassification::FilePath);
    }

    #[test]
    fn classify_paste_plain_short_text() {
        let payload = "hello there";
        assert_eq!(classify_paste_kind(payload), PasteClassification::Text);
    }

    #[test]
    fn classify_paste_multiline_path_like_is_not_a_file_marker() {
        let payload = "/usr/local/bin/notes.md\nmore text";
        assert_eq!(classify_paste_kind(payload), PasteClassification::Text);
    }

    #[test]
    fn submit_marker_detected_only_at_line_end() {
        assert!(ends_with_submit_marker("do the thing>>>", 15));
        assert!(!ends_with_submit_marker("do the thing>>> more", 21));
        assert!(!ends_with_submit_marker("no marker here", 15));
    }

    #[test]
    fn cli_parses_options_and_prompt() {
        let args = Args::parse_from(["agent-input", "--prompt", "Pick one> ", "--options", "a", "b", "c"]);
        assert_eq!(args.prompt, "Pick one> ");
        assert_eq!(args.options, vec!["a", "b", "c"]);
    }

    #[test]
    fn cli_defaults_have_empty_options_and_show_welcome() {
        let args = Args::parse_from(["agent-input"]);
        assert!(args.options.is_empty());
        assert!(!args.skip_welcome);
        assert_eq!(args.prompt, "> ");
    }
}
