//! Terminal host for the picker: a ` LOCATION ` prompt with the filter text
//! above the candidate list.
//!
//! The interface is drawn on stderr so stdout stays free for the selected
//! directory.

use std::io::{self, Stderr};
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;
use std::thread;

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};

use crate::picker::{Notifier, Picker, PickerState};

const PROMPT: &str = " LOCATION ";

/// What a key press asks the picker to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    None,
    FilterChanged,
    Accept,
    Cancel,
}

/// Filter text and highlighted row of the open picker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub query: String,
    pub selected: usize,
}

impl ViewState {
    /// Applies `key` to the view. `rows` is the number of rows shown.
    pub fn handle_key(&mut self, key: KeyEvent, rows: usize) -> KeyAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => KeyAction::Cancel,
            KeyCode::Char('c') if ctrl => KeyAction::Cancel,
            KeyCode::Enter => KeyAction::Accept,
            KeyCode::Up => {
                self.selected = decrement_selected_index(self.selected, rows);
                KeyAction::None
            }
            KeyCode::Char('p') if ctrl => {
                self.selected = decrement_selected_index(self.selected, rows);
                KeyAction::None
            }
            KeyCode::Down => {
                self.selected = increment_selected_index(self.selected, rows);
                KeyAction::None
            }
            KeyCode::Char('n') if ctrl => {
                self.selected = increment_selected_index(self.selected, rows);
                KeyAction::None
            }
            KeyCode::Char('u') if ctrl => self.edit(String::clear),
            KeyCode::Backspace => self.edit(|query| {
                query.pop();
            }),
            KeyCode::Char(ch) if !ctrl => self.edit(|query| query.push(ch)),
            _ => KeyAction::None,
        }
    }

    fn edit(&mut self, change: impl FnOnce(&mut String)) -> KeyAction {
        let before = self.query.len();
        change(&mut self.query);
        if self.query.len() == before {
            return KeyAction::None;
        }
        self.selected = 0;

        KeyAction::FilterChanged
    }
}

/// Increments selected index with wrap-around.
fn increment_selected_index(selected_index: usize, row_count: usize) -> usize {
    if row_count == 0 {
        return 0;
    }

    (selected_index + 1) % row_count
}

/// Decrements selected index with wrap-around.
fn decrement_selected_index(selected_index: usize, row_count: usize) -> usize {
    if row_count == 0 {
        return 0;
    }

    if selected_index == 0 {
        return row_count - 1;
    }

    selected_index - 1
}

/// Runs the picker until a row is accepted or the user cancels.
///
/// Returns the directory changed into, if any.
///
/// # Errors
/// Returns an error when the terminal cannot be set up or read.
pub fn run(picker: &mut Picker, notifier: &dyn Notifier) -> io::Result<Option<String>> {
    let panic_hook = PanicHookGuard::install(restore_terminal);

    enable_raw_mode()?;
    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stderr))?;

    let result = event_loop(&mut terminal, picker, notifier);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    drop(panic_hook);

    result
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stderr(), LeaveAlternateScreen);
}

type PanicHook = Arc<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Runs `cleanup` before the previous panic hook while alive; dropping it
/// reinstalls the previous hook.
struct PanicHookGuard {
    previous: PanicHook,
}

impl PanicHookGuard {
    fn install(cleanup: fn()) -> Self {
        let previous: PanicHook = Arc::from(panic::take_hook());
        let chained = Arc::clone(&previous);
        panic::set_hook(Box::new(move |panic_info| {
            cleanup();
            chained(panic_info);
        }));

        Self { previous }
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        // `set_hook` itself panics when called during unwinding.
        if thread::panicking() {
            return;
        }
        let previous = Arc::clone(&self.previous);
        panic::set_hook(Box::new(move |panic_info| previous(panic_info)));
    }
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    picker: &mut Picker,
    notifier: &dyn Notifier,
) -> io::Result<Option<String>> {
    let mut view = ViewState {
        query: picker.filter_text().to_string(),
        selected: 0,
    };
    let mut list_state = ListState::default();

    while picker.state() == PickerState::Open {
        list_state.select((!picker.is_empty()).then_some(view.selected));
        terminal.draw(|frame| draw(frame, &*picker, &view, &mut list_state))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match view.handle_key(key, picker.len()) {
            KeyAction::None => {}
            KeyAction::FilterChanged => picker.set_filter(&view.query),
            KeyAction::Accept => return Ok(picker.accept(notifier, view.selected)),
            KeyAction::Cancel => picker.cancel(),
        }
    }

    Ok(None)
}

fn draw(frame: &mut Frame, picker: &Picker, view: &ViewState, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(frame.area());

    let prompt = Line::from(vec![
        Span::styled(PROMPT, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(" "),
        Span::raw(view.query.as_str()),
    ]);
    let cursor_x = chunks[0]
        .x
        .saturating_add(u16::try_from(prompt.width()).unwrap_or(u16::MAX));
    frame.render_widget(Paragraph::new(prompt), chunks[0]);
    frame.set_cursor_position((cursor_x, chunks[0].y));

    let items: Vec<ListItem> = (0..picker.len())
        .filter_map(|index| picker.show(index))
        .map(ListItem::new)
        .collect();
    let list =
        List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, chunks[1], list_state);
}
