//! Full-screen results view
//!
//! The table surface of the session. It renders the active view of a
//! [`MaterializedResultStore`] in the alternate screen and hands control back
//! to the session with a [`ViewAction`] whenever the user asks for something
//! that needs the network or a different view:
//! - Up/Down, PageUp/PageDown, Home/End scroll
//! - `n` fetches the next page
//! - `m` or Tab toggles table / changelog
//! - `q`, Esc or Ctrl+C returns to the prompt

use std::io::{self, Write};
use std::ops::Range;

use colored::Colorize;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};

use crate::formatter::OutputFormatter;
use crate::store::MaterializedResultStore;

/// Title bar, footer
const CHROME_LINES: usize = 2;

/// Top border, header row and separator of a box-drawn table
const TABLE_HEAD_LINES: usize = 3;

/// What the session should do after the view returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    NextPage,
    ToggleMode,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Return(ViewAction),
    Scroll(isize),
    Top,
    Bottom,
    Ignore,
}

/// Scroll position over the body rows of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
    height: usize,
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self {
            offset: 0,
            height: height.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, height: usize, total: usize) {
        self.height = height.max(1);
        self.clamp(total);
    }

    pub fn scroll_by(&mut self, delta: isize, total: usize) {
        self.offset = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta as usize)
        };
        self.clamp(total);
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self, total: usize) {
        self.offset = total.saturating_sub(self.height);
    }

    /// Keep the last page full; a shrinking view pulls the offset back.
    pub fn clamp(&mut self, total: usize) {
        self.offset = self.offset.min(total.saturating_sub(self.height));
    }

    pub fn visible(&self, total: usize) -> Range<usize> {
        let start = self.offset.min(total);
        start..(start + self.height).min(total)
    }
}

/// Interactive table surface
pub struct ResultsView {
    viewport: Viewport,
    color_enabled: bool,
}

impl ResultsView {
    pub fn new(color_enabled: bool) -> Self {
        Self {
            viewport: Viewport::new(1),
            color_enabled,
        }
    }

    /// Forget the scroll position, e.g. for a new statement.
    pub fn reset(&mut self) {
        self.viewport.scroll_to_top();
    }

    /// Show the store until the user picks an action.
    ///
    /// `status` is shown in the title bar (statement name, phase, paging).
    /// The scroll position is kept across calls so that fetching a page or
    /// toggling the mode does not jump back to the top.
    pub fn run(&mut self, store: &MaterializedResultStore, status: &str) -> io::Result<ViewAction> {
        let headers = store.headers();
        let rows: Vec<Vec<String>> = store
            .iter()
            .map(|fields| fields.iter().map(|f| f.to_string()).collect())
            .collect();
        let mode = if store.is_table_mode() { "table" } else { "changelog" };
        let title = format!("{} | {} | {} rows", status, mode, rows.len());

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(Hide)?;

        let result = self.run_loop(&mut stdout, &title, &headers, &rows);

        // Restore terminal state even if the loop failed
        stdout.execute(Show)?;
        stdout.execute(LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn run_loop(
        &mut self,
        stdout: &mut io::Stdout,
        title: &str,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> io::Result<ViewAction> {
        let (width, height) = terminal::size()?;
        let mut lines = OutputFormatter::table_lines(headers, rows, width as usize);
        self.viewport.resize(Self::body_height(height), rows.len());
        self.render(stdout, title, &lines, rows.len())?;

        loop {
            if !event::poll(std::time::Duration::from_millis(100))? {
                continue;
            }
            match event::read()? {
                Event::Key(key_event) => {
                    // Only handle key press events, not release
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }
                    match Self::outcome_for(key_event, self.viewport.height()) {
                        KeyOutcome::Return(action) => return Ok(action),
                        KeyOutcome::Scroll(delta) => self.viewport.scroll_by(delta, rows.len()),
                        KeyOutcome::Top => self.viewport.scroll_to_top(),
                        KeyOutcome::Bottom => self.viewport.scroll_to_bottom(rows.len()),
                        KeyOutcome::Ignore => continue,
                    }
                },
                Event::Resize(width, height) => {
                    lines = OutputFormatter::table_lines(headers, rows, width as usize);
                    self.viewport.resize(Self::body_height(height), rows.len());
                },
                _ => continue,
            }
            self.render(stdout, title, &lines, rows.len())?;
        }
    }

    fn body_height(terminal_height: u16) -> usize {
        // Table head and bottom border stay on screen
        (terminal_height as usize).saturating_sub(CHROME_LINES + TABLE_HEAD_LINES + 1)
    }

    fn outcome_for(key: KeyEvent, page: usize) -> KeyOutcome {
        let page = page as isize;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyOutcome::Return(ViewAction::Quit)
            },
            KeyCode::Esc | KeyCode::Char('q') => KeyOutcome::Return(ViewAction::Quit),
            KeyCode::Char('n') => KeyOutcome::Return(ViewAction::NextPage),
            KeyCode::Char('m') | KeyCode::Tab => KeyOutcome::Return(ViewAction::ToggleMode),
            KeyCode::Up | KeyCode::Char('k') => KeyOutcome::Scroll(-1),
            KeyCode::Down | KeyCode::Char('j') => KeyOutcome::Scroll(1),
            KeyCode::PageUp => KeyOutcome::Scroll(-page),
            KeyCode::PageDown | KeyCode::Char(' ') => KeyOutcome::Scroll(page),
            KeyCode::Home | KeyCode::Char('g') => KeyOutcome::Top,
            KeyCode::End | KeyCode::Char('G') => KeyOutcome::Bottom,
            _ => KeyOutcome::Ignore,
        }
    }

    fn render(
        &self,
        stdout: &mut impl Write,
        title: &str,
        lines: &[String],
        row_count: usize,
    ) -> io::Result<()> {
        stdout.execute(terminal::Clear(ClearType::All))?;
        stdout.execute(MoveTo(0, 0))?;

        let header = if self.color_enabled {
            format!(" {} ", title).on_bright_blue().white().bold().to_string()
        } else {
            format!(" {} ", title)
        };
        write!(stdout, "{}\r\n", header)?;

        for line in Self::frame(lines, self.viewport.visible(row_count)) {
            write!(stdout, "{}\r\n", line)?;
        }

        let range = self.viewport.visible(row_count);
        let position = if row_count == 0 {
            "empty".to_string()
        } else {
            format!("{}-{} of {}", range.start + 1, range.end, row_count)
        };
        let hints = format!(
            "{}  ↑↓ scroll, n next page, m table/changelog, q back",
            position
        );
        if self.color_enabled {
            write!(stdout, "{}", hints.dimmed())?;
        } else {
            write!(stdout, "{}", hints)?;
        }
        stdout.flush()
    }

    /// Table head, the visible body rows and the bottom border.
    fn frame(lines: &[String], visible: Range<usize>) -> Vec<&str> {
        if lines.len() <= TABLE_HEAD_LINES {
            return lines.iter().map(String::as_str).collect();
        }
        let body = &lines[TABLE_HEAD_LINES..lines.len() - 1];
        let mut frame: Vec<&str> = lines[..TABLE_HEAD_LINES].iter().map(String::as_str).collect();
        frame.extend(
            body[visible.start.min(body.len())..visible.end.min(body.len())]
                .iter()
                .map(String::as_str),
        );
        if let Some(bottom) = lines.last() {
            frame.push(bottom);
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_viewport_scrolls_within_bounds() {
        let mut viewport = Viewport::new(3);
        viewport.scroll_by(-5, 10);
        assert_eq!(viewport.offset(), 0);

        viewport.scroll_by(4, 10);
        assert_eq!(viewport.visible(10), 4..7);

        viewport.scroll_by(100, 10);
        assert_eq!(viewport.visible(10), 7..10);

        viewport.scroll_to_top();
        assert_eq!(viewport.visible(10), 0..3);
    }

    #[test]
    fn test_viewport_short_content() {
        let mut viewport = Viewport::new(5);
        viewport.scroll_to_bottom(2);
        assert_eq!(viewport.visible(2), 0..2);
        assert_eq!(viewport.visible(0), 0..0);
    }

    #[test]
    fn test_viewport_clamps_when_content_shrinks() {
        let mut viewport = Viewport::new(2);
        viewport.scroll_to_bottom(10);
        assert_eq!(viewport.offset(), 8);

        viewport.clamp(4);
        assert_eq!(viewport.visible(4), 2..4);

        viewport.resize(10, 4);
        assert_eq!(viewport.visible(4), 0..4);
    }

    #[test]
    fn test_zero_height_is_one_row() {
        let viewport = Viewport::new(0);
        assert_eq!(viewport.height(), 1);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            ResultsView::outcome_for(key(KeyCode::Char('n')), 10),
            KeyOutcome::Return(ViewAction::NextPage)
        );
        assert_eq!(
            ResultsView::outcome_for(key(KeyCode::Tab), 10),
            KeyOutcome::Return(ViewAction::ToggleMode)
        );
        assert_eq!(
            ResultsView::outcome_for(key(KeyCode::Esc), 10),
            KeyOutcome::Return(ViewAction::Quit)
        );
        assert_eq!(
            ResultsView::outcome_for(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                10
            ),
            KeyOutcome::Return(ViewAction::Quit)
        );
        assert_eq!(
            ResultsView::outcome_for(key(KeyCode::PageUp), 10),
            KeyOutcome::Scroll(-10)
        );
        assert_eq!(ResultsView::outcome_for(key(KeyCode::End), 10), KeyOutcome::Bottom);
        assert_eq!(ResultsView::outcome_for(key(KeyCode::Char('x')), 10), KeyOutcome::Ignore);
    }

    #[test]
    fn test_frame_keeps_head_and_bottom_border() {
        let headers = vec!["id".to_string()];
        let rows: Vec<Vec<String>> = (0..5).map(|i| vec![i.to_string()]).collect();
        let lines = OutputFormatter::table_lines(&headers, &rows, 80);

        let frame = ResultsView::frame(&lines, 1..3);
        assert_eq!(frame.len(), TABLE_HEAD_LINES + 2 + 1);
        assert!(frame[1].contains("id"));
        assert!(frame[3].contains('1'));
        assert!(frame[4].contains('2'));
        assert!(frame[5].starts_with('└'));
    }

    #[test]
    fn test_frame_without_columns() {
        let lines = OutputFormatter::table_lines(&[], &[], 80);
        assert_eq!(ResultsView::frame(&lines, 0..0), vec!["(no columns)"]);
    }
}
