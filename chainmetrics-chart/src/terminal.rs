//! Interactive display: draw a figure full-screen until a key is pressed.

use std::io::{self, stdout, Stdout};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use tracing::debug;

use crate::error::ChartError;
use crate::figure::Figure;
use crate::render::FigureView;
use crate::theme::Theme;

/// Switching the terminal into and out of full-screen drawing.
trait ScreenMode {
    fn enter(&mut self) -> io::Result<()>;
    fn leave(&mut self);
}

/// Raw mode plus the alternate screen.
struct CrosstermScreen;

impl ScreenMode for CrosstermScreen {
    fn enter(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        if let Err(e) = execute!(stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(())
    }

    fn leave(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);
    }
}

/// Leaves the screen mode on drop, once entered.
struct ScreenGuard<M: ScreenMode>(M);

impl<M: ScreenMode> ScreenGuard<M> {
    fn enter(mut mode: M) -> io::Result<Self> {
        mode.enter()?;
        Ok(Self(mode))
    }
}

impl<M: ScreenMode> Drop for ScreenGuard<M> {
    fn drop(&mut self) {
        self.0.leave();
    }
}

/// A drawing terminal. The screen guard is taken before the terminal is
/// built, so a failed build or clear still restores the shell.
struct Session<B: Backend, M: ScreenMode> {
    terminal: Terminal<B>,
    _screen: ScreenGuard<M>,
}

impl<B: Backend, M: ScreenMode> Session<B, M> {
    fn open(mode: M, backend: impl FnOnce() -> io::Result<B>) -> io::Result<Self> {
        let screen = ScreenGuard::enter(mode)?;
        let mut terminal = Terminal::new(backend()?)?;
        terminal.clear()?;
        Ok(Self {
            terminal,
            _screen: screen,
        })
    }
}

impl<B: Backend, M: ScreenMode> Drop for Session<B, M> {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

/// Show `figure` in the terminal and block until a key press.
pub fn show(figure: &Figure) -> Result<(), ChartError> {
    let theme = Theme::default();
    let mut session: Session<CrosstermBackend<Stdout>, _> =
        Session::open(CrosstermScreen, || Ok(CrosstermBackend::new(stdout())))?;
    debug!(
        width = figure.size.width,
        height = figure.size.height,
        "showing figure"
    );

    loop {
        session
            .terminal
            .draw(|f| f.render_widget(FigureView::new(figure, &theme), f.area()))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => break,
            // redraw on resize
            _ => {}
        }
    }
    Ok(())
}
