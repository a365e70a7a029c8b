use crate::{
    config::Config,
    document::Document,
    tui::{
        components::{
            modal::{ContentSource, ModalProvider},
            TextBlock,
        },
        events::Event,
        keys::KeyMap,
        pages::{form_page::ModalFormPage, Page},
        styles::Theme,
        Frame,
    },
};
use anyhow::{Context, Result};
use crossterm::event::{KeyEventKind, MouseButton, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
};
use tracing::debug;

/// Main application state and controller
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Key mappings for the application
    pub key_map: KeyMap,

    /// Current theme for styling
    pub theme: Theme,

    document: Document,
    modal: ModalProvider,
    page: Box<dyn Page>,
    mouse_enabled: bool,
}

impl App {
    /// Create a new application instance
    pub fn new(config: &Config) -> Result<Self> {
        let document = Document::new(Rect::default());
        if config.mount_point_enabled {
            document.insert_element(config.mount_point_id.as_str(), &Document::body_id());
        } else {
            debug!("mount point disabled, dialogs will not render");
        }

        // The provider must exist before the page asks it for a handle.
        let modal = ModalProvider::new(document.clone(), config.mount_point_id.as_str());
        let page = ModalFormPage::new(document.clone(), &modal.context(), config.filler_paragraphs)
            .context("Failed to create form page")?;
        debug!(page = %page.id(), "page ready");

        Ok(Self {
            should_quit: false,
            key_map: KeyMap::default(),
            theme: Theme::default(),
            document,
            modal,
            page: Box::new(page),
            mouse_enabled: config.mouse_enabled,
        })
    }

    /// Handle incoming events; returns true when the app should exit
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) => {
                if key_event.kind == KeyEventKind::Release {
                    return Ok(false);
                }
                if self.key_map.should_quit(&key_event) {
                    self.should_quit = true;
                    return Ok(true);
                }
                if self.key_map.should_show_help(&key_event) {
                    self.toggle_help();
                    return Ok(false);
                }

                self.document.dispatch_key(&key_event);
                if self.modal.is_mounted() {
                    if self.modal.is_open() {
                        self.modal.handle_key_event(key_event)?;
                    }
                } else {
                    self.page.handle_key_event(key_event)?;
                }
            }

            Event::Mouse(mouse_event) => {
                if !self.mouse_enabled {
                    return Ok(false);
                }
                if let MouseEventKind::Down(MouseButton::Left) = mouse_event.kind {
                    let Some(target) = self.document.dispatch_click(mouse_event.column, mouse_event.row)
                    else {
                        return Ok(false);
                    };
                    if self.modal.is_mounted() {
                        if self.modal.is_open() {
                            self.modal.handle_click(&target)?;
                        }
                    } else {
                        self.page.handle_click(&target)?;
                    }
                }
            }

            Event::Resize(width, height) => {
                self.document.set_viewport(Rect::new(0, 0, width, height));
            }

            Event::Tick => {}
        }

        Ok(self.should_quit)
    }

    /// Open the key help as a static dialog, or close whatever dialog is open
    fn toggle_help(&self) {
        if self.modal.is_open() {
            self.modal.close();
            return;
        }
        let text = self.key_map.help_text(&self.page.help_text());
        self.modal
            .open(ContentSource::from_component(TextBlock::new(text)));
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.size();
        self.document.set_viewport(size);
        self.modal.reconcile();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Page
                Constraint::Length(1), // Status bar
            ])
            .split(size);

        self.page.render(frame, chunks[0], &self.theme);
        self.render_status_bar(frame, chunks[1]);
        self.modal.render(frame, &self.theme);
    }

    /// Render the status bar
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let snapshot = self.modal.snapshot();
        let state = match (snapshot.is_open, snapshot.has_content) {
            (true, true) => "dialog open",
            (true, false) => "dialog open (empty)",
            (false, _) => "ready",
        };
        let status_text = format!(
            "{} | {} | {} for help | {} to quit",
            self.page.title(),
            state,
            self.key_map.help.label,
            self.key_map.quit.label
        );

        frame.render_widget(
            Paragraph::new(status_text).style(self.theme.status_bar_style()),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ElementId;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn draw(app: &mut App, terminal: &mut Terminal<TestBackend>) {
        terminal.draw(|frame| app.render(frame)).unwrap();
    }

    #[test]
    fn test_quit_on_ctrl_c() {
        let mut app = App::new(&Config::default()).unwrap();
        let quit = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.handle_event(quit).unwrap());
        assert!(app.should_quit);
    }

    #[test]
    fn test_open_and_escape_round_trip() {
        let mut app = App::new(&Config::default()).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        draw(&mut app, &mut terminal);

        app.handle_event(key(KeyCode::Enter)).unwrap();
        assert!(app.modal.is_open());
        draw(&mut app, &mut terminal);
        assert!(app.modal.is_mounted());

        app.handle_event(key(KeyCode::Esc)).unwrap();
        assert!(!app.modal.is_open());
        draw(&mut app, &mut terminal);
        assert!(!app.modal.is_mounted());
        assert!(app
            .document
            .is_focused(&ElementId::from("open-form-button")));
    }

    #[test]
    fn test_click_trigger_then_backdrop() {
        let mut app = App::new(&Config::default()).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        draw(&mut app, &mut terminal);

        app.handle_event(click(2, 2)).unwrap();
        assert!(app.modal.is_open());
        draw(&mut app, &mut terminal);

        // Inside the dialog body: stays open.
        app.handle_event(click(40, 12)).unwrap();
        assert!(app.modal.is_open());

        app.handle_event(click(0, 0)).unwrap();
        assert!(!app.modal.is_open());
    }

    #[test]
    fn test_without_mount_point_nothing_renders() {
        let config = Config {
            mount_point_enabled: false,
            ..Config::default()
        };
        let mut app = App::new(&config).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        app.handle_event(key(KeyCode::Enter)).unwrap();
        assert!(app.modal.is_open());
        draw(&mut app, &mut terminal);
        assert!(!app.modal.is_mounted());
        assert_eq!(app.document.listener_count(), 0);
    }

    #[test]
    fn test_help_dialog_is_static_content() {
        let mut app = App::new(&Config::default()).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let help = Event::Key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL));

        app.handle_event(help).unwrap();
        draw(&mut app, &mut terminal);
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Ctrl+C"));
        assert!(text.contains("dialog open"));
    }

    #[test]
    fn test_help_key_closes_open_dialog() {
        let mut app = App::new(&Config::default()).unwrap();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let help = Event::Key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL));
        draw(&mut app, &mut terminal);

        app.handle_event(key(KeyCode::Enter)).unwrap();
        assert!(app.modal.is_open());
        draw(&mut app, &mut terminal);

        app.handle_event(help).unwrap();
        assert!(!app.modal.is_open());
        draw(&mut app, &mut terminal);
        assert!(!app.modal.is_mounted());

        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("ready"));
    }
}
