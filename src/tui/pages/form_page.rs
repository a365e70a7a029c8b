//! Page hosting the application form trigger
//!
//! The page owns a scrollable body and a trigger button. Pressing the trigger
//! opens the form in the dialog; when the dialog closes again, focus returns
//! to the trigger.

use super::{Page, PageId};
use crate::{
    document::{Document, ElementId, Overflow},
    tui::{
        components::{
            form::{FormValues, ModalForm},
            modal::{use_modal, ContentProps, ContentSource, ModalContext, ModalHandle, ModalResult},
        },
        styles::Theme,
        Frame,
    },
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use std::{cell::RefCell, rc::Rc};
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

pub const TRIGGER_ID: &str = "open-form-button";
const TRIGGER_LABEL: &str = "신청 폼 작성하기";

/// Rows above the filler text: heading, blank, trigger, status, blank
const HEADER_ROWS: u16 = 5;
const TRIGGER_ROW: u16 = 2;

pub struct ModalFormPage {
    id: PageId,
    title: String,
    document: Document,
    modal: ModalHandle,
    trigger: ElementId,
    status: Rc<RefCell<Option<String>>>,
    filler: Vec<String>,
    scroll: u16,
    viewport_rows: u16,
    was_open: bool,
}

impl ModalFormPage {
    /// Create the page inside the modal scope of `context`
    pub fn new(document: Document, context: &ModalContext, filler_paragraphs: usize) -> ModalResult<Self> {
        let modal = use_modal(context)?;
        let trigger = ElementId::from(TRIGGER_ID);
        document.insert_element(trigger.clone(), &Document::body_id());
        document.focus(&trigger);

        let filler = (1..=filler_paragraphs)
            .map(|n| format!("{:>3}. 스크롤 가능한 본문입니다. 대화상자가 열리면 스크롤이 잠깁니다.", n))
            .collect();

        Ok(Self {
            id: "modal-form".to_string(),
            title: "신청".to_string(),
            document,
            modal,
            trigger,
            status: Rc::new(RefCell::new(None)),
            filler,
            scroll: 0,
            viewport_rows: 0,
            was_open: false,
        })
    }

    /// Latest submission message, if any
    pub fn status(&self) -> Option<String> {
        self.status.borrow().clone()
    }

    /// Open the application form in the dialog
    pub fn open_form(&self) {
        let status = Rc::clone(&self.status);
        let modal = self.modal.clone();
        debug!("opening application form");

        self.modal.open(ContentSource::dynamic(move |props: ContentProps| {
            debug!(is_open = props.is_open, "building application form");
            let form = ModalForm::new(move |data: Option<FormValues>| {
                let Some(values) = data else {
                    debug!("application form cancelled");
                    return;
                };
                let json = serde_json::to_string(&values).unwrap_or_default();
                info!(name = %values.name, "application submitted");
                *status.borrow_mut() = Some(format!(
                    "{}님의 정보가 제출되었습니다. {}",
                    values.name, json
                ));
                modal.close();
            });
            Ok(form.with_closer(props.close))
        }));
    }

    /// Return focus to the trigger once the dialog has closed
    fn sync_focus(&mut self) {
        let open = self.modal.is_open();
        if self.was_open && !open {
            self.document.focus(&self.trigger);
        }
        self.was_open = open;
    }

    fn content_rows(&self) -> u16 {
        (HEADER_ROWS as usize + self.filler.len()).min(u16::MAX as usize) as u16
    }

    fn max_scroll(&self) -> u16 {
        self.content_rows().saturating_sub(self.viewport_rows)
    }

    fn scroll_by(&mut self, delta: i32) {
        if self.document.body_style().overflow == Overflow::Hidden {
            return;
        }
        let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        self.scroll = next as u16;
    }

    fn render_scrollbar(&self, frame: &mut Frame, column: Rect, theme: &Theme) {
        let total = u32::from(self.content_rows().max(1));
        let rows = u32::from(column.height);
        let thumb_len = (rows * rows / total).clamp(1, rows.max(1));
        let thumb_start = u32::from(self.scroll) * rows / total;

        let lines: Vec<Line> = (0..rows)
            .map(|row| {
                let symbol = if row >= thumb_start && row < thumb_start + thumb_len {
                    "█"
                } else {
                    "│"
                };
                Line::from(Span::styled(symbol, theme.border_style()))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), column);
    }
}

impl Page for ModalFormPage {
    fn id(&self) -> &PageId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        match event.code {
            KeyCode::Enter | KeyCode::Char(' ') if self.document.is_focused(&self.trigger) => {
                self.open_form();
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.document.focus(&self.trigger);
            }
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::Down => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-i32::from(self.viewport_rows.max(1))),
            KeyCode::PageDown => self.scroll_by(i32::from(self.viewport_rows.max(1))),
            KeyCode::Home => self.scroll_by(-i32::from(u16::MAX)),
            KeyCode::End => self.scroll_by(i32::from(u16::MAX)),
            _ => {}
        }
        Ok(())
    }

    fn handle_click(&mut self, target: &ElementId) -> Result<()> {
        if *target == self.trigger {
            self.document.focus(&self.trigger);
            self.open_form();
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.sync_focus();
        self.viewport_rows = area.height;
        self.document.set_content_height(self.content_rows());
        self.scroll = self.scroll.min(self.max_scroll());

        let body = self.document.body_style();
        let scrollbar = self.document.scrollbar_visible();
        let reserved = if scrollbar { 1 } else { body.padding() };
        let content = Rect {
            width: area.width.saturating_sub(reserved),
            ..area
        };

        let trigger_focused = self.document.is_focused(&self.trigger);
        let trigger_label = format!(" {} ", TRIGGER_LABEL);
        let mut lines = vec![
            Line::from(Span::styled("지원 안내", theme.title_style())),
            Line::from(""),
            Line::from(Span::styled(
                trigger_label.clone(),
                theme.button_style(trigger_focused),
            )),
            Line::from(Span::styled(
                self.status().unwrap_or_default(),
                Style::default().fg(theme.success),
            )),
            Line::from(""),
        ];
        lines.extend(
            self.filler
                .iter()
                .map(|text| Line::from(Span::styled(text.clone(), theme.muted_style()))),
        );

        frame.render_widget(Paragraph::new(lines).scroll((self.scroll, 0)), content);

        let trigger_row = TRIGGER_ROW.checked_sub(self.scroll).filter(|row| *row < area.height);
        let trigger_area = match trigger_row {
            Some(row) => Rect {
                x: content.x,
                y: content.y + row,
                width: (trigger_label.width() as u16).min(content.width),
                height: 1,
            },
            None => Rect::default(),
        };
        self.document.set_layout(&self.trigger, trigger_area);

        if scrollbar && area.width > 0 {
            let column = Rect {
                x: area.x + area.width - 1,
                width: 1,
                ..area
            };
            self.render_scrollbar(frame, column, theme);
        }
    }

    fn help_text(&self) -> Vec<(&str, &str)> {
        vec![
            ("Enter", "Open the application form"),
            ("↑/↓ PgUp/PgDn", "Scroll"),
            ("Esc", "Close the dialog"),
            ("Ctrl+G", "Help"),
            ("Ctrl+C", "Quit"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        document::BodyStyle,
        tui::components::modal::ModalProvider,
    };
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    const MOUNT: &str = "modal-container";

    fn setup(filler: usize) -> (Document, ModalProvider, ModalFormPage) {
        let document = Document::new(Rect::new(0, 0, 80, 24));
        document.insert_element(MOUNT, &Document::body_id());
        let provider = ModalProvider::new(document.clone(), MOUNT);
        let page = ModalFormPage::new(document.clone(), &provider.context(), filler).unwrap();
        (document, provider, page)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(provider: &mut ModalProvider, text: &str) {
        for c in text.chars() {
            provider.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn draw(page: &mut ModalFormPage) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| page.render(frame, frame.size(), &theme))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_trigger_focused_on_mount() {
        let (document, _provider, page) = setup(3);
        assert!(document.is_focused(&ElementId::from(TRIGGER_ID)));
        assert!(page.status().is_none());
    }

    #[test]
    fn test_page_requires_provider() {
        let document = Document::new(Rect::new(0, 0, 80, 24));
        assert!(ModalFormPage::new(document, &ModalContext::default(), 1).is_err());
    }

    #[test]
    fn test_submit_sets_status_and_closes() {
        let (_document, mut provider, mut page) = setup(3);
        page.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(provider.is_open());
        provider.reconcile();

        provider.handle_key_event(key(KeyCode::Tab)).unwrap();
        type_text(&mut provider, "홍길동");
        provider.handle_key_event(key(KeyCode::Tab)).unwrap();
        type_text(&mut provider, "hong@example.com");
        provider.handle_key_event(key(KeyCode::Tab)).unwrap();
        provider.handle_key_event(key(KeyCode::Right)).unwrap();
        provider.handle_key_event(key(KeyCode::Enter)).unwrap();

        assert!(!provider.is_open());
        assert_eq!(
            page.status().as_deref(),
            Some(
                "홍길동님의 정보가 제출되었습니다. \
                 {\"name\":\"홍길동\",\"email\":\"hong@example.com\",\"career\":\"1\",\"github\":\"\"}"
            )
        );
    }

    #[test]
    fn test_focus_returns_to_trigger_after_close() {
        let (document, mut provider, mut page) = setup(3);
        page.handle_click(&ElementId::from(TRIGGER_ID)).unwrap();
        draw(&mut page);
        provider.reconcile();
        assert!(!document.is_focused(&ElementId::from(TRIGGER_ID)));

        document.dispatch_key(&key(KeyCode::Esc));
        assert!(!provider.is_open());
        provider.reconcile();
        draw(&mut page);
        assert!(document.is_focused(&ElementId::from(TRIGGER_ID)));
        assert!(page.status().is_none());
    }

    #[test]
    fn test_scroll_ignored_while_locked() {
        let (document, mut provider, mut page) = setup(60);
        draw(&mut page);
        assert!(document.scrollbar_visible());

        page.handle_key_event(key(KeyCode::Down)).unwrap();
        assert_eq!(page.scroll, 1);

        page.open_form();
        provider.reconcile();
        assert_eq!(document.body_style().overflow, Overflow::Hidden);
        page.handle_key_event(key(KeyCode::PageDown)).unwrap();
        assert_eq!(page.scroll, 1);

        provider.close();
        provider.reconcile();
        assert_eq!(document.body_style(), BodyStyle::default());
        page.handle_key_event(key(KeyCode::End)).unwrap();
        assert_eq!(page.scroll, 65 - 24);
    }

    #[test]
    fn test_render_shows_trigger_and_status() {
        let (document, _provider, mut page) = setup(2);
        let text = draw(&mut page);
        assert!(text.contains("  1."));
        assert_eq!(
            document.hit_test(3, TRIGGER_ROW),
            Some(ElementId::from(TRIGGER_ID))
        );
        assert!(!document.scrollbar_visible());
    }
}
