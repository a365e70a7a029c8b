//! Application form shown inside the dialog
//!
//! The form reads each declared field explicitly on submission, validates all
//! of them, and either reports the values to its callback or surfaces the
//! errors inline. Cancelling closes the hosting dialog and reports `None`.

use super::{
    input::{SelectField, TextField},
    validator::{validate_values, Field, FormErrors, FormValues},
};
use crate::{
    document::{Document, ElementId},
    tui::{
        components::{
            modal::Closer,
            Component,
        },
        styles::Theme,
        Frame,
    },
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

pub const TITLE_ID: &str = "modal-form-title";
pub const DESCRIPTION_ID: &str = "modal-form-description";
pub const CANCEL_ID: &str = "form-cancel";
pub const SUBMIT_ID: &str = "form-submit";

const TITLE: &str = "신청 폼";
const DESCRIPTION: &str = "이메일과 FE 경력 연차 등 간단한 정보를 입력해 주세요.";
const CANCEL_LABEL: &str = "취소";
const SUBMIT_LABEL: &str = "제출하기";
const GITHUB_PLACEHOLDER: &str = "https://github.com/username";

/// Career options as `(value, label)`; the empty value means nothing chosen
pub const CAREER_OPTIONS: &[(&str, &str)] = &[
    ("", "선택해주세요"),
    ("1", "0-3년"),
    ("2", "4-7년"),
    ("3", "8년 이상"),
];

const FORM_WIDTH: u16 = 56;
/// Title, description and a blank row
const HEADER_ROWS: u16 = 3;
/// Label, input and message row per field
const FIELD_ROWS: u16 = 3;

/// Receives the submitted values, or `None` when the user cancelled
pub type SubmitCallback = Box<dyn FnMut(Option<FormValues>)>;

/// What has keyboard focus inside the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Title,
    Field(Field),
    Cancel,
    Submit,
}

impl FormFocus {
    /// Tab order; the title takes focus only programmatically
    const ORDER: [FormFocus; 6] = [
        FormFocus::Field(Field::Name),
        FormFocus::Field(Field::Email),
        FormFocus::Field(Field::Career),
        FormFocus::Field(Field::Github),
        FormFocus::Cancel,
        FormFocus::Submit,
    ];

    fn element_id(&self) -> ElementId {
        match self {
            FormFocus::Title => ElementId::from(TITLE_ID),
            FormFocus::Field(field) => ElementId::from(field.as_str()),
            FormFocus::Cancel => ElementId::from(CANCEL_ID),
            FormFocus::Submit => ElementId::from(SUBMIT_ID),
        }
    }

    fn from_element(id: &ElementId) -> Option<Self> {
        match id.as_str() {
            TITLE_ID => Some(FormFocus::Title),
            CANCEL_ID => Some(FormFocus::Cancel),
            SUBMIT_ID => Some(FormFocus::Submit),
            other => other.parse().ok().map(FormFocus::Field),
        }
    }
}

fn label(field: Field) -> &'static str {
    match field {
        Field::Name => "이름/닉네임",
        Field::Email => "이메일",
        Field::Career => "FE 경력 연차",
        Field::Github => "Github 링크 (선택)",
    }
}

/// Host element and document the form is mounted in
struct Mount {
    document: Document,
    parent: ElementId,
}

pub struct ModalForm {
    name: TextField,
    email: TextField,
    career: SelectField,
    github: TextField,
    focus: FormFocus,
    errors: FormErrors,
    closer: Option<Closer>,
    on_submit: SubmitCallback,
    mount: Option<Mount>,
}

impl ModalForm {
    /// Create a standalone form reporting to `on_submit`
    pub fn new(on_submit: impl FnMut(Option<FormValues>) + 'static) -> Self {
        Self {
            name: TextField::new(),
            email: TextField::new(),
            career: SelectField::new(CAREER_OPTIONS),
            github: TextField::new().with_placeholder(GITHUB_PLACEHOLDER),
            focus: FormFocus::Title,
            errors: FormErrors::default(),
            closer: None,
            on_submit: Box::new(on_submit),
            mount: None,
        }
    }

    /// Close the hosting dialog through `closer` on cancel
    pub fn with_closer(mut self, closer: Closer) -> Self {
        self.closer = Some(closer);
        self
    }

    /// Current raw value of one field
    pub fn value_of(&self, field: Field) -> &str {
        match field {
            Field::Name => self.name.value(),
            Field::Email => self.email.value(),
            Field::Career => self.career.value(),
            Field::Github => self.github.value(),
        }
    }

    /// Set a field's value; career accepts only one of its option values
    pub fn set_value(&mut self, field: Field, value: &str) -> bool {
        match field {
            Field::Name => self.name.set_value(value),
            Field::Email => self.email.set_value(value),
            Field::Career => return self.career.select_value(value),
            Field::Github => self.github.set_value(value),
        }
        true
    }

    /// Build the submission mapping by reading every declared field
    pub fn collect_values(&self) -> FormValues {
        let mut values = FormValues::default();
        for field in Field::ALL {
            values.set(field, self.value_of(field));
        }
        values
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Validate and, when everything passes, hand the values to the callback.
    ///
    /// Returns whether the callback fired.
    pub fn submit(&mut self) -> bool {
        let values = self.collect_values();
        self.errors = validate_values(&values);
        self.sync_error_elements();

        if self.errors.has_errors() {
            debug!(
                failed = ?self.errors.failed().map(|(field, _)| field.as_str()).collect::<Vec<_>>(),
                "form submission blocked"
            );
            return false;
        }

        info!("form submitted");
        (self.on_submit)(Some(values));
        true
    }

    /// Close the hosting dialog, then report the cancellation
    pub fn cancel(&mut self) {
        debug!("form cancelled");
        if let Some(closer) = &self.closer {
            closer.close();
        }
        (self.on_submit)(None);
    }

    fn set_focus(&mut self, focus: FormFocus) {
        self.focus = focus;
        if let Some(mount) = &self.mount {
            mount.document.focus(&focus.element_id());
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let len = FormFocus::ORDER.len();
        let next = match FormFocus::ORDER.iter().position(|f| *f == self.focus) {
            Some(index) if forward => (index + 1) % len,
            Some(index) => (index + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        self.set_focus(FormFocus::ORDER[next]);
    }

    /// Reflect the latest errors into the document for assistive technology
    fn sync_error_elements(&self) {
        let Some(mount) = &self.mount else {
            return;
        };
        let document = &mount.document;

        for field in Field::ALL {
            let input = ElementId::from(field.as_str());
            let error_id = ElementId::from(field.error_id());
            match self.errors.get(field) {
                Some(message) => {
                    if !document.contains(&error_id) {
                        document.insert_element(error_id.clone(), &mount.parent);
                    }
                    document.set_attribute(&error_id, "role", "alert");
                    document.set_attribute(&error_id, "text", message);
                    document.set_attribute(&input, "aria-invalid", "true");
                    document.set_attribute(&input, "aria-describedby", error_id.as_str());
                }
                None => {
                    document.remove_element(&error_id);
                    document.set_attribute(&input, "aria-invalid", "false");
                    document.remove_attribute(&input, "aria-describedby");
                }
            }
        }
    }

    fn set_layout(&self, id: &str, area: Rect) {
        if let Some(mount) = &self.mount {
            mount.document.set_layout(&ElementId::from(id), area);
        }
    }

    fn render_field(&self, frame: &mut Frame, field: Field, rows: [Rect; 3], theme: &Theme) {
        let [label_row, input_row, message_row] = rows;
        let focused = self.focus == FormFocus::Field(field);
        let invalid = self.errors.get(field).is_some();

        frame.render_widget(
            Paragraph::new(label(field)).style(theme.text_style()),
            label_row,
        );

        let input_style = if focused {
            theme.selection_style()
        } else if invalid {
            theme.error_style().bg(theme.background_alt)
        } else {
            theme.text_style().bg(theme.background_alt)
        };

        let line = match field {
            Field::Career => Line::from(vec![
                Span::raw("◀ "),
                Span::raw(self.career.label()),
                Span::raw(" ▶"),
            ]),
            _ => {
                let input = self.text_field(field);
                match input.placeholder() {
                    Some(placeholder) if input.value().is_empty() && !focused => {
                        Line::from(Span::styled(placeholder, theme.placeholder_style()))
                    }
                    _ => Line::from(input.value().to_string()),
                }
            }
        };
        frame.render_widget(Paragraph::new(line).style(input_style), input_row);
        self.set_layout(field.as_str(), input_row);

        if focused && field != Field::Career {
            let column = self.text_field(field).cursor_column();
            if column < input_row.width {
                frame.set_cursor(input_row.x + column, input_row.y);
            }
        }

        if let Some(message) = self.errors.get(field) {
            frame.render_widget(
                Paragraph::new(message).style(theme.error_style()),
                message_row,
            );
            self.set_layout(&field.error_id(), message_row);
        }
    }

    fn text_field(&self, field: Field) -> &TextField {
        match field {
            Field::Email => &self.email,
            Field::Github => &self.github,
            _ => &self.name,
        }
    }

    fn text_field_mut(&mut self, field: Field) -> Option<&mut TextField> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Email => Some(&mut self.email),
            Field::Github => Some(&mut self.github),
            Field::Career => None,
        }
    }

    fn render_buttons(&self, frame: &mut Frame, row: Rect, theme: &Theme) {
        let cancel = format!(" {} ", CANCEL_LABEL);
        let submit = format!(" {} ", SUBMIT_LABEL);
        let cancel_width = cancel.width() as u16;
        let submit_width = submit.width() as u16;

        let submit_area = Rect {
            x: row.x + row.width.saturating_sub(submit_width),
            y: row.y,
            width: submit_width.min(row.width),
            height: 1,
        };
        let cancel_area = Rect {
            x: submit_area.x.saturating_sub(cancel_width + 1).max(row.x),
            y: row.y,
            width: cancel_width.min(submit_area.x.saturating_sub(row.x)),
            height: 1,
        };

        frame.render_widget(
            Paragraph::new(cancel).style(theme.button_style(self.focus == FormFocus::Cancel)),
            cancel_area,
        );
        frame.render_widget(
            Paragraph::new(submit)
                .alignment(Alignment::Center)
                .style(theme.button_style(self.focus == FormFocus::Submit)),
            submit_area,
        );
        self.set_layout(CANCEL_ID, cancel_area);
        self.set_layout(SUBMIT_ID, submit_area);
    }
}

impl Component for ModalForm {
    fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        if event.kind == KeyEventKind::Release {
            return Ok(());
        }

        match event.code {
            KeyCode::Tab => self.move_focus(true),
            KeyCode::BackTab => self.move_focus(false),
            KeyCode::Enter => match self.focus {
                FormFocus::Cancel => self.cancel(),
                FormFocus::Title => {}
                _ => {
                    self.submit();
                }
            },
            KeyCode::Char(' ') if self.focus == FormFocus::Cancel => self.cancel(),
            KeyCode::Char(' ') if self.focus == FormFocus::Submit => {
                self.submit();
            }
            _ => match self.focus {
                FormFocus::Field(Field::Career) => {
                    self.career.handle_key(&event);
                }
                FormFocus::Field(field) => {
                    if let Some(input) = self.text_field_mut(field) {
                        input.handle_key(&event);
                    }
                }
                _ => {}
            },
        }
        Ok(())
    }

    fn handle_click(&mut self, target: &ElementId) -> Result<()> {
        let Some(focus) = FormFocus::from_element(target) else {
            return Ok(());
        };
        self.set_focus(focus);
        match focus {
            FormFocus::Cancel => self.cancel(),
            FormFocus::Submit => {
                self.submit();
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let row = |index: u16| Rect {
            x: area.x,
            y: area.y.saturating_add(index),
            width: area.width,
            height: u16::from(index < area.height),
        };

        let title_style = if self.focus == FormFocus::Title {
            theme.title_style().fg(theme.primary)
        } else {
            theme.title_style()
        };
        frame.render_widget(Paragraph::new(TITLE).style(title_style), row(0));
        self.set_layout(TITLE_ID, row(0));

        frame.render_widget(
            Paragraph::new(DESCRIPTION).style(theme.muted_style()),
            row(1),
        );
        self.set_layout(DESCRIPTION_ID, row(1));

        for (index, field) in Field::ALL.into_iter().enumerate() {
            let base = HEADER_ROWS + index as u16 * FIELD_ROWS;
            self.render_field(frame, field, [row(base), row(base + 1), row(base + 2)], theme);
        }

        let buttons = HEADER_ROWS + Field::ALL.len() as u16 * FIELD_ROWS;
        self.render_buttons(frame, row(buttons), theme);
    }

    fn on_mount(&mut self, document: &Document, parent: &ElementId) -> Result<()> {
        let mut ids = vec![TITLE_ID, DESCRIPTION_ID];
        ids.extend(Field::ALL.iter().map(Field::as_str));
        ids.extend([CANCEL_ID, SUBMIT_ID]);
        for id in ids {
            document.insert_element(id, parent);
        }

        document.set_attribute(&ElementId::from(TITLE_ID), "tabindex", "-1");
        for field in Field::ALL {
            let input = ElementId::from(field.as_str());
            document.set_attribute(&input, "aria-required", field.is_required().to_string());
            document.set_attribute(&input, "aria-invalid", "false");
        }

        self.mount = Some(Mount {
            document: document.clone(),
            parent: parent.clone(),
        });
        self.focus = FormFocus::Title;
        self.sync_error_elements();
        Ok(())
    }

    fn preferred_size(&self) -> (u16, u16) {
        (
            FORM_WIDTH,
            HEADER_ROWS + Field::ALL.len() as u16 * FIELD_ROWS + 1,
        )
    }

    fn initial_focus(&self) -> Option<ElementId> {
        Some(ElementId::from(TITLE_ID))
    }

    fn labelled_by(&self) -> Option<ElementId> {
        Some(ElementId::from(TITLE_ID))
    }

    fn described_by(&self) -> Option<ElementId> {
        Some(ElementId::from(DESCRIPTION_ID))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::form::validator::*;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};
    use std::{cell::{Cell, RefCell}, rc::Rc};

    type Submissions = Rc<RefCell<Vec<Option<FormValues>>>>;

    fn recording_form() -> (ModalForm, Submissions) {
        let submissions: Submissions = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&submissions);
        let form = ModalForm::new(move |data| log.borrow_mut().push(data));
        (form, submissions)
    }

    fn mounted(form: &mut ModalForm) -> Document {
        let document = Document::new(Rect::new(0, 0, 80, 24));
        let host = ElementId::from("host");
        document.insert_element(host.clone(), &Document::body_id());
        form.on_mount(&document, &host).unwrap();
        document
    }

    fn press(form: &mut ModalForm, code: KeyCode) {
        form.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn type_text(form: &mut ModalForm, text: &str) {
        for c in text.chars() {
            press(form, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_valid_submission_reports_values_once() {
        let (mut form, submissions) = recording_form();
        let document = mounted(&mut form);
        form.set_value(Field::Name, "Al");
        form.set_value(Field::Email, "a@b.com");
        assert!(form.set_value(Field::Career, "1"));

        assert!(form.submit());
        assert_eq!(
            *submissions.borrow(),
            vec![Some(FormValues {
                name: "Al".into(),
                email: "a@b.com".into(),
                career: "1".into(),
                github: String::new(),
            })]
        );
        assert!(!form.errors().has_errors());
        for field in Field::ALL {
            assert!(!document.contains(&ElementId::from(field.error_id())));
        }
    }

    #[test]
    fn test_invalid_submission_blocks_and_marks_fields() {
        let (mut form, submissions) = recording_form();
        let document = mounted(&mut form);
        form.set_value(Field::Name, "A");
        form.set_value(Field::Email, "a@b");

        assert!(!form.submit());
        assert!(submissions.borrow().is_empty());
        assert_eq!(form.errors().get(Field::Name), Some(NAME_TOO_SHORT));
        assert_eq!(form.errors().get(Field::Email), Some(EMAIL_INVALID));
        assert_eq!(form.errors().get(Field::Career), Some(CAREER_REQUIRED));

        let name = ElementId::from("name");
        let name_error = ElementId::from("name-error");
        assert_eq!(document.attribute(&name, "aria-invalid").as_deref(), Some("true"));
        assert_eq!(
            document.attribute(&name, "aria-describedby").as_deref(),
            Some("name-error")
        );
        assert_eq!(document.attribute(&name_error, "role").as_deref(), Some("alert"));
        assert_eq!(
            document.attribute(&name_error, "text").as_deref(),
            Some(NAME_TOO_SHORT)
        );
        let github = ElementId::from("github");
        assert_eq!(document.attribute(&github, "aria-invalid").as_deref(), Some("false"));
        assert!(!document.contains(&ElementId::from("github-error")));
    }

    #[test]
    fn test_resubmission_replaces_previous_errors() {
        let (mut form, submissions) = recording_form();
        let document = mounted(&mut form);
        assert!(!form.submit());
        assert!(document.contains(&ElementId::from("email-error")));

        form.set_value(Field::Name, "Al");
        form.set_value(Field::Email, "a@b.com");
        assert!(!form.submit());
        assert!(!document.contains(&ElementId::from("name-error")));
        assert!(!document.contains(&ElementId::from("email-error")));
        assert!(document.contains(&ElementId::from("career-error")));
        assert_eq!(
            document.attribute(&ElementId::from("email"), "aria-describedby"),
            None
        );
        assert!(submissions.borrow().is_empty());
    }

    #[test]
    fn test_cancel_closes_once_and_reports_none() {
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        let (form, submissions) = recording_form();
        let mut form = form.with_closer(Closer::new(move || counter.set(counter.get() + 1)));

        form.cancel();
        assert_eq!(closes.get(), 1);
        assert_eq!(*submissions.borrow(), vec![None]);
    }

    #[test]
    fn test_standalone_cancel_only_reports() {
        let (mut form, submissions) = recording_form();
        form.cancel();
        assert_eq!(*submissions.borrow(), vec![None]);
    }

    #[test]
    fn test_keyboard_fill_and_submit() {
        let (mut form, submissions) = recording_form();
        let document = mounted(&mut form);
        assert_eq!(form.focus, FormFocus::Title);

        press(&mut form, KeyCode::Tab);
        assert!(document.is_focused(&ElementId::from("name")));
        type_text(&mut form, "Al");
        press(&mut form, KeyCode::Tab);
        type_text(&mut form, "a@b.com");
        press(&mut form, KeyCode::Tab);
        press(&mut form, KeyCode::Right);
        press(&mut form, KeyCode::Tab);
        assert_eq!(form.focus, FormFocus::Field(Field::Github));
        press(&mut form, KeyCode::Enter);

        let submitted = submissions.borrow();
        assert_eq!(submitted.len(), 1);
        let values = submitted[0].as_ref().unwrap();
        assert_eq!(values.name, "Al");
        assert_eq!(values.email, "a@b.com");
        assert_eq!(values.career, "1");
        assert_eq!(values.github, "");
    }

    #[test]
    fn test_enter_on_cancel_button_cancels() {
        let (mut form, submissions) = recording_form();
        press(&mut form, KeyCode::BackTab);
        press(&mut form, KeyCode::BackTab);
        assert_eq!(form.focus, FormFocus::Cancel);
        press(&mut form, KeyCode::Enter);
        assert_eq!(*submissions.borrow(), vec![None]);
    }

    #[test]
    fn test_click_targets() {
        let (mut form, submissions) = recording_form();
        let document = mounted(&mut form);

        form.handle_click(&ElementId::from("email")).unwrap();
        assert_eq!(form.focus, FormFocus::Field(Field::Email));
        assert!(document.is_focused(&ElementId::from("email")));

        form.handle_click(&ElementId::from(SUBMIT_ID)).unwrap();
        assert!(submissions.borrow().is_empty());
        assert!(form.errors().has_errors());

        form.handle_click(&ElementId::from("name-error")).unwrap();
        assert_eq!(form.focus, FormFocus::Submit);
    }

    #[test]
    fn test_successful_submit_leaves_closing_to_callback() {
        let closes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&closes);
        let (form, submissions) = recording_form();
        let mut form = form.with_closer(Closer::new(move || counter.set(counter.get() + 1)));
        form.set_value(Field::Name, "홍길동");
        form.set_value(Field::Email, "hong@example.com");
        form.set_value(Field::Career, "2");

        assert!(form.submit());
        assert_eq!(submissions.borrow().len(), 1);
        assert!(submissions.borrow()[0].is_some());
        assert_eq!(closes.get(), 0);
    }

    #[test]
    fn test_render_shows_title_and_errors() {
        let (mut form, _) = recording_form();
        let document = mounted(&mut form);
        form.submit();

        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| form.render(frame, Rect::new(0, 0, 60, 16), &theme))
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Github"));
        assert!(text.contains("FE"));
        assert_eq!(
            document.layout(&ElementId::from(TITLE_ID)),
            Some(Rect::new(0, 0, 60, 1))
        );
        assert_eq!(
            document.layout(&ElementId::from("name-error")),
            Some(Rect::new(0, 5, 60, 1))
        );
    }
}
