use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};
use tracing::debug;

use crate::tui::components::form::{Field, FormValues, ModalForm};

/// Validate and submit the form without the terminal UI
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Applicant name (at least 2 characters)
    #[arg(long, default_value = "")]
    pub name: String,

    /// Applicant email
    #[arg(long, default_value = "")]
    pub email: String,

    /// Career band: 1 (0-3년), 2 (4-7년), 3 (8년 이상)
    #[arg(long, default_value = "")]
    pub career: String,

    /// Github profile URL
    #[arg(long, default_value = "")]
    pub github: String,
}

/// Result of one headless submission
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmitOutcome {
    Submitted { data: FormValues },
    Invalid { errors: BTreeMap<Field, String> },
}

impl SubmitCommand {
    pub fn execute(&self) -> Result<()> {
        let outcome = self.run()?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);

        match outcome {
            SubmitOutcome::Submitted { .. } => Ok(()),
            SubmitOutcome::Invalid { errors } => Err(anyhow!(
                "{} field(s) failed validation",
                errors.len()
            )),
        }
    }

    /// Drive the same form the dialog shows
    pub fn run(&self) -> Result<SubmitOutcome> {
        let submitted = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&submitted);
        let mut form = ModalForm::new(move |data| *sink.borrow_mut() = data);

        form.set_value(Field::Name, &self.name);
        form.set_value(Field::Email, &self.email);
        form.set_value(Field::Github, &self.github);
        if !form.set_value(Field::Career, &self.career) {
            return Err(anyhow!(
                "unknown career option '{}', expected one of 1, 2, 3",
                self.career
            ));
        }

        if form.submit() {
            let data = submitted
                .borrow_mut()
                .take()
                .ok_or_else(|| anyhow!("form reported success without values"))?;
            debug!("headless submission accepted");
            return Ok(SubmitOutcome::Submitted { data });
        }

        let errors = form
            .errors()
            .failed()
            .map(|(field, message)| (field, message.to_string()))
            .collect();
        Ok(SubmitOutcome::Invalid { errors })
    }
}
