//! Terminal questions for the wizard

use anyhow::Result;
use buckup_core::ProvisionError;
use dialoguer::{Confirm, Input};
use std::io;

fn interrupted_as_cancel(err: dialoguer::Error) -> anyhow::Error {
    match err {
        dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => {
            ProvisionError::Cancelled.into()
        }
        dialoguer::Error::IO(e) => anyhow::Error::new(e).context("Failed to read answer"),
    }
}

/// Free-text answer, possibly empty.
pub fn ask(question: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(question)
        .allow_empty(true)
        .interact_text()
        .map_err(interrupted_as_cancel)
}

/// Free-text answer with a default shown in brackets and used on empty input.
pub fn ask_with_default(question: &str, default: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(question)
        .default(default.to_string())
        .interact_text()
        .map_err(interrupted_as_cancel)
}

/// y/n question with no default; it is asked again until answered.
pub fn ask_yes_no(question: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(question)
        .interact()
        .map_err(interrupted_as_cancel)
}

/// Split a comma separated answer, trimming entries and dropping blank ones.
pub fn split_comma_list(answer: &str) -> Vec<String> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
