//! Two-phase result of composite operations
//!
//! A composite operation performs one primary mutation followed by
//! best-effort dependent calls. Only the primary result travels through the
//! error path; dependent failures are kept here and reported to the observer.

use std::fmt;
use thiserror::Error;

/// Best-effort follow-up calls issued after a primary mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependentStep {
    AttachSenderEmails,
    CreateSequenceStep,
    AttachTags,
    ResolveSequenceTitle,
}

impl DependentStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependentStep::AttachSenderEmails => "attach sender emails",
            DependentStep::CreateSequenceStep => "create sequence step",
            DependentStep::AttachTags => "attach tags",
            DependentStep::ResolveSequenceTitle => "resolve sequence title",
        }
    }
}

impl fmt::Display for DependentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{step} failed: {message}")]
pub struct DependentStepError {
    pub step: DependentStep,
    pub message: String,
}

impl DependentStepError {
    pub fn new(step: DependentStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}

/// Primary entity plus the fate of each dependent step
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub primary: T,
    pub dependents: Vec<Result<DependentStep, DependentStepError>>,
}

impl<T> Outcome<T> {
    pub fn new(primary: T) -> Self {
        Self {
            primary,
            dependents: Vec::new(),
        }
    }

    pub fn succeeded(&mut self, step: DependentStep) {
        self.dependents.push(Ok(step));
    }

    pub fn failed(&mut self, step: DependentStep, message: impl Into<String>) {
        self.dependents.push(Err(DependentStepError::new(step, message)));
    }

    pub fn failures(&self) -> impl Iterator<Item = &DependentStepError> {
        self.dependents.iter().filter_map(|d| d.as_ref().err())
    }

    pub fn is_clean(&self) -> bool {
        self.dependents.iter().all(Result::is_ok)
    }
}
