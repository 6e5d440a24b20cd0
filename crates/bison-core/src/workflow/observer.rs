//! Observability channel injected into every handler
//!
//! Handlers never print; they emit [`ExecutionEvent`]s. [`LogObserver`]
//! forwards them to the `log` facade, [`MemoryObserver`] keeps them for
//! inspection.

use super::outcome::DependentStep;
use super::traits::ExecutionObserver;
use crate::clients::HttpMethod;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    BatchStarted {
        execution_id: String,
        operation: String,
        items: usize,
    },
    RequestIssued {
        item_index: usize,
        method: HttpMethod,
        path: String,
    },
    IdTokensDropped {
        item_index: usize,
        parameter: String,
        tokens: Vec<String>,
    },
    DependentStepSucceeded {
        item_index: usize,
        step: DependentStep,
    },
    DependentStepFailed {
        item_index: usize,
        step: DependentStep,
        error: String,
    },
    ItemFailed {
        item_index: usize,
        error: String,
        continued: bool,
    },
    OptionsLoadFailed {
        source: String,
        error: String,
    },
    BatchFinished {
        execution_id: String,
        records: usize,
        failures: usize,
    },
}

/// Default observer: structured events rendered through `log`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ExecutionObserver for LogObserver {
    fn record(&self, event: ExecutionEvent) {
        match event {
            ExecutionEvent::BatchStarted { execution_id, operation, items } => {
                log::info!("[{}] Running {} for {} item(s)", execution_id, operation, items);
            }
            ExecutionEvent::RequestIssued { item_index, method, path } => {
                log::debug!("Item {}: {} {}", item_index, method, path);
            }
            ExecutionEvent::IdTokensDropped { item_index, parameter, tokens } => {
                log::warn!(
                    "Item {}: ignored non-numeric ID(s) {:?} in '{}'",
                    item_index, tokens, parameter
                );
            }
            ExecutionEvent::DependentStepSucceeded { item_index, step } => {
                log::info!("Item {}: {} succeeded", item_index, step);
            }
            ExecutionEvent::DependentStepFailed { item_index, step, error } => {
                log::warn!(
                    "Item {}: {} failed, primary result kept: {}",
                    item_index, step, error
                );
            }
            ExecutionEvent::ItemFailed { item_index, error, continued } => {
                if continued {
                    log::warn!("Item {} failed, continuing: {}", item_index, error);
                } else {
                    log::error!("Item {} failed: {}", item_index, error);
                }
            }
            ExecutionEvent::OptionsLoadFailed { source, error } => {
                log::error!("Error loading {}: {}", source, error);
            }
            ExecutionEvent::BatchFinished { execution_id, records, failures } => {
                log::info!(
                    "[{}] Finished with {} record(s), {} failure(s)",
                    execution_id, records, failures
                );
            }
        }
    }
}

/// Collects events in memory
#[derive(Debug, Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<ExecutionEvent>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn dependent_failures(&self) -> Vec<(usize, DependentStep, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ExecutionEvent::DependentStepFailed { item_index, step, error } => {
                    Some((item_index, step, error))
                }
                _ => None,
            })
            .collect()
    }
}

impl ExecutionObserver for MemoryObserver {
    fn record(&self, event: ExecutionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
