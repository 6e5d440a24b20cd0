//! Item-loop driver

use super::dispatcher;
use super::observer::{ExecutionEvent, LogObserver};
use super::traits::ExecutionObserver;
use crate::clients::ApiTransport;
use crate::error::{BisonError, Result};
use crate::params::{value_as_string, ParameterSource};
use crate::resources::OperationContext;
use bison_types::{NodeOperation, OutputItem, UnsupportedOperation};
use std::sync::Arc;
use uuid::Uuid;

/// Runs one node operation over every input item, strictly in order
pub struct NodeExecutor<T: ApiTransport> {
    transport: T,
    observer: Arc<dyn ExecutionObserver>,
    continue_on_fail: bool,
}

impl<T: ApiTransport> NodeExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            observer: Arc::new(LogObserver),
            continue_on_fail: false,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Turn item failures into `{error}` records instead of aborting
    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resource and operation are read once, from the first item
    pub async fn execute(
        &self,
        params: &dyn ParameterSource,
        item_count: usize,
    ) -> Result<Vec<OutputItem>> {
        let resource = params
            .parameter("resource", 0)
            .and_then(value_as_string)
            .unwrap_or_default();
        let operation = params
            .parameter("operation", 0)
            .and_then(value_as_string)
            .unwrap_or_default();

        let resolved = dispatcher::resolve(&resource, &operation);
        let label = format!("{}:{}", resource, operation);
        self.run(resolved, label, params, item_count).await
    }

    pub async fn execute_operation(
        &self,
        operation: NodeOperation,
        params: &dyn ParameterSource,
        item_count: usize,
    ) -> Result<Vec<OutputItem>> {
        self.run(Ok(operation), operation.to_string(), params, item_count)
            .await
    }

    async fn run(
        &self,
        resolved: std::result::Result<NodeOperation, UnsupportedOperation>,
        label: String,
        params: &dyn ParameterSource,
        item_count: usize,
    ) -> Result<Vec<OutputItem>> {
        let execution_id = Uuid::new_v4().to_string();
        self.observer.record(ExecutionEvent::BatchStarted {
            execution_id: execution_id.clone(),
            operation: label,
            items: item_count,
        });

        let mut output = Vec::new();
        let mut failures = 0;

        for item_index in 0..item_count {
            let result = match &resolved {
                Ok(operation) => {
                    let ctx = OperationContext::new(
                        &self.transport,
                        params,
                        self.observer.as_ref(),
                        item_index,
                    );
                    dispatcher::dispatch(&ctx, *operation).await
                }
                Err(unsupported) => Err(BisonError::Unsupported(unsupported.clone())),
            };

            match result {
                Ok(records) => {
                    output.extend(
                        records
                            .into_iter()
                            .map(|json| OutputItem::success(item_index, json)),
                    );
                }
                Err(e) => {
                    failures += 1;
                    self.observer.record(ExecutionEvent::ItemFailed {
                        item_index,
                        error: e.to_string(),
                        continued: self.continue_on_fail,
                    });
                    if !self.continue_on_fail {
                        return Err(e);
                    }
                    output.push(OutputItem::failure(item_index, e.to_string()));
                }
            }
        }

        self.observer.record(ExecutionEvent::BatchFinished {
            execution_id,
            records: output.len(),
            failures,
        });
        Ok(output)
    }
}
