//! Per-resource operation handlers
//!
//! Every handler receives an [`OperationContext`] for one item and returns
//! the JSON records that item produces.

pub mod blacklists;
pub mod campaigns;
pub mod email_accounts;
pub mod leads;
pub mod replies;
pub mod sequence_steps;
pub mod tags;
pub mod webhooks;
pub mod workspaces;

use crate::clients::{ApiRequest, ApiTransport};
use crate::constants::DEFAULT_LIMIT;
use crate::error::Result;
use crate::params::{ParameterSource, Params};
use crate::response::{self, Listing};
use crate::workflow::{ExecutionEvent, ExecutionObserver, Outcome};
use serde_json::{json, Value};

/// Everything a handler may touch while processing one item
pub struct OperationContext<'a> {
    transport: &'a dyn ApiTransport,
    observer: &'a dyn ExecutionObserver,
    params: Params<'a>,
}

impl<'a> OperationContext<'a> {
    pub fn new(
        transport: &'a dyn ApiTransport,
        source: &'a dyn ParameterSource,
        observer: &'a dyn ExecutionObserver,
        item_index: usize,
    ) -> Self {
        Self {
            transport,
            observer,
            params: Params::new(source, observer, item_index),
        }
    }

    pub fn params(&self) -> &Params<'a> {
        &self.params
    }

    pub fn item_index(&self) -> usize {
        self.params.item_index()
    }

    pub fn observer(&self) -> &dyn ExecutionObserver {
        self.observer
    }

    /// Raw response body
    pub async fn call(&self, request: ApiRequest) -> Result<Value> {
        self.observer.record(ExecutionEvent::RequestIssued {
            item_index: self.item_index(),
            method: request.method,
            path: request.path.clone(),
        });
        self.transport.send(request).await
    }

    /// Response with the `data` envelope removed
    pub async fn fetch(&self, request: ApiRequest) -> Result<Value> {
        Ok(response::unwrap_data(self.call(request).await?))
    }

    /// Single-entity call turned into output records
    pub async fn records(&self, request: ApiRequest) -> Result<Vec<Value>> {
        Ok(response::unwrap_records(self.call(request).await?))
    }

    /// `returnAll` / `limit` driven list call
    pub async fn list(&self, request: ApiRequest) -> Result<Vec<Value>> {
        let listing = self.listing()?;
        self.observer.record(ExecutionEvent::RequestIssued {
            item_index: self.item_index(),
            method: request.method,
            path: request.path.clone(),
        });
        response::collect_list(self.transport, request, listing).await
    }

    pub fn listing(&self) -> Result<Listing> {
        if self.params.bool_or("returnAll", false) {
            Ok(Listing::All)
        } else {
            Ok(Listing::Limit(self.params.u64_or("limit", DEFAULT_LIMIT)?))
        }
    }

    /// Issue a delete and acknowledge it with `{success, id}`
    pub async fn delete(&self, path: String, id: &str) -> Result<Vec<Value>> {
        self.call(ApiRequest::delete(path)).await?;
        Ok(vec![json!({"success": true, "id": id})])
    }

    /// Hand the dependent steps of a composite operation to the observer
    pub fn report<T>(&self, outcome: &Outcome<T>) {
        for dependent in &outcome.dependents {
            let event = match dependent {
                Ok(step) => ExecutionEvent::DependentStepSucceeded {
                    item_index: self.item_index(),
                    step: *step,
                },
                Err(e) => ExecutionEvent::DependentStepFailed {
                    item_index: self.item_index(),
                    step: e.step,
                    error: e.message.clone(),
                },
            };
            self.observer.record(event);
        }
    }
}

/// `id` field of a created entity, unwrapped or not
pub(crate) fn entity_id(entity: &Value) -> Option<i64> {
    let id = entity.get("id")?;
    id.as_i64()
        .or_else(|| id.as_str().and_then(crate::params::parse_id_token))
}
