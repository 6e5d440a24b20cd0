//! Response unwrapping and list pagination

use crate::clients::{ApiRequest, ApiTransport};
use crate::constants::MAX_PAGES;
use crate::error::Result;
use serde_json::Value;

/// `{"data": x}` becomes `x`; anything else passes through
pub fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Records of a list endpoint; a non-array payload means no records
pub fn unwrap_list(body: Value) -> Vec<Value> {
    match unwrap_data(body) {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Records of a single-entity endpoint: one record, or the array's elements
pub fn unwrap_records(body: Value) -> Vec<Value> {
    match unwrap_data(body) {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: u64,
    pub last_page: u64,
}

impl PageInfo {
    pub fn from_body(body: &Value) -> Option<Self> {
        let meta = body.get("meta")?;
        Some(Self {
            current_page: meta.get("current_page")?.as_u64()?,
            last_page: meta.get("last_page")?.as_u64()?,
        })
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// How many records a `getMany` should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    All,
    Limit(u64),
}

/// Run a list request, following pages for [`Listing::All`]
pub async fn collect_list(
    transport: &dyn ApiTransport,
    request: ApiRequest,
    listing: Listing,
) -> Result<Vec<Value>> {
    match listing {
        Listing::Limit(limit) => {
            let body = transport.send(request.query("limit", limit)).await?;
            let mut records = unwrap_list(body);
            records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(records)
        }
        Listing::All => {
            let mut records = Vec::new();
            for page in 1..=MAX_PAGES {
                let body = transport.send(request.clone().query("page", page)).await?;
                let info = PageInfo::from_body(&body);
                // An upstream that ignores `page` keeps answering with an earlier one
                if matches!(info, Some(info) if info.current_page < u64::from(page)) {
                    log::warn!("Pagination stalled before page {}, stopping", page);
                    break;
                }
                let batch = unwrap_list(body);
                let exhausted = batch.is_empty();
                records.extend(batch);

                match info {
                    Some(info) if info.has_more() && !exhausted => continue,
                    _ => break,
                }
            }
            Ok(records)
        }
    }
}
