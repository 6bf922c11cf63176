//! Last stored update timestamp across both granularity tables.

use serde_json::{json, Value};

use tickvane_warehouse::BarStore;

use crate::error::CliError;

pub fn run(store: &BarStore) -> Result<Value, CliError> {
    let last = store.last_update_timestamp()?;
    Ok(json!({ "last_update_timestamp": last }))
}
