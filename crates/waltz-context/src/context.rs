//! The per-user context record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ContextResult;
use crate::filter::{DeviceFilter, UNIVERSAL_PATTERN};
use crate::store::{ContextPersistence, DeleteResponse};
use crate::types::RequestOptions;

/// Data associated with a user: known Tango hosts, device filters and an
/// extension bag for application state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    /// User id; the record's only identity.
    pub user: String,

    /// Host address to metadata (usually `null`), in insertion order.
    #[serde(default)]
    pub tango_hosts: Map<String, Value>,

    /// Raw `domain/family/member` patterns.
    #[serde(default)]
    pub device_filters: Vec<String>,

    /// Free-form extension values keyed by id.
    #[serde(default)]
    pub ext: Map<String, Value>,
}

impl UserContext {
    pub fn new(
        user: impl Into<String>,
        tango_hosts: Map<String, Value>,
        device_filters: Vec<String>,
        ext: Map<String, Value>,
    ) -> Self {
        Self {
            user: user.into(),
            tango_hosts,
            device_filters,
            ext,
        }
    }

    /// Context used when the cache has no record for `user`: no hosts, the
    /// universal device filter and an empty extension bag.
    pub fn default_for(user: impl Into<String>) -> Self {
        Self::new(
            user,
            Map::new(),
            vec![UNIVERSAL_PATTERN.to_string()],
            Map::new(),
        )
    }

    pub fn tango_hosts(&self) -> Vec<&str> {
        self.tango_hosts.keys().map(String::as_str).collect()
    }

    /// Register `host`; an existing entry has its metadata reset to `null`.
    pub fn add_tango_host(&mut self, host: impl Into<String>) -> &mut Self {
        self.tango_hosts.insert(host.into(), Value::Null);
        self
    }

    pub fn remove_tango_host(&mut self, host: &str) -> &mut Self {
        self.tango_hosts.shift_remove(host);
        self
    }

    /// Build a fresh [`DeviceFilter`] from the current patterns.
    pub fn to_device_filter(&self) -> DeviceFilter {
        DeviceFilter::new(self.user.clone(), self.device_filters.clone())
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.ext.get(id)
    }

    /// Return `ext[id]`, first storing `default` there if the current value
    /// is falsy (absent, `null`, `false`, `0` or `""`).
    pub fn get_or_default(&mut self, id: &str, default: impl Into<Value>) -> &Value {
        let slot = self.ext.entry(id).or_insert(Value::Null);
        if is_falsy(slot) {
            *slot = default.into();
        }
        slot
    }

    /// Run `updater` on `ext[id]` in place.
    pub fn update_ext<F>(&mut self, id: &str, updater: F) -> &mut Self
    where
        F: FnOnce(Option<&mut Value>),
    {
        updater(self.ext.get_mut(id));
        self
    }

    /// Persist this context through `store`, returning `self` on success.
    pub async fn save<S>(&self, store: &S, options: &RequestOptions) -> ContextResult<&Self>
    where
        S: ContextPersistence + ?Sized,
    {
        store.save(self, options).await?;
        Ok(self)
    }

    /// Delete this user's record through `store`.
    pub async fn delete<S>(
        &self,
        store: &S,
        options: &RequestOptions,
    ) -> ContextResult<DeleteResponse>
    where
        S: ContextPersistence + ?Sized,
    {
        store.delete(&self.user, options).await
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
