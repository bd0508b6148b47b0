// ── Property-tree snapshots ──
//
// `RetrieveProperties` returns a nested tree of data objects. Clients hand
// it to callers as a JSON value with the VMODL property names unchanged
// (`summary.config.numCpu`, `guest.toolsStatus`, ...). Lookups treat JSON
// `null` and a missing key the same way: the property is not set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Point-in-time snapshot of a managed object's properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet(Map<String, Value>);

impl PropertySet {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self(properties)
    }

    /// Resolve a dotted property path (`summary.runtime.powerState`).
    ///
    /// Returns `None` when any segment is missing, is not an object, or the
    /// final value is `null`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// Whether the property at `path` is set.
    pub fn has(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// First set property among `candidates`, in order.
    ///
    /// Used where newer API versions renamed a property and both spellings
    /// may be present on the same object.
    pub fn first_of<'a>(&'a self, candidates: &[&str]) -> Option<&'a Value> {
        candidates.iter().find_map(|path| self.lookup(path))
    }

    pub fn str(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(Value::as_str)
    }

    pub fn i64(&self, path: &str) -> Option<i64> {
        self.lookup(path).and_then(Value::as_i64)
    }

    pub fn bool(&self, path: &str) -> Option<bool> {
        self.lookup(path).and_then(Value::as_bool)
    }

    /// Array property, empty when unset.
    pub fn array(&self, path: &str) -> &[Value] {
        self.lookup(path)
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice)
    }

    /// The managed entity `name` property.
    pub fn name(&self) -> Option<&str> {
        self.str("name")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for PropertySet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
