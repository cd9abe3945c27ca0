//! Typed view of a node's `sysinfo.json` status document.
//!
//! Every field is optional. Fields whose shape differs between firmware
//! releases are kept as raw JSON values and passed through untouched. Typed
//! fields holding a value of the wrong type read as absent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Link type reported for tunnel links.
pub const TUNNEL_LINK_TYPE: &str = "TUN";

/// Link type given to tunnel links of a supernode.
pub const SUPERNODE_TUNNEL_LINK_TYPE: &str = "STUN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDocument {
    #[serde(deserialize_with = "lenient")]
    pub node: Option<String>,
    pub lastseen: Option<Value>,
    pub lat: Option<Value>,
    pub lon: Option<Value>,
    pub meshrf: Option<Value>,
    pub chanbw: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub node_details: Option<Map<String, Value>>,
    pub interfaces: Option<Value>,
    pub link_info: Option<Value>,
    pub lqm: Option<Value>,
    #[serde(deserialize_with = "lenient_hosts")]
    pub hosts: Option<Vec<HostEntry>>,
}

/// One entry of the `hosts` neighbor list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostEntry {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Entries that are not host objects are dropped, the rest are kept.
fn lenient_hosts<'de, D>(deserializer: D) -> Result<Option<Vec<HostEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => Ok(Some(
            entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value(entry).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

impl RawDocument {
    /// The node's self-reported name, if present and non-empty.
    pub fn identity(&self) -> Option<&str> {
        self.node.as_deref().filter(|name| !name.is_empty())
    }

    /// Whether both coordinates are present and truthy.
    pub fn has_location(&self) -> bool {
        is_truthy(self.lat.as_ref()) && is_truthy(self.lon.as_ref())
    }

    /// Whether `node_details.mesh_supernode` is set.
    pub fn is_supernode(&self) -> bool {
        self.node_details
            .as_ref()
            .is_some_and(|details| is_truthy(details.get("mesh_supernode")))
    }

    /// Names of the neighbors listed in `hosts`, in document order.
    ///
    /// Entries without a name are skipped.
    pub fn neighbors(&self) -> impl Iterator<Item = &str> {
        self.hosts
            .iter()
            .flatten()
            .filter_map(|host| host.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are false.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
    }
}
