// ── Netbox record types ──
//
// Typed views of the JSON records returned by the dcim and ipam endpoints.
// Only the fields nbnak consumes are modeled; everything else is ignored.
// Netbox serializes absent optional references as `null`, so nearly every
// nested field is an `Option`.

use serde::{Deserialize, Deserializer};

/// Collection envelope: `{ count, next, previous, results }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

/// A choice field, e.g. `{"value": "tagged", "label": "Tagged"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Choice {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

// ── dcim ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Nested device reference embedded in other records.
#[derive(Debug, Clone, Deserialize)]
pub struct NestedDevice {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Nested interface reference (e.g. an interface's `lag` parent).
#[derive(Debug, Clone, Deserialize)]
pub struct NestedInterface {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interface {
    pub id: u64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<Choice>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub lag: Option<NestedInterface>,
    #[serde(default)]
    pub connected_endpoint_type: Option<String>,
    #[serde(default)]
    pub connected_endpoint: Option<ConnectedEndpoint>,
    #[serde(default)]
    pub mode: Option<Choice>,
    #[serde(default)]
    pub untagged_vlan: Option<NestedVlan>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tagged_vlans: Vec<NestedVlan>,
}

fn default_enabled() -> bool {
    true
}

/// Netbox sends `null` for some empty strings and lists; treat it as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Interface {
    /// The interface `type` value, e.g. `"lag"` or `"10gbase-x-sfpp"`.
    pub fn kind_value(&self) -> Option<&str> {
        self.kind.as_ref().map(|c| c.value.as_str())
    }

    /// The switchport mode value, e.g. `"access"` or `"tagged-all"`.
    pub fn mode_value(&self) -> Option<&str> {
        self.mode.as_ref().map(|c| c.value.as_str())
    }
}

/// Whatever a cable terminates on at the far end.
///
/// The shape depends on `connected_endpoint_type`: a remote interface
/// carries `device` + `name`, a circuit termination carries `circuit`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectedEndpoint {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub device: Option<NestedDevice>,
    #[serde(default)]
    pub circuit: Option<NestedCircuit>,
}

// ── circuits ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NestedCircuit {
    pub id: u64,
    pub cid: String,
}

// ── ipam ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Vlan {
    pub id: u64,
    pub vid: u16,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedVlan {
    pub id: u64,
    pub vid: u16,
    #[serde(default)]
    pub name: Option<String>,
}
