// ── Port normalization ──
//
// Turns a raw Netbox interface into the compact per-port record consumed
// by the switch templates. Interfaces that are neither cabled nor a LAG are
// "clean": the templates leave them alone and nothing else is derived.
//
// LAG members inherit switchport settings from their Port-channel parent.
// Settings on the member's own record are applied afterwards and override
// anything inherited; fields the member leaves empty keep the parent value.

use std::collections::BTreeSet;
use std::future::Future;
use std::str::FromStr;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

use nbnak_api::NetboxClient;
use nbnak_api::models::Interface;

use crate::error::CoreError;

/// Interface `type` value marking a link-aggregation interface.
const LAG_KIND: &str = "lag";

/// Name prefix of LAG interfaces; the remainder is the group number.
const LAG_PREFIX: &str = "Port-channel";

/// Native VLAN forced by the `tagged-all` mode.
const TAGGED_ALL_NATIVE_VLAN: u16 = 1;

// ── Errors ──────────────────────────────────────────────────────────

/// Why a single interface could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("unrecognized switchport mode '{mode}'")]
    UnknownMode { mode: String },

    #[error("unrecognized connected endpoint type '{kind}'")]
    UnknownEndpoint { kind: String },

    #[error("connected endpoint of type '{kind}' has no {field}")]
    MalformedEndpoint { kind: String, field: &'static str },

    #[error("cannot parse link-aggregation number from parent LAG interface name '{name}'")]
    InvalidLagName { name: String },
}

// ── Inventory vocabulary ────────────────────────────────────────────

/// Switchport mode as Netbox spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SwitchportMode {
    Access,
    Tagged,
    TaggedAll,
}

/// What a cable lands on at the far end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, Display)]
pub enum EndpointKind {
    #[strum(serialize = "dcim.interface")]
    Interface,
    #[strum(serialize = "circuits.circuittermination")]
    CircuitTermination,
}

// ── Normalized output ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Access,
    Trunk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LagMode {
    Active,
}

/// Tagged VLANs on a trunk: either everything, or an explicit set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedVlans {
    All,
    Vlans(BTreeSet<u16>),
}

impl Serialize for TaggedVlans {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Vlans(vids) => {
                let mut seq = serializer.serialize_seq(Some(vids.len()))?;
                for vid in vids {
                    seq.serialize_element(vid)?;
                }
                seq.end()
            }
        }
    }
}

/// Settings for a port the templates should manage.
///
/// Fields are declared alphabetically so rendered documents have stable,
/// sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManagedPort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lag: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lagmode: Option<LagMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    pub shutdown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagged: Option<TaggedVlans>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub port_type: Option<PortType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub untagged: Option<u16>,
}

/// Normalized form of one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortConfig {
    /// Not cabled and not a LAG: rendered as `{clean: true}` only.
    Clean,
    Managed(ManagedPort),
}

impl Serialize for PortConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Clean => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("clean", &true)?;
                map.end()
            }
            Self::Managed(port) => port.serialize(serializer),
        }
    }
}

impl PortConfig {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    /// Derive the port config from an interface and, for LAG members,
    /// the parent LAG's own record.
    ///
    /// When `iface` names a LAG parent but `lag_parent` is `None`, the group
    /// number is still set and no switchport settings are inherited.
    pub fn derive(iface: &Interface, lag_parent: Option<&Interface>) -> Result<Self, PortError> {
        if is_clean(iface) {
            return Ok(Self::Clean);
        }

        let mut port = ManagedPort {
            descr: describe(iface)?,
            shutdown: !iface.enabled,
            ..ManagedPort::default()
        };

        if let Some(lag) = &iface.lag {
            port.lag = Some(lag_group(&lag.name)?);
            port.lagmode = Some(LagMode::Active);
            if let Some(parent) = lag_parent {
                apply_switchport(&mut port, parent)?;
            }
        }

        // Own settings last: they override whatever the parent supplied.
        apply_switchport(&mut port, iface)?;

        port.mtu = iface.mtu;

        Ok(Self::Managed(port))
    }
}

// ── Normalization rules ─────────────────────────────────────────────

/// An interface is clean unless something is cabled to it or it is a LAG.
pub fn is_clean(iface: &Interface) -> bool {
    iface.connected_endpoint_type.is_none() && iface.kind_value() != Some(LAG_KIND)
}

/// Extract `N` from a `Port-channel<N>` interface name.
pub fn lag_group(name: &str) -> Result<u32, PortError> {
    name.strip_prefix(LAG_PREFIX)
        .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| PortError::InvalidLagName {
            name: name.to_owned(),
        })
}

/// Pick the port description.
///
/// The interface's own description wins; otherwise it is synthesized from
/// the far end of the cable. A non-clean interface with no endpoint at all
/// (a bare LAG) has no description.
fn describe(iface: &Interface) -> Result<Option<String>, PortError> {
    if !iface.description.is_empty() {
        return Ok(Some(iface.description.clone()));
    }

    let Some(raw_kind) = iface.connected_endpoint_type.as_deref() else {
        return Ok(None);
    };
    let kind = EndpointKind::from_str(raw_kind).map_err(|_| PortError::UnknownEndpoint {
        kind: raw_kind.to_owned(),
    })?;

    let malformed = |field| PortError::MalformedEndpoint {
        kind: raw_kind.to_owned(),
        field,
    };
    let endpoint = iface
        .connected_endpoint
        .as_ref()
        .ok_or_else(|| malformed("record"))?;

    let descr = match kind {
        EndpointKind::Interface => {
            let device = endpoint
                .device
                .as_ref()
                .and_then(|d| d.name.as_deref())
                .ok_or_else(|| malformed("device name"))?;
            let name = endpoint
                .name
                .as_deref()
                .ok_or_else(|| malformed("interface name"))?;
            format!("{device}:{name}")
        }
        EndpointKind::CircuitTermination => endpoint
            .circuit
            .as_ref()
            .map(|c| c.cid.clone())
            .ok_or_else(|| malformed("circuit"))?,
    };

    Ok(Some(descr))
}

/// Apply the switchport mode and VLAN membership of `record` onto `port`.
///
/// Only fields `record` actually carries are written; absent ones leave
/// earlier values in place.
fn apply_switchport(port: &mut ManagedPort, record: &Interface) -> Result<(), PortError> {
    if let Some(raw_mode) = record.mode_value() {
        let mode = SwitchportMode::from_str(raw_mode).map_err(|_| PortError::UnknownMode {
            mode: raw_mode.to_owned(),
        })?;
        match mode {
            SwitchportMode::Access => port.port_type = Some(PortType::Access),
            SwitchportMode::Tagged => port.port_type = Some(PortType::Trunk),
            SwitchportMode::TaggedAll => {
                port.port_type = Some(PortType::Trunk);
                port.untagged = Some(TAGGED_ALL_NATIVE_VLAN);
                port.tagged = Some(TaggedVlans::All);
            }
        }
    }

    if let Some(vlan) = &record.untagged_vlan {
        port.untagged = Some(vlan.vid);
    }

    if !record.tagged_vlans.is_empty() {
        let vids = record.tagged_vlans.iter().map(|v| v.vid).collect();
        port.tagged = Some(TaggedVlans::Vlans(vids));
    }

    Ok(())
}

// ── Async entry point ───────────────────────────────────────────────

/// Source of interface records by id, used to fetch LAG parents.
pub trait InterfaceLookup {
    fn interface(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Interface, nbnak_api::Error>> + Send;
}

impl InterfaceLookup for NetboxClient {
    fn interface(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Interface, nbnak_api::Error>> + Send {
        NetboxClient::interface(self, id)
    }
}

/// Normalize one interface, fetching its LAG parent through `lookup`.
///
/// Clean interfaces never trigger a lookup. The parent name is validated
/// before the parent is fetched.
pub async fn normalize<L: InterfaceLookup + Sync>(
    lookup: &L,
    iface: &Interface,
) -> Result<PortConfig, CoreError> {
    if is_clean(iface) {
        return Ok(PortConfig::Clean);
    }

    let parent = match &iface.lag {
        Some(lag) => {
            lag_group(&lag.name).map_err(|e| CoreError::port(&iface.name, e))?;
            Some(lookup.interface(lag.id).await?)
        }
        None => None,
    };

    PortConfig::derive(iface, parent.as_ref()).map_err(|e| CoreError::port(&iface.name, e))
}
