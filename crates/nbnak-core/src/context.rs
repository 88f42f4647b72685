// ── Device context assembly ──
//
// Resolves a device by name, then gathers whichever sections were asked
// for into a single document. Sections that were not requested are absent
// from the output, never null.

use std::collections::BTreeMap;
use std::convert::Infallible;

use serde::Serialize;
use tracing::{debug, info, warn};

use nbnak_api::NetboxClient;

use crate::error::CoreError;
use crate::port::{self, PortConfig};

/// VLAN catalog entry, keyed by VLAN id in [`DeviceContext::vlans`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VlanEntry {
    pub name: String,
}

/// The rendered document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<BTreeMap<String, PortConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlans: Option<BTreeMap<u16, VlanEntry>>,
}

/// What to do when a single interface cannot be normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Fail the whole run on the first bad interface.
    #[default]
    Abort,
    /// Log a warning and leave the interface out of the port map.
    Skip,
}

/// Which sections to include.
#[derive(Debug, Clone, Default)]
pub struct ContextRequest {
    pub device: Option<String>,
    pub vlans: bool,
    pub ports: bool,
    pub users: bool,
    pub on_port_error: ErrorPolicy,
}

impl ContextRequest {
    /// Reject combinations that cannot be satisfied.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.ports && self.device.is_none() {
            return Err(CoreError::ValidationFailed {
                message: "the ports section requires a device".into(),
            });
        }
        Ok(())
    }
}

/// User export has no data source yet.
pub fn export_users() -> Result<Infallible, CoreError> {
    Err(CoreError::NotImplemented {
        feature: "users".into(),
    })
}

/// Names tried when resolving a device: bare, then domain-qualified.
pub fn candidate_names(name: &str, search_domain: Option<&str>) -> Vec<String> {
    let mut names = vec![name.to_owned()];
    if let Some(domain) = search_domain.filter(|d| !d.is_empty()) {
        names.push(format!("{name}.{domain}"));
    }
    names
}

// ── Assembler ───────────────────────────────────────────────────────

pub struct ContextAssembler<'a> {
    client: &'a NetboxClient,
    search_domain: Option<String>,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(client: &'a NetboxClient, search_domain: Option<String>) -> Self {
        Self {
            client,
            search_domain,
        }
    }

    /// Resolve a short device name to its Netbox id.
    ///
    /// Tries the bare name first, then `name.<search_domain>`, and stops at
    /// the first name that matches any device.
    pub async fn resolve_device(&self, name: &str) -> Result<u64, CoreError> {
        let tried = candidate_names(name, self.search_domain.as_deref());
        for candidate in &tried {
            debug!(candidate, "looking up device");
            if let Some(device) = self.client.devices_named(candidate).await?.first() {
                info!(device = candidate, id = device.id, "resolved device");
                return Ok(device.id);
            }
        }
        Err(CoreError::DeviceNotFound { tried })
    }

    /// The hostname section for a resolved device.
    pub async fn hostname(&self, device_id: u64) -> Result<Option<String>, CoreError> {
        Ok(self.client.device(device_id).await?.name)
    }

    /// Every VLAN, reduced to `vid -> {name}`. Later duplicates win.
    pub async fn vlan_catalog(&self) -> Result<BTreeMap<u16, VlanEntry>, CoreError> {
        let vlans = self.client.vlans().await?;
        Ok(vlans
            .into_iter()
            .map(|v| (v.vid, VlanEntry { name: v.name }))
            .collect())
    }

    /// Normalized config for every interface of a device, keyed by name.
    pub async fn port_map(
        &self,
        device_id: u64,
        policy: ErrorPolicy,
    ) -> Result<BTreeMap<String, PortConfig>, CoreError> {
        let interfaces = self.client.device_interfaces(device_id).await?;
        debug!(device_id, count = interfaces.len(), "normalizing interfaces");

        let mut ports = BTreeMap::new();
        for iface in &interfaces {
            match port::normalize(self.client, iface).await {
                Ok(config) => {
                    ports.insert(iface.name.clone(), config);
                }
                Err(err @ CoreError::Port { .. }) if policy == ErrorPolicy::Skip => {
                    warn!("skipping interface: {err}");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(ports)
    }

    /// Build the document for `request`.
    pub async fn assemble(&self, request: &ContextRequest) -> Result<DeviceContext, CoreError> {
        request.validate()?;
        if request.users {
            match export_users()? {}
        }

        let mut context = DeviceContext::default();

        let device_id = match request.device.as_deref() {
            Some(name) => {
                let id = self.resolve_device(name).await?;
                context.hostname = self.hostname(id).await?;
                Some(id)
            }
            None => None,
        };

        if request.vlans {
            context.vlans = Some(self.vlan_catalog().await?);
        }

        if let (true, Some(id)) = (request.ports, device_id) {
            context.ports = Some(self.port_map(id, request.on_port_error).await?);
        }

        Ok(context)
    }
}
