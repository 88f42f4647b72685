//! Device context rendering on top of `nbnak-api`.
//!
//! - **[`port`]** normalizes a raw Netbox interface (and its LAG parent)
//!   into a [`PortConfig`] suitable for switch templating.
//! - **[`context`]** resolves devices by name and assembles the requested
//!   sections (hostname, VLAN catalog, port map) into a [`DeviceContext`].

pub mod context;
pub mod error;
pub mod port;

pub use context::{ContextAssembler, ContextRequest, DeviceContext, ErrorPolicy, VlanEntry};
pub use error::CoreError;
pub use port::{InterfaceLookup, ManagedPort, PortConfig, PortError, PortType, TaggedVlans};
