// nbnak-api: async client for the Netbox REST API (dcim + ipam reads)

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::NetboxClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
