use serde::Serialize;

use crate::error::Result;
use crate::trace::Element;

/// Network identity of a flow, from an `Ipv4FlowClassifier/Flow` record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FiveTuple {
    pub source_address: String,
    pub destination_address: String,
    pub protocol: u8,
    pub source_port: u16,
    pub destination_port: u16,
}

impl FiveTuple {
    pub fn from_element(el: &Element) -> Result<Self> {
        Ok(Self {
            source_address: el.required_attr("sourceAddress")?.to_string(),
            destination_address: el.required_attr("destinationAddress")?.to_string(),
            protocol: el.parse_attr("protocol")?,
            source_port: el.parse_attr("sourcePort")?,
            destination_port: el.parse_attr("destinationPort")?,
        })
    }
}

impl std::fmt::Display for FiveTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{} (proto {})",
            self.source_address, self.source_port, self.destination_address, self.destination_port, self.protocol
        )
    }
}
