use serde::Serialize;

use crate::error::Result;
use crate::trace::Element;
use crate::units::ns_to_seconds;

/// Statistics one probe recorded for one flow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeFlowStats {
    pub probe_id: u32,
    pub packets: u64,
    pub bytes: u64,
    /// Mean delay since the flow's first probe, in seconds (0 with no packets)
    pub delay_from_first_probe: f64,
}

impl ProbeFlowStats {
    /// Decode a `FlowProbe/FlowStats` record.
    ///
    /// Returns the flow id the record belongs to alongside the stats. Errors
    /// past the flow id name the probe and the flow.
    pub fn from_element(probe_id: u32, el: &Element) -> Result<(u32, Self)> {
        let flow_id: u32 = el.parse_attr("flowId")?;
        let stats = Self::decode(probe_id, el)
            .map_err(|e| e.in_flow(format!("FlowProbe {}", probe_id), flow_id))?;
        Ok((flow_id, stats))
    }

    fn decode(probe_id: u32, el: &Element) -> Result<Self> {
        let packets: u64 = el.parse_attr("packets")?;
        let bytes: u64 = el.parse_attr("bytes")?;
        let delay_sum = el.time_attr("delayFromFirstProbeSum")?;

        let delay_from_first_probe = if packets > 0 {
            ns_to_seconds(delay_sum) / packets as f64
        } else {
            0.0
        };

        Ok(Self {
            probe_id,
            packets,
            bytes,
            delay_from_first_probe,
        })
    }
}
