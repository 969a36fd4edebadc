//! Per-flow metric derivation.
//!
//! All durations are computed from raw nanosecond differences and converted
//! to seconds once. Metrics that are undefined for a flow (no packets
//! received, zero-length transmission window) are `None`, never zero.

use serde::Serialize;

use super::{FiveTuple, Histogram, ProbeFlowStats};
use crate::config::LinkModel;
use crate::error::Result;
use crate::trace::Element;
use crate::units::ns_to_seconds;

/// Hop count reported for flows that never delivered a packet
pub const HOP_COUNT_UNKNOWN: f64 = -1000.0;

const FLOW_STATS_RECORD: &str = "FlowStats";

/// One flow of a simulation with its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flow {
    pub flow_id: u32,
    /// Bytes transmitted
    pub size: u64,
    /// Time of the first transmitted packet, seconds
    pub start: f64,
    /// Time of the last received packet, seconds
    pub finish: f64,
    /// Mean one-way packet delay, seconds
    pub delay_mean: Option<f64>,
    /// Mean received packet size, bytes
    pub packet_size_mean: Option<f64>,
    pub rx_bitrate: Option<f64>,
    pub tx_bitrate: Option<f64>,
    /// lost / (received + lost)
    pub packet_loss_ratio: Option<f64>,
    /// Mean forwarding count + 1, or [`HOP_COUNT_UNKNOWN`]
    pub hop_count: f64,
    pub rx_duration: f64,
    /// First transmission to last reception, seconds
    pub raw_duration: f64,
    /// `raw_duration` relative to the ideal duration of the link model
    pub slowdown: Option<f64>,
    pub flow_interruptions_histogram: Option<Histogram>,
    five_tuple: Option<FiveTuple>,
    probe_stats_unsorted: Vec<ProbeFlowStats>,
}

impl Flow {
    /// Decode a `FlowStats/Flow` record using the default link model.
    pub fn from_element(el: &Element) -> Result<Self> {
        Self::from_element_with(el, &LinkModel::default())
    }

    /// Decode a `FlowStats/Flow` record. Errors after `flowId` has been read
    /// are reported as [`crate::error::TraceError::InFlow`] naming the flow.
    pub fn from_element_with(el: &Element, link_model: &LinkModel) -> Result<Self> {
        let flow_id: u32 = el.parse_attr("flowId")?;
        Self::decode(flow_id, el, link_model).map_err(|e| e.in_flow(FLOW_STATS_RECORD, flow_id))
    }

    fn decode(flow_id: u32, el: &Element, link_model: &LinkModel) -> Result<Self> {
        let rx_packets: u64 = el.parse_attr("rxPackets")?;
        // Decoded to validate the record even though no metric uses it
        let _tx_packets: u64 = el.parse_attr("txPackets")?;
        let tx_bytes: u64 = el.parse_attr("txBytes")?;
        let rx_bytes: u64 = el.parse_attr("rxBytes")?;
        let lost_packets: u64 = el.parse_attr("lostPackets")?;
        let times_forwarded: u64 = el.parse_attr("timesForwarded")?;

        let first_tx = el.time_attr("timeFirstTxPacket")?;
        let last_tx = el.time_attr("timeLastTxPacket")?;
        let first_rx = el.time_attr("timeFirstRxPacket")?;
        let last_rx = el.time_attr("timeLastRxPacket")?;
        let delay_sum = el.time_attr("delaySum")?;

        let tx_duration = ns_to_seconds(last_tx - first_tx);
        let rx_duration = ns_to_seconds(last_rx - first_rx);
        let actual_duration = ns_to_seconds(last_rx - first_tx);

        let ideal_duration = link_model.ideal_duration(tx_bytes as f64 * 8.0);
        let slowdown = (ideal_duration > 0.0).then(|| actual_duration / ideal_duration);

        let received = rx_packets > 0;
        let rx = rx_packets as f64;

        let hop_count = if received {
            times_forwarded as f64 / rx + 1.0
        } else {
            HOP_COUNT_UNKNOWN
        };
        let delay_mean = received.then(|| ns_to_seconds(delay_sum) / rx);
        let packet_size_mean = received.then(|| rx_bytes as f64 / rx);
        let packet_loss_ratio = received.then(|| {
            let lost = lost_packets as f64;
            lost / (rx + lost)
        });

        let rx_bitrate = (rx_duration > 0.0).then(|| rx_bytes as f64 * 8.0 / rx_duration);
        let tx_bitrate = (tx_duration > 0.0).then(|| tx_bytes as f64 * 8.0 / tx_duration);

        let flow_interruptions_histogram = el
            .find("flowInterruptionsHistogram")
            .map(Histogram::from_element)
            .transpose()?;

        Ok(Self {
            flow_id,
            size: tx_bytes,
            start: ns_to_seconds(first_tx),
            finish: ns_to_seconds(last_rx),
            delay_mean,
            packet_size_mean,
            rx_bitrate,
            tx_bitrate,
            packet_loss_ratio,
            hop_count,
            rx_duration,
            raw_duration: actual_duration,
            slowdown,
            flow_interruptions_histogram,
            five_tuple: None,
            probe_stats_unsorted: Vec::new(),
        })
    }

    /// Classifier identity; always present on flows of a joined [`super::Simulation`]
    pub fn five_tuple(&self) -> Option<&FiveTuple> {
        self.five_tuple.as_ref()
    }

    /// Hop count, or `None` when no packet was received
    pub fn known_hop_count(&self) -> Option<f64> {
        (self.hop_count != HOP_COUNT_UNKNOWN).then_some(self.hop_count)
    }

    /// Probe samples in probe discovery order
    pub fn probe_stats_unsorted(&self) -> &[ProbeFlowStats] {
        &self.probe_stats_unsorted
    }

    /// Probe samples ordered by probe index
    pub fn probe_stats_sorted(&self) -> Vec<&ProbeFlowStats> {
        let mut stats: Vec<&ProbeFlowStats> = self.probe_stats_unsorted.iter().collect();
        stats.sort_by_key(|s| s.probe_id);
        stats
    }

    pub(crate) fn attach_five_tuple(&mut self, five_tuple: FiveTuple) {
        self.five_tuple = Some(five_tuple);
    }

    pub(crate) fn push_probe_stats(&mut self, stats: ProbeFlowStats) {
        self.probe_stats_unsorted.push(stats);
    }
}
