use serde::{Deserialize, Serialize};

use crate::model::Flow;

/// Per-flow scalar that can be summarised across a group of runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Bytes transmitted by the flow
    #[default]
    Size,
    /// First transmission to last reception
    RawDuration,
    /// Completion time relative to the ideal duration
    Slowdown,
    DelayMean,
    RxBitrate,
    TxBitrate,
    LossRatio,
    HopCount,
    PacketSizeMean,
}

impl Metric {
    /// Value of this metric for one flow, `None` where it is undefined
    pub fn extract(self, flow: &Flow) -> Option<f64> {
        match self {
            Metric::Size => Some(flow.size as f64),
            Metric::RawDuration => Some(flow.raw_duration),
            Metric::Slowdown => flow.slowdown,
            Metric::DelayMean => flow.delay_mean,
            Metric::RxBitrate => flow.rx_bitrate,
            Metric::TxBitrate => flow.tx_bitrate,
            Metric::LossRatio => flow.packet_loss_ratio,
            Metric::HopCount => flow.known_hop_count(),
            Metric::PacketSizeMean => flow.packet_size_mean,
        }
    }

    /// Name as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            Metric::Size => "size",
            Metric::RawDuration => "raw-duration",
            Metric::Slowdown => "slowdown",
            Metric::DelayMean => "delay-mean",
            Metric::RxBitrate => "rx-bitrate",
            Metric::TxBitrate => "tx-bitrate",
            Metric::LossRatio => "loss-ratio",
            Metric::HopCount => "hop-count",
            Metric::PacketSizeMean => "packet-size-mean",
        }
    }

    /// Axis label for reports
    pub fn label(self) -> &'static str {
        match self {
            Metric::Size => "Flow Size (bytes)",
            Metric::RawDuration => "Flow Completion Time (s)",
            Metric::Slowdown => "FCT Slowdown",
            Metric::DelayMean => "Mean Packet Delay (s)",
            Metric::RxBitrate => "Receive Bitrate (bit/s)",
            Metric::TxBitrate => "Transmit Bitrate (bit/s)",
            Metric::LossRatio => "Packet Loss Ratio",
            Metric::HopCount => "Hop Count",
            Metric::PacketSizeMean => "Mean Packet Size (bytes)",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
