//! Reconstruction of one simulation run from a trace element.
//!
//! The three sections of a `FlowMonitor` element are independently ordered;
//! only flow ids tie them together. The flow-id index built here lives for
//! the duration of the join and is dropped afterwards.

use std::collections::HashMap;

use serde::Serialize;

use super::{FiveTuple, Flow, ProbeFlowStats};
use crate::config::LinkModel;
use crate::error::{Result, TraceError};
use crate::trace::Element;

const FLOW_STATS_PATH: &str = "FlowStats/Flow";
const CLASSIFIER_SECTION: &str = "Ipv4FlowClassifier";
const PROBES_SECTION: &str = "FlowProbes";
const PROBES_PATH: &str = "FlowProbes/FlowProbe";

/// All flows of one simulation run, in flow-record document order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Simulation {
    flows: Vec<Flow>,
}

impl Simulation {
    /// Build a simulation from a `FlowMonitor` element.
    ///
    /// Fails on the first malformed record, and with
    /// [`TraceError::JoinIntegrity`] when a classifier or probe record names
    /// an unknown flow, or a flow has no classifier record.
    pub fn from_element(el: &Element, link_model: &LinkModel) -> Result<Self> {
        let mut flows: Vec<Flow> = Vec::new();
        let mut index: HashMap<u32, usize> = HashMap::new();

        for flow_el in el.find_path(FLOW_STATS_PATH) {
            let flow = Flow::from_element_with(flow_el, link_model)?;
            if index.insert(flow.flow_id, flows.len()).is_some() {
                return Err(TraceError::malformed(
                    "Flow",
                    "flowId",
                    format!("duplicates flow {}", flow.flow_id),
                ));
            }
            flows.push(flow);
        }

        let mut classifiers = el.find_all(CLASSIFIER_SECTION);
        let classifier = match (classifiers.next(), classifiers.next()) {
            (Some(classifier), None) => classifier,
            (None, _) => {
                return Err(TraceError::malformed(el.name.as_str(), CLASSIFIER_SECTION, "section is missing"));
            }
            (Some(_), Some(_)) => {
                return Err(TraceError::malformed(el.name.as_str(), CLASSIFIER_SECTION, "section appears more than once"));
            }
        };

        for record in classifier.find_all("Flow") {
            let flow_id: u32 = record.parse_attr("flowId")?;
            let slot = *index
                .get(&flow_id)
                .ok_or_else(|| TraceError::join(CLASSIFIER_SECTION, flow_id))?;
            let five_tuple = FiveTuple::from_element(record)
                .map_err(|e| e.in_flow(CLASSIFIER_SECTION, flow_id))?;
            flows[slot].attach_five_tuple(five_tuple);
        }

        for probe in el.find_path(PROBES_PATH) {
            let probe_id: u32 = probe.parse_attr("index")?;
            for record in probe.find_all("FlowStats") {
                let (flow_id, stats) = ProbeFlowStats::from_element(probe_id, record)?;
                let slot = *index
                    .get(&flow_id)
                    .ok_or_else(|| TraceError::join(PROBES_SECTION, flow_id))?;
                flows[slot].push_probe_stats(stats);
            }
        }

        if let Some(orphan) = flows.iter().find(|f| f.five_tuple().is_none()) {
            return Err(TraceError::join(CLASSIFIER_SECTION, orphan.flow_id));
        }

        log::debug!("Joined {} flows from <{}>", flows.len(), el.name);
        Ok(Self { flows })
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Look up a flow by id
    pub fn flow(&self, flow_id: u32) -> Option<&Flow> {
        self.flows.iter().find(|f| f.flow_id == flow_id)
    }
}
