//! Error types for trace decoding and flow reconstruction.
//!
//! Every variant is scoped to the file being read: callers that process a
//! batch log the error together with the file path and move on to the next
//! trace.

/// Errors that can occur while decoding a flow-monitor trace
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Malformed timestamp: {value:?} (expected <integer>ns)")]
    MalformedTimestamp { value: String },

    #[error("Malformed <{element}> record: attribute '{attribute}' {reason}")]
    MalformedRecord {
        element: String,
        attribute: String,
        reason: String,
    },

    /// Failure inside a record whose flow id is known
    #[error("In {record} record of flow {flow_id}")]
    InFlow {
        record: String,
        flow_id: u32,
        #[source]
        source: Box<TraceError>,
    },

    #[error("Join integrity error: {section} references flow {flow_id} with no matching flow record")]
    JoinIntegrity { section: String, flow_id: u32 },

    #[error("Trace ended inside an open <{tag}> element")]
    Truncated { tag: String },

    #[error("XML decoding failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TraceError {
    /// Shorthand for a `MalformedRecord` error.
    pub fn malformed(element: &str, attribute: &str, reason: impl Into<String>) -> Self {
        TraceError::MalformedRecord {
            element: element.to_string(),
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }

    pub fn join(section: &str, flow_id: u32) -> Self {
        TraceError::JoinIntegrity {
            section: section.to_string(),
            flow_id,
        }
    }

    /// Attach the record and flow id this error was raised for
    pub fn in_flow(self, record: impl Into<String>, flow_id: u32) -> Self {
        TraceError::InFlow {
            record: record.into(),
            flow_id,
            source: Box::new(self),
        }
    }

    /// Flow id of the record that failed, if known
    pub fn flow_id(&self) -> Option<u32> {
        match self {
            TraceError::InFlow { flow_id, .. } | TraceError::JoinIntegrity { flow_id, .. } => Some(*flow_id),
            _ => None,
        }
    }
}

pub type Result<T, E = TraceError> = std::result::Result<T, E>;

#[cfg(test)]
impl TraceError {
    /// The innermost error, past any flow context
    pub(crate) fn root(&self) -> &TraceError {
        match self {
            TraceError::InFlow { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_join_error_names_section_and_flow() {
        let err = TraceError::join("Ipv4FlowClassifier", 7);
        assert_eq!(
            err.to_string(),
            "Join integrity error: Ipv4FlowClassifier references flow 7 with no matching flow record"
        );
        assert_eq!(err.flow_id(), Some(7));
    }

    #[test]
    fn test_flow_context_keeps_cause() {
        let err = TraceError::MalformedTimestamp { value: "5us".to_string() }.in_flow("FlowStats", 42);
        assert_eq!(err.to_string(), "In FlowStats record of flow 42");
        assert_eq!(err.flow_id(), Some(42));
        assert!(matches!(err.root(), TraceError::MalformedTimestamp { value } if value == "5us"));
        assert!(err.source().unwrap().to_string().contains("5us"));
    }
}
