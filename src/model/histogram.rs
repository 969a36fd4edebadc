use serde::Serialize;

use crate::error::Result;
use crate::trace::Element;

/// One histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub width: f64,
    pub count: u64,
}

/// Flow interruption histogram, kept for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Decode the `bin` children of a histogram element, in document order.
    /// The `nBins` attribute is not needed and is ignored.
    pub fn from_element(el: &Element) -> Result<Self> {
        let bins = el
            .find_all("bin")
            .map(|bin| {
                Ok(HistogramBin {
                    start: bin.parse_attr("start")?,
                    width: bin.parse_attr("width")?,
                    count: bin.parse_attr("count")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bins })
    }
}
