//! Incremental reader for flow-monitor trace files.
//!
//! The reader pulls events from quick-xml and only materialises the subtree
//! of the top-level trace element currently being read. As soon as that
//! element closes it is moved out to the caller, so peak memory is one trace
//! element no matter how many runs are batched into the same file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::element::Element;
use crate::config::LinkModel;
use crate::error::{Result, TraceError};
use crate::model::Simulation;

/// Top-level element written by ns-3's FlowMonitor::SerializeToXmlFile
pub const DEFAULT_TRACE_TAG: &str = "FlowMonitor";

pub struct TraceReader<R: BufRead> {
    reader: Reader<R>,
    tag: String,
    buf: Vec<u8>,
    /// Elements of the current trace element that are still open
    open: Vec<Element>,
    /// Depth inside a top-level element that does not match `tag`
    skip_depth: usize,
    skipped_tag: Option<String>,
    done: bool,
}

impl TraceReader<BufReader<File>> {
    /// Open a trace file for streaming
    pub fn from_path(path: &Path, tag: &str) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::with_capacity(64 * 1024, file), tag))
    }
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(source: R, tag: &str) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            tag: tag.to_string(),
            buf: Vec::new(),
            open: Vec::new(),
            skip_depth: 0,
            skipped_tag: None,
            done: false,
        }
    }

    /// Current nesting depth, counted from outside any top-level element
    pub fn depth(&self) -> usize {
        self.open.len() + self.skip_depth
    }

    /// Number of elements currently held by the reader, including all
    /// children attached to still-open elements
    pub fn retained_elements(&self) -> usize {
        fn count(el: &Element) -> usize {
            1 + el.children.iter().map(count).sum::<usize>()
        }
        self.open.iter().map(count).sum()
    }

    /// Map every yielded trace element to a joined [`Simulation`].
    ///
    /// Each element is dropped as soon as its simulation has been built.
    pub fn simulations(self, link_model: LinkModel) -> impl Iterator<Item = Result<Simulation>> {
        self.map(move |element| element.and_then(|el| Simulation::from_element(&el, &link_model)))
    }

    fn next_element(&mut self) -> Result<Option<Element>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(start) => {
                    if self.skip_depth > 0 {
                        self.skip_depth += 1;
                    } else if self.open.is_empty() && start.name().as_ref() != self.tag.as_bytes() {
                        self.skip_depth = 1;
                        self.skipped_tag = Some(String::from_utf8_lossy(start.name().as_ref()).into_owned());
                    } else {
                        let element = decode_start(&start)?;
                        self.open.push(element);
                    }
                }
                Event::Empty(start) => {
                    if self.skip_depth > 0 {
                        continue;
                    }
                    match self.open.last_mut() {
                        Some(parent) => parent.children.push(decode_start(&start)?),
                        None if start.name().as_ref() == self.tag.as_bytes() => {
                            return Ok(Some(decode_start(&start)?));
                        }
                        None => {}
                    }
                }
                Event::End(_) => {
                    if self.skip_depth > 0 {
                        self.skip_depth -= 1;
                        if self.skip_depth == 0 {
                            self.skipped_tag = None;
                        }
                        continue;
                    }
                    if let Some(element) = self.open.pop() {
                        match self.open.last_mut() {
                            Some(parent) => parent.children.push(element),
                            None => return Ok(Some(element)),
                        }
                    }
                }
                Event::Eof => {
                    if let Some(root) = self.open.first() {
                        return Err(TraceError::Truncated { tag: root.name.clone() });
                    }
                    if let Some(tag) = self.skipped_tag.take() {
                        return Err(TraceError::Truncated { tag });
                    }
                    return Ok(None);
                }
                // Text, comments, declarations and processing instructions
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn decode_start(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}
