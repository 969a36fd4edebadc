//! Owned element tree for one decoded trace element.
//!
//! Flow-monitor output carries all of its data in attributes, so an element
//! is just a tag name, its attributes in document order, and its children.

use std::str::FromStr;

use crate::error::{Result, TraceError};
use crate::units::parse_time_ns;

/// A decoded XML element and its subtree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter, mostly useful for fixtures
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder-style child setter
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Get a raw attribute value
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get an attribute that must be present
    pub fn required_attr(&self, key: &str) -> Result<&str> {
        self.attr(key)
            .ok_or_else(|| TraceError::malformed(&self.name, key, "is missing"))
    }

    /// Parse a required attribute as a number (or any other `FromStr` type)
    pub fn parse_attr<T: FromStr>(&self, key: &str) -> Result<T> {
        let raw = self.required_attr(key)?;
        raw.trim().parse::<T>().map_err(|_| {
            TraceError::malformed(&self.name, key, format!("has invalid value {:?}", raw))
        })
    }

    /// Parse a required `<integer>ns` timestamp attribute into nanoseconds
    pub fn time_attr(&self, key: &str) -> Result<i128> {
        parse_time_ns(self.required_attr(key)?)
    }

    /// First direct child with the given tag
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given tag, in document order
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All descendants matching a `/`-separated path of child tags, e.g.
    /// `"FlowProbes/FlowProbe"`. Results are in document order.
    pub fn find_path(&self, path: &str) -> Vec<&Element> {
        let mut current: Vec<&Element> = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|el| el.children.iter().filter(move |c| c.name == segment))
                .collect();
        }
        current
    }
}
