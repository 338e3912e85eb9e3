// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{RunObserver, TestCaseResult, TestEvent, TestEventKind};
use crate::capabilities::CapabilityIndex;
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Results grouped by capability tag.
///
/// Tags are sorted. Within a tag, test cases keep the order in which they first finished, and the
/// latest result for a test case replaces any earlier one.
#[derive(Clone, Debug, Default)]
pub struct CapabilitiesResultTree<'list> {
    by_tag: BTreeMap<String, IndexMap<&'list str, TestCaseResult<'list>>>,
}

impl<'list> CapabilitiesResultTree<'list> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `result` under `tag`.
    pub fn insert(&mut self, tag: &str, result: TestCaseResult<'list>) {
        self.by_tag
            .entry(tag.to_owned())
            .or_default()
            .insert(result.case.full_name(), result);
    }

    /// Iterates over tags and their results, in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, impl Iterator<Item = &TestCaseResult<'list>>)> {
        self.by_tag
            .iter()
            .map(|(tag, results)| (tag.as_str(), results.values()))
    }

    /// Returns the results for a tag.
    pub fn get(&self, tag: &str) -> Option<impl ExactSizeIterator<Item = &TestCaseResult<'list>>> {
        self.by_tag.get(tag).map(|results| results.values())
    }

    /// The tags that have at least one result.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.by_tag.keys().map(|tag| tag.as_str())
    }

    /// Returns true if no results have been recorded.
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

/// Collects results by capability as a run progresses.
#[derive(Debug)]
pub struct CapabilitiesCollector<'a, 'list> {
    index: &'a CapabilityIndex,
    tree: CapabilitiesResultTree<'list>,
}

impl<'a, 'list> CapabilitiesCollector<'a, 'list> {
    /// Creates a collector that files results under the tags `index` gives them.
    pub fn new(index: &'a CapabilityIndex) -> Self {
        Self {
            index,
            tree: CapabilitiesResultTree::new(),
        }
    }

    /// Returns the results collected so far.
    pub fn tree(&self) -> &CapabilitiesResultTree<'list> {
        &self.tree
    }

    /// Consumes the collector, returning the collected results.
    pub fn into_tree(self) -> CapabilitiesResultTree<'list> {
        self.tree
    }
}

impl<'list> RunObserver<'list> for CapabilitiesCollector<'_, 'list> {
    fn handle_event(&mut self, event: &TestEvent<'list>) {
        if let TestEventKind::TestFinished { event, .. } = &event.kind {
            let result = &event.result;
            for tag in self.index.tags_for(result.case.full_name()) {
                self.tree.insert(tag, result.clone());
            }
        }
    }
}
