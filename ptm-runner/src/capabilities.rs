// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability specification files.
//!
//! A capability file groups test cases by the product features (capabilities) they exercise. Each
//! category name in the file is a capability tag. [`CapabilityIndex`] holds the two derived
//! mappings used during selection and reporting: tag to test names, and test name to tags.
//!
//! Tags are normalized to lowercase on load, so all tag lookups are case-insensitive.

use crate::errors::CapabilitiesParseError;
use camino::Utf8Path;
use serde::{
    Deserialize, Deserializer,
    de::{Error as _, Unexpected},
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

static EMPTY_TAGS: BTreeSet<String> = BTreeSet::new();

/// An index over a capability specification file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CapabilityIndex {
    testsuite: Option<String>,
    version: Option<String>,
    tests_by_tag: BTreeMap<String, BTreeSet<String>>,
    tags_by_test: BTreeMap<String, BTreeSet<String>>,
}

impl CapabilityIndex {
    /// Reads and parses the capability file at `path`.
    pub fn parse(path: &Utf8Path) -> Result<Self, CapabilitiesParseError> {
        let contents =
            std::fs::read_to_string(path).map_err(|error| CapabilitiesParseError::Read {
                path: path.to_owned(),
                error,
            })?;
        let index =
            Self::from_json(&contents).map_err(|error| CapabilitiesParseError::Deserialize {
                path: path.to_owned(),
                error,
            })?;
        debug!(
            "loaded capability file {path}: {} tags over {} tests",
            index.tests_by_tag.len(),
            index.tags_by_test.len(),
        );
        Ok(index)
    }

    /// Parses capability file contents.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let file: CapabilityFile = serde_json::from_str(contents)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: CapabilityFile) -> Self {
        let mut tests_by_tag: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut tags_by_test: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        let categories = file
            .capabilities
            .groups
            .into_iter()
            .flat_map(|group| group.categories);
        for category in categories {
            let tag = category.name.to_ascii_lowercase();
            let tests = tests_by_tag.entry(tag.clone()).or_default();
            for test in category.tests {
                tags_by_test
                    .entry(test.clone())
                    .or_default()
                    .insert(tag.clone());
                tests.insert(test);
            }
        }

        Self {
            testsuite: file.capabilities.metadata.testsuite,
            version: file.capabilities.metadata.version,
            tests_by_tag,
            tags_by_test,
        }
    }

    /// The test suite the file was written for, if recorded.
    pub fn testsuite(&self) -> Option<&str> {
        self.testsuite.as_deref()
    }

    /// The version of the capability file, if recorded.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Iterates over all known tags, in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.tests_by_tag.keys().map(String::as_str)
    }

    /// Returns the union of test names carrying any of `filter_tags`.
    ///
    /// An empty filter produces an empty set. Unknown tags contribute nothing.
    pub fn matching_test_names<'a, I>(&self, filter_tags: I) -> BTreeSet<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        filter_tags
            .into_iter()
            .filter_map(|tag| self.tests_by_tag.get(&tag.to_ascii_lowercase()))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Returns the tags for a test, or an empty set if the test is not in the file.
    pub fn tags_for(&self, full_name: &str) -> &BTreeSet<String> {
        self.tags_by_test.get(full_name).unwrap_or(&EMPTY_TAGS)
    }
}

/// Splits a comma-separated category list, trimming whitespace and dropping empty entries.
pub fn parse_category_list(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[derive(Deserialize)]
struct CapabilityFile {
    capabilities: CapabilitiesSection,
}

#[derive(Deserialize)]
struct CapabilitiesSection {
    #[serde(default)]
    metadata: CapabilityMetadata,
    #[serde(default)]
    groups: Vec<CapabilityGroup>,
}

#[derive(Default, Deserialize)]
struct CapabilityMetadata {
    testsuite: Option<String>,
    version: Option<String>,
}

#[derive(Deserialize)]
struct CapabilityGroup {
    #[serde(default)]
    categories: Vec<CapabilityCategory>,
}

#[derive(Deserialize)]
struct CapabilityCategory {
    #[serde(deserialize_with = "deserialize_tag")]
    name: String,
    #[serde(default)]
    tests: Vec<String>,
}

/// Tags name per-capability report files, so they must be usable as a single file name.
fn is_valid_tag(tag: &str) -> bool {
    !tag.trim().is_empty()
        && tag != "."
        && tag != ".."
        && !tag.contains(['/', '\\', '\0'])
}

fn deserialize_tag<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = String::deserialize(deserializer)?;
    if is_valid_tag(&tag) {
        Ok(tag)
    } else {
        Err(D::Error::invalid_value(
            Unexpected::Str(&tag),
            &"a capability name without path separators",
        ))
    }
}
