// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The set of test cases known to a test suite.
//!
//! The main data structures in this module are:
//! * [`TestSuiteInfo`] for static metadata about a suite
//! * [`TestList`] for the test cases in a suite, in suite order

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Static metadata about a loaded test suite.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestSuiteInfo {
    name: String,
    folder: Utf8PathBuf,
    version: String,
}

impl TestSuiteInfo {
    /// Creates a new `TestSuiteInfo`.
    pub fn new(
        name: impl Into<String>,
        folder: impl Into<Utf8PathBuf>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            folder: folder.into(),
            version: version.into(),
        }
    }

    /// The name of the suite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The folder the suite was loaded from.
    pub fn folder(&self) -> &Utf8Path {
        &self.folder
    }

    /// The version string of the suite.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// A single test case definition.
///
/// Test cases are owned by a [`TestList`] and are only ever referenced by the rest of the runner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestCase {
    full_name: String,
    categories: BTreeSet<String>,
    checked: bool,
}

impl TestCase {
    /// Creates a new, unchecked test case.
    pub fn new<I, S>(full_name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            full_name: full_name.into(),
            categories: categories.into_iter().map(Into::into).collect(),
            checked: false,
        }
    }

    /// Sets the checked (manually selected) flag, returning `self`.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// The full, dotted name of this test case.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The short name of this test case: the last segment of the full name.
    pub fn name(&self) -> &str {
        match self.full_name.rsplit_once('.') {
            Some((_, name)) => name,
            None => &self.full_name,
        }
    }

    /// The class this test case belongs to: the full name without its last segment.
    ///
    /// For a full name with no dots, this is the full name itself.
    pub fn class_name(&self) -> &str {
        match self.full_name.rsplit_once('.') {
            Some((class_name, _)) => class_name,
            None => &self.full_name,
        }
    }

    /// The category tags of this test case.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Whether this test case was manually selected.
    pub fn is_checked(&self) -> bool {
        self.checked
    }
}

/// All test cases in a suite, in suite order, indexed by full name.
#[derive(Clone, Debug, Default)]
pub struct TestList {
    cases: IndexMap<String, TestCase>,
}

impl TestList {
    /// Creates an empty test list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a test case to the end of the list.
    ///
    /// Returns the test case back if a case with the same full name already exists.
    pub fn push(&mut self, case: TestCase) -> Result<(), TestCase> {
        if self.cases.contains_key(case.full_name()) {
            return Err(case);
        }
        self.cases.insert(case.full_name.clone(), case);
        Ok(())
    }

    /// Returns the test case with the given full name.
    pub fn get(&self, full_name: &str) -> Option<&TestCase> {
        self.cases.get(full_name)
    }

    /// Returns the number of test cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns true if the list has no test cases.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Returns the number of checked test cases.
    pub fn checked_count(&self) -> usize {
        self.cases.values().filter(|case| case.checked).count()
    }

    /// Iterates over test cases in suite order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TestCase> + '_ {
        self.cases.values()
    }

    /// Sets the checked flag on exactly the named test cases, clearing it on all others.
    ///
    /// Returns the names that don't correspond to any test case.
    pub fn set_checked<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        for case in self.cases.values_mut() {
            case.checked = false;
        }
        let mut unknown = Vec::new();
        for name in names {
            match self.cases.get_mut(name) {
                Some(case) => case.checked = true,
                None => unknown.push(name),
            }
        }
        unknown
    }
}
