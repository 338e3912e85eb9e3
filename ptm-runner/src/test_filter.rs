// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selecting the test cases to run.
//!
//! The main structure in this module is [`TestCaseSelector`], which resolves a [`SelectionMode`]
//! against a [`SuiteRuntime`] into a [`Selection`].

mod category;
mod expression;

pub use category::*;
pub use expression::*;

use crate::{
    capabilities::{CapabilityIndex, parse_category_list},
    errors::{SelectionConfigError, TestSelectionError},
    list::TestCase,
    runtime::SuiteRuntime,
};
use camino::Utf8Path;
use tracing::debug;

/// How test cases are chosen for a run. Exactly one mode is active per run.
#[derive(Clone, Copy, Debug)]
pub enum SelectionMode<'a> {
    /// Select test cases by their checked flag.
    Explicit {
        /// If true, select only checked cases. Otherwise select every case.
        selected_only: bool,
    },

    /// Select test cases matching a filter expression, evaluated by the suite runtime.
    Expression(&'a str),

    /// Select test cases belonging to any of the given capabilities.
    Capabilities {
        /// The capability specification file.
        spec_file: &'a Utf8Path,

        /// A comma-separated list of capability tags.
        filter: Option<&'a str>,
    },
}

/// The result of selecting test cases: the cases to run, in suite order.
#[derive(Clone, Debug)]
pub struct Selection<'list> {
    cases: Vec<&'list TestCase>,
    capabilities: Option<CapabilityIndex>,
}

impl<'list> Selection<'list> {
    /// Creates a selection from a list of cases.
    pub fn new(cases: Vec<&'list TestCase>) -> Self {
        Self {
            cases,
            capabilities: None,
        }
    }

    /// The selected test cases, in suite order.
    pub fn cases(&self) -> &[&'list TestCase] {
        &self.cases
    }

    /// The number of selected test cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns true if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// The capability index used to make this selection, in capabilities mode.
    pub fn capabilities(&self) -> Option<&CapabilityIndex> {
        self.capabilities.as_ref()
    }
}

/// Resolves selection modes against a suite.
#[derive(Clone, Copy)]
pub struct TestCaseSelector<'list> {
    runtime: &'list dyn SuiteRuntime,
}

impl<'list> TestCaseSelector<'list> {
    /// Creates a new selector over the suite owned by `runtime`.
    pub fn new(runtime: &'list dyn SuiteRuntime) -> Self {
        Self { runtime }
    }

    /// Selects test cases according to `mode`.
    ///
    /// Selection never changes the suite, and the same mode always produces the same cases in the
    /// same order.
    pub fn select(&self, mode: SelectionMode<'_>) -> Result<Selection<'list>, TestSelectionError> {
        let selection = match mode {
            SelectionMode::Explicit { selected_only } => Selection::new(
                self.runtime
                    .test_list()
                    .iter()
                    .filter(|case| !selected_only || case.is_checked())
                    .collect(),
            ),
            SelectionMode::Expression(expr) => {
                Selection::new(self.runtime.filter_by_expression(expr)?)
            }
            SelectionMode::Capabilities { spec_file, filter } => {
                self.select_capabilities(spec_file, filter)?
            }
        };

        debug!(
            "selected {} of {} test cases",
            selection.len(),
            self.runtime.test_list().len(),
        );
        Ok(selection)
    }

    /// Returns the test cases whose categories match `filter`, in suite order.
    pub fn by_categories(&self, filter: &CategoryFilter) -> Vec<&'list TestCase> {
        self.runtime
            .test_list()
            .iter()
            .filter(|case| filter.matches_case(case))
            .collect()
    }

    fn select_capabilities(
        &self,
        spec_file: &Utf8Path,
        filter: Option<&str>,
    ) -> Result<Selection<'list>, TestSelectionError> {
        // Check the filter before touching the file.
        let tags = parse_category_list(filter.unwrap_or_default());
        if tags.is_empty() {
            return Err(SelectionConfigError::MissingCategoryFilter {
                spec_file: spec_file.to_owned(),
            }
            .into());
        }

        let index = CapabilityIndex::parse(spec_file)?;
        let names = index.matching_test_names(tags.iter().copied());
        let cases: Vec<_> = self
            .runtime
            .test_list()
            .iter()
            .filter(|case| names.contains(case.full_name()))
            .collect();

        if cases.len() < names.len() {
            debug!(
                "{} test names in {spec_file} are not in the suite and were skipped",
                names.len() - cases.len(),
            );
        }

        Ok(Selection {
            cases,
            capabilities: Some(index),
        })
    }
}
