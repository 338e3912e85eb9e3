// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::list::TestCase;

/// The kind of rule a [`CategoryFilter`] applies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum RuleKind {
    /// Include a test case if any of its categories is one of the rule's tags.
    Selector,
}

/// A category-membership filter over test cases.
///
/// Tag comparisons are ASCII case-insensitive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CategoryFilter {
    kind: RuleKind,
    tags: Vec<String>,
}

impl CategoryFilter {
    /// Creates a new filter with the given tags, in order.
    pub fn new<I, S>(tags: I, kind: RuleKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// The kind of rule this filter applies.
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// The tags in this rule.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns true if `case_tags` intersects this rule's tags.
    pub fn matches<'a, I>(&self, case_tags: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self.kind {
            RuleKind::Selector => case_tags.into_iter().any(|case_tag| {
                self.tags
                    .iter()
                    .any(|tag| tag.eq_ignore_ascii_case(case_tag))
            }),
        }
    }

    /// Returns true if the test case's categories intersect this rule's tags.
    pub fn matches_case(&self, case: &TestCase) -> bool {
        self.matches(case.categories().iter().map(String::as_str))
    }
}
