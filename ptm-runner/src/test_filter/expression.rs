// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filter expressions over test cases.
//!
//! An expression is a boolean combination of conditions on a test case's properties:
//!
//! ```text
//! expr      := and ('|' and)*
//! and       := unary ('&' unary)*
//! unary     := '!' unary | '(' expr ')' | condition
//! condition := property op value
//! property  := Name | FullName | TestCategory
//! op        := '=' | '!=' | '~' | '!~'
//! ```
//!
//! `~` means "contains". Property names and values are compared case-insensitively.

use super::{CategoryFilter, RuleKind};
use crate::{errors::InvalidExpressionError, list::TestCase};
use winnow::{
    ModalParser, Parser,
    ascii::{alphanumeric1, multispace0},
    combinator::{alt, delimited, preceded, repeat},
    token::take_till,
};

type Error = ();
type PResult<T> = winnow::ModalResult<T, Error>;

/// A parsed filter expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterExpression {
    /// A single condition on a property.
    Condition(Condition),

    /// Negation of an expression.
    Not(Box<FilterExpression>),

    /// Both expressions must match.
    And(Box<FilterExpression>, Box<FilterExpression>),

    /// Either expression must match.
    Or(Box<FilterExpression>, Box<FilterExpression>),
}

impl FilterExpression {
    /// Parses a filter expression.
    pub fn parse(input: &str) -> Result<Self, InvalidExpressionError> {
        if input.trim().is_empty() {
            return Err(InvalidExpressionError::new(input, "expression is empty"));
        }

        let mut remaining = input;
        let expr = parse_expr.parse_next(&mut remaining).map_err(|_| {
            InvalidExpressionError::new(
                input,
                "expected a condition such as `TestCategory=net` or `FullName~Smb2`",
            )
        })?;

        let rest = remaining.trim_start();
        if rest.is_empty() {
            Ok(expr)
        } else {
            let offset = input.len() - rest.len();
            Err(InvalidExpressionError::new(
                input,
                format!("unexpected input at offset {offset}: `{rest}`"),
            ))
        }
    }

    /// Returns true if the test case matches this expression.
    pub fn matches(&self, case: &TestCase) -> bool {
        match self {
            Self::Condition(condition) => condition.matches(case),
            Self::Not(expr) => !expr.matches(case),
            Self::And(a, b) => a.matches(case) && b.matches(case),
            Self::Or(a, b) => a.matches(case) || b.matches(case),
        }
    }
}

/// A property of a test case that can be tested in a condition.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Property {
    /// The short name of the test case.
    Name,

    /// The full, dotted name of the test case.
    FullName,

    /// One of the categories of the test case.
    TestCategory,
}

impl Property {
    fn from_name(name: &str) -> Option<Self> {
        [Self::Name, Self::FullName, Self::TestCategory]
            .into_iter()
            .find(|property| property.as_str().eq_ignore_ascii_case(name))
    }

    /// The name of this property as written in expressions.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::FullName => "FullName",
            Self::TestCategory => "TestCategory",
        }
    }
}

/// A comparison operator in a condition.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `~`
    Contains,
    /// `!~`
    NotContains,
}

/// A single `<property><operator><value>` condition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Condition {
    /// The property being tested.
    pub property: Property,

    /// The comparison.
    pub operator: Operator,

    /// The value being compared against.
    pub value: String,
}

impl Condition {
    fn matches(&self, case: &TestCase) -> bool {
        let positive = match self.operator {
            Operator::Equal | Operator::NotEqual => self.matches_equal(case),
            Operator::Contains | Operator::NotContains => self.matches_contains(case),
        };
        match self.operator {
            Operator::Equal | Operator::Contains => positive,
            Operator::NotEqual | Operator::NotContains => !positive,
        }
    }

    fn matches_equal(&self, case: &TestCase) -> bool {
        match self.property {
            Property::Name => case.name().eq_ignore_ascii_case(&self.value),
            Property::FullName => case.full_name().eq_ignore_ascii_case(&self.value),
            Property::TestCategory => {
                CategoryFilter::new([self.value.as_str()], RuleKind::Selector).matches_case(case)
            }
        }
    }

    fn matches_contains(&self, case: &TestCase) -> bool {
        let needle = self.value.to_ascii_lowercase();
        let contains = |haystack: &str| haystack.to_ascii_lowercase().contains(&needle);
        match self.property {
            Property::Name => contains(case.name()),
            Property::FullName => contains(case.full_name()),
            Property::TestCategory => case.categories().iter().any(|tag| contains(tag)),
        }
    }
}

fn ws<'a, T, P: ModalParser<&'a str, T, Error>>(
    inner: P,
) -> impl ModalParser<&'a str, T, Error> {
    preceded(multispace0, inner)
}

fn parse_expr(input: &mut &str) -> PResult<FilterExpression> {
    // "or" binds less tightly than "and", so parse and within or.
    let first = parse_and.parse_next(input)?;
    let rest: Vec<_> = repeat(0.., preceded(ws('|'), parse_and)).parse_next(input)?;
    Ok(rest.into_iter().fold(first, |a, b| {
        FilterExpression::Or(Box::new(a), Box::new(b))
    }))
}

fn parse_and(input: &mut &str) -> PResult<FilterExpression> {
    let first = parse_unary.parse_next(input)?;
    let rest: Vec<_> = repeat(0.., preceded(ws('&'), parse_unary)).parse_next(input)?;
    Ok(rest.into_iter().fold(first, |a, b| {
        FilterExpression::And(Box::new(a), Box::new(b))
    }))
}

fn parse_unary(input: &mut &str) -> PResult<FilterExpression> {
    ws(alt((
        preceded('!', parse_unary).map(|expr| FilterExpression::Not(Box::new(expr))),
        delimited('(', parse_expr, ws(')')),
        parse_condition,
    )))
    .parse_next(input)
}

fn parse_condition(input: &mut &str) -> PResult<FilterExpression> {
    (parse_property, parse_operator, parse_value)
        .map(|(property, operator, value)| {
            FilterExpression::Condition(Condition {
                property,
                operator,
                value,
            })
        })
        .parse_next(input)
}

fn parse_property(input: &mut &str) -> PResult<Property> {
    ws(alphanumeric1.verify_map(Property::from_name)).parse_next(input)
}

fn parse_operator(input: &mut &str) -> PResult<Operator> {
    ws(alt((
        "!=".value(Operator::NotEqual),
        "!~".value(Operator::NotContains),
        '='.value(Operator::Equal),
        '~'.value(Operator::Contains),
    )))
    .parse_next(input)
}

fn parse_value(input: &mut &str) -> PResult<String> {
    take_till(1.., ('&', '|', '(', ')'))
        .verify_map(|value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_owned())
        })
        .parse_next(input)
}
