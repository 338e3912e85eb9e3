// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ConfigItemParseError;
use regex::Regex;
use std::{fmt, str::FromStr, sync::LazyLock};

static CONFIG_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<name>[^=]+)=(?<value>.*)$").expect("config item regex is valid")
});

/// A `key=value` configuration override.
///
/// Overrides take precedence over the properties in a profile.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigItem {
    name: String,
    value: String,
}

impl ConfigItem {
    /// The name of the property being overridden.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The new value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for ConfigItem {
    type Err = ConfigItemParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = CONFIG_ITEM_REGEX
            .captures(s)
            .ok_or_else(|| ConfigItemParseError::new(s))?;
        let name = captures["name"].trim();
        if name.is_empty() {
            return Err(ConfigItemParseError::new(s));
        }
        Ok(Self {
            name: name.to_owned(),
            value: captures["value"].to_owned(),
        })
    }
}

impl fmt::Display for ConfigItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
