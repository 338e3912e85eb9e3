// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ProfileParseError;
use camino::Utf8Path;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A saved test profile.
///
/// A profile is a TOML file:
///
/// ```toml
/// test-suite = "FileServer"
/// selected = ["A.T1", "A.T2"]
///
/// [properties]
/// ServerName = "sut01"
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct TestProfile {
    test_suite: String,
    #[serde(default)]
    selected: Vec<String>,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

impl TestProfile {
    /// Reads a profile from disk.
    pub fn load(path: &Utf8Path) -> Result<Self, ProfileParseError> {
        let contents =
            std::fs::read_to_string(path).map_err(|error| ProfileParseError::Read {
                path: path.to_owned(),
                error,
            })?;
        let profile =
            Self::from_toml(&contents).map_err(|error| ProfileParseError::Deserialize {
                path: path.to_owned(),
                error,
            })?;
        debug!(
            "loaded profile {path} for suite {} ({} selected, {} properties)",
            profile.test_suite,
            profile.selected.len(),
            profile.properties.len(),
        );
        Ok(profile)
    }

    /// Parses profile contents.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The name of the test suite this profile is for.
    pub fn test_suite(&self) -> &str {
        &self.test_suite
    }

    /// The full names of the test cases checked in this profile.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Suite properties, by name.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
