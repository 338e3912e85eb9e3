// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{ExecutionOutput, SuiteRuntime};
use crate::{
    config::{ConfigItem, TestProfile},
    errors::SuiteLoadError,
    list::{TestCase, TestList, TestSuiteInfo},
    reporter::Outcome,
};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::{debug, warn};

/// The directory inside a suite folder that holds the suite's files.
pub const BIN_DIR: &str = "Bin";

/// The version file inside [`BIN_DIR`].
pub const VERSION_FILE: &str = ".version";

/// The suite manifest inside [`BIN_DIR`].
pub const MANIFEST_FILE: &str = "suite.toml";

/// Prefix for the environment variables that pass suite properties to test commands.
pub const PROPERTY_ENV_PREFIX: &str = "PTM_PROPERTY_";

/// Exit code a test command uses to report an inconclusive result.
pub const INCONCLUSIVE_EXIT_CODE: i32 = 2;

/// A suite runtime that runs each test case as an external command.
///
/// The suite folder is laid out as:
///
/// ```text
/// <folder>/Bin/.version     first line is the suite version
/// <folder>/Bin/suite.toml   the suite manifest
/// ```
///
/// The manifest names the suite and lists its test cases:
///
/// ```toml
/// name = "FileServer"
///
/// [[test]]
/// full-name = "Smb2.Negotiate.Basic"
/// categories = ["net", "bvt"]
/// command = ["./negotiate.sh", "basic"]
/// ```
///
/// Commands run with `Bin` as their working directory. Exit code 0 is a pass, 2 is inconclusive,
/// and anything else is a failure.
#[derive(Debug)]
pub struct ManifestRuntime {
    info: TestSuiteInfo,
    bin_dir: Utf8PathBuf,
    list: TestList,
    commands: HashMap<String, Vec<String>>,
    properties: BTreeMap<String, String>,
    abort_requested: AtomicBool,
}

impl ManifestRuntime {
    /// Loads the suite in `folder`.
    pub fn load(folder: &Utf8Path) -> Result<Self, SuiteLoadError> {
        if !folder.is_dir() {
            return Err(SuiteLoadError::FolderNotFound {
                path: folder.to_owned(),
            });
        }
        let bin_dir = folder.join(BIN_DIR);
        let version = read_version(&bin_dir)?;

        let manifest_path = bin_dir.join(MANIFEST_FILE);
        let contents =
            std::fs::read_to_string(&manifest_path).map_err(|error| SuiteLoadError::Read {
                path: manifest_path.clone(),
                error,
            })?;
        let manifest: SuiteManifest =
            toml::from_str(&contents).map_err(|error| SuiteLoadError::Manifest {
                path: manifest_path.clone(),
                error,
            })?;

        let mut list = TestList::new();
        let mut commands = HashMap::with_capacity(manifest.tests.len());
        for test in manifest.tests {
            if test.command.is_empty() {
                return Err(SuiteLoadError::EmptyCommand {
                    full_name: test.full_name,
                });
            }
            if let Err(case) = list.push(TestCase::new(test.full_name.clone(), test.categories)) {
                return Err(SuiteLoadError::DuplicateTestCase {
                    path: manifest_path,
                    full_name: case.full_name().to_owned(),
                });
            }
            commands.insert(test.full_name, test.command);
        }

        debug!(
            "loaded suite {} version {version} from {folder} with {} test cases",
            manifest.name,
            list.len(),
        );

        Ok(Self {
            info: TestSuiteInfo::new(manifest.name, folder, version),
            bin_dir,
            list,
            commands,
            properties: BTreeMap::new(),
            abort_requested: AtomicBool::new(false),
        })
    }

    /// Applies a profile: checks the test cases it selects and takes its properties.
    ///
    /// Fails if the profile is for a different suite.
    pub fn apply_profile(&mut self, profile: &TestProfile) -> Result<(), SuiteLoadError> {
        if profile.test_suite() != self.info.name() {
            return Err(SuiteLoadError::UnknownTestSuite {
                requested: profile.test_suite().to_owned(),
                actual: self.info.name().to_owned(),
            });
        }

        let unknown = self
            .list
            .set_checked(profile.selected().iter().map(String::as_str));
        if !unknown.is_empty() {
            warn!(
                "profile selects test cases that are not in the suite: {}",
                unknown.iter().join(", "),
            );
        }
        self.properties.extend(
            profile
                .properties()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        Ok(())
    }

    /// Applies `key=value` overrides on top of the current properties.
    pub fn apply_overrides<'a>(&mut self, items: impl IntoIterator<Item = &'a ConfigItem>) {
        for item in items {
            self.properties
                .insert(item.name().to_owned(), item.value().to_owned());
        }
    }

    /// The suite properties passed to test commands.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Returns true if [`SuiteRuntime::request_abort`] has been called.
    pub fn abort_requested(&self) -> bool {
        self.abort_requested.load(Ordering::Acquire)
    }

    fn resolve_program(&self, program: &str) -> Utf8PathBuf {
        // Bare names are looked up on PATH. Anything with a separator is relative to Bin.
        if program.contains(['/', '\\']) {
            self.bin_dir.join(program)
        } else {
            Utf8PathBuf::from(program)
        }
    }
}

impl SuiteRuntime for ManifestRuntime {
    fn suite_info(&self) -> &TestSuiteInfo {
        &self.info
    }

    fn test_list(&self) -> &TestList {
        &self.list
    }

    fn execute(&self, case: &TestCase) -> ExecutionOutput {
        let Some((program, args)) = self
            .commands
            .get(case.full_name())
            .and_then(|command| command.split_first())
        else {
            return ExecutionOutput::new(Outcome::Fail, "test case is not defined in this suite");
        };
        let program = self.resolve_program(program);

        let mut expression = duct::cmd(program.as_str(), args)
            .dir(self.bin_dir.as_std_path())
            .stdout_capture()
            .stderr_capture()
            .unchecked();
        for (name, value) in &self.properties {
            expression = expression.env(property_env_var(name), value);
        }

        debug!(
            "running {}: {program} {}",
            case.full_name(),
            args.iter().join(" "),
        );
        let output = match expression.run() {
            Ok(output) => output,
            Err(error) => {
                return ExecutionOutput::new(
                    Outcome::Fail,
                    format!("failed to start `{program}`: {error}"),
                );
            }
        };

        let outcome = match output.status.code() {
            Some(0) => Outcome::Pass,
            Some(INCONCLUSIVE_EXIT_CODE) => Outcome::Inconclusive,
            _ => Outcome::Fail,
        };
        let message = match outcome {
            Outcome::Pass => None,
            _ => command_message(&output.stdout, &output.stderr)
                .or_else(|| Some(format!("command exited with {}", output.status))),
        };
        ExecutionOutput { outcome, message }
    }

    fn request_abort(&self) {
        // Test cases run one at a time and the current one has already finished, so there is
        // nothing in flight to cancel.
        debug!("abort requested for suite {}", self.info.name());
        self.abort_requested.store(true, Ordering::Release);
    }
}

/// Returns the environment variable used to pass a property to test commands.
pub fn property_env_var(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{PROPERTY_ENV_PREFIX}{name}")
}

fn read_version(bin_dir: &Utf8Path) -> Result<String, SuiteLoadError> {
    let path = bin_dir.join(VERSION_FILE);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(SuiteLoadError::VersionFileMissing { path });
        }
        Err(error) => return Err(SuiteLoadError::Read { path, error }),
    };
    match contents.lines().next().map(str::trim) {
        Some(version) if !version.is_empty() => Ok(version.to_owned()),
        _ => Err(SuiteLoadError::VersionFileEmpty { path }),
    }
}

/// Picks a message from a command's output: stderr if it has anything, otherwise stdout.
fn command_message(stdout: &[u8], stderr: &[u8]) -> Option<String> {
    [stderr, stdout].into_iter().find_map(|bytes| {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_owned())
    })
}

#[derive(Deserialize)]
struct SuiteManifest {
    name: String,
    #[serde(default, rename = "test")]
    tests: Vec<ManifestTestCase>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ManifestTestCase {
    full_name: String,
    #[serde(default)]
    categories: Vec<String>,
    command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const MANIFEST: &str = indoc! {r#"
        name = "FileServer"

        [[test]]
        full-name = "A.T1"
        categories = ["net"]
        command = ["sh", "-c", "exit 0"]

        [[test]]
        full-name = "A.T2"
        categories = ["net", "slow"]
        command = ["sh", "-c", "echo 'server refused' >&2; exit 1"]

        [[test]]
        full-name = "A.T3"
        categories = ["io"]
        command = ["sh", "-c", "echo \"no share $PTM_PROPERTY_SERVERNAME\"; exit 2"]
    "#};

    fn write_suite(version: Option<&str>, manifest: &str) -> Utf8TempDir {
        let dir = camino_tempfile::tempdir().unwrap();
        let bin = dir.path().join(BIN_DIR);
        std::fs::create_dir(&bin).unwrap();
        if let Some(version) = version {
            std::fs::write(bin.join(VERSION_FILE), version).unwrap();
        }
        std::fs::write(bin.join(MANIFEST_FILE), manifest).unwrap();
        dir
    }

    #[test]
    fn load_manifest() {
        let dir = write_suite(Some("1.2.3\nbuild 7\n"), MANIFEST);
        let runtime = ManifestRuntime::load(dir.path()).unwrap();

        let info = runtime.suite_info();
        assert_eq!(info.name(), "FileServer");
        assert_eq!(info.version(), "1.2.3");
        assert_eq!(info.folder(), dir.path());

        let names: Vec<_> = runtime.test_list().iter().map(|c| c.full_name()).collect();
        assert_eq!(names, vec!["A.T1", "A.T2", "A.T3"]);
    }

    #[test_case(None ; "missing")]
    #[test_case(Some("") ; "empty")]
    #[test_case(Some("   \n1.0") ; "blank first line")]
    fn version_file_errors(version: Option<&str>) {
        let dir = write_suite(version, MANIFEST);
        let err = ManifestRuntime::load(dir.path()).unwrap_err();
        assert!(
            matches!(
                err,
                SuiteLoadError::VersionFileMissing { .. } | SuiteLoadError::VersionFileEmpty { .. }
            ),
            "{err}"
        );
    }

    #[test]
    fn duplicate_test_case() {
        let manifest = indoc! {r#"
            name = "S"
            [[test]]
            full-name = "A.T1"
            command = ["true"]
            [[test]]
            full-name = "A.T1"
            command = ["false"]
        "#};
        let dir = write_suite(Some("1.0"), manifest);
        let err = ManifestRuntime::load(dir.path()).unwrap_err();
        assert!(
            matches!(&err, SuiteLoadError::DuplicateTestCase { full_name, .. } if full_name == "A.T1"),
            "{err}"
        );
    }

    #[test]
    fn profile_for_other_suite() {
        let dir = write_suite(Some("1.0"), MANIFEST);
        let mut runtime = ManifestRuntime::load(dir.path()).unwrap();
        let profile = TestProfile::from_toml(r#"test-suite = "Other""#).unwrap();
        let err = runtime.apply_profile(&profile).unwrap_err();
        assert!(matches!(err, SuiteLoadError::UnknownTestSuite { .. }), "{err}");
    }

    #[test_case("ServerName", "PTM_PROPERTY_SERVERNAME" ; "simple")]
    #[test_case("server.name-2", "PTM_PROPERTY_SERVER_NAME_2" ; "punctuation")]
    fn env_var_names(name: &str, expected: &str) {
        assert_eq!(property_env_var(name), expected);
    }

    #[cfg(unix)]
    #[test]
    fn execute_maps_exit_codes() {
        let dir = write_suite(Some("1.0"), MANIFEST);
        let mut runtime = ManifestRuntime::load(dir.path()).unwrap();
        let profile = TestProfile::from_toml(indoc! {r#"
            test-suite = "FileServer"
            selected = ["A.T3"]
            [properties]
            ServerName = "sut01"
        "#})
        .unwrap();
        runtime.apply_profile(&profile).unwrap();
        let items: Vec<ConfigItem> = vec!["Domain=contoso".parse().unwrap()];
        runtime.apply_overrides(&items);
        assert_eq!(
            runtime.properties().keys().collect::<Vec<_>>(),
            vec!["Domain", "ServerName"],
        );

        let outputs: Vec<_> = runtime
            .test_list()
            .iter()
            .map(|case| runtime.execute(case))
            .collect();
        assert_eq!(
            outputs,
            vec![
                ExecutionOutput::pass(),
                ExecutionOutput::new(Outcome::Fail, "server refused"),
                ExecutionOutput::new(Outcome::Inconclusive, "no share sut01"),
            ]
        );
        assert!(runtime.test_list().get("A.T3").unwrap().is_checked());
    }

    #[test]
    fn execute_start_failure() {
        let manifest = indoc! {r#"
            name = "S"
            [[test]]
            full-name = "A.T1"
            command = ["./does-not-exist"]
        "#};
        let dir = write_suite(Some("1.0"), manifest);
        let runtime = ManifestRuntime::load(dir.path()).unwrap();
        let case = runtime.test_list().get("A.T1").unwrap();

        let output = runtime.execute(case);
        assert_eq!(output.outcome, Outcome::Fail);
        let message = output.message.unwrap();
        assert!(message.starts_with("failed to start"), "{message}");

        assert!(!runtime.abort_requested());
        runtime.request_abort();
        assert!(runtime.abort_requested());
    }
}
