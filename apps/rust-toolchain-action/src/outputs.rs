//! Version reports published as job outputs.
//!
//! Each output runs `<program> -V` and extracts one capture group:
//!
//! | output       | example stdout                                   | value            |
//! |--------------|--------------------------------------------------|------------------|
//! | `rustc`      | `rustc 1.75.0-beta.1 (782883f60 2023-11-12)`     | `1.75.0-beta.1`  |
//! | `rustc_hash` | `rustc 1.75.0-beta.1 (782883f60 2023-11-12)`     | `782883f60`      |
//! | `cargo`      | `cargo 1.75.0-nightly (df3509237 2023-10-24)`    | `1.75.0-nightly` |
//! | `rustup`     | `rustup 1.26.0 (5af9b9484 2023-04-05)`           | `1.26.0`         |

use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

use crate::errors::ActionError;
use crate::rustup::CommandRunner;

/// A name/value pair published for the CI platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub name: &'static str,
    pub value: String,
}

/// How to obtain one output value.
struct VersionReport {
    output: &'static str,
    program: &'static str,
    pattern: &'static LazyLock<Regex>,
    group: usize,
}

static RUSTC: LazyLock<Regex> =
    LazyLock::new(|| compile(r"rustc (\d+\.\d+\.\d+(-nightly|-beta\.\d+)?)"));
static RUSTC_HASH: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"rustc (\d+\.\d+\.\d+(-nightly|-beta\.\d+)?) \((\w+) \d+-\d+-\d+\)")
});
static CARGO: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"cargo (\d+\.\d+\.\d+(-nightly|-beta\.\d+)?) \(.+ (\d{4}-\d{2}-\d{2})\)")
});
static RUSTUP: LazyLock<Regex> = LazyLock::new(|| compile(r"rustup (\d+\.\d+\.\d+) \(.+\)"));

static REPORTS: [VersionReport; 4] = [
    VersionReport {
        output: "rustc",
        program: "rustc",
        pattern: &RUSTC,
        group: 1,
    },
    VersionReport {
        output: "rustc_hash",
        program: "rustc",
        pattern: &RUSTC_HASH,
        group: 3,
    },
    VersionReport {
        output: "cargo",
        program: "cargo",
        pattern: &CARGO,
        group: 1,
    },
    VersionReport {
        output: "rustup",
        program: "rustup",
        pattern: &RUSTUP,
        group: 1,
    },
];

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("version report patterns are valid")
}

/// Collects every version output, in publication order.
///
/// # Errors
///
/// Returns an error if a program is missing, fails, or prints output that
/// does not match its expected format.
pub async fn collect<R: CommandRunner>(runner: &R) -> Result<Vec<OutputRecord>, ActionError> {
    let version_flag = ["-V".to_string()];
    let mut records = Vec::with_capacity(REPORTS.len());

    for report in &REPORTS {
        let program = runner.which(report.program)?;
        let stdout = runner.run_stdout(&program, &version_flag).await?;
        records.push(OutputRecord {
            name: report.output,
            value: extract(&stdout, report.pattern, report.group)?,
        });
    }
    Ok(records)
}

/// Returns capture group `group` of the first match of `pattern` in `stdout`.
///
/// # Errors
///
/// Returns [`ActionError::Parse`] if there is no match or the group did not
/// participate in it.
pub fn extract(stdout: &str, pattern: &Regex, group: usize) -> Result<String, ActionError> {
    pattern
        .captures(stdout)
        .and_then(|captures| captures.get(group))
        .map(|value| value.as_str().to_string())
        .ok_or_else(|| {
            let err = ActionError::parse(format!("Could not match {stdout}"));
            error!("{err}");
            err
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rustup::runner::fake::FakeRunner;

    const RUSTC_SAMPLES: &[&str] = &[
        "rustc 1.75.0-nightly (aa1a71e9e 2023-10-26)",
        "rustc 1.75.0 (aa1a71e9e 2023-10-26)",
        "rustc 1.75.0-beta.1 (782883f60 2023-11-12)",
    ];

    #[test]
    fn rustc_version_is_second_word() {
        for stdout in RUSTC_SAMPLES {
            let expected = stdout.split(' ').nth(1).unwrap();
            assert_eq!(extract(stdout, &RUSTC, 1).unwrap(), expected);
        }
    }

    #[test]
    fn rustc_hash_is_commit_in_parentheses() {
        for stdout in RUSTC_SAMPLES {
            let expected = &stdout.split(' ').nth(2).unwrap()[1..];
            assert_eq!(extract(stdout, &RUSTC_HASH, 3).unwrap(), expected);
        }
    }

    #[test]
    fn cargo_version_is_second_word() {
        for stdout in [
            "cargo 1.75.0-nightly (df3509237 2023-10-24)",
            "cargo 1.75.0 (df3509237 2023-10-24)",
            "cargo 1.75.0-beta.1 (6790a5127 2023-11-10)",
        ] {
            let expected = stdout.split(' ').nth(1).unwrap();
            assert_eq!(extract(stdout, &CARGO, 1).unwrap(), expected);
        }
    }

    #[test]
    fn rustup_version_ignores_trailing_info_lines() {
        let stdout = "rustup 1.26.0 (5af9b9484 2023-04-05)\n\
            info: This is the version for the rustup toolchain manager, not the rustc compiler.\n\
            info: The currently active `rustc` version is `rustc 1.75.0-nightly (aa1a71e9e 2023-10-26)`";
        assert_eq!(extract(stdout, &RUSTUP, 1).unwrap(), "1.26.0");
    }

    #[test]
    fn unmatched_output_is_parse_error() {
        let err = extract("blah blah", &RUSTC, 1).unwrap_err();
        assert!(matches!(err, ActionError::Parse { .. }));
        assert_eq!(err.to_string(), "Could not match blah blah");
    }

    #[tokio::test]
    async fn collect_reports_in_order() {
        let mut runner = FakeRunner::default();
        runner.rustc_version = "rustc 1.75.0-beta.1 (782883f60 2023-11-12)\n".into();
        runner.cargo_version = "cargo 1.75.0-nightly (df3509237 2023-10-24)\n".into();

        let records = collect(&runner).await.unwrap();

        let values: Vec<(&str, &str)> = records
            .iter()
            .map(|record| (record.name, record.value.as_str()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("rustc", "1.75.0-beta.1"),
                ("rustc_hash", "782883f60"),
                ("cargo", "1.75.0-nightly"),
                ("rustup", "1.26.0"),
            ]
        );
    }

    #[tokio::test]
    async fn collect_fails_on_unexpected_output() {
        let mut runner = FakeRunner::default();
        runner.cargo_version = "blah blah".into();

        let err = collect(&runner).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not match blah blah");
    }
}
