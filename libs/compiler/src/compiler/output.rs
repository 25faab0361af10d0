use std::fmt::Write;

use tolk_rs::{CompileResult, CompileSuccess};

pub use tolk_rs::SourceSnapshotEntry;

/// Outcome of a full compile: either the complete artifact set or the engine's error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
  Success(CompiledArtifacts),
  Failure { message: String },
}

impl From<CompileResult> for CompileOutcome {
  fn from(result: CompileResult) -> Self {
    match result {
      CompileResult::Ok(success) => CompileOutcome::Success(success.into()),
      CompileResult::Error { message } => CompileOutcome::Failure { message },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifacts {
  pub code_hash_hex: String,
  pub code_boc64: String,
  pub fift_code: String,
  pub stderr: Option<String>,
  pub sources_snapshot: Vec<SourceSnapshotEntry>,
}

impl From<CompileSuccess> for CompiledArtifacts {
  fn from(success: CompileSuccess) -> Self {
    CompiledArtifacts {
      code_hash_hex: success.code_hash_hex,
      code_boc64: success.code_boc64,
      fift_code: success.fift_code,
      stderr: success.stderr,
      sources_snapshot: success.sources_snapshot,
    }
  }
}

impl CompiledArtifacts {
  /// Compiler warnings, if the engine printed anything besides whitespace.
  pub fn warnings(&self) -> Option<&str> {
    non_empty(self.stderr.as_deref())
  }

  pub fn boc_size(&self) -> usize {
    estimated_boc_size(&self.code_boc64)
  }

  /// Render the multi-section report returned by the compile tool.
  ///
  /// Sections appear in a fixed order: heading, hash, size, Fift assembly, BoC, then warnings
  /// and the source listing when there is something to show.
  pub fn to_report(&self) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "## Compilation successful\n");
    let _ = writeln!(report, "**Code hash:** `{}`", self.code_hash_hex);
    let _ = writeln!(report, "**BoC size:** ~{} bytes\n", self.boc_size());

    let _ = writeln!(report, "### Fift assembly");
    push_fenced(&mut report, "fift", &self.fift_code);

    let _ = writeln!(report, "\n### BoC (base64)");
    push_fenced(&mut report, "", &self.code_boc64);

    if let Some(warnings) = self.warnings() {
      let _ = writeln!(report, "\n### Warnings");
      push_fenced(&mut report, "", warnings);
    }

    if !self.sources_snapshot.is_empty() {
      let _ = writeln!(report, "\n### Sources");
      for entry in &self.sources_snapshot {
        let _ = writeln!(
          report,
          "- `{}` ({} bytes)",
          entry.filename,
          entry.contents.len()
        );
      }
    }

    report
  }
}

/// Outcome of a syntax check. Assembly and BoC are dropped on purpose; only the hash survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxCheckOutcome {
  Passed {
    code_hash_hex: String,
    warnings: Option<String>,
  },
  Failed {
    message: String,
  },
}

impl From<CompileOutcome> for SyntaxCheckOutcome {
  fn from(outcome: CompileOutcome) -> Self {
    match outcome {
      CompileOutcome::Success(artifacts) => SyntaxCheckOutcome::Passed {
        warnings: artifacts.warnings().map(str::to_string),
        code_hash_hex: artifacts.code_hash_hex,
      },
      CompileOutcome::Failure { message } => SyntaxCheckOutcome::Failed { message },
    }
  }
}

impl SyntaxCheckOutcome {
  /// `OK — code hash: <hex>`, followed by warnings when present. `None` for failed checks.
  pub fn summary(&self) -> Option<String> {
    match self {
      SyntaxCheckOutcome::Passed {
        code_hash_hex,
        warnings,
      } => {
        let mut text = format!("OK — code hash: {code_hash_hex}");
        if let Some(warnings) = non_empty(warnings.as_deref()) {
          let _ = write!(text, "\n\nWarnings:\n{}", warnings.trim_end());
        }
        Some(text)
      }
      SyntaxCheckOutcome::Failed { .. } => None,
    }
  }
}

/// Approximate binary size of a base64 payload: `ceil(len * 3 / 4)`.
///
/// Padding is not subtracted, so the estimate can exceed the decoded size by up to two bytes.
pub fn estimated_boc_size(boc64: &str) -> usize {
  (boc64.len() * 3).div_ceil(4)
}

fn non_empty(text: Option<&str>) -> Option<&str> {
  text.filter(|text| !text.trim().is_empty())
}

fn push_fenced(report: &mut String, language: &str, body: &str) {
  let _ = writeln!(report, "```{language}");
  let _ = writeln!(report, "{}", body.trim_end());
  let _ = writeln!(report, "```");
}

#[cfg(test)]
mod tests {
  use super::*;

  fn artifacts() -> CompiledArtifacts {
    CompiledArtifacts {
      code_hash_hex: "5d3e".into(),
      code_boc64: "te6ccgEBAQEABgAACP8AAAA=".into(),
      fift_code: "PROGRAM{\n  42 PUSHINT\n}END>c\n".into(),
      stderr: None,
      sources_snapshot: Vec::new(),
    }
  }

  #[test]
  fn size_estimate_rounds_up() {
    assert_eq!(estimated_boc_size(""), 0);
    assert_eq!(estimated_boc_size("a"), 1);
    assert_eq!(estimated_boc_size("abcd"), 3);
    assert_eq!(estimated_boc_size("abcde"), 4);
    assert_eq!(estimated_boc_size("abcdefg"), 6);
    assert_eq!(estimated_boc_size("te6ccgEBAQEABgAACP8AAAA="), 18);
  }

  #[test]
  fn report_sections_appear_in_order() {
    let mut artifacts = artifacts();
    artifacts.stderr = Some("warning: unused variable `x`\n".into());
    artifacts.sources_snapshot = vec![SourceSnapshotEntry {
      filename: "main.tolk".into(),
      contents: "fun main() {}".into(),
    }];
    let report = artifacts.to_report();

    let order = [
      "## Compilation successful",
      "**Code hash:** `5d3e`",
      "**BoC size:** ~18 bytes",
      "```fift\nPROGRAM{\n  42 PUSHINT\n}END>c\n```",
      "### BoC (base64)\n```\nte6ccgEBAQEABgAACP8AAAA=\n```",
      "### Warnings\n```\nwarning: unused variable `x`\n```",
      "### Sources\n- `main.tolk` (13 bytes)",
    ];
    let positions: Vec<usize> = order
      .iter()
      .map(|needle| report.find(needle).unwrap_or_else(|| panic!("missing {needle:?} in\n{report}")))
      .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
  }

  #[test]
  fn optional_sections_are_omitted_when_empty() {
    let mut artifacts = artifacts();
    artifacts.stderr = Some("  \n".into());
    let report = artifacts.to_report();
    assert!(!report.contains("### Warnings"));
    assert!(!report.contains("### Sources"));
  }

  #[test]
  fn report_is_deterministic() {
    assert_eq!(artifacts().to_report(), artifacts().to_report());
  }

  #[test]
  fn syntax_check_keeps_only_hash_and_warnings() {
    let mut artifacts = artifacts();
    artifacts.stderr = Some("warning: deprecated\n".into());
    let outcome = SyntaxCheckOutcome::from(CompileOutcome::Success(artifacts));

    assert_eq!(
      outcome.summary().as_deref(),
      Some("OK — code hash: 5d3e\n\nWarnings:\nwarning: deprecated")
    );
  }

  #[test]
  fn failed_syntax_check_has_no_summary() {
    let outcome = SyntaxCheckOutcome::from(CompileOutcome::Failure {
      message: "error".into(),
    });
    assert_eq!(outcome.summary(), None);
  }

  #[test]
  fn engine_results_map_losslessly() {
    let outcome = CompileOutcome::from(CompileResult::Error {
      message: "bad.tolk:1:23: error: expected `;`".into(),
    });
    assert_eq!(
      outcome,
      CompileOutcome::Failure {
        message: "bad.tolk:1:23: error: expected `;`".into()
      }
    );
  }
}
