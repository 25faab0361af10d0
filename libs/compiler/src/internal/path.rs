use thiserror::Error;
use tolk_rs::{FsReader, ReadError};

use crate::compiler::input::SourceSet;
use crate::internal::errors::list_files;

/// A file the compiler asked for that is not part of the submitted sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("File not found: {requested}. Available files: {}", list_files(.available))]
pub struct FileNotFound {
  pub requested: String,
  pub available: Vec<String>,
}

/// Strip leading `./` segments from a logical filename.
///
/// Only the current-directory prefix is rewritten. Nested paths such as `./lib/utils.tolk` become
/// `lib/utils.tolk` and are matched against keys verbatim; `..` is never interpreted.
pub fn normalize_path(path: &str) -> &str {
  let mut current = path;
  while let Some(rest) = current.strip_prefix("./") {
    current = rest;
  }
  current
}

/// Flat virtual filesystem over the sources submitted with one request.
///
/// The engine may ask for a file either as `main.tolk` (the entrypoint) or as `./main.tolk` (an
/// import inside another file). Lookups try the normalized name first and then the raw request.
/// Standard-library imports are served by the engine itself and never reach the resolver.
#[derive(Debug, Clone, Copy)]
pub struct SourceResolver<'a> {
  sources: &'a SourceSet,
}

impl<'a> SourceResolver<'a> {
  pub fn new(sources: &'a SourceSet) -> Self {
    Self { sources }
  }

  pub fn resolve(&self, path: &str) -> Result<&'a str, FileNotFound> {
    self
      .sources
      .get(normalize_path(path))
      .or_else(|| self.sources.get(path))
      .map(String::as_str)
      .ok_or_else(|| FileNotFound {
        requested: path.to_string(),
        available: self.sources.keys().cloned().collect(),
      })
  }
}

impl FsReader for SourceResolver<'_> {
  fn read_file(&self, path: &str) -> Result<String, ReadError> {
    match self.resolve(path) {
      Ok(contents) => Ok(contents.to_owned()),
      Err(err) => {
        log::debug!("{err}");
        Err(ReadError::new(err.to_string()))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sources(entries: &[(&str, &str)]) -> SourceSet {
    entries
      .iter()
      .map(|(name, text)| (name.to_string(), text.to_string()))
      .collect()
  }

  #[test]
  fn normalize_strips_current_directory_prefixes() {
    assert_eq!(normalize_path("./main.tolk"), "main.tolk");
    assert_eq!(normalize_path("././main.tolk"), "main.tolk");
    assert_eq!(normalize_path("./lib/utils.tolk"), "lib/utils.tolk");
    assert_eq!(normalize_path("../main.tolk"), "../main.tolk");
    assert_eq!(normalize_path("main.tolk"), "main.tolk");
  }

  #[test]
  fn relative_and_bare_names_resolve_to_the_same_text() {
    let set = sources(&[("main.tolk", "fun main() {}")]);
    let resolver = SourceResolver::new(&set);

    let bare = resolver.resolve("main.tolk").expect("bare name");
    let relative = resolver.resolve("./main.tolk").expect("relative name");
    assert_eq!(bare, relative);
  }

  #[test]
  fn falls_back_to_the_raw_key() {
    let set = sources(&[("./odd.tolk", "fun odd() {}")]);
    let resolver = SourceResolver::new(&set);
    assert_eq!(resolver.resolve("./odd.tolk"), Ok("fun odd() {}"));
  }

  #[test]
  fn normalized_key_wins_over_raw_key() {
    let set = sources(&[("a.tolk", "normalized"), ("./a.tolk", "raw")]);
    let resolver = SourceResolver::new(&set);
    assert_eq!(resolver.resolve("./a.tolk"), Ok("normalized"));
  }

  #[test]
  fn missing_file_names_request_and_available_files() {
    let set = sources(&[("main.tolk", ""), ("helper.tolk", "")]);
    let err = SourceResolver::new(&set)
      .resolve("./missing.tolk")
      .expect_err("missing file");

    assert_eq!(err.requested, "./missing.tolk");
    assert_eq!(err.available, vec!["helper.tolk", "main.tolk"]);
    assert_eq!(
      err.to_string(),
      "File not found: ./missing.tolk. Available files: helper.tolk, main.tolk"
    );
  }

  #[test]
  fn no_wildcard_or_directory_matching() {
    let set = sources(&[("lib/utils.tolk", "")]);
    let resolver = SourceResolver::new(&set);
    assert!(resolver.resolve("utils.tolk").is_err());
    assert!(resolver.resolve("lib/*.tolk").is_err());
    assert!(resolver.resolve("./lib/utils.tolk").is_ok());
  }

  #[test]
  fn reader_reports_lookup_failures_as_text() {
    let set = SourceSet::new();
    let err = SourceResolver::new(&set)
      .read_file("main.tolk")
      .expect_err("empty set");
    assert_eq!(
      err.message(),
      "File not found: main.tolk. Available files: (none)"
    );
  }
}
