use std::collections::BTreeMap;

/// Logical filename to source text, as submitted with one request.
pub type SourceSet = BTreeMap<String, String>;
