pub(crate) mod errors;
pub(crate) mod options;
pub(crate) mod path;
