//! Templates compiled into the binary.

mod batch;
mod inference;

use super::types::Template;

/// Built-in templates as `(name, constructor)` pairs.
pub const BUILTIN_TEMPLATES: &[(&str, fn() -> Template)] = &[
    ("batch", batch::template),
    ("inference", inference::template),
];
