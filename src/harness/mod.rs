//! Harness generator
//!
//! Turns raw user source into a standalone program that reads one test case
//! from stdin and prints its answer in the `[v1,v2,...]` literal format used
//! by expected outputs. Generation is pure text assembly: nothing is compiled
//! or validated here, malformed input surfaces as a runtime error of the
//! generated program.

pub mod c;
pub mod cpp;
pub mod java;
pub mod kind;
pub mod python;
pub mod stdin;

pub use kind::ProblemKind;
pub use stdin::example_to_stdin;

use crate::languages::Language;

/// Wrap user source in a driver for the given language and problem family
pub fn wrap(source: &str, language: Language, kind: ProblemKind) -> String {
    match language {
        Language::C => c::wrap(source, kind),
        Language::Cpp => cpp::wrap(source, kind),
        Language::Java => java::wrap(source, kind),
        Language::Python => python::wrap(source, kind),
    }
}
