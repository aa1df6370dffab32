//! Text-level preprocessor that makes object member decorators parseable.
//!
//! Runs before the SWC parser. Class and class-member decorators are left
//! alone since SWC parses them natively.

use dl_ast::DecoratorSyntax;

mod object_pass;
mod util;

pub use object_pass::rewrite_object_decorators;

/// Preprocess a source string, rewriting object member decorators to markers.
pub fn preprocess(source: &str, syntax: &DecoratorSyntax) -> String {
    if syntax.object_members {
        rewrite_object_decorators(source)
    } else {
        source.to_string()
    }
}
