//! Desugaring pass that rewrites legacy decorators into standard code.
//!
//! Transforms:
//! - `@a class C {}` → `a(_class = class C {}) || _class`
//! - `@d m() {}` in a class or object → descriptor read, `_desc = d(T, "m", _desc) || _desc`,
//!   descriptor write back
//! - `@d f = 1` class field → initializer moved into a closure the decorators can replace
//! - `{ @d k: v }` object data property → initializer descriptor over the installed value
//!
//! Decorator expressions other than plain identifiers are evaluated once, in
//! source order, into `_dec` temporaries before anything else happens.

mod build;
mod class;
pub mod context;
mod descriptor;
pub mod driver;
pub mod error;
mod member;
mod normalize;

use swc_ecma_ast::Module;
use swc_ecma_visit::VisitMutWith;

pub use context::{DesugarContext, NameAllocator};
pub use driver::LegacyDecorators;
pub use error::{DecoratorError, DesugarError, Unsupported};

/// Desugar every legacy decorator in a module.
///
/// Any unsupported decorator use rejects the whole module; every such use
/// is reported, not just the first.
pub fn desugar_module(mut module: Module) -> Result<Module, DesugarError> {
    let names = NameAllocator::from_module(&module);
    let mut pass = LegacyDecorators::new(DesugarContext::new(names));
    module.visit_mut_with(&mut pass);
    pass.finish()?;
    Ok(module)
}
