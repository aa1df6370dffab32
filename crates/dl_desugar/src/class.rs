//! Class-level decorators.
//!
//! `@a @b class C {}` becomes `a(_class = b(_class = class C {}) || _class) || _class`:
//! the last-declared decorator runs first, and a falsy return keeps the
//! class it was given.

use dl_ast::{Decorator, Expr, Ident};

use crate::build;
use crate::context::DesugarContext;

pub(crate) struct ClassDecoratorChain {
    class_ref: Option<Ident>,
    decorators: Vec<Decorator>,
}

impl ClassDecoratorChain {
    /// Allocates the class reference temporary only when there is something
    /// to apply.
    pub(crate) fn new(cx: &mut DesugarContext, decorators: Vec<Decorator>) -> Self {
        let class_ref = (!decorators.is_empty()).then(|| cx.temp("class"));
        Self {
            class_ref,
            decorators,
        }
    }

    pub(crate) fn wrap(self, inner: Box<Expr>) -> Box<Expr> {
        let Some(class_ref) = self.class_ref else {
            return inner;
        };

        tracing::debug!(count = self.decorators.len(), class_ref = %class_ref.sym, "applying class decorators");

        self.decorators
            .into_iter()
            .rev()
            .fold(inner, |acc, decorator| {
                build::or(
                    build::call(decorator.expr, vec![build::assign(&class_ref, acc)]),
                    build::ident(&class_ref),
                )
            })
    }
}
