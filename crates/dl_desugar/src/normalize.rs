//! Ordering normalization.
//!
//! Later stages nest decorator calls inside one another, which would change
//! when each decorator expression is evaluated. Every decorator expression
//! that is not a bare identifier is therefore evaluated up front into a
//! temporary, in source order across the whole construct.

use dl_ast::{Class, DecoratedObjectLit, Decorator, Expr};

use crate::build;
use crate::context::DesugarContext;
use crate::member::member_decorators_mut;

/// Hoist class decorators, then each member's decorators in member order.
pub(crate) fn hoist_class(cx: &mut DesugarContext, class: &mut Class) -> Vec<Box<Expr>> {
    let members = class
        .body
        .iter_mut()
        .filter_map(member_decorators_mut)
        .flat_map(|decorators| decorators.iter_mut());
    hoist(cx, class.decorators.iter_mut().chain(members))
}

/// Hoist object member decorators in member order.
pub(crate) fn hoist_object(cx: &mut DesugarContext, obj: &mut DecoratedObjectLit) -> Vec<Box<Expr>> {
    let decorators = obj.props.iter_mut().flat_map(|p| p.decorators.iter_mut());
    hoist(cx, decorators)
}

fn hoist<'a>(
    cx: &mut DesugarContext,
    decorators: impl IntoIterator<Item = &'a mut Decorator>,
) -> Vec<Box<Expr>> {
    let mut hoisted = Vec::new();
    for decorator in decorators {
        if matches!(*decorator.expr, Expr::Ident(_)) {
            continue;
        }
        let temp = cx.temp("dec");
        let original = std::mem::replace(&mut decorator.expr, build::ident(&temp));
        hoisted.push(build::assign(&temp, original));
    }
    hoisted
}

/// `(hoisted…, expr)`, or `expr` alone when nothing was hoisted.
pub(crate) fn sequence_after(mut hoisted: Vec<Box<Expr>>, expr: Box<Expr>) -> Box<Expr> {
    if hoisted.is_empty() {
        return expr;
    }
    hoisted.push(expr);
    build::seq(hoisted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NameAllocator;
    use swc_common::DUMMY_SP;

    fn decorator(expr: Box<Expr>) -> Decorator {
        Decorator {
            span: DUMMY_SP,
            expr,
        }
    }

    #[test]
    fn identifiers_stay_calls_are_hoisted_in_order() {
        let mut cx = DesugarContext::new(NameAllocator::default());
        cx.enter_scope();
        let mut decorators = vec![
            decorator(build::call(build::named("dec"), vec![])),
            decorator(build::named("plain")),
            decorator(build::member(build::named("ns"), "dec")),
        ];

        let hoisted = hoist(&mut cx, decorators.iter_mut());

        assert_eq!(hoisted.len(), 2);
        let names: Vec<_> = decorators
            .iter()
            .map(|d| match &*d.expr {
                Expr::Ident(id) => id.sym.to_string(),
                other => panic!("decorator not normalized: {other:?}"),
            })
            .collect();
        assert_eq!(names, ["_dec", "plain", "_dec2"]);
        assert_eq!(cx.exit_scope().len(), 2);
    }

    #[test]
    fn nothing_hoisted_leaves_expression_alone() {
        let expr = sequence_after(vec![], build::named("x"));
        assert!(matches!(*expr, Expr::Ident(_)));
    }
}
