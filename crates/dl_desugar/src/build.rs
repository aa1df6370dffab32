//! Constructors for the handful of standard AST shapes the desugaring emits.
//!
//! Generated glue carries `DUMMY_SP`; nodes moved from the input keep their
//! own spans.

use swc_common::DUMMY_SP;
use swc_ecma_ast::{
    ArrowExpr, AssignExpr, AssignOp, AssignTarget, BinExpr, BinaryOp, BindingIdent, BlockStmt,
    BlockStmtOrExpr, CallExpr, Callee, CondExpr, Decl, Expr, ExprOrSpread, ExprStmt, FnExpr,
    Function, Ident, IdentName, Lit, MemberExpr, MemberProp, Null, Number, ParenExpr, Pat,
    ReturnStmt, SeqExpr, SimpleAssignTarget, Stmt, ThisExpr, UnaryExpr, UnaryOp, VarDecl,
    VarDeclKind, VarDeclarator,
};

pub(crate) fn ident(id: &Ident) -> Box<Expr> {
    Box::new(Expr::Ident(id.clone()))
}

pub(crate) fn named(name: &str) -> Box<Expr> {
    Box::new(Expr::Ident(Ident::new_no_ctxt(name.into(), DUMMY_SP)))
}

/// `to = value`
pub(crate) fn assign(to: &Ident, value: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Assign(AssignExpr {
        span: DUMMY_SP,
        op: AssignOp::Assign,
        left: AssignTarget::Simple(SimpleAssignTarget::Ident(BindingIdent {
            id: to.clone(),
            type_ann: None,
        })),
        right: paren_seq(value),
    }))
}

/// `obj.prop = value`
pub(crate) fn assign_member(obj: Box<Expr>, prop: &str, value: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Assign(AssignExpr {
        span: DUMMY_SP,
        op: AssignOp::Assign,
        left: AssignTarget::Simple(SimpleAssignTarget::Member(member_expr(obj, prop))),
        right: paren_seq(value),
    }))
}

fn member_expr(obj: Box<Expr>, prop: &str) -> MemberExpr {
    MemberExpr {
        span: DUMMY_SP,
        obj,
        prop: MemberProp::Ident(IdentName::new(prop.into(), DUMMY_SP)),
    }
}

/// `obj.prop`
pub(crate) fn member(obj: Box<Expr>, prop: &str) -> Box<Expr> {
    Box::new(Expr::Member(member_expr(obj, prop)))
}

/// `callee(args…)`; sequence arguments are parenthesized.
pub(crate) fn call(callee: Box<Expr>, args: Vec<Box<Expr>>) -> Box<Expr> {
    Box::new(Expr::Call(CallExpr {
        span: DUMMY_SP,
        callee: Callee::Expr(callee),
        args: args
            .into_iter()
            .map(|expr| ExprOrSpread {
                spread: None,
                expr: paren_seq(expr),
            })
            .collect(),
        type_args: None,
        ..Default::default()
    }))
}

/// `obj.method(args…)`
pub(crate) fn method_call(obj: Box<Expr>, method: &str, args: Vec<Box<Expr>>) -> Box<Expr> {
    call(member(obj, method), args)
}

fn bin(op: BinaryOp, left: Box<Expr>, right: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Bin(BinExpr {
        span: DUMMY_SP,
        op,
        left,
        right,
    }))
}

/// `left || right`
pub(crate) fn or(left: Box<Expr>, right: Box<Expr>) -> Box<Expr> {
    bin(BinaryOp::LogicalOr, left, right)
}

/// `left && right`; an assignment on the right is parenthesized.
pub(crate) fn and(left: Box<Expr>, right: Box<Expr>) -> Box<Expr> {
    let right = if matches!(*right, Expr::Assign(_)) {
        paren(right)
    } else {
        right
    };
    bin(BinaryOp::LogicalAnd, left, right)
}

/// `left in right`
pub(crate) fn has_key(left: Box<Expr>, right: Box<Expr>) -> Box<Expr> {
    bin(BinaryOp::In, left, right)
}

/// `test ? cons : alt`
pub(crate) fn cond(test: Box<Expr>, cons: Box<Expr>, alt: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Cond(CondExpr {
        span: DUMMY_SP,
        test,
        cons,
        alt,
    }))
}

/// `(a, b, …)` without the parentheses; nested sequences are flattened.
pub(crate) fn seq(exprs: Vec<Box<Expr>>) -> Box<Expr> {
    let mut flat = Vec::with_capacity(exprs.len());
    for expr in exprs {
        match *expr {
            Expr::Seq(inner) => flat.extend(inner.exprs),
            other => flat.push(Box::new(other)),
        }
    }
    Box::new(Expr::Seq(SeqExpr {
        span: DUMMY_SP,
        exprs: flat,
    }))
}

pub(crate) fn paren(expr: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Paren(ParenExpr {
        span: DUMMY_SP,
        expr,
    }))
}

/// Parenthesize a sequence so it stays one operand.
pub(crate) fn paren_seq(expr: Box<Expr>) -> Box<Expr> {
    if matches!(*expr, Expr::Seq(_)) {
        paren(expr)
    } else {
        expr
    }
}

/// Parenthesize anything that binds looser than a member access, so a
/// replacement can stand wherever the original class or object stood.
pub(crate) fn paren_operand(expr: Box<Expr>) -> Box<Expr> {
    match *expr {
        Expr::Seq(_) | Expr::Bin(_) | Expr::Cond(_) | Expr::Assign(_) => paren(expr),
        _ => expr,
    }
}

/// `!expr`; loose operands are parenthesized.
pub(crate) fn not(expr: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Unary(UnaryExpr {
        span: DUMMY_SP,
        op: UnaryOp::Bang,
        arg: paren_operand(expr),
    }))
}

/// `void 0`
pub(crate) fn void_zero() -> Box<Expr> {
    Box::new(Expr::Unary(UnaryExpr {
        span: DUMMY_SP,
        op: UnaryOp::Void,
        arg: Box::new(Expr::Lit(Lit::Num(Number {
            span: DUMMY_SP,
            value: 0.0,
            raw: None,
        }))),
    }))
}

pub(crate) fn null() -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Null(Null { span: DUMMY_SP })))
}

pub(crate) fn this() -> Box<Expr> {
    Box::new(Expr::This(ThisExpr { span: DUMMY_SP }))
}

/// `function () { return value; }`
pub(crate) fn returning_fn(value: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Fn(FnExpr {
        ident: None,
        function: Box::new(Function {
            params: vec![],
            decorators: vec![],
            span: DUMMY_SP,
            ctxt: Default::default(),
            body: Some(BlockStmt {
                span: DUMMY_SP,
                ctxt: Default::default(),
                stmts: vec![Stmt::Return(ReturnStmt {
                    span: DUMMY_SP,
                    arg: Some(value),
                })],
            }),
            is_generator: false,
            is_async: false,
            type_params: None,
            return_type: None,
        }),
    }))
}

/// `() => value`
pub(crate) fn returning_arrow(value: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Arrow(ArrowExpr {
        span: DUMMY_SP,
        ctxt: Default::default(),
        params: vec![],
        body: Box::new(BlockStmtOrExpr::Expr(value)),
        is_async: false,
        is_generator: false,
        type_params: None,
        return_type: None,
    }))
}

pub(crate) fn var_decl(kind: VarDeclKind, decls: Vec<(Ident, Option<Box<Expr>>)>) -> Box<VarDecl> {
    Box::new(VarDecl {
        span: DUMMY_SP,
        ctxt: Default::default(),
        kind,
        declare: false,
        decls: decls
            .into_iter()
            .map(|(id, init)| VarDeclarator {
                span: DUMMY_SP,
                name: Pat::Ident(BindingIdent { id, type_ann: None }),
                init,
                definite: false,
            })
            .collect(),
    })
}

/// `var a, b, …;`
pub(crate) fn declare_vars(temps: Vec<Ident>) -> Stmt {
    Stmt::Decl(Decl::Var(var_decl(
        VarDeclKind::Var,
        temps.into_iter().map(|id| (id, None)).collect(),
    )))
}

/// `"use strict";` and friends must stay at the top of a body.
pub(crate) fn is_directive(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Expr(ExprStmt { expr, .. }) if matches!(&**expr, Expr::Lit(Lit::Str(_))))
}

/// Insert `var temps…;` after any leading directives.
pub(crate) fn prepend_vars(stmts: &mut Vec<Stmt>, temps: Vec<Ident>) {
    if temps.is_empty() {
        return;
    }
    let at = stmts.iter().take_while(|s| is_directive(s)).count();
    stmts.insert(at, declare_vars(temps));
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_ecma_ast::Str;

    #[test]
    fn seq_flattens_nested_sequences() {
        let inner = seq(vec![named("a"), named("b")]);
        let outer = seq(vec![named("x"), inner, named("y")]);
        let Expr::Seq(s) = *outer else {
            panic!("expected a sequence");
        };
        assert_eq!(s.exprs.len(), 4);
    }

    #[test]
    fn sequence_arguments_are_parenthesized() {
        let expr = call(named("f"), vec![seq(vec![named("a"), named("b")])]);
        let Expr::Call(c) = *expr else {
            panic!("expected a call");
        };
        assert!(matches!(*c.args[0].expr, Expr::Paren(_)));
    }

    #[test]
    fn operands_wrap_only_loose_expressions() {
        assert!(matches!(*paren_operand(named("a")), Expr::Ident(_)));
        assert!(matches!(
            *paren_operand(or(named("a"), named("b"))),
            Expr::Paren(_)
        ));
    }

    #[test]
    fn vars_go_after_directives() {
        let mut stmts = vec![
            Stmt::Expr(ExprStmt {
                span: DUMMY_SP,
                expr: Box::new(Expr::Lit(Lit::Str(Str {
                    span: DUMMY_SP,
                    value: "use strict".into(),
                    raw: None,
                }))),
            }),
            Stmt::Expr(ExprStmt {
                span: DUMMY_SP,
                expr: named("f"),
            }),
        ];
        prepend_vars(&mut stmts, vec![Ident::new_no_ctxt("_a".into(), DUMMY_SP)]);
        assert!(is_directive(&stmts[0]));
        assert!(matches!(stmts[1], Stmt::Decl(Decl::Var(_))));
    }
}
