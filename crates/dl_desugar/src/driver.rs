//! The traversal that finds decorated constructs and swaps in their
//! rewritten form.
//!
//! Children are rewritten before their parent, so a decorated construct
//! nested inside a decorator argument or a member body is already plain
//! code by the time the enclosing construct is hoisted and rewritten.

use dl_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, ClassDecl, ClassExpr, Constructor, Decl,
    DecoratedObjectLit, DefaultDecl, ExportDefaultDecl, ExportNamedSpecifier, ExportSpecifier,
    Expr, Function, GetterProp, Ident, Invalid, Module, ModuleDecl, ModuleExportName, ModuleItem,
    NamedExport, ReturnStmt, SetterProp, StaticBlock, Stmt, VarDeclKind,
};
use swc_common::DUMMY_SP;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::build;
use crate::class::ClassDecoratorChain;
use crate::context::DesugarContext;
use crate::error::{DecoratorError, DesugarError, Unsupported};
use crate::member::{self, class_has_decorators};
use crate::normalize;

/// Legacy decorator desugaring as a `VisitMut` pass over one module.
pub struct LegacyDecorators {
    cx: DesugarContext,
}

impl LegacyDecorators {
    pub fn new(cx: DesugarContext) -> Self {
        Self { cx }
    }

    /// Errors collected during the traversal. Any error rejects the unit.
    pub fn finish(mut self) -> Result<(), DesugarError> {
        let errors = self.cx.take_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DesugarError { errors })
        }
    }

    /// `inner_name` is the binding only a class expression's body can see.
    fn validate_class(&mut self, class: &dl_ast::Class, inner_name: Option<&Ident>) -> bool {
        let errors = member::class_errors(class, inner_name);
        let valid = errors.is_empty();
        for error in errors {
            self.cx.report(error);
        }
        valid
    }

    /// normalize → class chain → member sequence.
    fn rewrite_class(&mut self, mut class: ClassExpr) -> Box<Expr> {
        tracing::debug!(
            class = class.ident.as_ref().map(|id| &*id.sym).unwrap_or("<anonymous>"),
            "desugaring decorated class"
        );
        let hoisted = normalize::hoist_class(&mut self.cx, &mut class.class);
        let decorators = std::mem::take(&mut class.class.decorators);
        let chain = ClassDecoratorChain::new(&mut self.cx, decorators);
        let members = member::rewrite_class_members(&mut self.cx, class);
        normalize::sequence_after(hoisted, chain.wrap(members))
    }

    fn rewrite_object(&mut self, obj: &dl_ast::ObjectLit) -> Option<Box<Expr>> {
        let mut lifted = match DecoratedObjectLit::lift(obj.clone()) {
            Ok(lifted) => lifted,
            Err(span) => {
                self.cx.report(DecoratorError::new(
                    Unsupported::Dangling,
                    "end of object literal",
                    span,
                ));
                return None;
            }
        };
        if !lifted.has_decorators() {
            return Some(Box::new(Expr::Object(lifted.lower())));
        }

        let errors = member::object_errors(&lifted);
        if !errors.is_empty() {
            for error in errors {
                self.cx.report(error);
            }
            return None;
        }

        tracing::debug!(members = lifted.props.len(), "desugaring decorated object literal");
        let hoisted = normalize::hoist_object(&mut self.cx, &mut lifted);
        let members = member::rewrite_object_members(&mut self.cx, lifted);
        Some(normalize::sequence_after(hoisted, members))
    }

    /// `export default @dec class X {}` becomes `@dec class X {}` followed
    /// by `export { X as default }`.
    fn split_default_export(&mut self, item: ModuleItem) -> Vec<ModuleItem> {
        let ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
            span,
            decl: DefaultDecl::Class(class),
        })) = item
        else {
            return vec![item];
        };
        if !class_has_decorators(&class.class) {
            return vec![ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(
                ExportDefaultDecl {
                    span,
                    decl: DefaultDecl::Class(class),
                },
            ))];
        }

        let ident = class
            .ident
            .unwrap_or_else(|| self.cx.fresh_name("default"));
        tracing::trace!(name = %ident.sym, "splitting default-exported class");

        let decl = ModuleItem::Stmt(Stmt::Decl(Decl::Class(ClassDecl {
            ident: ident.clone(),
            declare: false,
            class: class.class,
        })));
        let export = ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(NamedExport {
            span,
            specifiers: vec![ExportSpecifier::Named(ExportNamedSpecifier {
                span: DUMMY_SP,
                orig: ModuleExportName::Ident(ident),
                exported: Some(ModuleExportName::Ident(Ident::new_no_ctxt(
                    "default".into(),
                    DUMMY_SP,
                ))),
                is_type_only: false,
            })],
            src: None,
            type_only: false,
            with: None,
        }));
        vec![decl, export]
    }
}

impl VisitMut for LegacyDecorators {
    fn visit_mut_module(&mut self, module: &mut Module) {
        self.cx.enter_scope();
        module.visit_mut_children_with(self);
        let temps = self.cx.exit_scope();
        if temps.is_empty() {
            return;
        }
        let at = module
            .body
            .iter()
            .take_while(|item| match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(_)) => true,
                ModuleItem::Stmt(stmt) => build::is_directive(stmt),
                _ => false,
            })
            .count();
        module
            .body
            .insert(at, ModuleItem::Stmt(build::declare_vars(temps)));
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        let split = std::mem::take(items)
            .into_iter()
            .flat_map(|item| self.split_default_export(item))
            .collect();
        *items = split;
        items.visit_mut_children_with(self);
    }

    fn visit_mut_decl(&mut self, decl: &mut Decl) {
        decl.visit_mut_children_with(self);

        let Decl::Class(class_decl) = decl else {
            return;
        };
        if !class_has_decorators(&class_decl.class) || !self.validate_class(&class_decl.class, None) {
            return;
        }

        let placeholder = Decl::Var(build::var_decl(VarDeclKind::Let, vec![]));
        let Decl::Class(ClassDecl { ident, class, .. }) = std::mem::replace(decl, placeholder)
        else {
            return;
        };
        let value = self.rewrite_class(ClassExpr {
            ident: Some(ident.clone()),
            class,
        });
        *decl = Decl::Var(build::var_decl(
            VarDeclKind::Let,
            vec![(ident, Some(build::paren_seq(value)))],
        ));
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        let decorated_class = matches!(&*expr, Expr::Class(c) if class_has_decorators(&c.class));
        let replacement = if decorated_class {
            let Expr::Class(class) = std::mem::replace(expr, Expr::Invalid(Invalid { span: DUMMY_SP }))
            else {
                return;
            };
            if !self.validate_class(&class.class, class.ident.as_ref()) {
                *expr = Expr::Class(class);
                return;
            }
            self.rewrite_class(class)
        } else if let Expr::Object(obj) = expr {
            if !DecoratedObjectLit::has_marker(obj) {
                return;
            }
            match self.rewrite_object(obj) {
                Some(replacement) => replacement,
                None => return,
            }
        } else {
            return;
        };
        *expr = *build::paren_operand(replacement);
    }

    fn visit_mut_function(&mut self, function: &mut Function) {
        function.decorators.visit_mut_with(self);
        function.params.visit_mut_with(self);
        if let Some(body) = &mut function.body {
            self.cx.enter_scope();
            body.visit_mut_with(self);
            build::prepend_vars(&mut body.stmts, self.cx.exit_scope());
        }
    }

    fn visit_mut_constructor(&mut self, ctor: &mut Constructor) {
        ctor.params.visit_mut_with(self);
        if let Some(body) = &mut ctor.body {
            self.cx.enter_scope();
            body.visit_mut_with(self);
            build::prepend_vars(&mut body.stmts, self.cx.exit_scope());
        }
    }

    fn visit_mut_getter_prop(&mut self, getter: &mut GetterProp) {
        getter.key.visit_mut_with(self);
        if let Some(body) = &mut getter.body {
            self.cx.enter_scope();
            body.visit_mut_with(self);
            build::prepend_vars(&mut body.stmts, self.cx.exit_scope());
        }
    }

    fn visit_mut_setter_prop(&mut self, setter: &mut SetterProp) {
        setter.key.visit_mut_with(self);
        setter.param.visit_mut_with(self);
        if let Some(body) = &mut setter.body {
            self.cx.enter_scope();
            body.visit_mut_with(self);
            build::prepend_vars(&mut body.stmts, self.cx.exit_scope());
        }
    }

    fn visit_mut_static_block(&mut self, block: &mut StaticBlock) {
        self.cx.enter_scope();
        block.body.visit_mut_with(self);
        build::prepend_vars(&mut block.body.stmts, self.cx.exit_scope());
    }

    fn visit_mut_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
        arrow.params.visit_mut_with(self);
        self.cx.enter_scope();
        arrow.body.visit_mut_with(self);
        let temps = self.cx.exit_scope();
        if temps.is_empty() {
            return;
        }

        match &mut *arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => build::prepend_vars(&mut block.stmts, temps),
            BlockStmtOrExpr::Expr(value) => {
                let value =
                    std::mem::replace(value, Box::new(Expr::Invalid(Invalid { span: DUMMY_SP })));
                *arrow.body = BlockStmtOrExpr::BlockStmt(BlockStmt {
                    span: DUMMY_SP,
                    ctxt: Default::default(),
                    stmts: vec![
                        build::declare_vars(temps),
                        Stmt::Return(ReturnStmt {
                            span: DUMMY_SP,
                            arg: Some(value),
                        }),
                    ],
                });
            }
        }
    }
}
