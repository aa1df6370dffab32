//! Member decorators: the acquire → decorate → store triple per member,
//! sequenced in source order behind a container temporary.
//!
//! ```text
//! (_class = class C { m() {} },
//!  _desc = a(_class.prototype, "m", _desc = b(_class.prototype, "m",
//!      _desc = Object.getOwnPropertyDescriptor(_class.prototype, "m")) || _desc) || _desc,
//!  _desc ? Object.defineProperty(_class.prototype, "m", _desc) : void 0,
//!  _class)
//! ```

use dl_ast::{
    Class, ClassExpr, ClassMember, DecoratedObjectLit, Decorator, Expr, Function, Ident, Key,
    MemberKind, Param, ParamOrTsParamProp, PrivateName, Prop, PropName, PropOrSpread,
    PropertyKey, Super,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::build;
use crate::context::DesugarContext;
use crate::descriptor::{self, DescriptorProtocol, DescriptorTemplate};
use crate::error::{DecoratorError, Unsupported};

/// Decorators of a member the rewriter can handle.
pub(crate) fn member_decorators_mut(member: &mut ClassMember) -> Option<&mut Vec<Decorator>> {
    match member {
        ClassMember::Method(method) => Some(&mut method.function.decorators),
        ClassMember::ClassProp(prop) => Some(&mut prop.decorators),
        _ => None,
    }
}

/// Decorators written on a member of any shape.
pub(crate) fn member_decorators(member: &ClassMember) -> &[Decorator] {
    match member {
        ClassMember::Method(method) => &method.function.decorators,
        ClassMember::PrivateMethod(method) => &method.function.decorators,
        ClassMember::ClassProp(prop) => &prop.decorators,
        ClassMember::PrivateProp(prop) => &prop.decorators,
        ClassMember::AutoAccessor(accessor) => &accessor.decorators,
        _ => &[],
    }
}

fn params_decorated(params: &[Param]) -> bool {
    params.iter().any(|p| !p.decorators.is_empty())
}

fn member_params_decorated(member: &ClassMember) -> bool {
    match member {
        ClassMember::Method(method) => params_decorated(&method.function.params),
        ClassMember::PrivateMethod(method) => params_decorated(&method.function.params),
        ClassMember::Constructor(ctor) => ctor.params.iter().any(|p| match p {
            ParamOrTsParamProp::Param(param) => !param.decorators.is_empty(),
            ParamOrTsParamProp::TsParamProp(prop) => !prop.decorators.is_empty(),
        }),
        _ => false,
    }
}

/// Whether the class or anything in its body carries a decorator.
pub(crate) fn class_has_decorators(class: &Class) -> bool {
    !class.decorators.is_empty()
        || class
            .body
            .iter()
            .any(|m| !member_decorators(m).is_empty() || member_params_decorated(m))
}

fn member_name(member: &ClassMember) -> String {
    match member {
        ClassMember::Method(method) => PropertyKey::describe(&method.key),
        ClassMember::ClassProp(prop) => PropertyKey::describe(&prop.key),
        ClassMember::PrivateMethod(method) => format!("#{}", method.key.name),
        ClassMember::PrivateProp(prop) => format!("#{}", prop.key.name),
        ClassMember::AutoAccessor(accessor) => match &accessor.key {
            Key::Private(name) => format!("#{}", name.name),
            Key::Public(key) => PropertyKey::describe(key),
        },
        ClassMember::Constructor(_) => "constructor".to_string(),
        _ => String::new(),
    }
}

/// Finds references in a field initializer that stop resolving once the
/// initializer is moved out of the class body into a closure.
struct ClassScopedRefs<'a> {
    inner_name: Option<&'a Ident>,
    found: Option<&'static str>,
    /// Depth of non-arrow functions and classes, which rebind `super`.
    super_bound: usize,
}

impl ClassScopedRefs<'_> {
    fn note(&mut self, what: &'static str) {
        if self.found.is_none() {
            self.found = Some(what);
        }
    }

    fn rebinding_super(&mut self, visit: impl FnOnce(&mut Self)) {
        self.super_bound += 1;
        visit(self);
        self.super_bound -= 1;
    }
}

impl Visit for ClassScopedRefs<'_> {
    fn visit_private_name(&mut self, _: &PrivateName) {
        self.note("private names");
    }

    fn visit_super(&mut self, _: &Super) {
        if self.super_bound == 0 {
            self.note("`super`");
        }
    }

    fn visit_ident(&mut self, ident: &Ident) {
        if self.inner_name.is_some_and(|name| name.sym == ident.sym) {
            self.note("the class expression's own name");
        }
    }

    fn visit_function(&mut self, function: &Function) {
        self.rebinding_super(|v| function.visit_children_with(v));
    }

    fn visit_class(&mut self, class: &Class) {
        self.rebinding_super(|v| class.visit_children_with(v));
    }
}

fn class_scoped_use(value: &Expr, inner_name: Option<&Ident>) -> Option<&'static str> {
    let mut refs = ClassScopedRefs {
        inner_name,
        found: None,
        super_bound: 0,
    };
    value.visit_with(&mut refs);
    refs.found
}

/// Every decorator use in the class body that has no legacy desugaring.
///
/// `inner_name` is a class expression's own name, which its body can see but
/// a moved field initializer cannot.
pub(crate) fn class_errors(class: &Class, inner_name: Option<&Ident>) -> Vec<DecoratorError> {
    let mut errors = Vec::new();
    for member in &class.body {
        let decorators = member_decorators(member);
        let span = decorators.first().map(|d| d.span).unwrap_or_default();
        let kind = match member {
            _ if member_params_decorated(member) => Some(Unsupported::Parameter),
            _ if decorators.is_empty() => None,
            ClassMember::PrivateMethod(_) | ClassMember::PrivateProp(_) => {
                Some(Unsupported::PrivateMember)
            }
            ClassMember::AutoAccessor(_) => Some(Unsupported::AutoAccessor),
            _ => MemberKind::of_class_member(member).and_then(|kind| {
                let flags = kind.flags();
                match kind {
                    MemberKind::ClassProperty(_) if flags.is_static => {
                        Some(Unsupported::StaticClassProperty)
                    }
                    _ if flags.computed_key => Some(Unsupported::ComputedKey),
                    _ => None,
                }
            }),
        };
        let kind = kind.or_else(|| match member {
            ClassMember::ClassProp(prop) if !decorators.is_empty() => prop
                .value
                .as_deref()
                .and_then(|value| class_scoped_use(value, inner_name))
                .map(Unsupported::ClassScopedInitializer),
            _ => None,
        });
        if let Some(kind) = kind {
            errors.push(DecoratorError::new(kind, member_name(member), span));
        }
    }
    errors
}

fn object_key(prop: &Prop) -> Option<&PropName> {
    match prop {
        Prop::KeyValue(kv) => Some(&kv.key),
        Prop::Method(method) => Some(&method.key),
        Prop::Getter(getter) => Some(&getter.key),
        Prop::Setter(setter) => Some(&setter.key),
        Prop::Shorthand(_) | Prop::Assign(_) => None,
    }
}

fn resolve_object_key(prop: &Prop) -> Option<PropertyKey> {
    match prop {
        Prop::Shorthand(ident) => Some(PropertyKey::from_ident(ident)),
        _ => object_key(prop).and_then(PropertyKey::from_prop_name),
    }
}

/// Every decorator use in the literal that has no legacy desugaring.
pub(crate) fn object_errors(obj: &DecoratedObjectLit) -> Vec<DecoratorError> {
    let mut errors = Vec::new();
    for decorated in obj.props.iter().filter(|p| !p.decorators.is_empty()) {
        let span = decorated.decorators[0].span;
        let error = match &decorated.prop {
            PropOrSpread::Spread(_) => Some(DecoratorError::new(
                Unsupported::Member("spread elements"),
                "...",
                span,
            )),
            PropOrSpread::Prop(prop) => match &**prop {
                Prop::Assign(assign) => Some(DecoratorError::new(
                    Unsupported::Member("assignment patterns"),
                    assign.key.sym.to_string(),
                    span,
                )),
                Prop::Method(method) if params_decorated(&method.function.params) => {
                    Some(DecoratorError::new(
                        Unsupported::Parameter,
                        PropertyKey::describe(&method.key),
                        span,
                    ))
                }
                other => object_key(other)
                    .filter(|key| matches!(key, PropName::Computed(_)))
                    .map(|key| {
                        DecoratorError::new(Unsupported::ComputedKey, PropertyKey::describe(key), span)
                    }),
            },
        };
        errors.extend(error);
    }
    errors
}

/// Apply one member's decorators to its descriptor:
/// `_desc = d0(T, K, _desc = d1(T, K, _desc = acquire) || _desc) || _desc`.
fn apply(
    decorators: Vec<Decorator>,
    target: &Expr,
    key: &PropertyKey,
    desc: &Ident,
    acquire: Box<Expr>,
) -> Box<Expr> {
    let chained = decorators.into_iter().rev().fold(acquire, |acc, decorator| {
        build::or(
            build::call(
                decorator.expr,
                vec![
                    Box::new(target.clone()),
                    Box::new(key.to_expr()),
                    build::assign(desc, acc),
                ],
            ),
            build::ident(desc),
        )
    });
    build::assign(desc, chained)
}

/// Output for one container: the container binding, then every member's
/// operations, then the container reference as the value.
struct MemberSequence {
    container: Ident,
    desc: Option<Ident>,
    ops: Vec<Box<Expr>>,
}

impl MemberSequence {
    fn new(cx: &mut DesugarContext, hint: &str) -> Self {
        Self {
            container: cx.temp(hint),
            desc: None,
            ops: Vec::new(),
        }
    }

    /// The descriptor holder is shared by every member of the container.
    fn desc(&mut self, cx: &mut DesugarContext) -> Ident {
        self.desc.get_or_insert_with(|| cx.temp("desc")).clone()
    }

    fn push(
        &mut self,
        decorators: Vec<Decorator>,
        target: &Expr,
        key: &PropertyKey,
        desc: &Ident,
        template: DescriptorTemplate,
    ) {
        self.ops.extend(template.setup);
        self.ops
            .push(apply(decorators, target, key, desc, template.acquire));
        self.ops.push(template.store);
    }

    fn finish(self, construct: Expr) -> Box<Expr> {
        let mut exprs = Vec::with_capacity(self.ops.len() + 2);
        exprs.push(build::assign(&self.container, Box::new(construct)));
        exprs.extend(self.ops);
        exprs.push(build::ident(&self.container));
        build::seq(exprs)
    }
}

/// Rewrite the decorated members of a validated class. Class-level
/// decorators are left for the class chain.
pub(crate) fn rewrite_class_members(cx: &mut DesugarContext, mut class: ClassExpr) -> Box<Expr> {
    if !class
        .class
        .body
        .iter()
        .any(|m| !member_decorators(m).is_empty())
    {
        return Box::new(Expr::Class(class));
    }

    let mut sequence = MemberSequence::new(cx, "class");
    let container = build::ident(&sequence.container);

    for member in class.class.body.iter_mut() {
        let Some(kind) = MemberKind::of_class_member(member) else {
            continue;
        };
        let decorators = match member_decorators_mut(member) {
            Some(decorators) if !decorators.is_empty() => std::mem::take(decorators),
            _ => continue,
        };
        let key = match &*member {
            ClassMember::Method(method) => PropertyKey::from_prop_name(&method.key),
            ClassMember::ClassProp(prop) => PropertyKey::from_prop_name(&prop.key),
            _ => None,
        };
        let Some(key) = key else {
            continue;
        };

        tracing::debug!(member = %key, %kind, count = decorators.len(), "rewriting class member");

        let target = if kind.flags().is_static {
            container.clone()
        } else {
            build::member(container.clone(), "prototype")
        };
        let desc = sequence.desc(cx);
        let template = match (DescriptorProtocol::for_kind(kind), member) {
            (DescriptorProtocol::ClassField, ClassMember::ClassProp(prop)) => {
                descriptor::class_field(cx, prop, &desc)
            }
            _ => descriptor::materialized(&target, &key, &desc),
        };
        sequence.push(decorators, &target, &key, &desc, template);
    }

    sequence.finish(Expr::Class(class))
}

/// Rewrite a validated object literal whose members carry decorators.
pub(crate) fn rewrite_object_members(
    cx: &mut DesugarContext,
    mut obj: DecoratedObjectLit,
) -> Box<Expr> {
    let mut sequence = MemberSequence::new(cx, "obj");
    let target = build::ident(&sequence.container);

    for decorated in obj.props.iter_mut() {
        if decorated.decorators.is_empty() {
            continue;
        }
        let PropOrSpread::Prop(prop) = &decorated.prop else {
            continue;
        };
        let (Some(kind), Some(key)) = (MemberKind::of_prop(prop), resolve_object_key(prop)) else {
            continue;
        };
        let decorators = std::mem::take(&mut decorated.decorators);

        tracing::debug!(member = %key, %kind, count = decorators.len(), "rewriting object member");

        let desc = sequence.desc(cx);
        let template = match DescriptorProtocol::for_kind(kind) {
            DescriptorProtocol::ObjectData => descriptor::object_data(cx, &target, &key, &desc),
            _ => descriptor::materialized(&target, &key, &desc),
        };
        sequence.push(decorators, &target, &key, &desc, template);
    }

    sequence.finish(Expr::Object(obj.lower()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dl_ast::{DecoratorSyntax, ModuleItem, Stmt};

    fn first_class(source: &str) -> Class {
        let parsed = dl_parser::parse_decorated(source, "input.ts", &DecoratorSyntax::default())
            .expect("parse");
        match parsed.module.body.into_iter().next() {
            Some(ModuleItem::Stmt(Stmt::Decl(dl_ast::Decl::Class(decl)))) => *decl.class,
            other => panic!("expected a class declaration, got {other:?}"),
        }
    }

    fn kinds(source: &str) -> Vec<Unsupported> {
        class_errors(&first_class(source), None)
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn plain_members_are_accepted() {
        assert!(kinds("class C { @a m() {} @b static s() {} @c f = 1; @d get g() { return 1; } }")
            .is_empty());
    }

    #[test]
    fn static_property_and_computed_key_are_rejected() {
        assert_eq!(
            kinds("class C { @a static x = 1; @b [k]() {} }"),
            [Unsupported::StaticClassProperty, Unsupported::ComputedKey]
        );
    }

    #[test]
    fn static_computed_property_reports_static_first() {
        assert_eq!(
            kinds("class C { @a static [k] = 1; }"),
            [Unsupported::StaticClassProperty]
        );
    }

    #[test]
    fn private_and_parameter_decorators_are_rejected() {
        assert_eq!(
            kinds("class C { @a #p = 1; m(@b x) {} }"),
            [Unsupported::PrivateMember, Unsupported::Parameter]
        );
    }

    #[test]
    fn initializers_bound_to_the_class_body_are_rejected() {
        assert_eq!(
            kinds("class C { #x = 7; @d f = this.#x; @d g = super.g; @d h = #x in this; }"),
            [
                Unsupported::ClassScopedInitializer("private names"),
                Unsupported::ClassScopedInitializer("`super`"),
                Unsupported::ClassScopedInitializer("private names"),
            ]
        );
    }

    #[test]
    fn super_inside_a_nested_method_is_its_own() {
        assert!(kinds("class C { @d f = { m() { return super.m(); } }; @d g = () => this.x; }")
            .is_empty());
    }

    #[test]
    fn undecorated_fields_may_use_private_names() {
        assert!(kinds("class C { #x = 7; f = this.#x; @d m() { return this.#x; } }").is_empty());
    }

    #[test]
    fn class_expression_name_in_field_initializer_is_rejected() {
        let inner = Ident::new_no_ctxt("Inner".into(), swc_common::DUMMY_SP);
        let class = first_class("class Inner { @d f = Inner.seed; @d g = Other.seed; }");
        let errors = class_errors(&class, Some(&inner));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].member, "f");
        assert_eq!(
            errors[0].kind,
            Unsupported::ClassScopedInitializer("the class expression's own name")
        );
        assert!(class_errors(&class, None).is_empty());
    }

    #[test]
    fn error_names_the_member() {
        let errors = class_errors(&first_class("class C { @a static count = 0; }"), None);
        assert_eq!(errors[0].member, "count");
    }

    #[test]
    fn parameter_decorators_count_as_decorated() {
        assert!(class_has_decorators(&first_class("class C { constructor(@inject x) {} }")));
        assert!(!class_has_decorators(&first_class("class C { m(x) {} }")));
    }

    #[test]
    fn chain_applies_last_declared_first() {
        let desc = Ident::new_no_ctxt("_desc".into(), swc_common::DUMMY_SP);
        let decorators = ["a", "b"]
            .iter()
            .map(|n| Decorator {
                span: swc_common::DUMMY_SP,
                expr: build::named(n),
            })
            .collect();
        let key = PropertyKey::from_ident(&Ident::new_no_ctxt("m".into(), swc_common::DUMMY_SP));
        let chain = apply(decorators, &build::named("T"), &key, &desc, build::named("ACQ"));

        // _desc = a(T, "m", _desc = b(…) || _desc) || _desc
        let Expr::Assign(outer) = *chain else {
            panic!("chain should assign the holder");
        };
        let Expr::Bin(or) = *outer.right else {
            panic!("expected `a(…) || _desc`");
        };
        let Expr::Call(call) = *or.left else {
            panic!("expected a call");
        };
        let dl_ast::Callee::Expr(callee) = call.callee else {
            panic!("expected an expression callee");
        };
        assert!(matches!(&*callee, Expr::Ident(id) if &*id.sym == "a"));
        assert_eq!(call.args.len(), 3);
    }
}
