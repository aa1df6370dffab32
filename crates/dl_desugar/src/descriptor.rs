//! Descriptor protocols: how each member shape is read into a descriptor
//! before its decorators run, and written back afterwards.
//!
//! | shape | acquire | store |
//! |---|---|---|
//! | method, accessor | `Object.getOwnPropertyDescriptor(T, K)` | `_desc ? Object.defineProperty(T, K, _desc) : void 0` |
//! | object data property | snapshot the installed value behind an initializer | define only if the initializer yields a truthy value |
//! | class field | move the initializer into a closure | rebind the closure from `_desc.initializer` |

use dl_ast::{ClassProp, Descriptor, Expr, Ident, MemberKind, PropertyKey};
use swc_common::DUMMY_SP;

use crate::build;
use crate::context::DesugarContext;

/// Which read/write shape a member needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DescriptorProtocol {
    /// Already installed on the target by the time the container exists.
    Materialized,
    /// Eagerly evaluated object literal value.
    ObjectData,
    /// Per-instance class field.
    ClassField,
}

impl DescriptorProtocol {
    pub(crate) fn for_kind(kind: MemberKind) -> Self {
        match kind {
            MemberKind::Method(_) | MemberKind::Accessor(_) => DescriptorProtocol::Materialized,
            MemberKind::ObjectProperty(_) => DescriptorProtocol::ObjectData,
            MemberKind::ClassProperty(_) => DescriptorProtocol::ClassField,
        }
    }
}

/// The generated expressions around one member's decorator chain.
#[derive(Debug)]
pub(crate) struct DescriptorTemplate {
    /// Runs before the chain (class fields hoist their initializer here).
    pub setup: Option<Box<Expr>>,
    /// Produces the descriptor the innermost decorator receives.
    pub acquire: Box<Expr>,
    /// Writes the final descriptor held in the holder temporary back.
    pub store: Box<Expr>,
}

/// Methods and accessors: read the live descriptor, define it back if the
/// chain left a truthy one.
pub(crate) fn materialized(target: &Expr, key: &PropertyKey, desc: &Ident) -> DescriptorTemplate {
    let acquire = get_own_property_descriptor(target, key);
    let store = build::cond(
        build::ident(desc),
        define_property(target, key, desc),
        build::void_zero(),
    );
    DescriptorTemplate {
        setup: None,
        acquire,
        store,
    }
}

/// Object literal data properties.
///
/// The literal has already evaluated and installed the value, so the
/// descriptor gets an initializer returning that snapshot. On the way back
/// the (possibly replaced) initializer is run against the object and its
/// result becomes `value`; the property is redefined only when that result
/// is truthy, so a cleared initializer leaves the installed value alone.
/// A descriptor with no `initializer` key, such as one turned into an
/// accessor, is defined as-is.
pub(crate) fn object_data(
    cx: &mut DesugarContext,
    target: &Expr,
    key: &PropertyKey,
    desc: &Ident,
) -> DescriptorTemplate {
    let value = cx.temp("init");

    let snapshot = build::assign(
        &value,
        build::member(get_own_property_descriptor(target, key), "value"),
    );
    let descriptor = Descriptor::initializer(build::returning_arrow(build::ident(&value)));
    let acquire = build::seq(vec![
        snapshot,
        Box::new(descriptor.into_expr(DUMMY_SP)),
    ]);

    let initializer = || build::member(build::ident(desc), "initializer");
    let computed = build::cond(
        initializer(),
        build::method_call(initializer(), "call", vec![Box::new(target.clone())]),
        build::void_zero(),
    );
    let evaluate = build::assign_member(build::ident(desc), "value", computed);
    let guard = build::or(
        build::not(build::has_key(initializer_key(), build::ident(desc))),
        build::paren(evaluate),
    );
    let store = build::and(build::paren(guard), define_property(target, key, desc));

    DescriptorTemplate {
        setup: None,
        acquire,
        store,
    }
}

/// Class instance fields.
///
/// The field initializer moves into a closure bound to a fresh temporary and
/// the field itself calls that closure with the instance as `this`. The
/// chain decides which closure the temporary finally holds, so every later
/// construction sees the decorated initializer, still evaluated once per
/// instance. The closure lives outside the class body, so initializers that
/// need its scope (private names, `super`, a class expression's own name)
/// are rejected during validation.
pub(crate) fn class_field(
    cx: &mut DesugarContext,
    prop: &mut ClassProp,
    desc: &Ident,
) -> DescriptorTemplate {
    let init = cx.temp("init");

    let setup = prop
        .value
        .take()
        .map(|value| build::assign(&init, build::returning_fn(value)));

    prop.value = Some(build::cond(
        build::ident(&init),
        build::method_call(build::ident(&init), "call", vec![build::this()]),
        build::void_zero(),
    ));

    let thunk = if setup.is_some() {
        build::ident(&init)
    } else {
        build::null()
    };
    let acquire = Box::new(Descriptor::initializer(thunk).into_expr(DUMMY_SP));
    let store = build::assign(&init, build::member(build::ident(desc), "initializer"));

    DescriptorTemplate {
        setup,
        acquire,
        store,
    }
}

fn get_own_property_descriptor(target: &Expr, key: &PropertyKey) -> Box<Expr> {
    build::method_call(
        build::named("Object"),
        "getOwnPropertyDescriptor",
        vec![Box::new(target.clone()), Box::new(key.to_expr())],
    )
}

fn define_property(target: &Expr, key: &PropertyKey, desc: &Ident) -> Box<Expr> {
    build::method_call(
        build::named("Object"),
        "defineProperty",
        vec![
            Box::new(target.clone()),
            Box::new(key.to_expr()),
            build::ident(desc),
        ],
    )
}

fn initializer_key() -> Box<Expr> {
    Box::new(
        PropertyKey::Str(dl_ast::Str {
            span: DUMMY_SP,
            value: "initializer".into(),
            raw: Some("\"initializer\"".into()),
        })
        .to_expr(),
    )
}
