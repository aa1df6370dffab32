//! Decoratable member shapes and the literal keys handed to member decorators.

use std::fmt;

use swc_common::Span;
use swc_ecma_ast::{BigInt, ClassMember, Expr, Ident, Lit, MethodKind, Number, Prop, PropName, Str};

/// Static facts about a member that decide how it may be decorated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberFlags {
    pub is_static: bool,
    pub computed_key: bool,
    pub has_initializer: bool,
}

/// The four member shapes a decorator can be attached to.
///
/// Each shape has its own property model at runtime, so each one is read
/// and written back differently by the desugaring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A class or object method. Already installed on its target when the
    /// container expression finishes evaluating.
    Method(MemberFlags),
    /// A getter or setter, class or object. Installed like a method.
    Accessor(MemberFlags),
    /// An object literal data property (`key: value` or shorthand `key`).
    /// Its value is computed eagerly while the literal is built.
    ObjectProperty(MemberFlags),
    /// A class field. Its initializer runs once per constructed instance.
    ClassProperty(MemberFlags),
}

impl MemberKind {
    /// Classify a class member. Constructors, private members, auto
    /// accessors, static blocks and index signatures have no kind.
    pub fn of_class_member(member: &ClassMember) -> Option<Self> {
        match member {
            ClassMember::Method(method) => {
                let flags = MemberFlags {
                    is_static: method.is_static,
                    computed_key: is_computed(&method.key),
                    has_initializer: false,
                };
                Some(match method.kind {
                    MethodKind::Method => MemberKind::Method(flags),
                    MethodKind::Getter | MethodKind::Setter => MemberKind::Accessor(flags),
                })
            }
            ClassMember::ClassProp(prop) => Some(MemberKind::ClassProperty(MemberFlags {
                is_static: prop.is_static,
                computed_key: is_computed(&prop.key),
                has_initializer: prop.value.is_some(),
            })),
            _ => None,
        }
    }

    /// Classify an object literal member. Assignment patterns (`{ a = 1 }`)
    /// only occur in destructuring and have no kind.
    pub fn of_prop(prop: &Prop) -> Option<Self> {
        let flags = |key: &PropName, has_initializer| MemberFlags {
            is_static: false,
            computed_key: is_computed(key),
            has_initializer,
        };
        match prop {
            Prop::Shorthand(_) => Some(MemberKind::ObjectProperty(MemberFlags {
                has_initializer: true,
                ..MemberFlags::default()
            })),
            Prop::KeyValue(kv) => Some(MemberKind::ObjectProperty(flags(&kv.key, true))),
            Prop::Method(method) => Some(MemberKind::Method(flags(&method.key, false))),
            Prop::Getter(getter) => Some(MemberKind::Accessor(flags(&getter.key, false))),
            Prop::Setter(setter) => Some(MemberKind::Accessor(flags(&setter.key, false))),
            Prop::Assign(_) => None,
        }
    }

    pub fn flags(&self) -> MemberFlags {
        match *self {
            MemberKind::Method(flags)
            | MemberKind::Accessor(flags)
            | MemberKind::ObjectProperty(flags)
            | MemberKind::ClassProperty(flags) => flags,
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberKind::Method(_) => "method",
            MemberKind::Accessor(_) => "accessor",
            MemberKind::ObjectProperty(_) => "object property",
            MemberKind::ClassProperty(_) => "class property",
        };
        if self.flags().is_static {
            write!(f, "static {name}")
        } else {
            f.write_str(name)
        }
    }
}

fn is_computed(key: &PropName) -> bool {
    matches!(key, PropName::Computed(_))
}

/// A member key normalized to a literal.
///
/// Identifier keys become string literals; string, numeric and bigint keys
/// are kept verbatim so that `4() {}` hands the decorator the number `4`.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Str(Str),
    Num(Number),
    BigInt(BigInt),
}

impl PropertyKey {
    /// Resolve a member key. Computed keys have no literal form.
    pub fn from_prop_name(key: &PropName) -> Option<Self> {
        match key {
            PropName::Ident(ident) => Some(Self::named(&ident.sym, ident.span)),
            PropName::Str(s) => Some(PropertyKey::Str(s.clone())),
            PropName::Num(n) => Some(PropertyKey::Num(n.clone())),
            PropName::BigInt(b) => Some(PropertyKey::BigInt(b.clone())),
            PropName::Computed(_) => None,
        }
    }

    /// Key of a shorthand object member (`{ x }`).
    pub fn from_ident(ident: &Ident) -> Self {
        Self::named(&ident.sym, ident.span)
    }

    fn named(name: &str, span: Span) -> Self {
        PropertyKey::Str(Str {
            span,
            value: name.into(),
            raw: Some(format!("\"{name}\"").into()),
        })
    }

    pub fn to_expr(&self) -> Expr {
        Expr::Lit(match self {
            PropertyKey::Str(s) => Lit::Str(s.clone()),
            PropertyKey::Num(n) => Lit::Num(n.clone()),
            PropertyKey::BigInt(b) => Lit::BigInt(b.clone()),
        })
    }

    /// Human-readable rendering of any member key, computed ones included.
    pub fn describe(key: &PropName) -> String {
        match key {
            PropName::Ident(ident) => ident.sym.to_string(),
            PropName::Computed(_) => "[computed]".to_string(),
            _ => Self::from_prop_name(key)
                .map(|resolved| resolved.to_string())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Str(s) => match &s.raw {
                Some(raw) => f.write_str(raw),
                None => f.write_str("<string>"),
            },
            PropertyKey::Num(n) => match &n.raw {
                Some(raw) => f.write_str(raw),
                None => write!(f, "{}", n.value),
            },
            PropertyKey::BigInt(b) => match &b.raw {
                Some(raw) => f.write_str(raw),
                None => f.write_str("<bigint>"),
            },
        }
    }
}
