//! Object literals whose members carry decorators.
//!
//! SWC's object literal has no decorator slot, so the parser encodes
//! `{ @a @b key: v }` as `{ __legacy_decorators__: [a, b], key: v }`.
//! [`DecoratedObjectLit::lift`] turns that encoding back into an ordered
//! decorator list per member.

use swc_common::{Span, Spanned};
use swc_ecma_ast::{Decorator, Expr, ObjectLit, Prop, PropName, PropOrSpread};

/// Key of the marker property that precedes a decorated object member.
pub const OBJECT_DECORATORS_MARKER: &str = "__legacy_decorators__";

/// One object literal member with the decorators written above it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedProp {
    pub decorators: Vec<Decorator>,
    pub prop: PropOrSpread,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedObjectLit {
    pub span: Span,
    pub props: Vec<DecoratedProp>,
}

impl DecoratedObjectLit {
    /// Whether the literal contains at least one decorator marker.
    pub fn has_marker(obj: &ObjectLit) -> bool {
        obj.props.iter().any(|p| marker_elems(p).is_some())
    }

    /// Attach every marker's decorators to the member that follows it.
    ///
    /// Fails with the marker's span when a marker is the last member, since
    /// its decorators then have nothing to decorate.
    pub fn lift(obj: ObjectLit) -> Result<Self, Span> {
        let mut props = Vec::with_capacity(obj.props.len());
        let mut pending: Vec<Decorator> = Vec::new();
        let mut pending_span = None;

        for prop in obj.props {
            if let Some(elems) = marker_elems(&prop) {
                pending_span.get_or_insert(prop.span());
                pending.extend(elems);
                continue;
            }
            pending_span = None;
            props.push(DecoratedProp {
                decorators: std::mem::take(&mut pending),
                prop,
            });
        }

        if let Some(span) = pending_span {
            return Err(span);
        }

        Ok(Self {
            span: obj.span,
            props,
        })
    }

    pub fn has_decorators(&self) -> bool {
        self.props.iter().any(|p| !p.decorators.is_empty())
    }

    /// Drop all decorators and give back a plain object literal.
    pub fn lower(self) -> ObjectLit {
        ObjectLit {
            span: self.span,
            props: self.props.into_iter().map(|p| p.prop).collect(),
        }
    }
}

fn marker_elems(prop: &PropOrSpread) -> Option<Vec<Decorator>> {
    let PropOrSpread::Prop(prop) = prop else {
        return None;
    };
    let Prop::KeyValue(kv) = &**prop else {
        return None;
    };
    let PropName::Ident(key) = &kv.key else {
        return None;
    };
    if &*key.sym != OBJECT_DECORATORS_MARKER {
        return None;
    }
    let Expr::Array(array) = &*kv.value else {
        return None;
    };
    Some(
        array
            .elems
            .iter()
            .flatten()
            .map(|elem| Decorator {
                span: elem.expr.span(),
                expr: elem.expr.clone(),
            })
            .collect(),
    )
}
