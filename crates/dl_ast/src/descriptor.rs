//! Property descriptors as the host runtime's reflective API sees them.

use swc_common::Span;
use swc_ecma_ast::{Bool, Expr, IdentName, KeyValueProp, Lit, ObjectLit, Prop, PropName, PropOrSpread};

/// A property descriptor literal synthesized by the desugaring.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub enumerable: bool,
    pub configurable: bool,
    pub shape: DescriptorShape,
}

/// What the descriptor says about the property's value.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorShape {
    Data { value: Box<Expr>, writable: bool },
    Accessor { get: Option<Box<Expr>>, set: Option<Box<Expr>> },
    /// A lazily evaluated value. `thunk` is called with the receiver as
    /// `this` when the property is finally installed.
    Initializer { thunk: Box<Expr>, writable: bool },
}

impl Descriptor {
    /// `{ enumerable: true, configurable: true, writable: true, initializer: thunk }`
    pub fn initializer(thunk: Box<Expr>) -> Self {
        Self {
            enumerable: true,
            configurable: true,
            shape: DescriptorShape::Initializer {
                thunk,
                writable: true,
            },
        }
    }

    /// Render the descriptor as an object literal expression.
    pub fn into_expr(self, span: Span) -> Expr {
        let mut props = vec![
            bool_prop("enumerable", self.enumerable, span),
            bool_prop("configurable", self.configurable, span),
        ];

        match self.shape {
            DescriptorShape::Data { value, writable } => {
                props.push(bool_prop("writable", writable, span));
                props.push(expr_prop("value", value, span));
            }
            DescriptorShape::Accessor { get, set } => {
                if let Some(get) = get {
                    props.push(expr_prop("get", get, span));
                }
                if let Some(set) = set {
                    props.push(expr_prop("set", set, span));
                }
            }
            DescriptorShape::Initializer { thunk, writable } => {
                props.push(bool_prop("writable", writable, span));
                props.push(expr_prop("initializer", thunk, span));
            }
        }

        Expr::Object(ObjectLit { span, props })
    }
}

fn bool_prop(name: &str, value: bool, span: Span) -> PropOrSpread {
    expr_prop(name, Box::new(Expr::Lit(Lit::Bool(Bool { span, value }))), span)
}

fn expr_prop(name: &str, value: Box<Expr>, span: Span) -> PropOrSpread {
    PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
        key: PropName::Ident(IdentName::new(name.into(), span)),
        value,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::DUMMY_SP;
    use swc_ecma_ast::{Ident, Null};

    fn keys(expr: &Expr) -> Vec<String> {
        let Expr::Object(obj) = expr else {
            panic!("descriptor should render as an object literal");
        };
        obj.props
            .iter()
            .map(|p| match p {
                PropOrSpread::Prop(prop) => match &**prop {
                    Prop::KeyValue(KeyValueProp {
                        key: PropName::Ident(id),
                        ..
                    }) => id.sym.to_string(),
                    other => panic!("unexpected prop {other:?}"),
                },
                PropOrSpread::Spread(_) => panic!("unexpected spread"),
            })
            .collect()
    }

    #[test]
    fn initializer_descriptor_has_all_flags() {
        let thunk = Box::new(Expr::Lit(Lit::Null(Null { span: DUMMY_SP })));
        let expr = Descriptor::initializer(thunk).into_expr(DUMMY_SP);
        assert_eq!(
            keys(&expr),
            ["enumerable", "configurable", "writable", "initializer"]
        );
    }

    #[test]
    fn accessor_descriptor_omits_writable() {
        let getter = Box::new(Expr::Ident(Ident::new_no_ctxt("get".into(), DUMMY_SP)));
        let expr = Descriptor {
            enumerable: false,
            configurable: true,
            shape: DescriptorShape::Accessor {
                get: Some(getter),
                set: None,
            },
        }
        .into_expr(DUMMY_SP);
        assert_eq!(keys(&expr), ["enumerable", "configurable", "get"]);
    }

    #[test]
    fn data_descriptor_carries_value() {
        let value = Box::new(Expr::Lit(Lit::Bool(Bool {
            span: DUMMY_SP,
            value: true,
        })));
        let expr = Descriptor {
            enumerable: true,
            configurable: false,
            shape: DescriptorShape::Data {
                value,
                writable: false,
            },
        }
        .into_expr(DUMMY_SP);
        assert_eq!(keys(&expr), ["enumerable", "configurable", "writable", "value"]);
    }
}
