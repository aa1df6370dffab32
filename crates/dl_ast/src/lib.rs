//! ECMAScript/TypeScript AST extended with the legacy decorator data model.
//!
//! Re-exports the standard SWC AST and adds:
//! - [`MemberKind`]: the closed set of decoratable member shapes
//! - [`PropertyKey`]: literal keys handed to member decorators
//! - [`Descriptor`]: property descriptors synthesized by the desugaring
//! - [`DecoratedObjectLit`]: object literals whose members carry decorators

pub use swc_ecma_ast::*;

use serde::{Deserialize, Serialize};

mod descriptor;
mod member;
mod object;

pub use descriptor::{Descriptor, DescriptorShape};
pub use member::{MemberFlags, MemberKind, PropertyKey};
pub use object::{DecoratedObjectLit, DecoratedProp, OBJECT_DECORATORS_MARKER};

/// Feature flags controlling which decorator positions are accepted.
///
/// Class and class-member decorators are always parsed (SWC supports them
/// natively). Object literal members need the text-level preprocessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoratorSyntax {
    /// Accept `@dec` on object literal members.
    pub object_members: bool,
}

impl Default for DecoratorSyntax {
    fn default() -> Self {
        Self {
            object_members: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_default_enables_object_members() {
        assert!(DecoratorSyntax::default().object_members);
    }

    #[test]
    fn syntax_missing_fields_use_defaults() {
        let syntax: DecoratorSyntax = deserialize_empty();
        assert_eq!(syntax, DecoratorSyntax::default());
    }

    fn deserialize_empty() -> DecoratorSyntax {
        use serde::de::value::{Error, MapDeserializer};
        let empty: Vec<(String, bool)> = Vec::new();
        DecoratorSyntax::deserialize(MapDeserializer::<_, Error>::new(empty.into_iter()))
            .unwrap()
    }
}
