//! Transform-time errors for decorator uses that have no legacy desugaring.

use swc_common::{errors::Handler, Span};
use thiserror::Error;

/// Why a decorated construct cannot be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unsupported {
    #[error("decorators on static class properties are not supported")]
    StaticClassProperty,
    #[error("decorators on computed member keys are not supported")]
    ComputedKey,
    #[error("decorators on private members are not supported")]
    PrivateMember,
    #[error("decorators on auto-accessors are not supported")]
    AutoAccessor,
    #[error("decorators on class fields whose initializer uses {0} are not supported")]
    ClassScopedInitializer(&'static str),
    #[error("parameter decorators are not supported")]
    Parameter,
    #[error("decorators on {0} are not supported")]
    Member(&'static str),
    #[error("decorators must be followed by an object member")]
    Dangling,
}

/// One rejected decorator use, naming the offending member.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: `{member}`")]
pub struct DecoratorError {
    pub kind: Unsupported,
    pub member: String,
    pub span: Span,
}

impl DecoratorError {
    pub fn new(kind: Unsupported, member: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            member: member.into(),
            span,
        }
    }

    /// Report through the SWC diagnostics sink, pointing at the source.
    pub fn emit(&self, handler: &Handler) {
        handler.struct_span_err(self.span, &self.to_string()).emit();
    }
}

/// The unit was rejected; no output is produced for it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} unsupported decorator use(s), first: {}", .errors.len(), .errors[0])]
pub struct DesugarError {
    pub errors: Vec<DecoratorError>,
}

impl DesugarError {
    pub fn emit(&self, handler: &Handler) {
        for error in &self.errors {
            error.emit(handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::DUMMY_SP;

    #[test]
    fn message_names_feature_and_member() {
        let err = DecoratorError::new(Unsupported::StaticClassProperty, "x", DUMMY_SP);
        assert_eq!(
            err.to_string(),
            "decorators on static class properties are not supported: `x`"
        );
    }

    #[test]
    fn unit_error_reports_count() {
        let err = DesugarError {
            errors: vec![
                DecoratorError::new(Unsupported::ComputedKey, "[computed]", DUMMY_SP),
                DecoratorError::new(Unsupported::Member("spread elements"), "...rest", DUMMY_SP),
            ],
        };
        assert!(err.to_string().starts_with("2 unsupported decorator use(s)"));
    }
}
