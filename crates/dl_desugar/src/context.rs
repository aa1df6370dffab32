//! Per-unit state threaded through every rewrite: temporary names, the
//! scopes they get declared in, and collected errors.

use std::collections::{HashMap, HashSet};

use swc_common::DUMMY_SP;
use swc_ecma_ast::{Ident, Module};
use swc_ecma_visit::{Visit, VisitWith};

use crate::error::DecoratorError;

/// Issues collision-free temporary identifiers for one compilation unit.
///
/// Every identifier already present in the unit is reserved up front, so a
/// temporary can never shadow or be shadowed by user code.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl NameAllocator {
    pub fn from_module(module: &Module) -> Self {
        let mut collector = IdentCollector::default();
        module.visit_with(&mut collector);
        Self {
            taken: collector.names,
            counters: HashMap::new(),
        }
    }

    /// `_hint`, then `_hint2`, `_hint3`, … skipping taken names.
    pub fn allocate(&mut self, hint: &str) -> Ident {
        let counter = self.counters.entry(hint.to_string()).or_insert(0);
        let name = loop {
            *counter += 1;
            let candidate = if *counter == 1 {
                format!("_{hint}")
            } else {
                format!("_{hint}{counter}")
            };
            if !self.taken.contains(&candidate) {
                break candidate;
            }
        };
        self.taken.insert(name.clone());
        Ident::new_no_ctxt(name.into(), DUMMY_SP)
    }
}

#[derive(Default)]
struct IdentCollector {
    names: HashSet<String>,
}

impl Visit for IdentCollector {
    fn visit_ident(&mut self, ident: &Ident) {
        self.names.insert(ident.sym.to_string());
    }
}

/// Rewrite state for one unit.
pub struct DesugarContext {
    names: NameAllocator,
    /// Temporaries awaiting a `var` declaration, one frame per open scope.
    frames: Vec<Vec<Ident>>,
    errors: Vec<DecoratorError>,
}

impl DesugarContext {
    pub fn new(names: NameAllocator) -> Self {
        Self {
            names,
            frames: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Allocate a temporary and declare it in the innermost open scope.
    pub(crate) fn temp(&mut self, hint: &str) -> Ident {
        let id = self.names.allocate(hint);
        tracing::trace!(name = %id.sym, "allocated temporary");
        if let Some(frame) = self.frames.last_mut() {
            frame.push(id.clone());
        }
        id
    }

    /// Allocate a name that the caller declares itself.
    pub(crate) fn fresh_name(&mut self, hint: &str) -> Ident {
        self.names.allocate(hint)
    }

    pub(crate) fn enter_scope(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Close the innermost scope, returning the temporaries it must declare.
    pub(crate) fn exit_scope(&mut self) -> Vec<Ident> {
        self.frames.pop().unwrap_or_default()
    }

    pub(crate) fn report(&mut self, error: DecoratorError) {
        tracing::warn!(member = %error.member, "{}", error.kind);
        self.errors.push(error);
    }

    pub(crate) fn take_errors(&mut self) -> Vec<DecoratorError> {
        std::mem::take(&mut self.errors)
    }
}
