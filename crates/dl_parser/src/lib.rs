//! TypeScript parser with legacy decorators enabled everywhere they may appear.
//!
//! Wraps the standard SWC parser (which already understands class and
//! class-member decorators) and preprocesses source so that decorators on
//! object literal members survive parsing:
//!
//! - `{ @dec key: value }` → `{ __legacy_decorators__: [dec], key: value }`
//!
//! The marker is folded back into a per-member decorator list by
//! `dl_ast::DecoratedObjectLit::lift`.

pub mod parse;
pub mod preprocess;

pub use parse::{parse_decorated, ParseResult};
