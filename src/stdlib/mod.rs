//! Standard-library modules the bridge can preload.
//!
//! Each module is a small, statically-known Rust type rather than
//! something discovered through reflection (see `bridge.rs` for why).
//! Adding a module means implementing [`StdlibModule`] and registering it
//! in [`lookup_module`].

mod generics;

use crate::error::RuntimeError;
use crate::value::Value;

/// The result a builtin hands back to the call dispatcher, before
/// return-type-based wrapping is applied (see `vm::ops_control`).
pub enum BuiltinOutcome {
    /// The builtin already produced a fully-typed value (e.g. `ReadLine`
    /// knows its own result is a string) — pushed as-is.
    Value(Value),
    /// The builtin produced nothing (e.g. `WriteLine`'s implicit `void`).
    Void,
}

pub type Builtin = fn(&[Value]) -> Result<BuiltinOutcome, RuntimeError>;

/// A host module that can be preloaded into the bridge. `namespaces` is
/// the namespace name(s) a module binds under (defaulting to the module's
/// own registered name when a module declares none); `bindings` is what
/// each namespace actually contributes to the flat qualified-name registry.
pub trait StdlibModule {
    fn namespaces(&self) -> Vec<String>;
    fn bindings(&self, namespace: &str) -> Vec<(String, Builtin)>;
}

/// Resolves a preload name (e.g. `"Generics"`) to its compiled-in
/// implementation. Returns `None` for anything the binary was not built
/// with knowledge of — the caller turns that into a load-failure
/// diagnostic rather than a hard error.
pub fn lookup_module(name: &str) -> Option<Box<dyn StdlibModule>> {
    match name {
        "Generics" => Some(Box::new(generics::GenericsModule)),
        _ => None,
    }
}
