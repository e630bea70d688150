//! Standard-Library Bridge. Loads a small, statically-known set of host
//! modules and flattens their namespace bindings into one qualified-name
//! lookup table.
//!
//! Resolving `call` targets through runtime reflection (importing a
//! module by name, reading its declared namespaces, then walking
//! `.`-separated attribute access) needs a dynamic runtime this crate
//! doesn't have, so the bridge uses an explicit registry instead:
//! [`crate::stdlib::lookup_module`] maps a configured module name to a
//! compiled-in [`crate::stdlib::StdlibModule`], and each module hands back
//! its fully-qualified bindings directly rather than making the bridge
//! walk attributes to find them. A name with no compiled-in implementation
//! becomes a diagnostic rather than a fatal error — a missing module
//! shouldn't take down the whole program.

use std::collections::HashMap;

use crate::error::Diagnostic;
use crate::stdlib::{lookup_module, Builtin};

/// Resolves `call`/`callvirt` targets against a preloaded set of host
/// modules. Construction never fails; modules that don't exist simply
/// leave a `Diagnostic::ModuleLoadFailed` behind for the embedder.
pub struct Bridge {
    table: HashMap<String, Builtin>,
    diagnostics: Vec<Diagnostic>,
}

impl Bridge {
    /// Attempts to load each named module in order; failures are recorded,
    /// not raised. Later modules may overwrite earlier ones' bindings for
    /// the same qualified name (last loaded wins).
    pub fn new(module_names: &[&str]) -> Bridge {
        let mut table = HashMap::new();
        let mut diagnostics = Vec::new();

        for &name in module_names {
            match lookup_module(name) {
                Some(module) => {
                    for namespace in module.namespaces() {
                        for (qualified_name, builtin) in module.bindings(&namespace) {
                            table.insert(qualified_name, builtin);
                        }
                    }
                }
                None => diagnostics.push(Diagnostic::ModuleLoadFailed(name.to_string())),
            }
        }

        Bridge { table, diagnostics }
    }

    /// Resolves a fully-qualified call target (e.g. `System.Console.WriteLine`).
    /// Returns `None` if no loaded module contributed that name — the caller
    /// turns that into an unresolved-call diagnostic.
    pub fn resolve(&self, qualified_name: &str) -> Option<Builtin> {
        self.table.get(qualified_name).copied()
    }

    /// Diagnostics recorded while loading modules (construction time only).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_module_resolves_console_write_line() {
        let bridge = Bridge::new(&["Generics"]);
        assert!(bridge.resolve("System.Console.WriteLine").is_some());
        assert!(bridge.resolve("System.Console.ReadLine").is_some());
        assert!(bridge.diagnostics().is_empty());
    }

    #[test]
    fn unknown_module_is_a_diagnostic_not_a_panic() {
        let bridge = Bridge::new(&["NoSuchModule"]);
        assert_eq!(
            bridge.diagnostics(),
            &[Diagnostic::ModuleLoadFailed("NoSuchModule".to_string())]
        );
    }

    #[test]
    fn unresolved_name_is_none() {
        let bridge = Bridge::new(&["Generics"]);
        assert!(bridge.resolve("System.Console.Beep").is_none());
    }
}
