//! The default preloaded module: binds `System.Console.WriteLine` and
//! `System.Console.ReadLine`. Registered by hand rather than discovered
//! through reflection, per the bridge's compiled-in registry design
//! (see `crate::bridge`).

use std::io::{self, BufRead};

use crate::error::RuntimeError;
use crate::value::Value;

use super::{Builtin, BuiltinOutcome, StdlibModule};

pub struct GenericsModule;

impl StdlibModule for GenericsModule {
    fn namespaces(&self) -> Vec<String> {
        vec!["Generics".to_string()]
    }

    fn bindings(&self, _namespace: &str) -> Vec<(String, Builtin)> {
        vec![
            ("System.Console.WriteLine".to_string(), write_line as Builtin),
            ("System.Console.ReadLine".to_string(), read_line as Builtin),
        ]
    }
}

/// Printing to the executor's captured console output is the call
/// dispatcher's job (the WriteLine side channel); the host callable itself
/// has nothing further to contribute.
fn write_line(_args: &[Value]) -> Result<BuiltinOutcome, RuntimeError> {
    Ok(BuiltinOutcome::Void)
}

fn read_line(_args: &[Value]) -> Result<BuiltinOutcome, RuntimeError> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| RuntimeError::Io(e.to_string()))?;
    let trimmed = line.trim_end_matches(['\r', '\n']);
    Ok(BuiltinOutcome::Value(Value::string(trimmed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_default_to_generics() {
        assert_eq!(GenericsModule.namespaces(), vec!["Generics".to_string()]);
    }

    #[test]
    fn bindings_cover_console_write_and_read() {
        let names: Vec<String> = GenericsModule
            .bindings("Generics")
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec![
                "System.Console.WriteLine".to_string(),
                "System.Console.ReadLine".to_string(),
            ]
        );
    }

    #[test]
    fn write_line_produces_no_value_of_its_own() {
        let outcome = write_line(&[Value::string("hi")]).unwrap();
        assert!(matches!(outcome, BuiltinOutcome::Void));
    }
}
