//! ObjectIR: a stack-based virtual machine for a line-oriented, brace-
//! delimited textual intermediate representation.
//!
//! The crate is organized the way the engine itself is laid out: [`parser`]
//! turns source text into a flat table of method instruction lists,
//! [`frame`] holds one method invocation's operand stack and locals,
//! [`vm`] dispatches opcodes and drives `if`/`while`/`break`/`continue`
//! control flow, [`bridge`] resolves `call`/`callvirt` targets against a
//! small compiled-in standard library ([`stdlib`]), and [`error`] splits
//! runtime conditions into fatal errors and non-fatal diagnostics.
//!
//! [`Runtime`] ties these together into the embedding surface: parse a
//! file or string, invoke a method by name, and read back captured
//! console output and accumulated diagnostics.

pub mod bridge;
pub mod error;
pub mod frame;
pub mod parser;
pub mod stdlib;
pub mod value;
pub mod vm;

use std::collections::HashMap;
use std::io;
use std::path::Path;

use bridge::Bridge;
use error::{Diagnostic, RuntimeError};
use frame::ExecutionFrame;
use parser::{ClassDef, ModuleDef, Program};
use value::Value;
use vm::Executor;

/// Standard-library modules preloaded when a [`Runtime`] is built via
/// [`Runtime::parse`] or [`Runtime::parse_file`]. Callers needing a
/// different set should go through [`Runtime::with_modules`] instead.
pub const DEFAULT_MODULES: &[&str] = &["Generics"];

/// The embeddable facade over a parsed program: ingest IR, invoke methods
/// by name, and read back console output and diagnostics. Parsing never
/// fails to produce a `Runtime` — malformed input just yields a program
/// with fewer recognized methods (see [`parser`]).
pub struct Runtime {
    program: Program,
    bridge: Bridge,
    executor: Executor,
}

impl Runtime {
    /// Parses `path` and preloads the default module set.
    pub fn parse_file(path: impl AsRef<Path>) -> io::Result<Runtime> {
        let program = Program::parse_file(path)?;
        Ok(Runtime::from_program(program, DEFAULT_MODULES))
    }

    /// Parses `text` and preloads the default module set.
    pub fn parse(text: &str) -> Runtime {
        Runtime::from_program(Program::parse(text), DEFAULT_MODULES)
    }

    /// Parses `path` with an explicit set of standard-library modules,
    /// in place of the default `["Generics"]`.
    pub fn with_modules(path: impl AsRef<Path>, modules: &[&str]) -> io::Result<Runtime> {
        let program = Program::parse_file(path)?;
        Ok(Runtime::from_program(program, modules))
    }

    fn from_program(program: Program, modules: &[&str]) -> Runtime {
        let bridge = Bridge::new(modules);
        Runtime {
            program,
            bridge,
            executor: Executor::new(),
        }
    }

    /// Invokes `method` by its unqualified name with the given arguments.
    /// Returns the method's return value, or `None` if `ret` never pushed
    /// one (or the method never reaches a `ret` with a non-empty stack).
    pub fn execute_method(
        &mut self,
        method: &str,
        args: HashMap<String, Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        let instructions = self
            .program
            .methods
            .get(method)
            .ok_or_else(|| RuntimeError::MethodNotFound(method.to_string()))?
            .clone();

        let mut frame = ExecutionFrame::with_args(method, args);
        self.executor.execute(&instructions, &mut frame, &self.bridge)?;
        Ok(frame.return_value)
    }

    /// Captured `WriteLine` output across every `execute_method` call made
    /// so far on this `Runtime`, newline-joined.
    pub fn get_output(&self) -> String {
        self.executor.console_output()
    }

    /// Non-fatal conditions accumulated so far: module load failures from
    /// construction, plus unresolved calls, unknown opcodes, and misused
    /// `break`/`continue` from every `execute_method` call.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.bridge.diagnostics().to_vec();
        all.extend(self.executor.diagnostics().iter().cloned());
        all
    }

    /// The parsed top-level modules.
    pub fn modules(&self) -> &HashMap<String, ModuleDef> {
        &self.program.modules
    }

    /// The parsed top-level classes.
    pub fn classes(&self) -> &HashMap<String, ClassDef> {
        &self.program.classes
    }

    /// The flat table of method name to instruction list, regardless of
    /// which module or class the method was textually declared under.
    pub fn methods(&self) -> &HashMap<String, Vec<String>> {
        &self.program.methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_method_runs_hello_world() {
        let mut runtime = Runtime::parse(
            r#"
method Main() -> void {
    ldstr "Hello"
    call System.Console.WriteLine(string) -> void
    ret
}
"#,
        );
        let result = runtime.execute_method("Main", HashMap::new()).unwrap();
        assert_eq!(result, None);
        assert_eq!(runtime.get_output(), "Hello");
    }

    #[test]
    fn execute_method_on_unknown_name_is_method_not_found() {
        let mut runtime = Runtime::parse("method Main() -> void {\n    ret\n}\n");
        let err = runtime.execute_method("Missing", HashMap::new()).unwrap_err();
        assert_eq!(err, RuntimeError::MethodNotFound("Missing".to_string()));
    }

    #[test]
    fn diagnostics_combine_bridge_and_executor() {
        let mut runtime = Runtime::parse(
            r#"
method Main() -> void {
    ldstr "x"
    call System.Console.Beep(string) -> void
    ret
}
"#,
        );
        runtime.execute_method("Main", HashMap::new()).unwrap();
        assert_eq!(runtime.diagnostics().len(), 1);
    }
}
