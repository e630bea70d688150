//! # Instruction Executor
//!
//! This module is the opcode dispatcher and structured control-flow
//! driver: it walks a parsed method's flat instruction list with a
//! program counter held on the [`ExecutionFrame`], executing loads,
//! stores, arithmetic, comparisons, `call`/`callvirt` dispatch through the
//! [`Bridge`], and the `if`/`while`/`else`/`break`/`continue` control-flow
//! forms recognized by their textual shape rather than by a pre-lowered
//! jump table (see `vm::ops_control`).
//!
//! Two accumulators live on the `Executor` across the lifetime of a
//! `Runtime`, rather than on the frame, since they are meant to survive
//! past any single `execute_method` call: `console_output` (the
//! `WriteLine` side channel) and `diagnostics` (non-fatal conditions) —
//! the engine never prints either itself; both are read back through
//! accessors by the embedder.

use crate::bridge::Bridge;
use crate::error::{Diagnostic, RuntimeError};
use crate::frame::ExecutionFrame;
use crate::value::{Value, ValueType};

mod ops_arith;
mod ops_control;

#[cfg(test)]
mod tests;

/// Strips a trailing `// ...` comment from an instruction line. Used both
/// by the brace scanner and by plain-line dispatch, since comments are
/// only ever removed at execution time (the parser keeps them verbatim).
pub(crate) fn strip_inline_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn quoted_re() -> &'static regex::Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new("\"([^\"]*)\"").unwrap())
}

/// Extracts the first double-quoted substring in `text` (no escape
/// processing — the first matching pair wins).
fn first_quoted(text: &str) -> Option<&str> {
    quoted_re().captures(text).map(|caps| caps.get(1).unwrap().as_str())
}

/// Opcode dispatch plus the control-flow driver over one method's
/// instruction list. Owns the two accumulators meant to survive past a
/// single frame: console output and diagnostics.
#[derive(Default)]
pub struct Executor {
    console_output: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Executor {
    pub fn new() -> Self {
        Executor::default()
    }

    /// Captured `WriteLine` output, newline-joined.
    pub fn console_output(&self) -> String {
        self.console_output.join("\n")
    }

    /// Non-fatal conditions accumulated so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Folds externally-sourced diagnostics (e.g. the bridge's module-load
    /// failures) into this executor's list, preserving emission order.
    pub fn extend_diagnostics(&mut self, extra: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(extra);
    }

    /// Runs `instructions` against `frame` to completion: either `pc` runs
    /// off the end, or `frame.return_value` becomes set (`ret` with a
    /// non-empty stack). Fatal conditions abort immediately and
    /// unwind the current invocation; non-fatal ones are recorded and
    /// execution continues.
    pub fn execute(
        &mut self,
        instructions: &[String],
        frame: &mut ExecutionFrame,
        bridge: &Bridge,
    ) -> Result<(), RuntimeError> {
        let mut loop_stack: Vec<ops_control::LoopFrame> = Vec::new();

        while frame.pc < instructions.len() && frame.return_value.is_none() {
            let current_pc = frame.pc;
            let line = strip_inline_comment(&instructions[current_pc]).trim().to_string();
            frame.pc += 1;

            if line.is_empty() {
                continue;
            }

            if line.starts_with("if") {
                ops_control::dispatch_if(&line, instructions, frame, current_pc)?;
                continue;
            }
            if line.starts_with("while") {
                ops_control::dispatch_while(&line, instructions, frame, current_pc, &mut loop_stack)?;
                continue;
            }
            // Checked ahead of the bare `}` case below: a combined `} else {`
            // line must route to dispatch_else, not be treated as an inert
            // loop-terminator brace.
            if line.starts_with("else") || line.starts_with("} else") {
                ops_control::dispatch_else(instructions, frame, current_pc);
                continue;
            }
            if line.starts_with('}') {
                ops_control::dispatch_close_brace(frame, current_pc, &mut loop_stack);
                continue;
            }
            if line == "break" {
                ops_control::dispatch_break(frame, &mut loop_stack, &mut self.diagnostics);
                continue;
            }
            if line == "continue" {
                ops_control::dispatch_continue(frame, &loop_stack, &mut self.diagnostics);
                continue;
            }
            if line.starts_with("call") {
                ops_control::dispatch_call(&line, frame, bridge, &mut self.console_output, &mut self.diagnostics)?;
                continue;
            }

            self.dispatch_opcode(&line, frame)?;
        }

        Ok(())
    }

    /// The flat opcode table — everything not already intercepted as a
    /// control-flow form or a `call`/`callvirt`.
    fn dispatch_opcode(&mut self, line: &str, frame: &mut ExecutionFrame) -> Result<(), RuntimeError> {
        let mut parts = line.splitn(2, char::is_whitespace);
        let opcode = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("");

        match opcode {
            "ldstr" => match first_quoted(rest) {
                Some(s) => frame.push(Value::string(s)),
                None => self.diagnostics.push(Diagnostic::UnknownOpcode(line.to_string())),
            },
            "ldc.i4" => {
                let text = rest.trim();
                let v: i32 = text.parse().map_err(|_| RuntimeError::MalformedOperand(text.to_string()))?;
                frame.push(Value::int32(v));
            }
            "ldc.i8" => {
                let text = rest.trim();
                let v: i64 = text.parse().map_err(|_| RuntimeError::MalformedOperand(text.to_string()))?;
                frame.push(Value::int64(v));
            }
            "ldc.r8" => {
                let text = rest.trim();
                let v: f64 = text.parse().map_err(|_| RuntimeError::MalformedOperand(text.to_string()))?;
                frame.push(Value::double(v));
            }
            "ldnull" => frame.push(Value::null_object()),
            "ldc.b.0" => frame.push(Value::bool(false)),
            "ldc.b.1" => frame.push(Value::bool(true)),
            "ldtrue" => frame.push(Value::bool(true)),
            "ldfalse" => frame.push(Value::bool(false)),
            "ldloc" => {
                let v = frame.get_local(rest.trim())?;
                frame.push(v);
            }
            "ldarg" => {
                let v = frame.get_arg(rest.trim())?;
                frame.push(v);
            }
            "ldcon" => self.dispatch_ldcon(rest, frame),
            "stloc" => {
                let v = frame.pop()?;
                frame.set_local(rest.trim(), v);
            }
            "starg" => {
                let v = frame.pop()?;
                frame.set_arg(rest.trim(), v);
            }
            "local" => {
                let mut decl = rest.splitn(2, ':');
                let name = decl.next().unwrap_or("").trim();
                let ty = ValueType::from_type_name(decl.next().unwrap_or("").trim());
                frame.set_local(name, Value::default_for(ty));
            }
            "add" => ops_arith::handle_add(frame)?,
            "sub" => ops_arith::handle_sub(frame)?,
            "mul" => ops_arith::handle_mul(frame)?,
            "div" => ops_arith::handle_div(frame)?,
            "rem" => ops_arith::handle_rem(frame)?,
            "neg" => ops_arith::handle_neg(frame)?,
            "ceq" => ops_arith::handle_ceq(frame)?,
            "cgt" => ops_arith::handle_cgt(frame)?,
            "clt" => ops_arith::handle_clt(frame)?,
            "cge" => ops_arith::handle_cge(frame)?,
            "cle" => ops_arith::handle_cle(frame)?,
            "cne" => ops_arith::handle_cne(frame)?,
            "dup" => {
                let v = frame.peek()?.clone();
                frame.push(v);
            }
            "pop" => {
                frame.pop()?;
            }
            "nop" => {}
            "throw" => {
                let v = frame.pop()?;
                return Err(RuntimeError::Thrown(v.display_string()));
            }
            "ret" => {
                if !frame.stack_is_empty() {
                    let v = frame.pop()?;
                    frame.return_value = Some(v);
                }
            }
            _ => self.diagnostics.push(Diagnostic::UnknownOpcode(line.to_string())),
        }

        Ok(())
    }

    /// `ldcon lit`: a quoted literal is a string; `true`/`false`
    /// (case-insensitive, e.g. `True`/`FALSE`) are bools; a token
    /// containing `.` is a double; an integer-parseable token is an
    /// `Int32`; anything else falls through to `String` with the raw
    /// (not further-trimmed) operand text.
    fn dispatch_ldcon(&mut self, rest: &str, frame: &mut ExecutionFrame) {
        let trimmed = rest.trim();
        if let Some(s) = first_quoted(trimmed) {
            frame.push(Value::string(s));
        } else if trimmed.eq_ignore_ascii_case("true") {
            frame.push(Value::bool(true));
        } else if trimmed.eq_ignore_ascii_case("false") {
            frame.push(Value::bool(false));
        } else if trimmed.contains('.') {
            match trimmed.parse::<f64>() {
                Ok(v) => frame.push(Value::double(v)),
                Err(_) => frame.push(Value::string(rest)),
            }
        } else if let Ok(v) = trimmed.parse::<i32>() {
            frame.push(Value::int32(v));
        } else {
            frame.push(Value::string(rest));
        }
    }
}
