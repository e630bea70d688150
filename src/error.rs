//! # Error Handling for the ObjectIR VM
//!
//! This module splits runtime conditions into two channels, matching the
//! severity table the engine is specified against:
//!
//! - [`RuntimeError`] — fatal conditions that unwind the current method
//!   invocation: stack underflow, undefined local/argument, unknown
//!   method, arithmetic type mismatches, malformed numeric literals, and
//!   explicit `throw`.
//! - [`Diagnostic`] — non-fatal conditions the engine records rather than
//!   acting on: a stdlib module that failed to load, a call target that
//!   did not resolve, an opcode nobody recognizes, or a misused
//!   `break`/`continue`. The engine never prints these itself; it
//!   accumulates them for the embedder to inspect.
//!
//! Both implement [`fmt::Display`]; `RuntimeError` additionally implements
//! [`std::error::Error`] so it composes with the rest of the ecosystem.

use std::fmt;

/// Fatal conditions that abort the current method invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Pop/peek on an empty operand stack, within the named method.
    StackUnderflow(String),
    /// Read of an undeclared local variable.
    UndefinedLocal(String),
    /// Read of an undeclared argument.
    UndefinedArgument(String),
    /// `execute_method` was asked for a name with no parsed body.
    MethodNotFound(String),
    /// Arithmetic or comparison attempted on incompatible operand types.
    TypeError(String),
    /// Integer `ldc.i4`/`ldc.i8`/`ldc.r8` operand failed to parse.
    MalformedOperand(String),
    /// Integer `div`/`rem` with a zero divisor.
    ZeroDivisionError,
    /// `throw` was executed; carries the display form of the thrown value.
    Thrown(String),
    /// A host callable (e.g. `ReadLine`) hit an I/O error.
    Io(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::StackUnderflow(method) => {
                write!(f, "Stack underflow in {}", method)
            }
            RuntimeError::UndefinedLocal(name) => {
                write!(f, "Undefined local variable: {}", name)
            }
            RuntimeError::UndefinedArgument(name) => {
                write!(f, "Undefined argument: {}", name)
            }
            RuntimeError::MethodNotFound(name) => {
                write!(f, "Method not found: {}", name)
            }
            RuntimeError::TypeError(msg) => {
                write!(f, "TypeError: {}", msg)
            }
            RuntimeError::MalformedOperand(msg) => {
                write!(f, "Malformed operand: {}", msg)
            }
            RuntimeError::ZeroDivisionError => {
                write!(f, "ZeroDivisionError: integer division or modulo by zero")
            }
            RuntimeError::Thrown(msg) => {
                write!(f, "VM Exception: {}", msg)
            }
            RuntimeError::Io(msg) => {
                write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Non-fatal conditions the engine records but never acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A configured standard-library module name has no known implementation.
    ModuleLoadFailed(String),
    /// A `call`/`callvirt` target did not resolve to anything invokable.
    UnresolvedCall(String),
    /// The dispatcher's default case: an opcode it does not recognize.
    UnknownOpcode(String),
    /// `break` with no enclosing loop.
    MisusedBreak,
    /// `continue` with no enclosing loop.
    MisusedContinue,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ModuleLoadFailed(name) => {
                write!(f, "unable to load standard-library module '{}'", name)
            }
            Diagnostic::UnresolvedCall(name) => {
                write!(f, "unable to resolve call target '{}'", name)
            }
            Diagnostic::UnknownOpcode(op) => {
                write!(f, "unknown opcode '{}'", op)
            }
            Diagnostic::MisusedBreak => write!(f, "break outside of a loop"),
            Diagnostic::MisusedContinue => write!(f, "continue outside of a loop"),
        }
    }
}
