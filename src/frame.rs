//! The per-invocation activation record: operand stack, locals, arguments,
//! program counter, and return slot. A frame is created at call entry and
//! discarded at return; it never outlives the single `execute_method` call
//! that owns it.

use std::collections::HashMap;

use crate::error::RuntimeError;
use crate::value::Value;

pub struct ExecutionFrame {
    method_name: String,
    stack: Vec<Value>,
    locals: HashMap<String, Value>,
    args: HashMap<String, Value>,
    pub return_value: Option<Value>,
    pub pc: usize,
}

impl ExecutionFrame {
    pub fn new(method_name: impl Into<String>) -> Self {
        Self::with_args(method_name, HashMap::new())
    }

    pub fn with_args(method_name: impl Into<String>, args: HashMap<String, Value>) -> Self {
        ExecutionFrame {
            method_name: method_name.into(),
            stack: Vec::new(),
            locals: HashMap::new(),
            args,
            return_value: None,
            pc: 0,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::StackUnderflow(self.method_name.clone()))
    }

    pub fn peek(&self) -> Result<&Value, RuntimeError> {
        self.stack
            .last()
            .ok_or_else(|| RuntimeError::StackUnderflow(self.method_name.clone()))
    }

    pub fn stack_is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn set_local(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    pub fn get_local(&self, name: &str) -> Result<Value, RuntimeError> {
        self.locals
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedLocal(name.to_string()))
    }

    pub fn set_arg(&mut self, name: impl Into<String>, value: Value) {
        self.args.insert(name.into(), value);
    }

    pub fn get_arg(&self, name: &str) -> Result<Value, RuntimeError> {
        self.args
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedArgument(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_on_empty_stack_errors_with_method_name() {
        let mut frame = ExecutionFrame::new("DoThing");
        assert_eq!(frame.pop(), Err(RuntimeError::StackUnderflow("DoThing".to_string())));
    }

    #[test]
    fn locals_round_trip() {
        let mut frame = ExecutionFrame::new("M");
        frame.set_local("i", Value::int32(7));
        assert_eq!(frame.get_local("i"), Ok(Value::int32(7)));
        assert_eq!(
            frame.get_local("missing"),
            Err(RuntimeError::UndefinedLocal("missing".to_string()))
        );
    }

    #[test]
    fn args_are_settable_and_readable() {
        let mut frame = ExecutionFrame::new("M");
        assert_eq!(
            frame.get_arg("arg1"),
            Err(RuntimeError::UndefinedArgument("arg1".to_string()))
        );
        frame.set_arg("arg1", Value::int32(42));
        assert_eq!(frame.get_arg("arg1"), Ok(Value::int32(42)));
    }

    #[test]
    fn dup_like_peek_does_not_consume() {
        let mut frame = ExecutionFrame::new("M");
        frame.push(Value::int32(1));
        assert_eq!(frame.peek(), Ok(&Value::int32(1)));
        assert_eq!(frame.stack_len(), 1);
    }
}
