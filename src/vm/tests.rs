//! End-to-end scenario tests driving the full parse → execute path,
//! one per concrete scenario.

use std::collections::HashMap;

use crate::bridge::Bridge;
use crate::frame::ExecutionFrame;
use crate::parser::Program;
use crate::value::Value;

use super::Executor;

fn run(source: &str, method: &str, args: HashMap<String, Value>) -> (Executor, Option<Value>) {
    let program = Program::parse(source);
    let bridge = Bridge::new(&["Generics"]);
    let mut executor = Executor::new();
    let instructions = program.methods.get(method).cloned().unwrap_or_default();
    let mut frame = ExecutionFrame::with_args(method, args);
    executor.execute(&instructions, &mut frame, &bridge).unwrap();
    (executor, frame.return_value)
}

#[test]
fn hello_world() {
    let source = r#"
method Main() -> void {
    ldstr "Hello"
    call System.Console.WriteLine(string) -> void
    ret
}
"#;
    let (executor, _) = run(source, "Main", HashMap::new());
    assert_eq!(executor.console_output(), "Hello");
}

#[test]
fn arithmetic() {
    let source = r#"
method Main() -> int32 {
    ldc.i4 2
    ldc.i4 3
    add
    ret
}
"#;
    let (_, ret) = run(source, "Main", HashMap::new());
    assert_eq!(ret, Some(Value::int32(5)));
}

#[test]
fn ceq_false_branch() {
    let source = r#"
method Main() -> void {
    ldc.i4 1
    ldc.i4 2
    ceq
    if (stack) {
        ldstr "True branch executed (Should not happen)"
        call System.Console.WriteLine(string) -> void
    } else {
        ldstr "False branch executed (Should happen)"
        call System.Console.WriteLine(string) -> void
    }
    ldstr "Done"
    call System.Console.WriteLine(string) -> void
    ret
}
"#;
    let (executor, _) = run(source, "Main", HashMap::new());
    assert_eq!(
        executor.console_output(),
        "False branch executed (Should happen)\nDone"
    );
}

#[test]
fn ceq_true_branch() {
    let source = r#"
method Main() -> void {
    ldc.i4 1
    ldc.i4 1
    ceq
    if (stack) {
        ldstr "True branch executed (Should happen)"
        call System.Console.WriteLine(string) -> void
    } else {
        ldstr "False branch executed (Should not happen)"
        call System.Console.WriteLine(string) -> void
    }
    ldstr "Done"
    call System.Console.WriteLine(string) -> void
    ret
}
"#;
    let (executor, _) = run(source, "Main", HashMap::new());
    assert_eq!(
        executor.console_output(),
        "True branch executed (Should happen)\nDone"
    );
}

#[test]
fn while_loop() {
    let source = r#"
method Main() -> void {
    local i: int32
    ldc.i4 0
    stloc i
    while (i < 3) {
        ldloc i
        call System.Console.WriteLine(int32) -> void
        ldloc i
        ldc.i4 1
        add
        stloc i
    }
    ldstr "Done"
    call System.Console.WriteLine(string) -> void
    ret
}
"#;
    let (executor, _) = run(source, "Main", HashMap::new());
    assert_eq!(executor.console_output(), "0\n1\n2\nDone");
}

#[test]
fn break_and_continue() {
    let source = r#"
method Main() -> void {
    local i: int32
    ldc.i4 1
    stloc i
    while (i < 5) {
        ldloc i
        ldc.i4 2
        ceq
        if (stack) {
            ldstr "Skipping 2"
            call System.Console.WriteLine(string) -> void
            ldloc i
            ldc.i4 1
            add
            stloc i
            continue
        }
        ldloc i
        ldc.i4 4
        ceq
        if (stack) {
            ldstr "Breaking at 4"
            call System.Console.WriteLine(string) -> void
            break
        }
        ldloc i
        call System.Console.WriteLine(int32) -> void
        ldloc i
        ldc.i4 1
        add
        stloc i
    }
    ret
}
"#;
    let (executor, _) = run(source, "Main", HashMap::new());
    assert_eq!(
        executor.console_output(),
        "1\nSkipping 2\n3\nBreaking at 4"
    );
}

#[test]
fn argument_neg_and_cne() {
    let source = r#"
method Main(arg1: int32) -> void {
    ldarg arg1
    call System.Console.WriteLine(int32) -> void
    ldc.i4 5
    neg
    call System.Console.WriteLine(int32) -> void
    ldc.i4 10
    ldc.i4 20
    cne
    if (stack) {
        ldstr "PASS: 10 != 20"
        call System.Console.WriteLine(string) -> void
    }
    ret
}
"#;
    let mut args = HashMap::new();
    args.insert("arg1".to_string(), Value::int32(42));
    let (executor, _) = run(source, "Main", args);
    assert_eq!(executor.console_output(), "42\n-5\nPASS: 10 != 20");
}

#[test]
fn ldcon_bool_literal_is_case_insensitive() {
    let source = r#"
method Main() -> bool {
    ldcon True
    ret
}
"#;
    let (_, ret) = run(source, "Main", HashMap::new());
    assert_eq!(ret, Some(Value::bool(true)));
}

#[test]
fn ret_with_empty_stack_leaves_return_value_unset() {
    let source = r#"
method Main() -> void {
    nop
    ret
}
"#;
    let (_, ret) = run(source, "Main", HashMap::new());
    assert_eq!(ret, None);
}

#[test]
fn unresolved_call_is_a_diagnostic_and_args_are_still_consumed() {
    let source = r#"
method Main() -> void {
    ldstr "x"
    call System.Console.Beep(string) -> void
    ret
}
"#;
    let (executor, _) = run(source, "Main", HashMap::new());
    assert_eq!(executor.console_output(), "");
    assert_eq!(executor.diagnostics().len(), 1);
}

#[test]
fn stack_underflow_carries_the_method_name() {
    let source = r#"
method Oops() -> void {
    pop
}
"#;
    let program = Program::parse(source);
    let bridge = Bridge::new(&["Generics"]);
    let mut executor = Executor::new();
    let instructions = program.methods.get("Oops").cloned().unwrap();
    let mut frame = ExecutionFrame::new("Oops");
    let err = executor.execute(&instructions, &mut frame, &bridge).unwrap_err();
    assert_eq!(err, crate::error::RuntimeError::StackUnderflow("Oops".to_string()));
}
