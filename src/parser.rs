//! Text parser: turns ObjectIR source into a [`Program`] of modules,
//! classes, and a flat table of method instruction lists.
//!
//! The parser is deliberately line-oriented and lenient — it does not
//! reject unknown opcodes, malformed headers, or unbalanced braces, it
//! simply fails to recognize them downstream. Structure (module/class
//! nesting, `if`/`else` sub-blocks) is recovered by tracking brace
//! balance rather than by building a real parse tree; every recognized
//! line, including the ones inside an `if`/`else` block, ends up as a
//! flat entry in the owning method's instruction list, preserving
//! textual block structure as visible tokens for the executor's own
//! brace scanner (see `vm::ops_control::scan_matching_brace`).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^class\s+(\w+)\s*\{").unwrap())
}

fn method_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^method\s+(\w+)\s*\((.*?)\)\s*->\s*(\w+(?:\.\w+)*)\s*\{").unwrap())
}

/// A parsed class. `methods` always stays empty after parsing: every
/// method body, wherever it textually appears, lands in the flat
/// top-level `methods` table on [`Program`] instead — classes exist in
/// the grammar but this parser never builds per-class method tables.
#[derive(Default, Debug, Clone)]
pub struct ClassDef {
    pub methods: HashMap<String, Vec<String>>,
}

/// A parsed module: the classes declared while it was the current module.
#[derive(Default, Debug, Clone)]
pub struct ModuleDef {
    pub classes: HashMap<String, ClassDef>,
}

/// The result of parsing one ObjectIR source file.
#[derive(Default, Debug, Clone)]
pub struct Program {
    pub modules: HashMap<String, ModuleDef>,
    pub classes: HashMap<String, ClassDef>,
    pub methods: HashMap<String, Vec<String>>,
}

impl Program {
    pub fn parse_file(path: impl AsRef<Path>) -> io::Result<Program> {
        let content = fs::read_to_string(path)?;
        Ok(Program::parse(&content))
    }

    pub fn parse(content: &str) -> Program {
        let trimmed = content.trim();
        let lines: Vec<&str> = trimmed.split('\n').collect();

        let mut program = Program::default();
        let mut current_module: Option<String> = None;

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i].trim();
            i += 1;

            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if let Some(rest) = line.strip_prefix("module ") {
                let name = rest.trim().to_string();
                program.modules.insert(name.clone(), ModuleDef::default());
                current_module = Some(name);
                continue;
            }

            if line.starts_with("class ") {
                if let Some(caps) = class_re().captures(line) {
                    let class_name = caps[1].to_string();
                    program.classes.insert(class_name.clone(), ClassDef::default());
                    if let Some(module_name) = &current_module {
                        if let Some(module_def) = program.modules.get_mut(module_name) {
                            module_def
                                .classes
                                .insert(class_name.clone(), ClassDef::default());
                        }
                    }
                }
                continue;
            }

            if line.starts_with("method ") {
                if let Some(caps) = method_re().captures(line) {
                    let method_name = caps[1].to_string();
                    program.methods.insert(method_name.clone(), Vec::new());
                    i = parse_method_body(&lines, i, &method_name, &mut program.methods);
                }
                continue;
            }
        }

        program
    }
}

fn brace_delta(line: &str) -> i32 {
    line.matches('{').count() as i32 - line.matches('}').count() as i32
}

/// Consumes lines from `start_idx` until the method's brace balance
/// (starting at 1, since the header's own `{` already opened the body)
/// returns to 0. Returns the index of the line after the terminator.
fn parse_method_body(
    lines: &[&str],
    start_idx: usize,
    method_name: &str,
    methods: &mut HashMap<String, Vec<String>>,
) -> usize {
    let mut instructions = Vec::new();
    let mut brace_count: i32 = 1;
    let mut i = start_idx;

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;

        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        brace_count += brace_delta(line);

        if brace_count == 0 {
            methods.insert(method_name.to_string(), instructions);
            return i;
        }

        if brace_count > 0 {
            if line.starts_with("if ") {
                let (if_block, next_index) = parse_if_statement(lines, i - 1);
                instructions.extend(if_block);
                i = next_index;
            } else {
                instructions.push(line.to_string());
            }
        }
    }

    methods.insert(method_name.to_string(), instructions);
    lines.len()
}

/// Accumulates an `if` header, its body, the closing `}`, and any
/// attached `else { }` block as flat entries in the same instruction
/// list. A nested `if`/`while` inside the body is not specially
/// recursed into here — its own braces simply contribute to the running
/// balance, and it is recorded as plain lines like everything else.
fn parse_if_statement(lines: &[&str], start_idx: usize) -> (Vec<String>, usize) {
    let mut if_block = Vec::new();
    let mut i = start_idx;
    let mut brace_count: i32 = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;

        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        if line.starts_with("if ") {
            if_block.push(line.to_string());
            if line.contains('{') {
                brace_count = brace_delta(line);
            }
            continue;
        }

        brace_count += brace_delta(line);
        if_block.push(line.to_string());

        if brace_count == 0 && line.contains('}') {
            if i < lines.len() && lines[i].trim().starts_with("else") {
                let else_line = lines[i].trim().to_string();
                i += 1;
                if_block.push(else_line.clone());

                if else_line.contains('{') {
                    let mut else_brace_count = brace_delta(&else_line);
                    while i < lines.len() && else_brace_count > 0 {
                        let else_body_line = lines[i].trim();
                        i += 1;
                        if else_body_line.is_empty() || else_body_line.starts_with("//") {
                            continue;
                        }
                        if_block.push(else_body_line.to_string());
                        else_brace_count += brace_delta(else_body_line);
                    }
                }
            }
            break;
        }
    }

    (if_block, i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_class_and_method() {
        let source = r#"
module Demo
class Program {
}
method Main() -> void {
    ldstr "hi"
    call System.Console.WriteLine(string) -> void
    ret
}
"#;
        let program = Program::parse(source);
        assert!(program.modules.contains_key("Demo"));
        assert!(program.classes.contains_key("Program"));
        let main = program.methods.get("Main").expect("Main method parsed");
        assert_eq!(
            main,
            &vec![
                "ldstr \"hi\"".to_string(),
                "call System.Console.WriteLine(string) -> void".to_string(),
                "ret".to_string(),
            ]
        );
    }

    #[test]
    fn nested_classes_never_carry_their_own_methods() {
        let source = r#"
class Program {
}
method Main() -> void {
    ret
}
"#;
        let program = Program::parse(source);
        let class = program.classes.get("Program").unwrap();
        assert!(class.methods.is_empty());
        assert!(program.methods.contains_key("Main"));
    }

    #[test]
    fn if_else_block_is_flattened_with_terminators_preserved() {
        let source = r#"
method Main() -> void {
    ldc.i4 1
    ldc.i4 2
    ceq
    if (stack) {
        ldstr "True"
        call System.Console.WriteLine(string) -> void
    } else {
        ldstr "False"
        call System.Console.WriteLine(string) -> void
    }
    ldstr "Done"
    call System.Console.WriteLine(string) -> void
    ret
}
"#;
        let program = Program::parse(source);
        let main = program.methods.get("Main").unwrap();
        assert!(main.contains(&"if (stack) {".to_string()));
        assert!(main.contains(&"} else {".to_string()));
        assert_eq!(main.last().unwrap(), "ret");
    }

    #[test]
    fn comments_and_blank_lines_are_dropped() {
        let source = r#"
method Main() -> void {
    // a comment
    nop

    ret
}
"#;
        let program = Program::parse(source);
        let main = program.methods.get("Main").unwrap();
        assert_eq!(main, &vec!["nop".to_string(), "ret".to_string()]);
    }
}
