mod common;

use common::{parse, parse_with, tokenize};
use nasm_syntax::{parse_strict, NodeKind, ParseConfig};

#[test]
fn pinned_rule_reports_one_anchored_error() {
    let source = "absolute\nmov eax, 1\n";
    let result = parse(source);

    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    let diagnostic = &result.errors[0];
    assert_eq!(diagnostic.location.line, 1);
    assert_eq!(diagnostic.location.column, 9, "anchor just past the keyword");

    // the rest of the file still parses as independent lines
    assert!(result.tree.find(NodeKind::AbsoluteDir).is_some());
    assert!(result.tree.find(NodeKind::Instruction).is_some());
    assert_eq!(result.tree.text(), source);
}

#[test]
fn garbage_run_becomes_one_error_node() {
    let source = "mov eax, 1\n) (\nadd ebx, 2\n";
    let result = parse(source);

    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert_eq!(result.tree.find_all(NodeKind::Error).len(), 1);
    assert_eq!(result.tree.find_all(NodeKind::Instruction).len(), 2);
    assert_eq!(result.tree.text(), source);
}

#[test]
fn each_garbage_run_gets_its_own_diagnostic() {
    let source = ") ) )\nnop\n( ( (\n";
    let result = parse(source);

    assert_eq!(result.errors.len(), 2, "{:?}", result.errors);
    assert_eq!(result.tree.find_all(NodeKind::Error).len(), 2);
    assert_eq!(result.tree.find_all(NodeKind::Instruction).len(), 1);
    assert_eq!(result.tree.text(), source);
}

#[test]
fn missing_endmacro_is_reported_not_fatal() {
    let source = "%macro f 0\nnop\n";
    let result = parse(source);

    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert!(result.errors[0].message.contains("%endmacro"));
    assert!(result.tree.find(NodeKind::MultiLineMacro).is_some());
    assert_eq!(result.tree.text(), source);
}

#[test]
fn missing_endif_is_reported_not_fatal() {
    let source = "%if 1\nnop\n";
    let result = parse(source);

    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert!(result.errors[0].message.contains("%endif"));
    assert!(result.tree.find(NodeKind::ConditionalBlock).is_some());
}

#[test]
fn error_inside_conditional_does_not_break_the_block() {
    let source = "%if 1\nabsolute\n%endif\n";
    let result = parse(source);

    assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
    assert!(result.tree.find(NodeKind::ConditionalBlock).is_some());
    assert!(result.tree.find(NodeKind::EndifDir).is_some());
}

#[test]
fn pathological_nesting_degrades_with_a_diagnostic() {
    let depth = 2_000;
    let mut source = String::from("db ");
    for _ in 0..depth {
        source.push('(');
    }
    source.push('1');
    for _ in 0..depth {
        source.push(')');
    }
    source.push('\n');

    let result = parse(&source);
    assert!(
        result.errors.iter().any(|e| e.message.contains("nesting too deep")),
        "{:?}",
        result.errors
    );
    assert_eq!(result.tree.text(), source);
}

#[test]
fn error_count_is_bounded_by_config() {
    let source = "absolute\nabsolute\nabsolute\nabsolute\n";
    let config = ParseConfig::new().with_max_errors(2);
    let result = parse_with(source, &config);

    assert_eq!(result.errors.len(), 2);
    assert_eq!(result.tree.text(), source, "parsing continues past the cap");
}

#[test]
fn lowered_depth_limit_is_honored() {
    let config = ParseConfig::new().with_max_depth(16);
    let result = parse_with("db (((1)))\n", &config);

    assert!(result
        .errors
        .iter()
        .any(|e| e.message.contains("nesting too deep")));
}

#[test]
fn strict_mode_maps_the_first_diagnostic() {
    assert!(parse_strict(tokenize("mov eax, 1\n")).is_ok());

    let err = parse_strict(tokenize("absolute\n")).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("1:9"), "{rendered}");
}
