mod common;

use common::parse_clean;
use nasm_syntax::NodeKind;

#[test]
fn effective_address_with_scaled_index() {
    let parse = parse_clean("mov eax, [rbx + rcx*4 + 8]\n");
    let tree = &parse.tree;

    assert!(tree.find(NodeKind::MemoryRef).is_some());
    assert!(tree.find(NodeKind::EffectiveAddr).is_some());
    let ea = tree.find(NodeKind::EaExpr).expect("no ea expression");
    assert_eq!(tree.find_all(NodeKind::EaTerm).len(), 3);
    assert_eq!(tree.node_text(ea), "rbx + rcx*4 + 8");
    let scale = tree.find(NodeKind::Scale).expect("no scale node");
    assert_eq!(tree.node_text(scale), "4");
}

#[test]
fn segment_override_inside_brackets() {
    let parse = parse_clean("mov ax, [es:di + 4]\n");
    let tree = &parse.tree;

    assert!(tree.find(NodeKind::SegmentReg).is_some());
    assert!(tree.find(NodeKind::EffectiveAddr).is_some());
}

#[test]
fn segment_override_before_brackets() {
    let parse = parse_clean("mov eax, fs:[base]\n");
    let tree = &parse.tree;

    assert!(tree.find(NodeKind::SegmentOverride).is_some());
    assert!(tree.find(NodeKind::MemoryRef).is_some());
}

#[test]
fn size_override_before_memory_reference() {
    let parse = parse_clean("mov byte [buf], 5\n");
    let tree = &parse.tree;

    let mem = tree.find(NodeKind::MemoryExpr).expect("no memory expr");
    assert_eq!(tree.node_text(mem).trim(), "byte [buf]");
}

#[test]
fn rip_relative_term() {
    let parse = parse_clean("lea rax, [rel msg]\n");
    let tree = &parse.tree;

    let term = tree.find(NodeKind::EaTerm).expect("no ea term");
    assert_eq!(tree.node_text(term), "rel msg");
}

#[test]
fn sized_immediate_operand() {
    let parse = parse_clean("push word 16\n");
    let tree = &parse.tree;

    let operand = tree.find(NodeKind::ExpandedOperand).expect("no operand body");
    assert_eq!(tree.node_text(operand).trim(), "word 16");
}

#[test]
fn far_jump_pair() {
    let parse = parse_clean("jmp 0x08:entry\n");
    let tree = &parse.tree;

    let operand = tree.find(NodeKind::Operand).expect("no operand");
    assert_eq!(tree.node_text(operand).trim(), "0x08:entry");
}

#[test]
fn mask_and_zeroing_decorators() {
    let parse = parse_clean("vaddps zmm1 {k1}{z}, zmm2, zmm3\n");
    let tree = &parse.tree;

    assert_eq!(tree.find_all(NodeKind::Decorator).len(), 2);
    assert_eq!(tree.find_all(NodeKind::DecoratorItem).len(), 2);
    assert_eq!(tree.find_all(NodeKind::Operand).len(), 3);
}

#[test]
fn rounding_and_broadcast_decorators() {
    let parse = parse_clean("vdivps zmm4 {rn-sae}, zmm5, [rbx] {1to16}\n");
    let tree = &parse.tree;

    let items = tree.find_all(NodeKind::DecoratorItem);
    assert_eq!(items.len(), 2);
    assert_eq!(tree.node_text(items[0]), "rn-sae");
    assert_eq!(tree.node_text(items[1]), "1to16");
}

#[test]
fn decorator_without_base_operand() {
    let parse = parse_clean("kshift {z}\n");
    let tree = &parse.tree;

    let operand = tree.find(NodeKind::Operand).expect("no operand");
    assert!(tree.find(NodeKind::Decorator).is_some());
    assert!(tree.find(NodeKind::ExpandedOperand).is_none());
    assert_eq!(tree.node_text(operand).trim(), "{z}");
}

#[test]
fn conditional_operand_selects_per_branch() {
    let source = "add eax, %if 1\n5\n%else\n6\n%endif\n";
    let parse = parse_clean(source);
    let tree = &parse.tree;

    assert!(tree.find(NodeKind::ConditionalOperand).is_some());
    assert!(tree.find(NodeKind::Condition).is_some());
}

#[test]
fn conditional_data_item() {
    let source = "db %if 2\n1\n%else\n2\n%endif\n";
    let parse = parse_clean(source);
    let tree = &parse.tree;

    assert!(tree.find(NodeKind::ConditionalData).is_some());
    assert!(tree.find(NodeKind::ConditionalBlock).is_none());
}

#[test]
fn instruction_prefixes_ride_on_the_instruction() {
    let parse = parse_clean("lock add [counter], 1\nrep movsb\n");
    let tree = &parse.tree;

    let instructions = tree.find_all(NodeKind::Instruction);
    assert_eq!(instructions.len(), 2);
    assert!(tree.node_text(instructions[0]).trim().starts_with("lock"));
    assert!(tree.node_text(instructions[1]).trim().starts_with("rep"));
}

#[test]
fn data_duplication_with_dup() {
    let parse = parse_clean("table dw 4 dup (0, 1)\n");
    let tree = &parse.tree;

    assert!(tree.find(NodeKind::DataDef).is_some());
    // the dup body is a nested data list
    assert_eq!(tree.find_all(NodeKind::DataList).len(), 2);
}

#[test]
fn uninitialized_data_item() {
    let parse = parse_clean("dd ?, 1\n");
    let tree = &parse.tree;

    let items = tree.find_all(NodeKind::DataItem);
    assert_eq!(items.len(), 2);
    assert_eq!(tree.node_text(items[0]).trim(), "?");
}
