//! Integration tests for production registration
//!
//! Tests naming, validation errors, priming against existing facts, and the
//! network dump.

use rete_engine::{Condition, Operator, Rete, ReteConfig, Variable};
use rete_foundation::{ErrorKind, Fact};

fn stacked_on_heavy() -> Vec<Condition> {
    vec![
        Condition::new("x", "on-top-of", Variable::new("y")),
        Condition::on("y").attr("weight").gt(10),
    ]
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn named_productions_are_found_by_name() {
    let mut rete = Rete::new();
    rete.production([Condition::on("x").attr("count").gt(0)], |_, _| {})
        .unwrap();
    let id = rete
        .add_production("heavy-stack", stacked_on_heavy(), |_, _| {})
        .unwrap();

    assert_eq!(rete.find_production("heavy-stack"), Some(id));
    assert_eq!(rete.find_production("production_0").map(|p| p.index()), Some(0));
    assert_eq!(rete.find_production("missing"), None);

    let node = rete.production_node(id);
    assert_eq!(node.name(), "heavy-stack");
    assert_eq!(node.conditions(), stacked_on_heavy().as_slice());
    let names: Vec<_> = rete.productions().map(|(_, p)| p.name().to_owned()).collect();
    assert_eq!(names, ["production_0", "heavy-stack"]);
}

#[test]
fn unsupported_operator_is_reported_before_registration() {
    let err = Condition::on("x").attr("count").op("~~", 3).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnsupportedOperator(ref op) if op == "~~"));
}

#[test]
fn variable_with_ordering_operator_is_malformed() {
    let mut rete = Rete::new();
    let err = rete
        .add_production(
            "bad",
            [
                Condition::on("x").attr("count").gt(0),
                Condition::with_operator("x", "on-top-of", Operator::Lt, Variable::new("y")),
            ],
            |_, _| {},
        )
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::MalformedCondition { .. }));
    let context = err.context.unwrap();
    assert_eq!(context.production.as_deref(), Some("bad"));
    assert_eq!(context.condition, Some(1));
    assert_eq!(rete.production_count(), 0);
    assert_eq!(rete.alpha_network().node_count(), 0);
}

#[test]
fn empty_attribute_is_malformed() {
    let mut rete = Rete::new();
    let err = rete
        .production([Condition::on("x").attr("").eq(1)], |_, _| {})
        .unwrap_err();
    assert!(err.to_string().contains("attribute name is empty"));
}

// =============================================================================
// Priming
// =============================================================================

#[test]
fn production_added_after_facts_is_primed() {
    let mut rete = Rete::new();
    rete.add(Fact::new("a", "on-top-of", "b"))
        .add(Fact::new("b", "weight", 11));
    rete.production(stacked_on_heavy(), |_, _| {}).unwrap();

    assert_eq!(rete.pending_count(), 1);
    rete.validate().unwrap();
}

#[test]
fn extending_a_shared_prefix_primes_the_new_memory() {
    let mut rete = Rete::new();
    rete.add_production("long", [Condition::on("x").attr("length").gt(1)], |_, _| {})
        .unwrap();
    rete.add(Fact::new("a", "length", 2))
        .add(Fact::new("a", "weight", 11));
    rete.fire().unwrap();

    let id = rete
        .add_production(
            "long-and-heavy",
            [
                Condition::on("x").attr("length").gt(1),
                Condition::on("x").attr("weight").gt(10),
            ],
            |_, _| {},
        )
        .unwrap();

    assert_eq!(rete.beta_network().join_count(), 2);
    assert_eq!(rete.stats().beta_entries, 1);
    assert_eq!(rete.production_node(id).pending_count(), 1);
    assert_eq!(rete.pending_count(), 1);
    rete.validate().unwrap();
}

#[test]
fn fully_shared_chain_primes_only_the_new_production() {
    let mut rete = Rete::new();
    let first = rete.add_production("first", stacked_on_heavy(), |_, _| {}).unwrap();
    rete.add(Fact::new("a", "on-top-of", "b"))
        .add(Fact::new("b", "weight", 11));
    rete.fire().unwrap();

    let second = rete.add_production("second", stacked_on_heavy(), |_, _| {}).unwrap();
    assert_eq!(rete.production_node(first).pending_count(), 0);
    assert_eq!(rete.production_node(second).pending_count(), 1);
}

#[test]
fn unprimed_productions_wait_for_new_facts() {
    let mut rete = Rete::with_config(ReteConfig::default().without_priming());
    rete.add(Fact::new("a", "on-top-of", "b"))
        .add(Fact::new("b", "weight", 11));
    rete.production(stacked_on_heavy(), |_, _| {}).unwrap();
    assert_eq!(rete.pending_count(), 0);

    rete.add(Fact::new("c", "on-top-of", "b"));
    rete.add(Fact::new("b", "weight", 12));
    assert_eq!(rete.pending_count(), 1);
}

// =============================================================================
// Dump
// =============================================================================

#[test]
fn dump_describes_nodes_and_pending_matches() {
    let mut rete = Rete::new();
    rete.add_production("heavy-stack", stacked_on_heavy(), |_, _| {})
        .unwrap();
    rete.add(Fact::new("a", "on-top-of", "b"))
        .add(Fact::new("b", "weight", 11));

    let dump = rete.dump().to_string();
    for line in [
        "facts:",
        "  a on-top-of b",
        "  alpha-node_1 [on-top-of == ?y] -> alpha-memory_0 (1 facts) -> join_0",
        "  alpha-node_2 [weight > 10] -> alpha-memory_1 (1 facts) -> join_1",
        "  join_0 (root x alpha-memory_0) -> beta-memory_0 (1 tokens)",
        "  join_1 (beta-memory_0 x alpha-memory_1) -> production_0",
        "  production_0 \"heavy-stack\": 1 pending, fired 0 times",
        "    Cond(y, weight, >, 10)",
        "    pending: a on-top-of b, b weight 11",
    ] {
        assert!(dump.lines().any(|l| l == line), "missing {line:?} in\n{dump}");
    }
}
