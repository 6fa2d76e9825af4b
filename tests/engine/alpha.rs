//! Integration tests for the alpha network
//!
//! Tests node sharing between productions and operator semantics as seen
//! through complete rules.

use std::cell::Cell;
use std::rc::Rc;

use rete_engine::{Condition, Operator, Rete, Variable};
use rete_foundation::{Fact, Literal, Token, Value};

fn counting(count: &Rc<Cell<usize>>) -> impl FnMut(&mut Rete, &Token) + 'static {
    let count = Rc::clone(count);
    move |_: &mut Rete, _: &Token| count.set(count.get() + 1)
}

/// Fires a single-condition rule against one fact and reports whether it
/// matched.
fn fires(condition: Condition, value: impl Into<Value>) -> bool {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::new();
    let attribute = condition.attribute.clone();
    rete.production([condition], counting(&count)).unwrap();
    rete.add(Fact::new("a", attribute, value));
    rete.fire().unwrap();
    count.get() == 1
}

// =============================================================================
// Sharing
// =============================================================================

#[test]
fn identical_productions_share_every_node() {
    let mut rete = Rete::new();
    let rule = || {
        vec![
            Condition::new("x", "on-top-of", Variable::new("y")),
            Condition::on("y").attr("weight").gt(10),
        ]
    };
    rete.production(rule(), |_, _| {}).unwrap();
    rete.production(rule(), |_, _| {}).unwrap();

    let stats = rete.stats();
    assert_eq!(stats.productions, 2);
    assert_eq!(stats.alpha_nodes, 2);
    assert_eq!(stats.alpha_memories, 2);
    assert_eq!(stats.joins, 2);
    assert_eq!(stats.beta_memories, 1);
}

#[test]
fn common_prefix_is_shared() {
    let mut rete = Rete::new();
    rete.production(
        [
            Condition::on("x").attr("length").gt(1),
            Condition::on("x").attr("weight").gt(10),
        ],
        |_, _| {},
    )
    .unwrap();
    rete.production(
        [
            Condition::on("x").attr("length").gt(1),
            Condition::on("x").attr("color").eq("red"),
        ],
        |_, _| {},
    )
    .unwrap();

    let stats = rete.stats();
    assert_eq!(stats.alpha_nodes, 3);
    assert_eq!(stats.alpha_memories, 3);
    assert_eq!(stats.joins, 3);
    assert_eq!(stats.beta_memories, 1);
}

#[test]
fn labels_do_not_split_nodes() {
    let mut rete = Rete::new();
    rete.production([Condition::on("x").attr("count").gt(0)], |_, _| {})
        .unwrap();
    rete.production([Condition::on("block").attr("count").gt(0)], |_, _| {})
        .unwrap();

    assert_eq!(rete.alpha_network().node_count(), 1);
    assert_eq!(rete.beta_network().join_count(), 1);
}

#[test]
fn different_variables_are_different_tests() {
    let mut rete = Rete::new();
    rete.production(
        [Condition::new("x", "on-top-of", Variable::new("y"))],
        |_, _| {},
    )
    .unwrap();
    rete.production(
        [Condition::new("x", "on-top-of", Variable::new("z"))],
        |_, _| {},
    )
    .unwrap();

    assert_eq!(rete.alpha_network().node_count(), 2);
}

#[test]
fn one_fact_reaches_every_passing_memory() {
    let mut rete = Rete::new();
    rete.production([Condition::on("x").attr("count").lt(5)], |_, _| {})
        .unwrap();
    rete.production([Condition::on("x").attr("count").lt(3)], |_, _| {})
        .unwrap();
    rete.production([Condition::on("x").attr("count").ge(2)], |_, _| {})
        .unwrap();

    rete.add(Fact::new("a", "count", 2));
    assert_eq!(rete.stats().alpha_entries, 3);
    rete.add(Fact::new("a", "count", 4));
    assert_eq!(rete.stats().alpha_entries, 2);
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn equality_is_numeric_across_int_and_float() {
    assert!(fires(Condition::on("x").attr("n").eq(2), 2.0));
    assert!(!fires(Condition::on("x").attr("n").ne(2), 2.0));
}

#[test]
fn float_equality_follows_ieee() {
    assert!(fires(Condition::on("x").attr("t").eq(0.0), -0.0));
    assert!(!fires(Condition::on("x").attr("t").eq(f64::NAN), f64::NAN));
    assert!(fires(Condition::on("x").attr("t").ne(f64::NAN), f64::NAN));
}

#[test]
fn identity_is_strict() {
    assert!(fires(Condition::on("x").attr("n").is(2), 2));
    assert!(!fires(Condition::on("x").attr("n").is(2), 2.0));
    assert!(fires(Condition::on("x").attr("n").is_not(2), 2.0));
}

#[test]
fn ordering_against_an_incomparable_value_is_false() {
    assert!(!fires(Condition::on("x").attr("n").gt(1), "2"));
    assert!(!fires(Condition::on("x").attr("n").lt(1), "0"));
    assert!(!fires(Condition::on("x").attr("n").le(1), Literal::Nil));
}

#[test]
fn membership_in_tuples_and_strings() {
    let colors = || Condition::on("x").attr("color").is_in(vec!["red", "green"]);
    assert!(fires(colors(), "green"));
    assert!(!fires(colors(), "blue"));

    let name = || Condition::on("x").attr("name").is_in("conveyor-belt");
    assert!(fires(name(), "belt"));
    assert!(!fires(name(), "pulley"));
    assert!(!fires(Condition::on("x").attr("n").is_in(5), 5));
}

#[test]
fn not_equal_nil_matches_any_present_value() {
    let present = || Condition::on("x").attr("heater").ne(Literal::Nil);
    assert!(fires(present(), false));
    assert!(fires(present(), 0));
    assert!(!fires(present(), Literal::Nil));
}

#[test]
fn operator_text_with_aliases() {
    let parsed = Condition::parse("x", "count", "<>", 3).unwrap();
    assert_eq!(parsed.operator, Operator::Ne);
    assert!(fires(parsed, 4));

    let parsed = Condition::on("x").attr("count").op("is not", 3).unwrap();
    assert_eq!(parsed.operator, Operator::IsNot);
    assert!(Condition::parse("x", "count", "=~", 3).is_err());
}
