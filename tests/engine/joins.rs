//! Integration tests for joins
//!
//! Single conditions, same-entity joins, and variable-correlated chains.

use std::cell::Cell;
use std::rc::Rc;

use rete_engine::{Condition, Rete, ReteConfig, Variable};
use rete_foundation::{Fact, Token};

/// An action that counts its runs in `count`.
fn counting(count: &Rc<Cell<usize>>) -> impl FnMut(&mut Rete, &Token) + 'static {
    let count = Rc::clone(count);
    move |_: &mut Rete, _: &Token| count.set(count.get() + 1)
}

fn stacked_on_heavy() -> Vec<Condition> {
    vec![
        Condition::new("x", "on-top-of", Variable::new("y")),
        Condition::on("y").attr("weight").gt(10),
    ]
}

// =============================================================================
// Single Entity
// =============================================================================

#[test]
fn single_condition_fires_per_matching_fact() {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::new();
    rete.production([Condition::on("x").attr("length").gt(1)], counting(&count))
        .unwrap();

    rete.add(Fact::new("a", "length", 2)).fire().unwrap();
    assert_eq!(count.get(), 1);
    rete.add(Fact::new("a", "length", 4)).fire().unwrap();
    assert_eq!(count.get(), 2);
    rete.add(Fact::new("a", "length", 1)).fire().unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn two_conditions_on_one_entity() {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::new();
    rete.production(
        [
            Condition::on("x").attr("length").gt(1),
            Condition::on("x").attr("weight").gt(10),
        ],
        counting(&count),
    )
    .unwrap();

    rete.add(Fact::new("a", "length", 2)).fire().unwrap();
    assert_eq!(count.get(), 0);
    rete.add(Fact::new("a", "weight", 11)).fire().unwrap();
    assert_eq!(count.get(), 1);
    rete.add(Fact::new("a", "length", 1)).fire().unwrap();
    assert_eq!(count.get(), 1);
    rete.add(Fact::new("a", "length", 2)).fire().unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn different_entities_do_not_join_without_a_variable() {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::new();
    rete.production(
        [
            Condition::on("x").attr("length").gt(1),
            Condition::on("x").attr("weight").gt(10),
        ],
        counting(&count),
    )
    .unwrap();

    rete.add(Fact::new("a", "length", 2))
        .add(Fact::new("b", "weight", 11));
    rete.fire().unwrap();
    assert_eq!(count.get(), 0);
}

// =============================================================================
// Variable Joins
// =============================================================================

#[test]
fn variable_binding_joins_across_entities() {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::new();
    rete.production(stacked_on_heavy(), counting(&count)).unwrap();

    rete.add(Fact::new("a", "on-top-of", "b")).fire().unwrap();
    assert_eq!(count.get(), 0);
    rete.add(Fact::new("b", "weight", 11)).fire().unwrap();
    assert_eq!(count.get(), 1);
    rete.add(Fact::new("b", "on-top-of", "a")).fire().unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn same_entity_correlates_without_binding() {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::new();
    rete.production(stacked_on_heavy(), counting(&count)).unwrap();

    // `a` is not what `?y` names, but sharing an id is enough.
    rete.add(Fact::new("a", "on-top-of", "b"))
        .add(Fact::new("a", "weight", 11));
    rete.fire().unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn unrelated_entity_does_not_join() {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::new();
    rete.production(stacked_on_heavy(), counting(&count)).unwrap();

    rete.add(Fact::new("a", "on-top-of", "b"))
        .add(Fact::new("c", "weight", 11));
    rete.fire().unwrap();
    assert_eq!(count.get(), 0);
}

#[test]
fn bound_token_carries_variable_tags() {
    let seen = Rc::new(Cell::new(false));
    let check = Rc::clone(&seen);
    let mut rete = Rete::new();
    rete.production(stacked_on_heavy(), move |_: &mut Rete, token: &Token| {
        let on = token.find("on-top-of").unwrap();
        let binding = on.value.as_binding().unwrap();
        assert_eq!(&*binding.var, "y");
        assert!(!token.find("weight").unwrap().value.is_binding());
        check.set(true);
    })
    .unwrap();

    rete.add(Fact::new("a", "on-top-of", "b"))
        .add(Fact::new("b", "weight", 11));
    rete.fire().unwrap();
    assert!(seen.get());
}

// =============================================================================
// Chains
// =============================================================================

fn chain() -> Vec<Condition> {
    vec![
        Condition::new("x", "on-top-of", Variable::new("y")),
        Condition::new("y", "left-of", Variable::new("z")),
        Condition::on("z").attr("length").eq(3),
    ]
}

#[test]
fn chain_matches_under_any_policy() {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::with_config(ReteConfig::chained());
    rete.production(chain(), counting(&count)).unwrap();

    rete.add(Fact::new("a", "on-top-of", "b")).fire().unwrap();
    assert_eq!(count.get(), 0);
    rete.add(Fact::new("b", "left-of", "c")).fire().unwrap();
    assert_eq!(count.get(), 0);
    rete.add(Fact::new("c", "length", 3)).fire().unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn chain_needs_every_link_under_every_policy() {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::new();
    rete.production(chain(), counting(&count)).unwrap();

    rete.add(Fact::new("a", "on-top-of", "b"))
        .add(Fact::new("b", "left-of", "c"))
        .add(Fact::new("c", "length", 3));
    rete.fire().unwrap();
    // `c` correlates with `b left-of c` but not with `a on-top-of b`.
    assert_eq!(count.get(), 0);
}

#[test]
fn repeated_attribute_chain() {
    let count = Rc::new(Cell::new(0));
    let mut rete = Rete::with_config(ReteConfig::chained());
    rete.production(
        [
            Condition::new("x", "on-top-of", Variable::new("y")),
            Condition::new("y", "on-top-of", Variable::new("z")),
            Condition::on("z").attr("count").gt(2),
        ],
        counting(&count),
    )
    .unwrap();

    rete.add(Fact::new("a", "on-top-of", "b")).fire().unwrap();
    rete.add(Fact::new("b", "on-top-of", "c")).fire().unwrap();
    rete.add(Fact::new("c", "count", 1)).fire().unwrap();
    assert_eq!(count.get(), 0);

    rete.add(Fact::new("c", "count", 3)).fire().unwrap();
    assert_eq!(count.get(), 1);
}
