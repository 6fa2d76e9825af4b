//! Multi-rule scenarios
//!
//! Several productions over the same entities, checked after every change.

use std::cell::Cell;
use std::rc::Rc;

use rete_engine::{Condition, Rete};
use rete_foundation::{Fact, Token};

fn counting(count: &Rc<Cell<usize>>) -> impl FnMut(&mut Rete, &Token) + 'static {
    let count = Rc::clone(count);
    move |_: &mut Rete, _: &Token| count.set(count.get() + 1)
}

#[test]
fn two_condition_rule_fires_once_in_either_order() {
    let facts = [Fact::new("a", "length", 2), Fact::new("a", "weight", 11)];
    for order in [[0, 1], [1, 0]] {
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

        for i in order {
            rete.add(facts[i].clone());
        }
        rete.fire().unwrap();
        rete.fire().unwrap();
        assert_eq!(count.get(), 1, "order {order:?}");
    }
}

#[test]
fn colored_counters() {
    let white = Rc::new(Cell::new(0));
    let low = Rc::new(Cell::new(0));
    let green = Rc::new(Cell::new(0));
    let mut rete = Rete::new();
    rete.production(
        [
            Condition::on("x").attr("color").eq("WHITE"),
            Condition::on("x").attr("count").lt(5),
        ],
        counting(&white),
    )
    .unwrap();
    rete.production([Condition::on("x").attr("count").lt(3)], counting(&low))
        .unwrap();
    rete.production(
        [
            Condition::on("x").attr("color").eq("GREEN"),
            Condition::on("x").attr("size").eq("LARGE"),
            Condition::on("x").attr("count").ge(2),
        ],
        counting(&green),
    )
    .unwrap();

    let mut step = |fact: Fact| {
        rete.add(fact).fire().unwrap();
        rete.validate().unwrap();
        (white.get(), low.get(), green.get())
    };

    step(Fact::new("a", "color", "WHITE"));
    step(Fact::new("a", "size", "SMALL"));
    step(Fact::new("b", "size", "LARGE"));
    step(Fact::new("b", "color", "GREEN"));
    assert_eq!(step(Fact::new("b", "size", "SMALL")), (0, 0, 0));

    assert_eq!(step(Fact::new("a", "count", 2)), (1, 1, 0));
    assert_eq!(step(Fact::new("c", "color", "GREEN")), (1, 1, 0));
    assert_eq!(step(Fact::new("c", "size", "LARGE")), (1, 1, 0));
    step(Fact::new("b", "size", "LARGE"));
    // Re-adding an unchanged fact still counts as a new match.
    assert_eq!(step(Fact::new("a", "color", "WHITE")), (2, 1, 0));
    assert_eq!(step(Fact::new("a", "count", 4)), (3, 1, 0));
    assert_eq!(step(Fact::new("a", "count", 3)), (4, 1, 0));
    assert_eq!(step(Fact::new("b", "count", 2)), (4, 2, 1));
}

#[test]
fn shared_network_stays_small_as_rules_repeat() {
    let mut rete = Rete::new();
    for threshold in [1, 2, 3] {
        for _ in 0..4 {
            rete.production(
                [
                    Condition::on("x").attr("length").gt(threshold),
                    Condition::on("x").attr("weight").gt(10),
                ],
                |_, _| {},
            )
            .unwrap();
        }
    }

    let stats = rete.stats();
    assert_eq!(stats.productions, 12);
    // Three length tests plus one shared weight test.
    assert_eq!(stats.alpha_nodes, 4);
    assert_eq!(stats.joins, 6);
    assert_eq!(stats.beta_memories, 3);

    rete.add(Fact::new("a", "length", 2))
        .add(Fact::new("a", "weight", 11));
    // `length > 1` passes for its four rules only.
    assert_eq!(rete.pending_count(), 4);
    assert_eq!(rete.stats().beta_entries, 1);
}
