//! Facts, slots, and tokens.

use rete_foundation::{Fact, SlotKey, Token};

#[test]
fn facts_in_one_slot_share_a_key() {
    let old = Fact::new("kitchen", "temperature", 14);
    let new = Fact::new("kitchen", "temperature", 15);
    assert_ne!(old, new);
    assert_eq!(old.slot(), new.slot());
    assert_eq!(old.slot().to_string(), "(kitchen, temperature)");
}

#[test]
fn fact_display() {
    let fact = Fact::new("a", "on-top-of", "b");
    assert_eq!(fact.to_string(), "a on-top-of b");
    assert_eq!(format!("{fact:?}"), "Fact(a, on-top-of, \"b\")");
}

#[test]
fn extending_a_token_leaves_the_original() {
    let base = Token::new().extended(Fact::new("a", "on-top-of", "b"));
    let longer = base.extended(Fact::new("b", "weight", 11));

    assert_eq!(base.len(), 1);
    assert_eq!(longer.len(), 2);
    assert_eq!(longer.last().unwrap().id.as_str(), "b");
    assert_eq!(longer[0], base[0]);
}

#[test]
fn token_lookup_by_attribute_and_slot() {
    let token: Token = [
        Fact::new("kitchen", "temperature", 19),
        Fact::new("kitchen", "heater", false),
    ]
    .into_iter()
    .collect();

    assert_eq!(token.find("heater").unwrap().value.literal().as_bool(), Some(false));
    assert!(token.find("humidity").is_none());
    assert!(token.contains_slot(&SlotKey::new("kitchen", "temperature")));
    assert!(!token.contains_slot(&SlotKey::new("bedroom", "temperature")));
    assert_eq!(token.to_string(), "kitchen temperature 19, kitchen heater false");
}
