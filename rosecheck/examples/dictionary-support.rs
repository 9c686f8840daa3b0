//! Dictionary support demonstration
//!
//! This example shows how to combine value choices with the container
//! generators: picking from predefined lists, mixing fixed values with
//! random ones, and generating whole dictionaries.

use rosecheck::*;
use std::collections::BTreeMap;

fn main() {
    println!("=== Dictionary Support Demonstration ===\n");

    // Example 1: Basic element selection
    example_basic_elements();

    // Example 2: Mixing fixed values with random generation
    example_weighted_mixing();

    // Example 3: Generated dictionaries
    example_dictionaries();

    // Example 4: A failing dictionary property and its minimal case
    example_minimal_dictionary();
}

/// Example 1: Basic element selection from predefined lists
fn example_basic_elements() {
    println!("1. Basic element selection from predefined lists");

    fn is_valid_role(role: &str) -> bool {
        matches!(role, "admin" | "user" | "guest" | "moderator")
    }

    let roles = element_of(vec!["admin".into(), "user".into(), "guest".into(), "moderator".into()])
        .expect("uniform weights are valid");

    let prop = for_all(|role: &'static str| is_valid_role(role), (roles,)).set_num_runs(20);

    match prop.go() {
        Ok(()) => println!("   ✓ All 20 generated roles were valid"),
        Err(err) => println!("   ✗ {err}"),
    }
    println!();
}

/// Example 2: Well-known ports mixed with random registered ports
fn example_weighted_mixing() {
    println!("2. Mixing fixed values with random generation");

    fn categorize_port(port: u16) -> &'static str {
        match port {
            1..=1023 => "well-known",
            1024..=49151 => "registered",
            49152..=65535 => "dynamic",
            _ => "invalid",
        }
    }

    let well_known = element_of(vec![22u16, 80, 443, 53, 25, 110, 143, 993].into_iter().map(Weighted::from).collect())
        .expect("uniform weights are valid");
    let ports = one_of(vec![
        weighted_gen(well_known, 0.7),
        Gen::<u16>::interval(1024, 65535).into(),
    ])
    .expect("the remainder goes to random ports");

    let mut counts = BTreeMap::new();
    let mut rand = Random::new("ports");
    for _ in 0..100 {
        if let Ok(tree) = ports.generate(&mut rand) {
            *counts.entry(categorize_port(tree.value)).or_insert(0) += 1;
        }
    }

    println!("   Port distribution over 100 generations:");
    for (category, count) in &counts {
        println!("     {category}: {count}");
    }
    println!();
}

/// Example 3: Generated dictionaries keep their keys distinct
fn example_dictionaries() {
    println!("3. Generated dictionaries");

    let headers = dictionary(
        element_of(vec!["accept".into(), "host".into(), "user-agent".into(), "cookie".into()])
            .expect("uniform weights are valid"),
        printable_ascii_string(1, 12).expect("valid size bounds"),
        1,
        4,
    )
    .expect("valid size bounds");

    let mut rand = Random::new("headers");
    for _ in 0..3 {
        match headers.generate(&mut rand) {
            Ok(tree) => println!("   {:?}", tree.value),
            Err(err) => println!("   ! {err}"),
        }
    }
    println!();
}

/// Example 4: The smallest dictionary breaking a size limit
fn example_minimal_dictionary() {
    println!("4. Shrinking a failing dictionary property");

    let entries = dictionary(
        Gen::<u16>::interval(0, 1000),
        Gen::<u32>::interval(0, 100_000),
        0,
        20,
    )
    .expect("valid size bounds");

    let prop = for_all(
        |map: BTreeMap<u16, u32>| map.values().sum::<u32>() < 150_000,
        (entries,),
    )
    .set_seed("dictionary");

    match prop.go() {
        Ok(()) => println!("   ✓ No dictionary exceeded the limit"),
        Err(CheckError::PropertyFailed {
            args, original_args, ..
        }) => {
            println!("   ✗ Original: {original_args}");
            println!("     Minimal:  {args}");
        }
        Err(err) => println!("   ! {err}"),
    }
    println!();
}
