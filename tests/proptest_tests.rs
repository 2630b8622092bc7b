//! Property-based tests for running-config block extraction.

use eosible::running_config::{extract_block, find_block};
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Indented child lines as EOS renders them.
fn child_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9 ]{1,30}".prop_map(|text| format!("   description {}", text.trim_end())),
        Just("   shutdown".to_string()),
        Just("   no shutdown".to_string()),
        (1u16..4094).prop_map(|vlan| format!("   switchport access vlan {}", vlan)),
        (1u32..100_000).prop_map(|mtu| format!("   mtu {}", mtu)),
    ]
}

fn render_block(header: &str, children: &[String]) -> String {
    let mut text = format!("{}\n", header);
    for child in children {
        text.push_str(child);
        text.push('\n');
    }
    text.push_str("!\n");
    text
}

/// Distinct interface numbers; the first one is the target.
fn layout() -> impl Strategy<Value = (Vec<u32>, Vec<Vec<String>>)> {
    btree_set(1u32..500, 1..8).prop_flat_map(|numbers| {
        let count = numbers.len();
        let numbers: Vec<u32> = numbers.into_iter().collect();
        (Just(numbers), vec(vec(child_line(), 0..6), count))
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_extracted_block_is_exact((numbers, bodies) in layout(), target in 0usize..8) {
        let target = target % numbers.len();
        let mut text = String::from("hostname leaf01\n!\n");
        for (number, body) in numbers.iter().zip(&bodies) {
            text.push_str(&render_block(&format!("interface Ethernet{}", number), body));
        }

        let header = format!("interface Ethernet{}", numbers[target]);
        let expected = render_block(&header, &bodies[target]);
        let block = extract_block(&text, &header).unwrap();

        prop_assert_eq!(block, expected.trim_end_matches('\n'));
        prop_assert!(block.ends_with('!'));
    }

    #[test]
    fn prop_span_points_into_source((numbers, bodies) in layout()) {
        let mut text = String::new();
        for (number, body) in numbers.iter().zip(&bodies) {
            text.push_str(&render_block(&format!("interface Ethernet{}", number), body));
        }

        for number in &numbers {
            let header = format!("interface Ethernet{}", number);
            let span = find_block(&text, &header).unwrap();
            prop_assert!(span.end <= text.len());
            prop_assert!(text[span.start..].starts_with(&header));
            prop_assert_eq!(&text[span.end - 1..span.end], "!");
        }
    }

    #[test]
    fn prop_missing_parent_is_none((numbers, bodies) in layout()) {
        let mut text = String::new();
        for (number, body) in numbers.iter().zip(&bodies) {
            text.push_str(&render_block(&format!("interface Ethernet{}", number), body));
        }

        // Numbers are drawn below 500.
        prop_assert!(extract_block(&text, "interface Ethernet500").is_none());
        prop_assert!(extract_block(&text, "interface Ethernet").is_none());
    }

    #[test]
    fn prop_unterminated_block_is_none(body in vec(child_line(), 0..6)) {
        let mut text = String::from("interface Ethernet1\n");
        for line in &body {
            text.push_str(line);
            text.push('\n');
        }
        prop_assert!(extract_block(&text, "interface Ethernet1").is_none());
    }

    #[test]
    fn prop_arbitrary_parent_never_panics(parent in "\\PC{0,40}", text in "\\PC{0,200}") {
        let _ = extract_block(&text, &parent);
    }
}
