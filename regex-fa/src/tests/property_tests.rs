//! Property tests for the automata pipeline.
//!
//! Patterns are generated from a small syntax tree over the letters `a`-`d`
//! so that random inputs over the same letters hit both matches and
//! mismatches. Anchors are left out: the DFA drops them.

use proptest::prelude::*;

use crate::automata::label::CharRange;
use crate::automata::ASCII_END;
use crate::compile;

// ══════════════════════════════════════════════════════════════════════
// Pattern strategies
// ══════════════════════════════════════════════════════════════════════

/// Strategy for anchor-free patterns up to a given nesting depth.
///
/// Depth 0: a literal, `.`, a class, or a meta class.
/// Depth n: concatenation, alternation, a group, or a quantified group.
fn arb_pattern(max_depth: u32) -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        4 => "[a-d]",
        1 => Just(".".to_string()),
        1 => Just("[b-c]".to_string()),
        1 => Just("[^a]".to_string()),
        1 => Just("[ad-]".to_string()),
        1 => Just(r"\w".to_string()),
    ];

    leaf.prop_recursive(max_depth, 24, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a}{b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a}|{b}")),
            inner.clone().prop_map(|a| format!("({a})")),
            (inner.clone(), arb_quantifier()).prop_map(|(a, q)| format!("({a}){q}")),
        ]
    })
}

fn arb_quantifier() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("*".to_string()),
        Just("+".to_string()),
        Just("?".to_string()),
        (0u32..3).prop_map(|m| format!("{{{m}}}")),
        (0u32..2, 0u32..2).prop_map(|(m, extra)| format!("{{{m},{}}}", m + extra + 1)),
        Just("{0,}".to_string()),
    ]
}

fn arb_input() -> impl Strategy<Value = String> {
    "[a-e]{0,6}"
}

/// Class bodies made of letters, digits and letter/digit ranges.
fn arb_class_body() -> impl Strategy<Value = String> {
    let member = prop_oneof![
        "[a-z0-9]",
        (b'a'..=b'z', 0u8..6).prop_map(|(lo, w)| {
            let hi = lo.saturating_add(w).min(b'z');
            format!("{}-{}", lo as char, hi as char)
        }),
    ];
    prop::collection::vec(member, 1..5).prop_map(|members| members.concat())
}

// ══════════════════════════════════════════════════════════════════════
// Properties
// ══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: the simulator and the DFA agree on every input.
    #[test]
    fn simulation_agrees_with_dfa(pattern in arb_pattern(3), inputs in prop::collection::vec(arb_input(), 8)) {
        let compiled = compile(&pattern).unwrap();
        let dfa = compiled.to_dfa().unwrap();
        for input in &inputs {
            prop_assert_eq!(
                compiled.simulate(input).unwrap(),
                dfa.accepts(input).unwrap(),
                "pattern {:?}, input {:?}",
                pattern,
                input
            );
        }
    }

    /// Property: every DFA state's edges are pairwise disjoint and cover the
    /// consuming labels of its NFA members.
    #[test]
    fn partition_is_disjoint_and_covering(pattern in arb_pattern(3)) {
        let compiled = compile(&pattern).unwrap();
        let dfa = compiled.to_dfa().unwrap();
        for (id, state) in dfa.states().iter().enumerate() {
            let ranges: Vec<CharRange> = dfa
                .outgoing(id as u32)
                .filter_map(|edge| edge.label.interval())
                .collect();
            for pair in ranges.windows(2) {
                prop_assert!(pair[0].hi <= pair[1].lo, "overlap {:?}", pair);
            }
            for &node in state.nfa_nodes() {
                if let Some(range) = compiled.nfa().node(node).label().and_then(|l| l.interval()) {
                    for c in range.lo..range.hi {
                        prop_assert!(dfa.step(id as u32, c).is_some());
                    }
                }
            }
        }
    }

    /// Property: `[X]` and `[^X]` split the alphabet between them.
    #[test]
    fn negated_class_is_complement(body in arb_class_body()) {
        let positive = compile(&format!("[{body}]")).unwrap();
        let negative = compile(&format!("[^{body}]")).unwrap();
        for c in 0..ASCII_END {
            let input = char::from(c).to_string();
            prop_assert_ne!(
                positive.simulate(&input).unwrap(),
                negative.simulate(&input).unwrap(),
                "body {:?}, code point {:#04x}",
                body,
                c
            );
        }
    }

    /// Property: `x*` accepts what `(x+)?` accepts, and `x?` what `x|` does.
    #[test]
    fn quantifier_identities(atom in arb_pattern(1), input in arb_input()) {
        let star = compile(&format!("({atom})*")).unwrap();
        let plus_opt = compile(&format!("(({atom})+)?")).unwrap();
        prop_assert_eq!(star.simulate(&input), plus_opt.simulate(&input));

        let opt = compile(&format!("({atom})?")).unwrap();
        let alt = compile(&format!("({atom})|")).unwrap();
        prop_assert_eq!(opt.simulate(&input), alt.simulate(&input));
    }
}
