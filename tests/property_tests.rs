//! Property-based tests for umbralog using proptest

use proptest::prelude::*;
use umbralog::{
    AttributeList, AttributePack, JsonFormatter, LeftoverOption, Options, PatternFormatter,
    PlaceholderOption, Record, Writer,
};

fn render_pattern(formatter: &PatternFormatter, list: &AttributeList<'_>) -> String {
    let mut pack = AttributePack::new();
    pack.push(list);
    let record = Record::new(2, "msg", &pack);
    let mut writer = Writer::new();
    formatter
        .format(&record, &mut writer)
        .expect("rendering succeeds");
    String::from_utf8_lossy(writer.as_view()).into_owned()
}

use umbralog::Formatter as _;

// ============================================================================
// Attribute pack ordering
// ============================================================================

proptest! {
    /// Pack iteration equals the concatenation of each list in pack order,
    /// inner order preserved, duplicates included
    #[test]
    fn test_pack_iteration_preserves_order(
        lists in prop::collection::vec(
            prop::collection::vec(("[a-z]{1,8}", any::<i64>()), 0..5),
            0..5,
        )
    ) {
        let owned: Vec<AttributeList<'_>> = lists
            .iter()
            .map(|attrs| {
                let mut list = AttributeList::new();
                for (name, value) in attrs {
                    list = list.with(name.clone(), *value);
                }
                list
            })
            .collect();

        let mut pack = AttributePack::new();
        for list in &owned {
            pack.push(list);
        }

        let expected: Vec<(String, i64)> = lists.iter().flatten().cloned().collect();
        let actual: Vec<(String, i64)> = pack
            .iter()
            .map(|(name, value)| (name.to_string(), value.as_i64().unwrap()))
            .collect();

        prop_assert_eq!(expected, actual);
    }

    /// Lookup returns the first match in pack order
    #[test]
    fn test_pack_lookup_is_first_match(
        values in prop::collection::vec(any::<i64>(), 1..6)
    ) {
        let owned: Vec<AttributeList<'_>> = values
            .iter()
            .map(|value| AttributeList::new().with("shared", *value))
            .collect();

        let mut pack = AttributePack::new();
        for list in &owned {
            pack.push(list);
        }

        prop_assert_eq!(
            pack.lookup("shared").and_then(|v| v.as_i64()),
            Some(values[0])
        );
    }
}

// ============================================================================
// Pattern formatter
// ============================================================================

proptest! {
    /// Literal portions of the template appear verbatim and in order in
    /// every rendered output
    #[test]
    fn test_literals_appear_verbatim(
        before in "[a-z ]{0,12}",
        after in "[a-z ]{0,12}",
        value in any::<i64>(),
    ) {
        let pattern = format!("{}{{key}}{}", before, after);
        let formatter = PatternFormatter::new(&pattern).unwrap();
        let list = AttributeList::new().with("key", value);

        let rendered = render_pattern(&formatter, &list);

        prop_assert_eq!(rendered, format!("{}{}{}", before, value, after));
    }

    /// Width pads the body, never truncates it
    #[test]
    fn test_width_pads_to_at_least_width(value in any::<i64>(), width in 0usize..20) {
        let pattern = format!("{{key:{}}}", width);
        let formatter = PatternFormatter::new(&pattern).unwrap();
        let list = AttributeList::new().with("key", value);

        let rendered = render_pattern(&formatter, &list);
        let body = value.to_string();

        prop_assert_eq!(rendered.chars().count(), width.max(body.chars().count()));
        prop_assert!(rendered.contains(&body));
    }

    /// Without `unique`, every unreferenced attribute appears exactly once
    /// in the leftover output
    #[test]
    fn test_leftover_completeness(
        names in prop::collection::vec("[a-z]{1,6}", 1..8)
    ) {
        let formatter = PatternFormatter::new("{...}").unwrap();

        let mut list = AttributeList::new();
        for (index, name) in names.iter().enumerate() {
            list = list.with(name.clone(), index as i64);
        }

        let rendered = render_pattern(&formatter, &list);

        for name in &names {
            let needle = format!("\"{}\":", name);
            let expected = names.iter().filter(|n| *n == name).count();
            prop_assert_eq!(rendered.matches(&needle).count(), expected);
        }
    }

    /// With `unique`, every distinct unreferenced name appears exactly once
    #[test]
    fn test_leftover_unique_distinct_names(
        names in prop::collection::vec("[a-z]{1,6}", 1..8)
    ) {
        let options = Options::from([(
            String::new(),
            PlaceholderOption::Leftover(LeftoverOption::default().unique()),
        )]);
        let formatter = PatternFormatter::with_options("{...}", options).unwrap();

        let mut list = AttributeList::new();
        for (index, name) in names.iter().enumerate() {
            list = list.with(name.clone(), index as i64);
        }

        let rendered = render_pattern(&formatter, &list);

        for name in &names {
            let needle = format!("\"{}\":", name);
            prop_assert_eq!(rendered.matches(&needle).count(), 1);
        }
    }
}

// ============================================================================
// JSON formatter
// ============================================================================

proptest! {
    /// JSON output parses back to the input values for JSON-safe attribute
    /// sets with distinct names
    #[test]
    fn test_json_round_trip(
        entries in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..6)
    ) {
        let formatter = JsonFormatter::new();

        // Prefixed so user attributes never collide with the fixed five
        let mut list = AttributeList::new();
        for (name, value) in &entries {
            list = list.with(format!("u_{}", name), *value);
        }

        let mut pack = AttributePack::new();
        pack.push(&list);
        let record = Record::new(3, "round trip", &pack);

        let mut writer = Writer::new();
        formatter.format(&record, &mut writer).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(writer.as_view()).expect("output is valid JSON");

        prop_assert_eq!(parsed["message"].as_str(), Some("round trip"));
        prop_assert_eq!(parsed["severity"].as_i64(), Some(3));
        for (name, value) in &entries {
            let key = format!("u_{}", name);
            prop_assert_eq!(parsed[key.as_str()].as_i64(), Some(*value));
        }
    }

    /// String values survive JSON escaping
    #[test]
    fn test_json_string_escaping_round_trip(text in "\\PC{0,24}") {
        let formatter = JsonFormatter::new();
        let list = AttributeList::new().with("u_text", text.clone());

        let mut pack = AttributePack::new();
        pack.push(&list);
        let record = Record::new(2, "msg", &pack);

        let mut writer = Writer::new();
        formatter.format(&record, &mut writer).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(writer.as_view()).expect("output is valid JSON");

        prop_assert_eq!(parsed["u_text"].as_str(), Some(text.as_str()));
    }
}
