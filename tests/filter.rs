mod common;

use common::{ids, sample};
use oppmap::filter::{Facet, FacetOptions, FilterState, category_counts, filter};
use oppmap::model::{CatalogItem, PatternTag};
use proptest::prelude::*;

#[test]
fn empty_state_keeps_everything_in_order() {
    let ds = sample();
    let out = filter(&ds.usecases, &FilterState::default(), ds.top_ids());
    assert_eq!(ids(&out), vec!["u1", "u2", "u3", "u4", "u5", "u6", "u7"]);
    assert!(FilterState::default().is_empty());
}

#[test]
fn patterns_within_a_facet_combine_with_or() {
    let ds = sample();
    let mut state = FilterState::default();
    state.facets.toggle(Facet::Pattern, "RAG");
    state.facets.toggle(Facet::Pattern, "Forecasting");
    let out = filter(&ds.usecases, &state, ds.top_ids());
    assert_eq!(ids(&out), vec!["u1", "u2", "u4"]);
}

#[test]
fn facets_combine_with_and() {
    let ds = sample();
    let mut state = FilterState::default();
    state.facets.set(Facet::Category, "fin", true);
    state.facets.set(Facet::MetricType, "Cost", true);
    let out = filter(&ds.usecases, &state, ds.top_ids());
    assert_eq!(ids(&out), vec!["u1", "u3"]);

    state.facets.set(Facet::Complexity, "Low", true);
    let out = filter(&ds.usecases, &state, ds.top_ids());
    assert_eq!(ids(&out), vec!["u1"]);
}

#[test]
fn items_without_category_fail_any_category_filter() {
    let ds = sample();
    let mut state = FilterState::default();
    for d in &ds.domains {
        state.facets.set(Facet::Category, &d.id, true);
    }
    let out = filter(&ds.usecases, &state, ds.top_ids());
    assert!(!ids(&out).contains(&"u7".to_string()));
    assert_eq!(out.len(), 6);
}

#[test]
fn items_missing_a_field_fail_that_facet() {
    let ds = sample();
    let mut state = FilterState::default();
    state.facets.set(Facet::DeploymentHint, "Vendor", true);
    let out = filter(&ds.usecases, &state, ds.top_ids());
    assert_eq!(ids(&out), vec!["u2"]);
}

#[test]
fn search_is_case_insensitive_and_covers_vendors() {
    let ds = sample();
    let state = FilterState {
        search: "AZURE".into(),
        ..FilterState::default()
    };
    assert_eq!(ids(&filter(&ds.usecases, &state, ds.top_ids())), vec!["u5"]);

    let state = FilterState {
        search: "sap ariba".into(),
        ..FilterState::default()
    };
    assert_eq!(ids(&filter(&ds.usecases, &state, ds.top_ids())), vec!["u1"]);
}

#[test]
fn search_covers_patterns_and_domain_name() {
    let ds = sample();
    let state = FilterState {
        search: "forecasting".into(),
        ..FilterState::default()
    };
    assert_eq!(ids(&filter(&ds.usecases, &state, ds.top_ids())), vec!["u2"]);

    let state = FilterState {
        search: "operations".into(),
        ..FilterState::default()
    };
    assert_eq!(ids(&filter(&ds.usecases, &state, ds.top_ids())), vec!["u4", "u5", "u6"]);
}

#[test]
fn top_toggle_keeps_listed_ids_and_opportunities() {
    let ds = sample();
    let state = FilterState {
        only_top: true,
        ..FilterState::default()
    };
    assert_eq!(ids(&filter(&ds.usecases, &state, ds.top_ids())), vec!["u1", "u2", "u3", "u7"]);

    let state = FilterState {
        only_opportunities: true,
        ..FilterState::default()
    };
    assert_eq!(ids(&filter(&ds.usecases, &state, ds.top_ids())), vec!["u1", "u3", "u7"]);
}

fn in_category(id: &str, category: &str) -> CatalogItem {
    let mut u = CatalogItem::new(id, id.to_uppercase());
    u.category_id = Some(category.into());
    u
}

#[test]
fn two_category_scenario() {
    let items = vec![
        in_category("a1", "A"),
        in_category("b1", "B"),
        in_category("a2", "A"),
        in_category("a3", "A"),
    ];
    let top = Default::default();

    let mut state = FilterState::default();
    assert_eq!(ids(&filter(&items, &state, &top)), vec!["a1", "b1", "a2", "a3"]);

    state.facets.set(Facet::Category, "A", true);
    assert_eq!(ids(&filter(&items, &state, &top)), vec!["a1", "a2", "a3"]);

    state.facets.set(Facet::Category, "B", true);
    assert_eq!(filter(&items, &state, &top).len(), 4);

    state.reset();
    assert_eq!(filter(&items, &state, &top).len(), 4);
}

#[test]
fn overlapping_patterns_pass() {
    let mut u = CatalogItem::new("x", "Scanner");
    u.patterns = ["RAG", "OCR"].into_iter().filter_map(PatternTag::new).collect();
    u.vendors_tools = Some("OCR engine X".into());
    let items = vec![u];
    let top = Default::default();

    let mut state = FilterState::default();
    state.facets.set(Facet::Pattern, "OCR", true);
    state.facets.set(Facet::Pattern, "NER", true);
    assert_eq!(filter(&items, &state, &top).len(), 1);

    let state = FilterState {
        search: "ocr".into(),
        ..FilterState::default()
    };
    assert_eq!(filter(&items, &state, &top).len(), 1);
}

#[test]
fn toggle_and_blank_values() {
    let mut state = FilterState::default();
    assert!(!state.facets.set(Facet::Pattern, "   ", true));
    state.facets.toggle(Facet::Pattern, " RAG ");
    assert!(state.facets.contains(Facet::Pattern, "RAG"));
    state.facets.toggle(Facet::Pattern, "RAG");
    assert!(state.facets.is_empty());
}

#[test]
fn facet_options_are_sorted_and_unique() {
    let ds = sample();
    let opts = FacetOptions::derive(&ds.usecases);
    assert_eq!(opts.values(Facet::MetricType), vec!["Cost", "Quality", "Time"]);
    assert_eq!(opts.values(Facet::Complexity), vec!["High", "Low", "Med", "Medium"]);
    assert_eq!(opts.values(Facet::Pattern), vec!["Automation", "Forecasting", "RAG"]);
    assert_eq!(opts.values(Facet::DeploymentHint), vec!["Self-hosted", "Vendor"]);
}

#[test]
fn category_counts_skip_uncategorized() {
    let ds = sample();
    let counts = category_counts(&ds.usecases);
    assert_eq!(counts.get("fin"), Some(&3));
    assert_eq!(counts.get("ops"), Some(&3));
    assert_eq!(counts.get("empty"), None);
    assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["fin", "ops"]);
}

fn arb_state() -> impl Strategy<Value = FilterState> {
    let patterns = prop::collection::vec(prop::sample::select(vec!["RAG", "Automation", "Forecasting", "Other"]), 0..3);
    let cats = prop::collection::vec(prop::sample::select(vec!["fin", "ops", "empty"]), 0..3);
    let cx = prop::collection::vec(prop::sample::select(vec!["Low", "Med", "Medium", "High"]), 0..3);
    let search = prop::sample::select(vec!["", "a", "plan", "AZURE", "zzz"]);
    (patterns, cats, cx, search, any::<bool>(), any::<bool>()).prop_map(|(p, c, x, q, top, opp)| {
        let mut s = FilterState {
            search: q.to_string(),
            only_top: top,
            only_opportunities: opp,
            ..FilterState::default()
        };
        for v in p {
            s.facets.set(Facet::Pattern, v, true);
        }
        for v in c {
            s.facets.set(Facet::Category, v, true);
        }
        for v in x {
            s.facets.set(Facet::Complexity, v, true);
        }
        s
    })
}

#[test]
fn each_facet_narrows_from_its_empty_set() {
    let ds = sample();
    let all = filter(&ds.usecases, &FilterState::default(), ds.top_ids()).len();
    for facet in Facet::ALL {
        for value in facet_pool(facet) {
            let mut state = FilterState::default();
            state.facets.set(facet, value, true);
            let narrowed = filter(&ds.usecases, &state, ds.top_ids()).len();
            assert!(narrowed <= all, "{:?}={} grew the result", facet, value);
            state.facets.clear(facet);
            assert!(state.is_empty());
        }
    }
}

fn facet_pool(facet: Facet) -> Vec<&'static str> {
    match facet {
        Facet::Category => vec!["fin", "ops", "empty", "nowhere"],
        Facet::MetricType => vec!["Cost", "Time", "Quality", "Revenue"],
        Facet::Complexity => vec!["Low", "Med", "Medium", "High"],
        Facet::Pattern => vec!["RAG", "Automation", "Forecasting", "Other"],
        Facet::DeploymentHint => vec!["Self-hosted", "Vendor", "Hybrid"],
    }
}

fn arb_facet_value() -> impl Strategy<Value = (Facet, &'static str)> {
    prop::sample::select(Facet::ALL.to_vec())
        .prop_flat_map(|facet| (Just(facet), prop::sample::select(facet_pool(facet))))
}

proptest! {
    #[test]
    fn selecting_a_facet_value_narrows_the_empty_facet(
        state in arb_state(),
        (facet, value) in arb_facet_value(),
    ) {
        let ds = sample();
        let mut baseline = state.clone();
        baseline.facets.clear(facet);
        let mut with_value = baseline.clone();
        with_value.facets.set(facet, value, true);

        let wide = ids(&filter(&ds.usecases, &baseline, ds.top_ids()));
        let narrow = ids(&filter(&ds.usecases, &with_value, ds.top_ids()));
        prop_assert!(narrow.len() <= wide.len());
        prop_assert!(narrow.iter().all(|id| wide.contains(id)));
    }

    #[test]
    fn output_is_an_ordered_subset(state in arb_state()) {
        let ds = sample();
        let out = filter(&ds.usecases, &state, ds.top_ids());
        let positions: Vec<usize> = out
            .iter()
            .map(|u| ds.usecases.iter().position(|x| x.id == u.id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn adding_a_predicate_never_grows_the_result(state in arb_state()) {
        let ds = sample();
        let before = filter(&ds.usecases, &state, ds.top_ids()).len();
        let mut narrower = state.clone();
        narrower.only_opportunities = true;
        prop_assert!(filter(&ds.usecases, &narrower, ds.top_ids()).len() <= before);

        let mut narrower = state.clone();
        narrower.search.push('a');
        prop_assert!(filter(&ds.usecases, &narrower, ds.top_ids()).len() <= before);
    }
}
