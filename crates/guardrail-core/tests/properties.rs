//! Property-based tests for the evaluation engine using proptest.

use proptest::prelude::*;

use guardrail_core::retrieval::{fused_order, RRF_K};
use guardrail_core::text::normalize;
use guardrail_core::{
    decompose, evaluate, fused_rank, route_decision, toxicity_score, Decision, Passage, Policy,
    Route, Scores,
};

const MARKERS: &[&str] = &["and", "or", "versus", "vs", "with", "without"];

fn word() -> impl Strategy<Value = String> {
    "[a-z]{2,9}".prop_filter("conjunction markers split questions", |w| {
        !MARKERS.contains(&w.as_str())
    })
}

fn sentence() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..12).prop_map(|words| words.join(" "))
}

fn passages() -> impl Strategy<Value = Vec<Passage>> {
    prop::collection::vec(sentence(), 0..6).prop_map(|texts| {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Passage::new(format!("p{}", i + 1), format!("{}.", text)))
            .collect()
    })
}

fn unit() -> impl Strategy<Value = f64> {
    0.0f64..=1.0
}

// --- Score properties ---

proptest! {
    #[test]
    fn scores_stay_in_unit_interval(
        question in ".{0,80}",
        answer in ".{0,160}",
        passages in passages(),
    ) {
        let result = evaluate(&question, &answer, &passages, &Policy::default());
        for score in [result.scores.faithfulness, result.scores.coverage, result.scores.toxicity] {
            prop_assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn question_without_separators_is_one_sub_question(question in sentence()) {
        prop_assert_eq!(decompose(&question), vec![normalize(&question)]);
    }

    #[test]
    fn answer_copied_from_passage_is_faithful(passages in passages(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!passages.is_empty());
        let answer = passages[pick.index(passages.len())].text.clone();
        let result = evaluate("", &answer, &passages, &Policy::default());
        prop_assert!(result.scores.faithfulness >= 0.85);
    }

    #[test]
    fn email_and_phone_reach_double_weight(
        user in "[a-z]{3,10}",
        domain in "[a-z]{3,10}",
        area in 200u32..999,
        line in 1000u32..9999,
    ) {
        let text = format!("Write {}@{}.com or call {}-555-{}", user, domain, area, line);
        prop_assert!(toxicity_score(&text) >= 0.08);
    }
}

// --- Routing properties ---

proptest! {
    #[test]
    fn toxic_answers_block_when_routed_to_block(
        faithfulness in unit(),
        coverage in unit(),
        toxicity_max in unit(),
        excess in 0.0f64..=1.0,
    ) {
        let mut policy = Policy::default();
        policy.thresholds.toxicity_max = toxicity_max;
        policy.routes.on_toxicity = Route::Block;
        let scores = Scores {
            faithfulness,
            coverage,
            toxicity: (toxicity_max + excess).min(1.0),
        };
        let (decision, explanations) = route_decision(&scores, &policy, &[]);
        prop_assert_eq!(decision, Decision::Block);
        prop_assert_eq!(explanations.len(), 1);
    }

    #[test]
    fn scores_within_thresholds_allow(
        faithfulness_min in unit(),
        coverage_min in unit(),
        toxicity_max in 0.01f64..=1.0,
        lift in 0.0f64..=1.0,
    ) {
        let mut policy = Policy::default();
        policy.thresholds.faithfulness_min = faithfulness_min;
        policy.thresholds.coverage_min = coverage_min;
        policy.thresholds.toxicity_max = toxicity_max;
        let scores = Scores {
            faithfulness: faithfulness_min + (1.0 - faithfulness_min) * lift,
            coverage: coverage_min + (1.0 - coverage_min) * lift,
            toxicity: toxicity_max * (1.0 - lift) * 0.99,
        };
        let (decision, explanations) = route_decision(&scores, &policy, &[]);
        prop_assert_eq!(decision, Decision::Allow);
        prop_assert!(explanations.is_empty());
    }

    #[test]
    fn repaired_answer_keeps_original_prefix(
        question in sentence(),
        answer in ".{0,120}",
        passages in passages(),
    ) {
        let result = evaluate(&question, &answer, &passages, &Policy::default());
        if let Some(repaired) = &result.repaired_answer {
            prop_assert_eq!(result.decision, Decision::Repair);
            prop_assert!(repaired.starts_with(&answer));
        }
    }
}

// --- Fusion properties ---

proptest! {
    #[test]
    fn fused_rank_over_no_passages_is_empty(query in ".{0,60}", top_k in 0usize..20) {
        prop_assert!(fused_rank(&query, &[], top_k).is_empty());
    }

    #[test]
    fn fusing_identical_rankings_preserves_order(
        ranking in (1usize..30).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let fused = fused_order(&[ranking.clone(), ranking.clone()], RRF_K);
        prop_assert_eq!(fused, ranking);
    }
}
