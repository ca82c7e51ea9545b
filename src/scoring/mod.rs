use std::collections::HashMap;

use crate::alignment::edit_distance::edit_counts;
use crate::types::{AlignedWord, EditOp, Metrics, MistakeRecord, SubstitutionHistogram};

pub mod rules;

pub use rules::{MistakeRule, MistakeRules};

#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub metrics: Metrics,
    pub substitution_histogram: SubstitutionHistogram,
    pub mistakes: Vec<MistakeRecord>,
}

/// Score every row of an alignment, predicted-only rows included.
pub fn score(rows: &[AlignedWord], rules: &MistakeRules) -> Score {
    let ops: Vec<&EditOp> = rows.iter().flat_map(|row| row.phoneme_ops.iter()).collect();
    score_ops(ops, rules)
}

pub fn score_ops<'a>(ops: impl IntoIterator<Item = &'a EditOp>, rules: &MistakeRules) -> Score {
    let ops: Vec<&EditOp> = ops.into_iter().collect();
    let score = Score {
        metrics: phoneme_error_rate(ops.iter().copied()),
        substitution_histogram: substitution_histogram(ops.iter().copied()),
        mistakes: classify_mistakes(ops.iter().copied(), rules),
    };
    tracing::debug!(
        ops = ops.len(),
        per = score.metrics.phoneme_error_rate,
        distinct_substitutions = score.substitution_histogram.len(),
        mistakes = score.mistakes.len(),
        "scoring: complete"
    );
    score
}

/// PER = (S + I + D) / max(1, ops with an expected side).
pub fn phoneme_error_rate<'a>(ops: impl IntoIterator<Item = &'a EditOp>) -> Metrics {
    let ops: Vec<&EditOp> = ops.into_iter().collect();
    let counts = edit_counts(ops.iter().copied());
    let reference_phones = ops.iter().filter(|op| op.expected().is_some()).count();
    Metrics {
        phoneme_error_rate: counts.errors() as f64 / reference_phones.max(1) as f64,
        substitutions: counts.substitutions,
        insertions: counts.insertions,
        deletions: counts.deletions,
        reference_phones,
    }
}

pub fn substitution_histogram<'a>(
    ops: impl IntoIterator<Item = &'a EditOp>,
) -> SubstitutionHistogram {
    let mut hist = SubstitutionHistogram::new();
    for op in ops {
        if let EditOp::Substitution {
            expected,
            predicted,
        } = op
        {
            *hist.entry(format!("{expected}→{predicted}")).or_default() += 1;
        }
    }
    hist
}

/// One record per distinct (rule, expected, predicted), in first-seen order.
/// Substitutions no rule claims are left out.
pub fn classify_mistakes<'a>(
    ops: impl IntoIterator<Item = &'a EditOp>,
    rules: &MistakeRules,
) -> Vec<MistakeRecord> {
    let mut records: Vec<MistakeRecord> = Vec::new();
    let mut slot: HashMap<(&str, &'a str, &'a str), usize> = HashMap::new();
    for op in ops {
        let EditOp::Substitution {
            expected,
            predicted,
        } = op
        else {
            continue;
        };
        let Some(rule) = rules.classify(expected, predicted) else {
            continue;
        };
        match slot.get(&(rule, expected.as_str(), predicted.as_str())) {
            Some(&idx) => records[idx].count += 1,
            None => {
                slot.insert((rule, expected.as_str(), predicted.as_str()), records.len());
                records.push(MistakeRecord {
                    rule: rule.to_string(),
                    expected: expected.clone(),
                    predicted: predicted.clone(),
                    count: 1,
                });
            }
        }
    }
    records
}
