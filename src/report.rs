use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::types::{
    AlignedWord, AlignmentMode, AssessmentInput, AssessmentOutput, Metrics, MistakeRecord,
    SubstitutionHistogram,
};

pub const REPORT_SCHEMA_VERSION: u32 = 1;
const WORST_CASES_TOP_N: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub reference: String,
    pub reference_words: Vec<String>,
    pub transcription: String,
    pub word_alignments: Vec<AlignedWord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inserted_words: Vec<AlignedWord>,
    pub metrics: Metrics,
    pub substitution_histogram: SubstitutionHistogram,
    pub mistakes: Vec<MistakeRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub case_id: String,
    pub generated_at: String,
    pub tool_version: String,
    pub mode: AlignmentMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub schema_version: u32,
    pub generated_at: String,
    pub tool_version: String,
    pub counts: BatchCounts,
    /// Errors over reference phones pooled across every assessed case.
    pub metrics: Metrics,
    pub mean_case_per: Option<f64>,
    pub substitution_histogram: SubstitutionHistogram,
    pub mistakes: Vec<MistakeRecord>,
    pub worst_cases: Vec<CaseEntry>,
    pub failures: Vec<CaseFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchCounts {
    pub total: usize,
    pub assessed: usize,
    pub failed: usize,
    pub word_mode: usize,
    pub utterance_mode: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseEntry {
    pub id: String,
    pub phoneme_error_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseFailure {
    pub id: String,
    pub error: String,
}

pub fn build_report(
    case_id: &str,
    input: &AssessmentInput,
    output: AssessmentOutput,
    generated_at: String,
) -> Report {
    Report {
        schema_version: REPORT_SCHEMA_VERSION,
        meta: Meta {
            case_id: case_id.to_string(),
            generated_at,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            mode: output.mode,
        },
        reference: input.reference.clone(),
        reference_words: output.reference_words,
        transcription: input.transcription.ipa_text.clone(),
        word_alignments: output.words,
        inserted_words: output.inserted,
        metrics: output.metrics,
        substitution_histogram: output.substitution_histogram,
        mistakes: output.mistakes,
    }
}

pub fn aggregate_reports(
    reports: &[Report],
    failures: Vec<CaseFailure>,
    generated_at: String,
) -> BatchSummary {
    let mut metrics = Metrics::default();
    let mut histogram = SubstitutionHistogram::new();
    let mut mistakes: Vec<MistakeRecord> = Vec::new();
    let mut slot: HashMap<(&str, &str, &str), usize> = HashMap::new();

    for report in reports {
        metrics.substitutions += report.metrics.substitutions;
        metrics.insertions += report.metrics.insertions;
        metrics.deletions += report.metrics.deletions;
        metrics.reference_phones += report.metrics.reference_phones;
        for (pair, count) in &report.substitution_histogram {
            *histogram.entry(pair.clone()).or_default() += count;
        }
        for record in &report.mistakes {
            let key = (
                record.rule.as_str(),
                record.expected.as_str(),
                record.predicted.as_str(),
            );
            match slot.get(&key) {
                Some(&idx) => mistakes[idx].count += record.count,
                None => {
                    slot.insert(key, mistakes.len());
                    mistakes.push(record.clone());
                }
            }
        }
    }
    let errors = metrics.substitutions + metrics.insertions + metrics.deletions;
    metrics.phoneme_error_rate = errors as f64 / metrics.reference_phones.max(1) as f64;

    let mean_case_per = (!reports.is_empty()).then(|| {
        reports
            .iter()
            .map(|r| r.metrics.phoneme_error_rate)
            .sum::<f64>()
            / reports.len() as f64
    });
    let word_mode = reports
        .iter()
        .filter(|r| r.meta.mode == AlignmentMode::Word)
        .count();

    BatchSummary {
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at,
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        counts: BatchCounts {
            total: reports.len() + failures.len(),
            assessed: reports.len(),
            failed: failures.len(),
            word_mode,
            utterance_mode: reports.len() - word_mode,
        },
        metrics,
        mean_case_per,
        substitution_histogram: histogram,
        mistakes,
        worst_cases: worst_cases(reports, WORST_CASES_TOP_N),
        failures,
    }
}

fn worst_cases(reports: &[Report], top_n: usize) -> Vec<CaseEntry> {
    let mut entries: Vec<CaseEntry> = reports
        .iter()
        .filter(|r| r.metrics.phoneme_error_rate > 0.0)
        .map(|r| CaseEntry {
            id: r.meta.case_id.clone(),
            phoneme_error_rate: r.metrics.phoneme_error_rate,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.phoneme_error_rate
            .partial_cmp(&a.phoneme_error_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    entries.truncate(top_n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transcription;

    fn report(
        id: &str,
        mode: AlignmentMode,
        metrics: Metrics,
        mistakes: Vec<MistakeRecord>,
    ) -> Report {
        let mut histogram = SubstitutionHistogram::new();
        for m in &mistakes {
            *histogram
                .entry(format!("{}→{}", m.expected, m.predicted))
                .or_default() += m.count;
        }
        let output = AssessmentOutput {
            mode,
            reference_words: vec!["w".to_string()],
            words: Vec::new(),
            inserted: Vec::new(),
            metrics,
            substitution_histogram: histogram,
            mistakes,
        };
        build_report(id, &AssessmentInput::default(), output, "t0".to_string())
    }

    fn metrics(s: usize, i: usize, d: usize, reference: usize) -> Metrics {
        Metrics {
            phoneme_error_rate: (s + i + d) as f64 / reference.max(1) as f64,
            substitutions: s,
            insertions: i,
            deletions: d,
            reference_phones: reference,
        }
    }

    fn voicing(count: usize) -> MistakeRecord {
        MistakeRecord {
            rule: "VOICING_ERROR_FRICATIVE".to_string(),
            expected: "z".to_string(),
            predicted: "s".to_string(),
            count,
        }
    }

    #[test]
    fn build_report_carries_case_data() {
        let input = AssessmentInput {
            reference: "zoo".to_string(),
            expected_ipa_words: vec!["zuː".to_string()],
            transcription: Transcription {
                ipa_text: "suː".to_string(),
                words: Vec::new(),
            },
        };
        let output = AssessmentOutput {
            mode: AlignmentMode::Word,
            reference_words: vec!["zoo".to_string()],
            words: Vec::new(),
            inserted: Vec::new(),
            metrics: metrics(1, 0, 0, 2),
            substitution_histogram: SubstitutionHistogram::new(),
            mistakes: vec![voicing(1)],
        };
        let report = build_report("case-1", &input, output, "2024-01-01T00:00:00Z".to_string());
        assert_eq!(report.schema_version, REPORT_SCHEMA_VERSION);
        assert_eq!(report.meta.case_id, "case-1");
        assert_eq!(report.transcription, "suː");

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["meta"]["mode"], "word");
        assert!(json.get("inserted_words").is_none());
        assert_eq!(json["mistakes"][0]["rule"], "VOICING_ERROR_FRICATIVE");
    }

    #[test]
    fn aggregate_pools_errors_and_merges_mistakes() {
        let reports = vec![
            report("a", AlignmentMode::Word, metrics(1, 0, 0, 2), vec![voicing(1)]),
            report("b", AlignmentMode::Utterance, metrics(2, 1, 1, 8), vec![voicing(2)]),
            report("c", AlignmentMode::Word, metrics(0, 0, 0, 4), Vec::new()),
        ];
        let failures = vec![CaseFailure {
            id: "d".to_string(),
            error: "bad".to_string(),
        }];
        let summary = aggregate_reports(&reports, failures, "t1".to_string());

        assert_eq!(summary.counts.total, 4);
        assert_eq!(summary.counts.assessed, 3);
        assert_eq!(summary.counts.failed, 1);
        assert_eq!(summary.counts.word_mode, 2);
        assert_eq!(summary.counts.utterance_mode, 1);
        assert_eq!(summary.metrics.reference_phones, 14);
        assert!((summary.metrics.phoneme_error_rate - 5.0 / 14.0).abs() < 1e-12);
        let mean = summary.mean_case_per.expect("mean");
        assert!((mean - (0.5 + 0.5 + 0.0) / 3.0).abs() < 1e-12);

        assert_eq!(summary.mistakes.len(), 1);
        assert_eq!(summary.mistakes[0].count, 3);
        assert_eq!(summary.substitution_histogram["z→s"], 3);

        let ids: Vec<&str> = summary.worst_cases.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn aggregate_of_nothing_is_empty() {
        let summary = aggregate_reports(&[], Vec::new(), "t2".to_string());
        assert_eq!(summary.counts.total, 0);
        assert!(summary.mean_case_per.is_none());
        assert_eq!(summary.metrics.phoneme_error_rate, 0.0);
        assert!(summary.worst_cases.is_empty());
    }
}
