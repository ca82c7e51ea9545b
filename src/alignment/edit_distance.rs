use crate::types::{EditOp, Phone};

/// One move through the DP table, read left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Consume one item from each side (match or substitution).
    Diagonal,
    /// Consume an expected item only.
    Delete,
    /// Consume a predicted item only.
    Insert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostPath {
    pub steps: Vec<Step>,
    pub cost: usize,
}

/// Minimum-cost alignment of `n` expected items against `m` predicted items.
///
/// Insertions and deletions cost 1; `diagonal_cost(i, j)` prices pairing
/// expected item `i` with predicted item `j` (0-based). On equal cost the
/// diagonal is preferred over a deletion, and a deletion over an insertion.
pub fn min_cost_path<F>(n: usize, m: usize, mut diagonal_cost: F) -> CostPath
where
    F: FnMut(usize, usize) -> usize,
{
    let width = m + 1;
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; width];
    let mut bp = vec![Step::Diagonal; (n + 1) * width];
    for cell in bp.iter_mut().take(width).skip(1) {
        *cell = Step::Insert;
    }

    for i in 1..=n {
        curr[0] = i;
        bp[i * width] = Step::Delete;
        for j in 1..=m {
            let diag = prev[j - 1] + diagonal_cost(i - 1, j - 1);
            let del = prev[j] + 1;
            let ins = curr[j - 1] + 1;
            let (best, step) = best_step(diag, del, ins);
            curr[j] = best;
            bp[i * width + j] = step;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let cost = prev[m];

    let mut steps = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let step = bp[i * width + j];
        match step {
            Step::Diagonal => {
                i -= 1;
                j -= 1;
            }
            Step::Delete => i -= 1,
            Step::Insert => j -= 1,
        }
        steps.push(step);
    }
    steps.reverse();

    CostPath { steps, cost }
}

#[inline(always)]
fn best_step(diag: usize, del: usize, ins: usize) -> (usize, Step) {
    let best = diag.min(del).min(ins);
    if best == diag {
        (best, Step::Diagonal)
    } else if best == del {
        (best, Step::Delete)
    } else {
        (best, Step::Insert)
    }
}

/// Levenshtein edit script between two phone sequences.
///
/// Expected-side tokens of the result, read in order, reproduce `expected`;
/// predicted-side tokens reproduce `predicted`.
pub fn levenshtein_ops(expected: &[Phone], predicted: &[Phone]) -> Vec<EditOp> {
    let path = min_cost_path(expected.len(), predicted.len(), |i, j| {
        usize::from(expected[i] != predicted[j])
    });
    ops_from_steps(&path.steps, expected, predicted)
}

fn ops_from_steps(
    steps: &[Step],
    expected: &[Phone],
    predicted: &[Phone],
) -> Vec<EditOp> {
    let mut exp = expected.iter();
    let mut pred = predicted.iter();
    steps
        .iter()
        .filter_map(|step| match step {
            Step::Diagonal => {
                let (e, p) = (exp.next()?.clone(), pred.next()?.clone());
                Some(if e == p {
                    EditOp::Match {
                        expected: e,
                        predicted: p,
                    }
                } else {
                    EditOp::Substitution {
                        expected: e,
                        predicted: p,
                    }
                })
            }
            Step::Delete => Some(EditOp::Deletion {
                expected: exp.next()?.clone(),
            }),
            Step::Insert => Some(EditOp::Insertion {
                predicted: pred.next()?.clone(),
            }),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditCounts {
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl EditCounts {
    pub fn errors(&self) -> usize {
        self.substitutions + self.insertions + self.deletions
    }
}

pub fn edit_counts<'a>(ops: impl IntoIterator<Item = &'a EditOp>) -> EditCounts {
    let mut counts = EditCounts::default();
    for op in ops {
        match op {
            EditOp::Substitution { .. } => counts.substitutions += 1,
            EditOp::Insertion { .. } => counts.insertions += 1,
            EditOp::Deletion { .. } => counts.deletions += 1,
            EditOp::Match { .. } => {}
        }
    }
    counts
}
