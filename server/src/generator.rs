//! Question generation and answer checking.

use quiz::{ModeParams, OpKind, Question, Verdict};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// Distractors are drawn from this window around the correct answer.
const DISTRACTOR_SPREAD: i64 = 12;
/// Every question carries this many answer options.
const OPTION_COUNT: usize = 3;

/// Generate one question for the given mode parameters.
///
/// Out-of-contract parameters are normalized rather than rejected: reversed
/// table ranges are swapped, digit counts are kept within i64 territory, and
/// a question always has at least two operands.
pub fn generate(params: &ModeParams) -> Question {
    let mut rng = rand::thread_rng();

    let operands: Vec<i64> = match *params {
        ModeParams::Multiply {
            start_table,
            end_table,
        } => {
            let (lo, hi) = if start_table > end_table {
                (end_table, start_table)
            } else {
                (start_table, end_table)
            };
            let lo = lo.max(1);
            let hi = hi.max(lo);
            vec![
                i64::from(rng.gen_range(lo..=hi)),
                i64::from(rng.gen_range(1..=10u32)),
            ]
        }
        ModeParams::Add { digits, term_count } => {
            let digits = digits.clamp(1, 9);
            let terms = term_count.max(2);
            let lo = 10_i64.pow(digits - 1);
            let hi = 10_i64.pow(digits) - 1;
            // Single-digit addition includes 1 (not 10^0 = 1 anyway).
            (0..terms).map(|_| rng.gen_range(lo..=hi)).collect()
        }
    };

    let answer = correct_answer(params.kind(), &operands);
    let options = build_options(&mut rng, answer);

    Question { operands, options }
}

/// The correct answer the options are built around plus unique distractors
/// near it, shuffled.
fn build_options(rng: &mut impl Rng, answer: i64) -> Vec<i64> {
    let mut options = BTreeSet::from([answer]);
    let lo = (answer - DISTRACTOR_SPREAD).max(1);
    let hi = answer + DISTRACTOR_SPREAD;
    while options.len() < OPTION_COUNT {
        options.insert(rng.gen_range(lo..=hi));
    }

    let mut options: Vec<i64> = options.into_iter().collect();
    options.shuffle(rng);
    options
}

pub fn correct_answer(mode: OpKind, operands: &[i64]) -> i64 {
    match mode {
        OpKind::Add => operands.iter().sum(),
        OpKind::Multiply => operands.iter().product(),
    }
}

/// Verdict for a candidate answer against the recomputed correct value.
pub fn check(mode: OpKind, operands: &[i64], answer: i64) -> Verdict {
    let correct_answer = correct_answer(mode, operands);
    Verdict {
        correct: answer == correct_answer,
        correct_answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_operands_stay_in_range() {
        let params = ModeParams::Multiply {
            start_table: 3,
            end_table: 6,
        };
        for _ in 0..200 {
            let q = generate(&params);
            assert_eq!(q.operands.len(), 2);
            assert!((3..=6).contains(&q.operands[0]), "got {}", q.operands[0]);
            assert!((1..=10).contains(&q.operands[1]), "got {}", q.operands[1]);
        }
    }

    #[test]
    fn reversed_table_range_is_swapped() {
        let params = ModeParams::Multiply {
            start_table: 12,
            end_table: 2,
        };
        for _ in 0..200 {
            let q = generate(&params);
            assert!((2..=12).contains(&q.operands[0]));
        }
    }

    #[test]
    fn addition_respects_digits_and_terms() {
        let params = ModeParams::Add {
            digits: 2,
            term_count: 4,
        };
        for _ in 0..200 {
            let q = generate(&params);
            assert_eq!(q.operands.len(), 4);
            for operand in &q.operands {
                assert!((10..=99).contains(operand), "got {operand}");
            }
        }
    }

    #[test]
    fn single_term_addition_is_bumped_to_two() {
        let params = ModeParams::Add {
            digits: 1,
            term_count: 1,
        };
        let q = generate(&params);
        assert!(q.operands.len() >= 2);
    }

    #[test]
    fn options_contain_the_answer_and_are_unique() {
        let params = ModeParams::Multiply {
            start_table: 2,
            end_table: 12,
        };
        for _ in 0..200 {
            let q = generate(&params);
            assert_eq!(q.options.len(), 3);
            let answer: i64 = q.operands.iter().product();
            assert!(q.options.contains(&answer));

            let mut unique = q.options.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), 3, "duplicate options in {:?}", q.options);
        }
    }

    #[test]
    fn distractors_stay_near_the_answer_and_positive() {
        let params = ModeParams::Multiply {
            start_table: 1,
            end_table: 2,
        };
        for _ in 0..200 {
            let q = generate(&params);
            let answer: i64 = q.operands.iter().product();
            for option in &q.options {
                assert!(*option >= 1);
                assert!((option - answer).abs() <= DISTRACTOR_SPREAD);
            }
        }
    }

    #[test]
    fn check_verdicts() {
        let verdict = check(OpKind::Multiply, &[3, 7], 21);
        assert!(verdict.correct);
        assert_eq!(verdict.correct_answer, 21);

        let verdict = check(OpKind::Multiply, &[3, 7], 22);
        assert!(!verdict.correct);
        assert_eq!(verdict.correct_answer, 21);

        let verdict = check(OpKind::Add, &[12, 5, 9], 26);
        assert!(verdict.correct);
    }
}
