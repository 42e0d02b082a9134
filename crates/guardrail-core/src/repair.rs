//! Additive answer repair.
//!
//! A repair never rewrites the answer. It retrieves supporting passages for
//! the question (and, optionally, for each sub-question the answer skipped),
//! stitches their leading sentences together with citations and appends the
//! result as a clearly delimited section.

use crate::coverage::decompose;
use crate::policy::RepairConfig;
use crate::retrieval::{pick_passages, LexicalRanker};
use crate::text::normalize;
use crate::types::Passage;

/// Missing parts listed in the repair section.
const MISSING_PARTS_LISTED: usize = 5;

const REPAIR_HEADER: &str = "\n\n**Auto-repair applied:**\n";
const MISSING_HEADER: &str = "**Missing parts identified:**\n";
const CONTENT_HEADER: &str = "**Added grounded content:**\n";
const RATIONALE: &str = "\n\n*Why this changed: Answer was missing key information from sources. Added relevant passages with citations.*";

/// The leading `n` sentences of `text`.
///
/// Sentences end after `.`, `!` or `?` followed by whitespace; the text is
/// trimmed first and empty pieces are skipped.
pub fn first_sentences(text: &str, n: usize) -> Vec<&str> {
    let text = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        let mut next = end;
        while let Some(&(j, ws)) = chars.peek() {
            if !ws.is_whitespace() {
                break;
            }
            next = j + ws.len_utf8();
            chars.next();
        }
        if next > end {
            sentences.push(&text[start..end]);
            start = next;
        }
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .filter(|s| !s.is_empty())
        .take(n)
        .collect()
}

/// Stitch leading sentences from `passages` into one paragraph.
///
/// Each passage contributes up to the sentences still needed to reach
/// `max_sentences` (at least one), tagged with its citation when
/// `add_citations` is set.
pub fn summarize_from_passages(
    passages: &[&Passage],
    max_sentences: usize,
    add_citations: bool,
) -> String {
    let mut chosen: Vec<String> = Vec::new();

    'passages: for passage in passages {
        let wanted = max_sentences.saturating_sub(chosen.len()).max(1);
        for sentence in first_sentences(&passage.text, wanted) {
            let sentence = if add_citations {
                format!("{} {}", sentence, passage.citation())
            } else {
                sentence.to_string()
            };
            chosen.push(sentence);
            if chosen.len() >= max_sentences {
                break 'passages;
            }
        }
    }

    chosen.join(" ").trim().to_string()
}

/// Outcome of a repair attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Repair {
    /// The answer with the repair section appended, or the original answer
    pub answer: String,

    /// Coverage gaps plus sub-questions the answer does not mention
    pub missing_parts: Vec<String>,

    /// Whether a section was appended
    pub applied: bool,
}

/// Passages gathered for a repair, in stitching order.
struct Gathered<'a> {
    passages: Vec<&'a Passage>,
    missing_parts: Vec<String>,
}

/// Repairs answers by appending grounded content.
#[derive(Debug, Clone)]
pub struct Repairer<'a> {
    config: &'a RepairConfig,
}

impl<'a> Repairer<'a> {
    pub fn new(config: &'a RepairConfig) -> Self {
        Self { config }
    }

    /// Repair `answer` using an index already built over `passages`.
    ///
    /// `coverage_missing` seeds the missing-parts list.
    pub fn repair(
        &self,
        question: &str,
        answer: &str,
        passages: &[Passage],
        ranker: &LexicalRanker,
        coverage_missing: &[String],
    ) -> Repair {
        let gathered = self.gather(question, answer, passages, ranker, coverage_missing);
        let unchanged = |missing_parts: Vec<String>| Repair {
            answer: answer.to_string(),
            missing_parts,
            applied: false,
        };

        if gathered.passages.is_empty() {
            return unchanged(gathered.missing_parts);
        }

        let stitched = summarize_from_passages(
            &gathered.passages,
            self.config.max_sentences,
            self.config.add_citations,
        );
        if stitched.is_empty() || answer.contains(&stitched) {
            return unchanged(gathered.missing_parts);
        }

        let mut repaired = String::with_capacity(answer.len() + stitched.len() + 256);
        repaired.push_str(answer);
        repaired.push_str(REPAIR_HEADER);
        if !gathered.missing_parts.is_empty() {
            repaired.push_str(MISSING_HEADER);
            for part in gathered.missing_parts.iter().take(MISSING_PARTS_LISTED) {
                repaired.push_str("  • ");
                repaired.push_str(part);
                repaired.push('\n');
            }
            repaired.push('\n');
        }
        repaired.push_str(CONTENT_HEADER);
        repaired.push_str(&stitched);
        repaired.push_str(RATIONALE);

        Repair {
            answer: repaired,
            missing_parts: gathered.missing_parts,
            applied: true,
        }
    }

    /// General support for the question, then targeted support for each
    /// sub-question the answer skipped. Duplicates are kept.
    fn gather<'p>(
        &self,
        question: &str,
        answer: &str,
        passages: &'p [Passage],
        ranker: &LexicalRanker,
        coverage_missing: &[String],
    ) -> Gathered<'p> {
        let mode = self.config.retriever_mode;
        let support = pick_passages(
            passages,
            &ranker.top_ids(question, mode, self.config.top_k),
        );

        let seed = Gathered {
            passages: support,
            missing_parts: coverage_missing.to_vec(),
        };
        if !self.config.add_missing_parts {
            return seed;
        }

        let answer_norm = normalize(answer);
        let targeted_k = (self.config.top_k / 2).max(1);

        decompose(question)
            .into_iter()
            .filter(|sub| !answer_norm.contains(sub.as_str()))
            .fold(seed, |mut acc, sub| {
                let ids = ranker.top_ids(&sub, mode, targeted_k);
                acc.passages.extend(pick_passages(passages, &ids));
                if !acc.missing_parts.contains(&sub) {
                    acc.missing_parts.push(sub);
                }
                acc
            })
    }
}

/// Repair an answer with a fresh index over `passages`.
pub fn repair_answer(
    question: &str,
    answer: &str,
    passages: &[Passage],
    config: &RepairConfig,
    coverage_missing: &[String],
) -> Repair {
    let ranker = LexicalRanker::new(passages);
    Repairer::new(config).repair(question, answer, passages, &ranker, coverage_missing)
}
