//! Study-question parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::coverage::{Coverage, CoverageKind};
use crate::text::clean_text;

static LETTERED_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]\)\s+?\S+?").unwrap());
static LETTERED_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z]\)\s+?").unwrap());
static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

/// A study question and the paragraphs it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub type_of_p_coverage: CoverageKind,
    /// Covered paragraphs as printed, without the trailing period.
    pub p_covered: String,
    /// Question text without the coverage token.
    pub text: String,
    /// Number of answers expected: the lettered count when above one, else 1.
    pub logical_q_count: usize,
    pub lettered_q_count: usize,
    #[serde(default)]
    pub lettered_question_texts: Vec<String>,
    /// Contents of every parenthesized note, e.g. `"vea también la imagen"`.
    #[serde(default)]
    pub references: Vec<String>,
}

impl Question {
    /// Builds a question from its bold coverage token and the full element text.
    ///
    /// ```rust
    /// use wolstudy_core::Question;
    ///
    /// let q = Question::parse("3, 4.", "3, 4. a) ¿Qué hizo Noé? b) ¿Por qué? (Vea la imagen).");
    /// assert_eq!(q.p_covered, "3, 4");
    /// assert_eq!(q.logical_q_count, 2);
    /// assert_eq!(q.references, vec!["Vea la imagen"]);
    /// ```
    pub fn parse(token: &str, full_text: &str) -> Self {
        let coverage = Coverage::classify(token);
        let text = if token.is_empty() {
            full_text.to_string()
        } else {
            full_text.replacen(&format!("{} ", token), "", 1)
        };

        let lettered_q_count = LETTERED_MARKER.find_iter(&text).count();
        let references: Vec<String> = PARENTHESIZED
            .captures_iter(&text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect();

        let lettered_question_texts = if lettered_q_count > 0 {
            LETTERED_SPLIT
                .split(&text)
                .map(|piece| {
                    let stripped = references
                        .iter()
                        .fold(piece.to_string(), |acc, r| acc.replacen(&format!("({})", r), "", 1));
                    clean_text(&stripped)
                })
                .filter(|piece| !piece.is_empty())
                .collect()
        } else {
            Vec::new()
        };

        Self {
            type_of_p_coverage: coverage.kind,
            p_covered: coverage.reference,
            text,
            logical_q_count: if lettered_q_count > 1 { lettered_q_count } else { 1 },
            lettered_q_count,
            lettered_question_texts,
            references,
        }
    }

    /// The coverage token this question was parsed from.
    pub fn coverage(&self) -> Coverage {
        Coverage { kind: self.type_of_p_coverage, reference: self.p_covered.clone() }
    }

    /// Paragraph numbers this question covers.
    pub fn paragraphs(&self) -> Vec<u32> {
        self.coverage().paragraphs()
    }

    pub fn is_lettered(&self) -> bool {
        self.logical_q_count > 1
    }
}
