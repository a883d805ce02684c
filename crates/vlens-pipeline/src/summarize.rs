//! Extractive summarization.
//!
//! `LsaSummarizer` ranks sentences by latent semantic analysis: a term ×
//! sentence matrix with smoothed term frequencies is decomposed, and each
//! sentence is scored by its weight across the strongest singular vectors.

use std::collections::HashMap;

use ndarray::{Array1, Array2};
use tracing::debug;
use vlens_media::Summarizer;
use vlens_models::sentinel::{self, NO_SPEECH, SPEECH_ERROR};

const POWER_ITERATIONS: usize = 200;
const CONVERGENCE_EPS: f64 = 1e-10;

/// Latent semantic analysis sentence ranker.
#[derive(Debug, Clone)]
pub struct LsaSummarizer {
    /// Singular triplets used for ranking
    dimensions: usize,
}

impl Default for LsaSummarizer {
    fn default() -> Self {
        Self { dimensions: 3 }
    }
}

impl LsaSummarizer {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Sentence indices ordered by descending rank, ties in document order.
    fn rank(&self, sentences: &[String]) -> Vec<usize> {
        let tokens: Vec<Vec<String>> = sentences.iter().map(|s| tokenize(s)).collect();
        let matrix = term_matrix(&tokens);
        let scores = lsa_scores(&matrix, self.dimensions);

        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
    }
}

impl Summarizer for LsaSummarizer {
    fn summarize(&self, text: &str, sentences: usize) -> Vec<String> {
        let all = split_sentences(text);
        if all.is_empty() || sentences == 0 {
            return Vec::new();
        }

        let order = self.rank(&all);
        debug!(sentences = all.len(), keep = sentences, "Ranked sentences");

        order
            .into_iter()
            .take(sentences)
            .map(|i| all[i].clone())
            .collect()
    }

    fn name(&self) -> &'static str {
        "lsa"
    }
}

/// Summarize a transcript, passing speech sentinels through unchanged.
pub fn summarize_transcript(summarizer: &dyn Summarizer, transcript: &str, sentences: usize) -> String {
    if sentinel::is_no_speech(transcript) {
        return NO_SPEECH.to_string();
    }
    if transcript.trim() == SPEECH_ERROR {
        return SPEECH_ERROR.to_string();
    }

    summarizer.summarize(transcript, sentences).join(" ")
}

/// Split on `.`, `!` and `?`, keeping the terminator with its sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            // keep runs like "?!" or "..." together
            while let Some(&next) = chars.peek() {
                if !matches!(next, '.' | '!' | '?') {
                    break;
                }
                current.push(next);
                chars.next();
            }
            push_sentence(&mut sentences, &mut current);
        }
    }
    push_sentence(&mut sentences, &mut current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let sentence = current.trim();
    if sentence.chars().any(char::is_alphanumeric) {
        sentences.push(sentence.to_string());
    }
    current.clear();
}

fn tokenize(sentence: &str) -> Vec<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Term × sentence matrix of smoothed frequencies `0.4 + 0.6 * tf / max_tf`.
fn term_matrix(sentences: &[Vec<String>]) -> Array2<f64> {
    let mut vocabulary: HashMap<&str, usize> = HashMap::new();
    for word in sentences.iter().flatten() {
        let next = vocabulary.len();
        vocabulary.entry(word.as_str()).or_insert(next);
    }

    let mut matrix = Array2::<f64>::zeros((vocabulary.len(), sentences.len()));
    for (col, words) in sentences.iter().enumerate() {
        for word in words {
            if let Some(&row) = vocabulary.get(word.as_str()) {
                matrix[[row, col]] += 1.0;
            }
        }
    }

    let max_tf = matrix.iter().cloned().fold(0.0, f64::max);
    if max_tf > 0.0 {
        matrix.mapv_inplace(|tf| if tf > 0.0 { 0.4 + 0.6 * tf / max_tf } else { 0.0 });
    }
    matrix
}

/// Rank score per sentence: `sqrt(sum_k sigma_k^2 * v_k[s]^2)` over the top
/// `dimensions` right singular vectors.
///
/// The right singular vectors of `A` are the eigenvectors of `AᵀA` with
/// eigenvalues `sigma^2`; they are found by power iteration with deflation.
fn lsa_scores(matrix: &Array2<f64>, dimensions: usize) -> Vec<f64> {
    let n = matrix.ncols();
    let mut gram = matrix.t().dot(matrix);
    let mut scores = Array1::<f64>::zeros(n);

    for _ in 0..dimensions.min(n) {
        let Some((eigenvalue, vector)) = dominant_eigenpair(&gram) else {
            break;
        };
        scores += &(vector.mapv(|v| v * v) * eigenvalue);

        // deflate: G -= λ v vᵀ
        let column = vector.view().insert_axis(ndarray::Axis(1));
        let row = vector.view().insert_axis(ndarray::Axis(0));
        gram -= &(column.dot(&row) * eigenvalue);
    }

    scores.iter().map(|s| s.max(0.0).sqrt()).collect()
}

fn dominant_eigenpair(gram: &Array2<f64>) -> Option<(f64, Array1<f64>)> {
    let n = gram.nrows();
    if n == 0 {
        return None;
    }

    // deterministic, non-symmetric start so it is unlikely to be orthogonal
    // to the dominant eigenvector
    let mut vector = Array1::from_iter((0..n).map(|i| 1.0 + i as f64 * 1e-3));
    let norm = vector.dot(&vector).sqrt();
    vector /= norm;

    for _ in 0..POWER_ITERATIONS {
        let next = gram.dot(&vector);
        let norm = next.dot(&next).sqrt();
        if norm < CONVERGENCE_EPS {
            return None;
        }
        let next = next / norm;
        let delta = (&next - &vector).mapv(f64::abs).sum();
        vector = next;
        if delta < CONVERGENCE_EPS {
            break;
        }
    }

    let eigenvalue = vector.dot(&gram.dot(&vector));
    (eigenvalue > CONVERGENCE_EPS).then_some((eigenvalue, vector))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Hello there. How are you?! Fine... thanks"),
            vec!["Hello there.", "How are you?!", "Fine...", "thanks"]
        );
        assert!(split_sentences("  ...  ").is_empty());
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("It's a Test, OK?"), vec!["it's", "a", "test", "ok"]);
    }

    #[test]
    fn test_empty_transcript_is_no_speech() {
        let summarizer = LsaSummarizer::default();
        assert_eq!(summarize_transcript(&summarizer, "", 3), "No speech detected.");
        assert_eq!(summarize_transcript(&summarizer, "   ", 3), "No speech detected.");
        assert_eq!(
            summarize_transcript(&summarizer, "No speech detected.", 3),
            "No speech detected."
        );
        assert_eq!(
            summarize_transcript(&summarizer, "Error processing speech.", 3),
            "Error processing speech."
        );
    }

    #[test]
    fn test_short_text_returns_all_sentences() {
        let summarizer = LsaSummarizer::default();
        let summary = summarizer.summarize("the cat sat. the dog ran.", 3);
        assert_eq!(summary.len(), 2);
        assert!(summary.contains(&"the cat sat.".to_string()));
        assert!(summary.contains(&"the dog ran.".to_string()));
    }

    #[test]
    fn test_unpunctuated_transcript_is_one_sentence() {
        let summarizer = LsaSummarizer::default();
        let text = "hi there world";
        assert_eq!(summarize_transcript(&summarizer, text, 3), "hi there world");
    }

    #[test]
    fn test_most_central_sentence_ranks_first() {
        let text = "Zeta. Alpha beta gamma. Alpha beta gamma delta.";
        let summary = LsaSummarizer::new(1).summarize(text, 1);
        assert_eq!(summary, vec!["Alpha beta gamma delta."]);
    }

    #[test]
    fn test_returns_requested_number_of_distinct_sentences() {
        let text = "The rocket launch was delayed. Engineers checked the engines. \
                    My cat likes fish. The launch team is ready. Pizza is tasty.";
        let summary = LsaSummarizer::default().summarize(text, 3);

        assert_eq!(summary.len(), 3);
        let mut unique = summary.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert!(summary.iter().all(|s| text.contains(s.as_str())));
    }

    #[test]
    fn test_scores_match_column_norms_at_full_rank() {
        let matrix = term_matrix(&[
            tokenize("a b c"),
            tokenize("a a d"),
            tokenize("e"),
        ]);
        let scores = lsa_scores(&matrix, 3);
        for (col, score) in scores.iter().enumerate() {
            let norm = matrix.column(col).dot(&matrix.column(col)).sqrt();
            assert!((score - norm).abs() < 1e-6, "col {col}: {score} vs {norm}");
        }
    }
}
