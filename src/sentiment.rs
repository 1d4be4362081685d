// Lexicon-based headline sentiment
use std::collections::HashSet;

const POSITIVE_WORDS: &[&str] = &[
    "bullish", "rally", "rallies", "surge", "surges", "soar", "soars", "gain", "gains", "profit",
    "growth", "beat", "beats", "upgrade", "upgraded", "outperform", "strong", "positive", "rise",
    "rises", "increase", "breakthrough", "innovation", "success", "exceed", "exceeds", "momentum",
    "buy", "recommend", "optimistic", "record", "high", "advance", "dividend", "buyback",
    "repurchase", "upside", "recovery", "rebound", "expansion", "robust", "accelerating",
    "overweight", "raised", "tailwind", "win", "wins", "jump", "jumps",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bearish", "decline", "declines", "loss", "losses", "fall", "falls", "plunge", "plunges",
    "crash", "miss", "misses", "downgrade", "downgraded", "underperform", "weak", "negative",
    "drop", "drops", "decrease", "concern", "concerns", "risk", "fail", "fails", "disappoint",
    "disappoints", "slump", "sell", "warning", "pessimistic", "low", "retreat", "fear", "trouble",
    "dilution", "headwind", "lawsuit", "litigation", "recall", "investigation", "probe", "default",
    "bankruptcy", "layoff", "layoffs", "downside", "overvalued", "bubble", "underweight",
    "lowered", "suspended", "weighs", "tumble", "tumbles", "slide", "slides",
];

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't", "wasn't", "weren't",
    "won't", "wouldn't", "couldn't", "shouldn't", "hardly", "barely", "neither", "nor", "without",
];

/// A negation flips polarity for this many following words.
const NEGATION_WINDOW: usize = 3;

/// Normalization constant mapping raw scores into (-1, 1).
const NORMALIZATION_ALPHA: f64 = 15.0;

pub struct SentimentScorer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negation: HashSet<&'static str>,
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negation: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    fn raw_score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')'))
            .filter(|w| !w.is_empty())
            .collect();

        let mut last_negation: Option<usize> = None;
        let mut score = 0i32;
        for (i, word) in words.iter().enumerate() {
            if self.negation.contains(word) {
                last_negation = Some(i);
                continue;
            }
            let polarity = if self.positive.contains(word) {
                1
            } else if self.negative.contains(word) {
                -1
            } else {
                continue;
            };
            let negated = last_negation.is_some_and(|n| i - n <= NEGATION_WINDOW);
            score += if negated { -polarity } else { polarity };
        }
        score as f64
    }

    /// Compound score in [-1, 1]; 0 for neutral or empty text.
    pub fn score(&self, text: &str) -> f64 {
        let raw = self.raw_score(text);
        if raw == 0.0 {
            return 0.0;
        }
        raw / (raw * raw + NORMALIZATION_ALPHA).sqrt()
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}
