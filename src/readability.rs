//! Automated Readability Index helpers.

/// Character-per-word coefficient of the ARI formula
const ARI_CHARS_PER_WORD: f64 = 4.71;
/// Word-per-sentence coefficient of the ARI formula
const ARI_WORDS_PER_SENTENCE: f64 = 0.5;
const ARI_INTERCEPT: f64 = -21.43;

/// Lowest and highest levels of the ARI grade table
pub const MIN_ARI_LEVEL: u8 = 1;
pub const MAX_ARI_LEVEL: u8 = 14;

/// Raw ARI score from character, word and sentence counts
///
/// Returns 0.0 when there are no words or no sentences so that a record with
/// incomplete counts still aggregates.
pub fn ari_raw(num_characters: f64, num_words: f64, num_sentences: f64) -> f64 {
    if num_words <= 0.0 || num_sentences <= 0.0 {
        return 0.0;
    }

    ARI_CHARS_PER_WORD * (num_characters / num_words)
        + ARI_WORDS_PER_SENTENCE * (num_words / num_sentences)
        + ARI_INTERCEPT
}

/// Map a raw ARI score onto the grade table (1 = kindergarten, 14 = graduate)
pub fn ari_years_education(ari_raw: f64) -> u8 {
    if !ari_raw.is_finite() {
        return MIN_ARI_LEVEL;
    }
    ari_raw
        .ceil()
        .clamp(MIN_ARI_LEVEL as f64, MAX_ARI_LEVEL as f64) as u8
}

/// Reader description for a level returned by [`ari_years_education`]
pub fn ari_grade_label(level: u8) -> &'static str {
    match level.clamp(MIN_ARI_LEVEL, MAX_ARI_LEVEL) {
        1 => "Kindergarten",
        2 => "First/Second Grade",
        3 => "Third Grade",
        4 => "Fourth Grade",
        5 => "Fifth Grade",
        6 => "Sixth Grade",
        7 => "Seventh Grade",
        8 => "Eighth Grade",
        9 => "Ninth Grade",
        10 => "Tenth Grade",
        11 => "Eleventh Grade",
        12 => "Twelfth Grade",
        13 => "College",
        _ => "Graduate",
    }
}
