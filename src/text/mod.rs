//! Text normalization shared by answer signatures and typo scoring.

pub mod stop_words;

pub use stop_words::StopWords;

/// How whitespace is treated by [`normalize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Keep word boundaries intact; tokenization runs on this output
    Tokenizing,
    /// Drop every whitespace character, turning a phrase into one token
    Collapsed,
}

/// Fold a single lower-case letter to its base Latin form.
///
/// The table covers the full diacritic alphabet of the supported language.
fn fold_diacritic(c: char) -> char {
    match c {
        'ą' => 'a',
        'ć' => 'c',
        'ę' => 'e',
        'ł' => 'l',
        'ń' => 'n',
        'ó' => 'o',
        'ś' => 's',
        'ź' => 'z',
        'ż' => 'z',
        other => other,
    }
}

/// Lower-case `text`, fold diacritics and apply the whitespace rule of `mode`.
///
/// Case folding uses Unicode's default (locale-invariant) mapping. Characters
/// outside the diacritic table pass through unchanged after folding.
pub fn normalize(text: &str, mode: NormalizeMode) -> String {
    let folded = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic);

    match mode {
        NormalizeMode::Tokenizing => folded.collect::<String>().trim().to_string(),
        NormalizeMode::Collapsed => folded.filter(|c| !c.is_whitespace()).collect(),
    }
}
