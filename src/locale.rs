//! Locale keys for resource resolution.
//!
//! A [`Locale`] identifies a language/region/variant combination and
//! converts to the filename stems searched inside a group folder. Locales
//! compare by value, so two independently parsed `en_US` keys share one
//! cache entry. The distinguished fallback locale has the fixed stem
//! `"default"`.

use std::fmt;
use std::str::FromStr;

use unic_langid::{LanguageIdentifier, LanguageIdentifierError};

/// A locale key with value equality over its parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locale {
    /// The fallback locale. Its filename stem is [`Locale::DEFAULT_STEM`].
    Default,
    /// A concrete language identifier such as `en_US` or `zh_Hant_TW`.
    Tag(LanguageIdentifier),
}

impl Locale {
    /// Filename stem of the fallback locale.
    pub const DEFAULT_STEM: &'static str = "default";

    /// The canonical filename stem, with underscore-separated parts
    /// (`en_US`, `zh_Hant_TW`). Stems become filenames, so the hyphenated
    /// BCP 47 spelling is not used here.
    pub fn stem(&self) -> String {
        match self {
            Locale::Default => Self::DEFAULT_STEM.to_string(),
            Locale::Tag(id) => id.to_string().replace('-', "_"),
        }
    }

    /// Filename stems from most to least specific, dropping variants,
    /// then region, then script: `en_US_posix` → `en_US` → `en`.
    ///
    /// The default [`LocaleGroup`](crate::LocaleGroup) strategy searches
    /// only the canonical stem; pass this as the variant strategy to get
    /// the richer chain.
    pub fn fallback_stems(&self) -> Vec<String> {
        let id = match self {
            Locale::Default => return vec![Self::DEFAULT_STEM.to_string()],
            Locale::Tag(id) => id,
        };

        let mut id = id.clone();
        let mut stems = vec![id.to_string().replace('-', "_")];
        if id.variants().count() > 0 {
            id.clear_variants();
            stems.push(id.to_string().replace('-', "_"));
        }
        if id.region.take().is_some() {
            stems.push(id.to_string().replace('-', "_"));
        }
        if id.script.take().is_some() {
            stems.push(id.to_string().replace('-', "_"));
        }
        stems
    }

    /// The language subtag, `None` for the default locale.
    pub fn language(&self) -> Option<String> {
        match self {
            Locale::Default => None,
            Locale::Tag(id) => Some(id.language.as_str().to_string()),
        }
    }

    /// The region subtag, if any.
    pub fn region(&self) -> Option<String> {
        match self {
            Locale::Default => None,
            Locale::Tag(id) => id.region.as_ref().map(|r| r.as_str().to_string()),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::Default
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}

impl FromStr for Locale {
    type Err = LanguageIdentifierError;

    /// Parses both the hyphenated (`en-US`) and the underscore (`en_US`)
    /// spellings. The literal `"default"` parses to the fallback locale.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(Self::DEFAULT_STEM) {
            return Ok(Locale::Default);
        }
        s.replace('_', "-")
            .parse::<LanguageIdentifier>()
            .map(Locale::Tag)
    }
}

impl From<LanguageIdentifier> for Locale {
    fn from(id: LanguageIdentifier) -> Self {
        Locale::Tag(id)
    }
}
