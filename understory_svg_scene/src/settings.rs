// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion settings.

use alloc::string::String;
use alloc::vec::Vec;

/// Options for one conversion.
///
/// ```
/// use understory_svg_scene::DrawingSettings;
///
/// let settings = DrawingSettings::default()
///     .with_include_runtime(true)
///     .with_languages(["fr", "en"]);
/// assert!(settings.include_runtime);
/// assert_eq!(settings.languages, ["fr", "en"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawingSettings {
    /// Tag scene nodes with the element id, unique id and class in addition
    /// to the display name.
    pub include_runtime: bool,
    /// Font family used when neither the font-family visitor nor the
    /// element's `font-family` list yields a name.
    pub default_font_family: String,
    /// User languages for `systemLanguage` tests, most preferred first.
    pub languages: Vec<String>,
    /// Maximum nesting of `use` instantiations.
    pub max_use_depth: usize,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            include_runtime: false,
            default_font_family: String::from("Arial"),
            languages: alloc::vec![String::from("en")],
            max_use_depth: 32,
        }
    }
}

impl DrawingSettings {
    /// Sets [`DrawingSettings::include_runtime`].
    #[must_use]
    pub fn with_include_runtime(mut self, include_runtime: bool) -> Self {
        self.include_runtime = include_runtime;
        self
    }

    /// Sets [`DrawingSettings::default_font_family`].
    #[must_use]
    pub fn with_default_font_family(mut self, family: &str) -> Self {
        self.default_font_family = String::from(family);
        self
    }

    /// Sets [`DrawingSettings::languages`].
    #[must_use]
    pub fn with_languages<'s>(mut self, languages: impl IntoIterator<Item = &'s str>) -> Self {
        self.languages = languages.into_iter().map(String::from).collect();
        self
    }

    /// Sets [`DrawingSettings::max_use_depth`].
    #[must_use]
    pub fn with_max_use_depth(mut self, depth: usize) -> Self {
        self.max_use_depth = depth;
        self
    }
}
