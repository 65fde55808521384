//! Closed selector enumerations and the per-mode tuning they carry.
//!
//! Every selector resolves from its public slug and silently falls back to
//! its default when the slug is unknown. Serde goes through the same path so
//! a stale config file never fails to load.

use serde::{Deserialize, Serialize};

macro_rules! selector {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($slug:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            #[default]
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in cycling order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn slug(self) -> &'static str {
                match self {
                    $(Self::$variant => $slug),+
                }
            }

            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Resolve a slug, falling back to the default variant.
            #[must_use]
            pub fn from_slug(slug: &str) -> Self {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.slug().eq_ignore_ascii_case(slug.trim()))
                    .unwrap_or_default()
            }

            /// Next variant in cycling order, wrapping around.
            #[must_use]
            pub fn next(self) -> Self {
                let index = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
                Self::ALL[(index + 1) % Self::ALL.len()]
            }
        }

        impl From<String> for $name {
            fn from(slug: String) -> Self {
                Self::from_slug(&slug)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.slug().to_owned()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.slug())
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::from_slug(s))
            }
        }
    };
}

selector! {
    /// How the heads move and how often glitch transforms fire.
    MovementMode {
        /// Calm grid-walking, the default look.
        Pixel => ("dream-machine-84", "Dream Machine '84"),
        Glitch => ("glitch-crawl", "Glitch Crawl"),
        Datamosh => ("data-mosh", "Data Mosh"),
    }
}

selector! {
    /// Which decorative marks get stamped.
    MarksMode {
        Mixed => ("mixed", "Mixed"),
        Text => ("glitch-text", "Glitch Text"),
        Blueprint => ("blueprint", "Blueprint"),
        Off => ("marks-off", "Marks Off"),
    }
}

selector! {
    /// Phrase pool used by text marks.
    TextSource {
        Mixed => ("mixed", "Mixed Text"),
        Design80s => ("80s-design", "80s Design Labels"),
        Original => ("original", "Original Phrases"),
        Hooks80s => ("80s-hooks", "80s Hooks"),
    }
}

selector! {
    /// Content theme for marks.
    Theme {
        Eighties => ("80s", "80s"),
        Any => ("any", "Any"),
    }
}

impl Theme {
    #[must_use]
    pub const fn is_eighties(self) -> bool {
        matches!(self, Self::Eighties)
    }
}

impl MovementMode {
    #[must_use]
    pub const fn is_pixel(self) -> bool {
        matches!(self, Self::Pixel)
    }

    /// Head steps per tick per buffer cell.
    #[must_use]
    pub const fn step_density(self) -> f64 {
        match self {
            Self::Pixel => 0.03,
            Self::Glitch => 0.026,
            Self::Datamosh => 0.022,
        }
    }

    #[must_use]
    pub const fn turn_chance(self) -> f64 {
        match self {
            Self::Pixel => 0.006,
            Self::Glitch => 0.022,
            Self::Datamosh => 0.015,
        }
    }

    #[must_use]
    pub const fn irregular_chance(self) -> f64 {
        match self {
            Self::Pixel => 0.0012,
            Self::Glitch => 0.0032,
            Self::Datamosh => 0.0024,
        }
    }

    /// Blend strength of a head's primary pixel.
    #[must_use]
    pub const fn paint_strength(self) -> f64 {
        match self {
            Self::Pixel => 0.55,
            Self::Glitch => 0.48,
            Self::Datamosh => 0.38,
        }
    }

    #[must_use]
    pub const fn spark_chance(self) -> f64 {
        match self {
            Self::Datamosh => 0.012,
            Self::Pixel | Self::Glitch => 0.006,
        }
    }

    /// Extra step size while a burst is running.
    #[must_use]
    pub const fn burst_boost(self) -> i32 {
        if self.is_pixel() { 1 } else { 2 }
    }

    /// Probability that a stamp attempt goes ahead.
    #[must_use]
    pub const fn stamp_chance(self) -> f64 {
        match self {
            Self::Pixel => 0.14,
            Self::Glitch => 0.18,
            Self::Datamosh => 0.16,
        }
    }

    /// Channel fade applied every fourth frame.
    #[must_use]
    pub const fn fade(self) -> f64 {
        match self {
            Self::Pixel => 0.008,
            Self::Glitch => 0.011,
            Self::Datamosh => 0.013,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_slugs_fall_back_to_default() {
        assert_eq!(MovementMode::from_slug("warp-drive"), MovementMode::Pixel);
        assert_eq!(MarksMode::from_slug(""), MarksMode::Mixed);
        assert_eq!(TextSource::from_slug("klingon"), TextSource::Mixed);
        assert_eq!(Theme::from_slug("90s"), Theme::Eighties);
    }

    #[test]
    fn slugs_resolve_case_insensitively() {
        assert_eq!(MovementMode::from_slug("Data-Mosh"), MovementMode::Datamosh);
        assert_eq!(MarksMode::from_slug(" glitch-text "), MarksMode::Text);
        assert_eq!("80s-hooks".parse::<TextSource>(), Ok(TextSource::Hooks80s));
    }

    #[test]
    fn cycling_visits_every_variant() {
        let mut mode = MarksMode::default();
        let mut seen = Vec::new();
        for _ in 0..MarksMode::ALL.len() {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, MarksMode::Mixed);
        assert_eq!(seen, MarksMode::ALL);
    }

    #[test]
    fn serde_uses_slugs_and_tolerates_unknowns() {
        let json = serde_json::to_string(&MovementMode::Glitch).expect("serialize");
        assert_eq!(json, "\"glitch-crawl\"");
        let parsed: MovementMode = serde_json::from_str("\"nope\"").expect("deserialize");
        assert_eq!(parsed, MovementMode::Pixel);
    }
}
