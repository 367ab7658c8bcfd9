//! The `family:attr:attr` font descriptor.
//!
//! Grammar: `family (':' attribute)*`, where `family` is everything before
//! the first colon (empty means the default family) and each attribute is
//! one of `h<number>` (height in points), `b` (bold), `l` (light) or `i`
//! (italic). Attributes may appear in any order; [`FontSpec`]'s `Display`
//! emits them as height, weight, italic.

use std::fmt;
use std::str::FromStr;

use crate::error::FontParseError;

const SEPARATOR: char = ':';

/// Weight hint of a font descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Light,
}

/// An immutable font descriptor.
///
/// Built by [`FontSpec::parse`], by [`FontSpec::parse_forced`], or with
/// [`FontSpec::new`] and the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontSpec {
    family: String,
    height: Option<f64>,
    weight: FontWeight,
    italic: bool,
    /// Unvalidated text kept as-is; set only by forced parsing.
    verbatim: Option<String>,
}

impl FontSpec {
    /// A descriptor for `family` with no attributes.
    ///
    /// An empty family means "default family". Note that a spec with an
    /// empty family and no attributes formats to an empty string, which
    /// [`FontSpec::parse`] rejects.
    pub fn new(family: impl Into<String>) -> Result<Self, FontParseError> {
        let family = family.into();
        if family.contains(SEPARATOR) {
            return Err(FontParseError::FamilyContainsColon(family));
        }
        Ok(Self {
            family,
            ..Self::default()
        })
    }

    /// Set the height in points. Must be finite and positive.
    pub fn with_height(mut self, points: f64) -> Result<Self, FontParseError> {
        if !points.is_finite() || points <= 0.0 {
            return Err(FontParseError::InvalidHeight(points.to_string()));
        }
        self.height = Some(points);
        Ok(self)
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Parse and validate a descriptor.
    pub fn parse(text: &str) -> Result<Self, FontParseError> {
        let mut parts = text.split(SEPARATOR);
        // `split` always yields at least one item.
        let family = parts.next().unwrap_or_default();
        let attributes: Vec<&str> = parts.collect();

        if family.is_empty() && attributes.is_empty() {
            return Err(FontParseError::Empty);
        }

        let mut spec = Self {
            family: family.to_string(),
            ..Self::default()
        };

        for attr in attributes {
            match attr {
                "" => return Err(FontParseError::EmptyAttribute(text.to_string())),
                // Bold and light are exclusive; the last one given wins.
                "b" => spec.weight = FontWeight::Bold,
                "l" => spec.weight = FontWeight::Light,
                "i" => spec.italic = true,
                _ => match attr.strip_prefix('h') {
                    Some(number) => spec.height = Some(parse_height(number)?),
                    None => return Err(FontParseError::UnknownAttribute(attr.to_string())),
                },
            }
        }

        Ok(spec)
    }

    /// Parse a descriptor, falling back to carrying `text` verbatim when it
    /// does not satisfy the grammar.
    pub fn parse_forced(text: &str) -> Self {
        match Self::parse(text) {
            Ok(spec) => spec,
            Err(e) => {
                log::debug!("Keeping font '{text}' verbatim: {e}");
                Self {
                    verbatim: Some(text.to_string()),
                    ..Self::default()
                }
            }
        }
    }

    /// Family name; empty means the default family.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Height in points, if given.
    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    pub fn is_light(&self) -> bool {
        self.weight == FontWeight::Light
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// The unvalidated text of a forced descriptor.
    pub fn verbatim(&self) -> Option<&str> {
        self.verbatim.as_deref()
    }

    pub fn is_verbatim(&self) -> bool {
        self.verbatim.is_some()
    }
}

/// Accept `12` or `10.5`; reject signs, exponents, `inf`/`nan` and zero.
fn parse_height(number: &str) -> Result<f64, FontParseError> {
    let invalid = || FontParseError::InvalidHeight(number.to_string());

    let (int_part, frac_part) = match number.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (number, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || frac_part.is_some_and(|f| !all_digits(f)) {
        return Err(invalid());
    }

    let value: f64 = number.parse().map_err(|_| invalid())?;
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = &self.verbatim {
            return f.write_str(text);
        }
        f.write_str(&self.family)?;
        if let Some(height) = self.height {
            write!(f, "{SEPARATOR}h{height}")?;
        }
        match self.weight {
            FontWeight::Bold => write!(f, "{SEPARATOR}b")?,
            FontWeight::Light => write!(f, "{SEPARATOR}l")?,
            FontWeight::Normal => {}
        }
        if self.italic {
            write!(f, "{SEPARATOR}i")?;
        }
        Ok(())
    }
}

impl FromStr for FontSpec {
    type Err = FontParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_family_and_height() {
        let spec = FontSpec::parse("DejaVu Sans Mono:h12").unwrap();
        assert_eq!(spec.family(), "DejaVu Sans Mono");
        assert_eq!(spec.height(), Some(12.0));
        assert_eq!(spec.weight(), FontWeight::Normal);
        assert!(!spec.is_italic());
    }

    #[test]
    fn test_parse_attributes_in_any_order() {
        let a = FontSpec::parse("Fira Code:i:b:h10.5").unwrap();
        let b = FontSpec::parse("Fira Code:h10.5:b:i").unwrap();
        assert_eq!(a, b);
        assert!(a.is_bold());
        assert!(a.is_italic());
        assert_eq!(a.height(), Some(10.5));
    }

    #[test]
    fn test_parse_family_only() {
        let spec = FontSpec::parse("Consolas").unwrap();
        assert_eq!(spec.family(), "Consolas");
        assert_eq!(spec.height(), None);
    }

    #[test]
    fn test_parse_default_family_with_height() {
        let spec = FontSpec::parse(":h14").unwrap();
        assert_eq!(spec.family(), "");
        assert_eq!(spec.height(), Some(14.0));
    }

    #[test]
    fn test_last_weight_wins() {
        assert!(FontSpec::parse("Mono:b:l").unwrap().is_light());
        assert!(FontSpec::parse("Mono:l:b").unwrap().is_bold());
    }

    #[test]
    fn test_rejects_empty_text() {
        assert_eq!(FontSpec::parse(""), Err(FontParseError::Empty));
    }

    #[test]
    fn test_rejects_unknown_attribute() {
        assert_eq!(
            FontSpec::parse("Mono:w7"),
            Err(FontParseError::UnknownAttribute("w7".to_string()))
        );
    }

    #[test]
    fn test_rejects_empty_attribute() {
        assert!(matches!(
            FontSpec::parse("Mono::h12"),
            Err(FontParseError::EmptyAttribute(_))
        ));
        assert!(matches!(
            FontSpec::parse("Mono:"),
            Err(FontParseError::EmptyAttribute(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_heights() {
        for bad in [
            "Mono:h", "Mono:h0", "Mono:h-3", "Mono:h+3", "Mono:h1e3", "Mono:hinf", "Mono:h.5",
            "Mono:h5.", "Mono:h1.2.3", "Mono:habc", "Mono:h0.0",
        ] {
            assert!(
                matches!(FontSpec::parse(bad), Err(FontParseError::InvalidHeight(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_orders_attributes() {
        let spec = FontSpec::new("Hack")
            .unwrap()
            .with_italic(true)
            .with_weight(FontWeight::Light)
            .with_height(9.0)
            .unwrap();
        assert_eq!(spec.to_string(), "Hack:h9:l:i");
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        assert!(matches!(
            FontSpec::new("a:b"),
            Err(FontParseError::FamilyContainsColon(_))
        ));
        assert!(FontSpec::new("Hack").unwrap().with_height(0.0).is_err());
        assert!(FontSpec::new("Hack").unwrap().with_height(f64::NAN).is_err());
    }

    #[test]
    fn test_forced_parse_keeps_text() {
        let spec = FontSpec::parse_forced("Iosevka:w500:cANSI");
        assert!(spec.is_verbatim());
        assert_eq!(spec.verbatim(), Some("Iosevka:w500:cANSI"));
        assert_eq!(spec.to_string(), "Iosevka:w500:cANSI");
    }

    #[test]
    fn test_forced_parse_of_valid_text_is_structured() {
        let spec = FontSpec::parse_forced("Mono:h11");
        assert!(!spec.is_verbatim());
        assert_eq!(spec.height(), Some(11.0));
    }
}
