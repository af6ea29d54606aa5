//! Typed extraction of element text and attribute values.
//!
//! Anything that can produce text implements [`TextSource`], and every
//! conversion is a provided method on it. Two surfaces are offered:
//!
//! - **Lenient** (`to_bool`, `to_i32`, `to_f64`, ...): never fails. Integers
//!   take the longest leading integer after optional whitespace, saturate at
//!   the target's bounds, and become `0` when no digits are present. Floats
//!   take the longest leading decimal number. Booleans are true when the
//!   first significant character is one of `YyTt1-9`.
//! - **Strict** ([`parse`](TextSource::parse)): the trimmed text must be a
//!   complete representation of the target type.
//!
//! ```
//! use xmlnav::{Document, TextSource};
//!
//! let doc = Document::parse_str("<a><n>42 apples</n><f>2.5e1x</f><b>yes</b></a>").unwrap();
//! let root = doc.root().unwrap();
//! assert_eq!(root.child("n").to_i32(), 42);
//! assert_eq!(root.child("f").to_f64(), 25.0);
//! assert!(root.child("b").to_bool());
//! assert!(root.child("n").parse::<i32>().is_err());
//! ```

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::ConversionError;
use crate::query::{AttributeLookup, Chained, Query};
use crate::tree::NodeRef;

/// An enum that maps itself from a raw text value.
///
/// ```
/// use xmlnav::convert::{RawValue, TextSource};
///
/// #[derive(Debug, PartialEq)]
/// enum Color {
///     Red,
///     Navy,
/// }
///
/// impl RawValue for Color {
///     fn from_raw(raw: &str) -> Option<Self> {
///         match raw {
///             "Red" => Some(Self::Red),
///             "Navy" => Some(Self::Navy),
///             _ => None,
///         }
///     }
///
///     fn raw_values() -> &'static [&'static str] {
///         &["Red", "Navy"]
///     }
/// }
///
/// assert_eq!("Navy".decode::<Color>(), Ok(Color::Navy));
/// assert!("Green".decode::<Color>().is_err());
/// ```
pub trait RawValue: Sized {
    /// Returns the variant whose raw value is exactly `raw`.
    fn from_raw(raw: &str) -> Option<Self>;

    /// The accepted raw values, for error messages.
    fn raw_values() -> &'static [&'static str] {
        &[]
    }
}

/// A source of text for typed conversion.
///
/// Implementations for nodes and queries log through the document's
/// diagnostics when there is no text to convert and fall back to the empty
/// string.
pub trait TextSource {
    /// The text to convert.
    fn text(&self) -> Cow<'_, str>;

    /// The text as an owned string.
    fn string(&self) -> String {
        self.text().into_owned()
    }

    /// Lenient boolean: `true` when the first character after whitespace,
    /// an optional sign and leading zeros is one of `YyTt1-9`.
    fn to_bool(&self) -> bool {
        lenient_bool(&self.text())
    }

    /// Lenient `i8`.
    fn to_i8(&self) -> i8 {
        lenient_int(&self.text())
    }

    /// Lenient `i16`.
    fn to_i16(&self) -> i16 {
        lenient_int(&self.text())
    }

    /// Lenient `i32`.
    fn to_i32(&self) -> i32 {
        lenient_int(&self.text())
    }

    /// Lenient `i64`.
    fn to_i64(&self) -> i64 {
        lenient_int(&self.text())
    }

    /// Lenient `isize`.
    fn to_isize(&self) -> isize {
        lenient_int(&self.text())
    }

    /// Lenient `u8`. Negative input saturates to `0`.
    fn to_u8(&self) -> u8 {
        lenient_int(&self.text())
    }

    /// Lenient `u16`.
    fn to_u16(&self) -> u16 {
        lenient_int(&self.text())
    }

    /// Lenient `u32`.
    fn to_u32(&self) -> u32 {
        lenient_int(&self.text())
    }

    /// Lenient `u64`.
    fn to_u64(&self) -> u64 {
        lenient_int(&self.text())
    }

    /// Lenient `usize`.
    fn to_usize(&self) -> usize {
        lenient_int(&self.text())
    }

    /// Lenient `f32`.
    fn to_f32(&self) -> f32 {
        leading_float(&self.text()).map_or(0.0, |number| number.parse().unwrap_or(0.0))
    }

    /// Lenient `f64`.
    fn to_f64(&self) -> f64 {
        leading_float(&self.text()).map_or(0.0, |number| number.parse().unwrap_or(0.0))
    }

    /// Strictly parses the trimmed text with [`FromStr`].
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Invalid`] if the text does not parse.
    fn parse<T: FromStr>(&self) -> Result<T, ConversionError> {
        let text = self.text();
        text.trim().parse::<T>().map_err(|_| ConversionError::Invalid {
            text: text.into_owned(),
            target: std::any::type_name::<T>(),
        })
    }

    /// Maps the text through a table of raw values. Matching is exact.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::UnknownVariant`] if no entry matches.
    fn enum_value<T: Clone>(&self, table: &[(&str, T)]) -> Result<T, ConversionError> {
        let text = self.text();
        table
            .iter()
            .find(|(raw, _)| *raw == text)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ConversionError::UnknownVariant {
                text: text.into_owned(),
                expected: table.iter().map(|(raw, _)| (*raw).to_string()).collect(),
            })
    }

    /// Like [`enum_value`](Self::enum_value), discarding the error.
    fn enum_value_opt<T: Clone>(&self, table: &[(&str, T)]) -> Option<T> {
        self.enum_value(table).ok()
    }

    /// Decodes the text as a [`RawValue`] enum.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::UnknownVariant`] if `T` rejects the text.
    fn decode<T: RawValue>(&self) -> Result<T, ConversionError> {
        let text = self.text();
        T::from_raw(&text).ok_or_else(|| ConversionError::UnknownVariant {
            text: text.into_owned(),
            expected: T::raw_values().iter().map(|raw| (*raw).to_string()).collect(),
        })
    }

    /// Like [`decode`](Self::decode), discarding the error.
    fn decode_opt<T: RawValue>(&self) -> Option<T> {
        T::from_raw(&self.text())
    }
}

impl TextSource for str {
    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl TextSource for String {
    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl TextSource for NodeRef<'_> {
    fn text(&self) -> Cow<'_, str> {
        match self.value() {
            Some(value) => Cow::Borrowed(value),
            None => {
                self.document()
                    .diagnostics()
                    .log(&format!("<{}> has no text", self.name()));
                Cow::Borrowed("")
            }
        }
    }
}

impl TextSource for Query<'_> {
    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.resolved_text())
    }
}

impl TextSource for AttributeLookup<'_> {
    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.value().unwrap_or_default())
    }
}

impl TextSource for Chained<'_> {
    fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Nodes(query) => query.text(),
            Self::Attribute(lookup) => lookup.text(),
        }
    }
}

/// Integer types the lenient conversions can saturate into.
trait Saturating: TryFrom<i128> {
    const MIN: Self;
    const MAX: Self;
}

macro_rules! impl_saturating {
    ($($ty:ty),*) => {
        $(
            impl Saturating for $ty {
                const MIN: Self = <$ty>::MIN;
                const MAX: Self = <$ty>::MAX;
            }
        )*
    };
}

impl_saturating!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn lenient_int<T: Saturating>(text: &str) -> T {
    let value = leading_integer(text);
    T::try_from(value).unwrap_or(if value < 0 { T::MIN } else { T::MAX })
}

/// The longest leading integer of `text` after whitespace, or `0`.
/// Saturates at the bounds of `i128`.
fn leading_integer(text: &str) -> i128 {
    let rest = text.trim_start();
    let (negative, digits) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let mut value: i128 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i128::from(digit - b'0');
        value = value.saturating_mul(10);
        value = if negative {
            value.saturating_sub(digit)
        } else {
            value.saturating_add(digit)
        };
    }
    value
}

/// The longest leading decimal number of `text` after whitespace: sign,
/// digits, fraction, and an exponent if one is complete.
fn leading_float(text: &str) -> Option<&str> {
    let rest = text.trim_start();
    let bytes = rest.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer = digits_from(end);
    end += integer;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        end += 1 + fraction;
    }
    if integer + fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }
    Some(&rest[..end])
}

fn lenient_bool(text: &str) -> bool {
    let rest = text.trim_start();
    let rest = rest.strip_prefix(['+', '-']).unwrap_or(rest);
    matches!(
        rest.trim_start_matches('0').chars().next(),
        Some('Y' | 'y' | 'T' | 't' | '1'..='9')
    )
}
