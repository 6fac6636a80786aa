//! Attribute annotation parsing and injection.
//!
//! Blocks may carry a Pandoc-style annotation such as
//! `.note #intro lang=en title="Hello World"`. [`expand`] turns it into an
//! [`AttributeMap`], [`serialize`] turns the map into an HTML attribute
//! fragment, and [`open_tag`] / [`inject`] place that fragment on a tag.
//!
//! # Example
//!
//! ```
//! use blockmark_renderer::attrs::{self, AttributeMap};
//! use blockmark_renderer::RenderOptions;
//!
//! let map = attrs::expand(AttributeMap::new(), "#intro .lead", &RenderOptions::default()).unwrap();
//! assert_eq!(attrs::serialize(&map), r#"id="intro" class="lead""#);
//! ```

use std::borrow::Cow;

use crate::escape::push_escaped;
use crate::options::{MalformedPolicy, RenderOptions, ValueOrder};

/// Error returned for attribute annotations that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    /// The text at `offset` matches none of the recognized forms.
    #[error("Malformed attribute annotation at offset {offset}: {input:?}")]
    Malformed {
        /// Complete annotation being parsed.
        input: String,
        /// Byte offset of the unparsable remainder.
        offset: usize,
    },
}

/// Attribute names mapped to their values, in first-insertion order of names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeMap(Vec<(String, Vec<String>)>);

impl AttributeMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with a single attribute, used for renderer defaults.
    #[must_use]
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self(vec![(name.into(), vec![value.into()])])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Values stored for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Add a value for `name`, creating the entry if needed.
    pub fn insert(&mut self, name: &str, value: impl Into<String>, order: ValueOrder) {
        let value = value.into();
        if let Some((_, values)) = self.0.iter_mut().find(|(n, _)| n == name) {
            match order {
                ValueOrder::Prepend => values.insert(0, value),
                ValueOrder::Append => values.push(value),
            }
        } else {
            self.0.push((name.to_owned(), vec![value]));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(&name.into(), value, ValueOrder::Append);
        }
        map
    }
}

/// Parse `raw` and add its attributes to `base`.
///
/// Recognized forms, tried in order at each position: `.class`, `#id`,
/// `name='value'`, `name="value"` and `name=value`. Quoted values may contain
/// their own quote character when escaped with a backslash.
///
/// # Errors
///
/// Returns [`AttributeError::Malformed`] when some non-whitespace text matches
/// none of the forms and the policy is [`MalformedPolicy::Fail`].
pub fn expand(
    mut base: AttributeMap,
    raw: &str,
    options: &RenderOptions,
) -> Result<AttributeMap, AttributeError> {
    let mut rest = raw.trim_start();

    while !rest.is_empty() {
        if let Some((name, value, tail)) = next_attribute(rest) {
            base.insert(name, value, options.value_order);
            rest = tail.trim_start();
            continue;
        }

        let offset = raw.len() - rest.len();
        match options.malformed_attributes {
            MalformedPolicy::Fail => {
                return Err(AttributeError::Malformed {
                    input: raw.to_owned(),
                    offset,
                });
            }
            MalformedPolicy::Skip => {
                let (word, tail) = split_word(rest);
                tracing::warn!(word, offset, "Skipping malformed attribute");
                rest = tail.trim_start();
            }
        }
    }

    Ok(base)
}

/// Render `name="v1 v2"` pairs joined by a single space.
#[must_use]
pub fn serialize(map: &AttributeMap) -> String {
    let mut out = String::new();
    for (name, values) in map.iter() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(name);
        out.push_str("=\"");
        push_escaped(&mut out, &values.join(" "));
        out.push('"');
    }
    out
}

/// Merge `raw_attrs` into `defaults` and splice the result into the first tag of `html`.
///
/// The attribute fragment is inserted in front of the first `>` in `html`
/// (in front of the `/` of a self-closing `/>`). Only that one position is
/// touched, so `html` must start with its outer opening tag.
///
/// # Errors
///
/// Propagates [`expand`] errors.
pub fn inject(
    html: &str,
    raw_attrs: Option<&str>,
    defaults: AttributeMap,
    options: &RenderOptions,
) -> Result<String, AttributeError> {
    let attrs = attribute_fragment(raw_attrs, defaults, options)?;
    if attrs.is_empty() {
        return Ok(html.to_owned());
    }
    let Some(close) = html.find('>') else {
        return Ok(html.to_owned());
    };

    let mut out = String::with_capacity(html.len() + attrs.len());
    match html[..close].strip_suffix('/') {
        Some(head) => {
            out.push_str(head.trim_end());
            out.push_str(&attrs);
            out.push(' ');
            out.push_str(&html[close - 1..]);
        }
        None => {
            out.push_str(&html[..close]);
            out.push_str(&attrs);
            out.push_str(&html[close..]);
        }
    }
    Ok(out)
}

/// Build the opening tag `<name ...>` with merged attributes.
///
/// # Errors
///
/// Propagates [`expand`] errors.
pub fn open_tag(
    name: &str,
    raw_attrs: Option<&str>,
    defaults: AttributeMap,
    options: &RenderOptions,
) -> Result<String, AttributeError> {
    let attrs = attribute_fragment(raw_attrs, defaults, options)?;
    Ok(format!("<{name}{attrs}>"))
}

/// Build the self-closing tag `<name ... />` with merged attributes.
///
/// # Errors
///
/// Propagates [`expand`] errors.
pub fn void_tag(
    name: &str,
    raw_attrs: Option<&str>,
    defaults: AttributeMap,
    options: &RenderOptions,
) -> Result<String, AttributeError> {
    let attrs = attribute_fragment(raw_attrs, defaults, options)?;
    Ok(format!("<{name}{attrs} />"))
}

/// Serialized attributes with a leading space, or an empty string.
fn attribute_fragment(
    raw_attrs: Option<&str>,
    defaults: AttributeMap,
    options: &RenderOptions,
) -> Result<String, AttributeError> {
    let raw = raw_attrs.filter(|raw| !raw.trim().is_empty());
    let map = match raw {
        Some(raw) => expand(defaults, raw, options)?,
        None if defaults.is_empty() => return Ok(String::new()),
        None => defaults,
    };
    if map.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(" {}", serialize(&map)))
}

/// Match one attribute at the start of `s`: `(name, value, rest)`.
fn next_attribute(s: &str) -> Option<(&str, Cow<'_, str>, &str)> {
    if let Some(after) = s.strip_prefix('.')
        && let Some((class, rest)) = non_empty_word(after)
    {
        return Some(("class", Cow::Borrowed(class), rest));
    }
    if let Some(after) = s.strip_prefix('#')
        && let Some((id, rest)) = non_empty_word(after)
    {
        return Some(("id", Cow::Borrowed(id), rest));
    }

    let name_end = s
        .find(|c: char| c.is_whitespace() || matches!(c, '=' | '\'' | '"'))
        .unwrap_or(s.len());
    if name_end == 0 {
        return None;
    }
    let name = &s[..name_end];
    let after_eq = s[name_end..].strip_prefix('=')?;

    for quote in ['\'', '"'] {
        if let Some(inner) = after_eq.strip_prefix(quote)
            && let Some((value, rest)) = quoted(inner, quote)
        {
            return Some((name, value, rest));
        }
    }

    let (value, rest) = non_empty_word(after_eq)?;
    Some((name, Cow::Borrowed(value), rest))
}

/// Read up to the closing `quote`, honoring backslash-escaped quotes.
fn quoted(s: &str, quote: char) -> Option<(Cow<'_, str>, &str)> {
    let mut escaped = false;
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' && s[i + 1..].starts_with(quote) {
            escaped = true;
            chars.next();
        } else if c == quote {
            let raw = &s[..i];
            let value = if escaped {
                Cow::Owned(raw.replace(&format!("\\{quote}"), quote.encode_utf8(&mut [0; 4])))
            } else {
                Cow::Borrowed(raw)
            };
            return Some((value, &s[i + 1..]));
        }
    }
    None
}

fn split_word(s: &str) -> (&str, &str) {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    s.split_at(end)
}

fn non_empty_word(s: &str) -> Option<(&str, &str)> {
    let (word, rest) = split_word(s);
    (!word.is_empty()).then_some((word, rest))
}
