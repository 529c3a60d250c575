//! Query-string codec shared by every request and by cursor replay.
//!
//! Options write themselves into a [`QueryParams`] accumulator. A `next`
//! cursor returned by the service is the same vocabulary percent-encoded
//! behind a `?`; [`parse_next`] turns it back into options.

use url::form_urlencoded;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// QueryParams
// ---------------------------------------------------------------------------

/// Ordered string multimap. Encoding preserves insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value of `key` with `value`, keeping the position of the
    /// first occurrence; append when the key is new.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(idx) => {
                self.pairs[idx].1 = value;
                let mut seen = 0usize;
                self.pairs.retain(|(k, _)| {
                    if *k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    /// Like [`set`](Self::set), but an empty `value` removes `key` instead.
    /// Cursor replay reads `key=` as absent, so an empty value is never written.
    pub fn set_nonempty(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.remove(&key);
        } else {
            self.set(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` rendering in insertion order.
    pub fn encode(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            ser.append_pair(k, v);
        }
        ser.finish()
    }

    /// Strict parse of a raw query string. Malformed percent escapes and `;`
    /// separators are rejected with [`Error::InvalidNextPage`].
    pub fn parse(query: &str) -> Result<Self> {
        if query.contains(';') {
            return Err(Error::InvalidNextPage);
        }
        let bytes = query.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                let valid = bytes.len() > i + 2
                    && bytes[i + 1].is_ascii_hexdigit()
                    && bytes[i + 2].is_ascii_hexdigit();
                if !valid {
                    return Err(Error::InvalidNextPage);
                }
                i += 3;
            } else {
                i += 1;
            }
        }
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Ok(QueryParams { pairs })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// A unit of request configuration that writes itself into the query.
pub trait RequestOption {
    fn apply(&self, params: &mut QueryParams);
}

/// Apply `options` in order; later options override earlier ones on the same key.
pub fn encode_options<O: RequestOption>(options: &[O]) -> QueryParams {
    let mut params = QueryParams::new();
    for opt in options {
        opt.apply(&mut params);
    }
    params
}

/// How a key of a pagination vocabulary is written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Base-10 integer.
    Int,
    /// Verbatim string.
    Str,
    /// `true` when on; omitted when off.
    Flag,
    /// Comma-joined list.
    List,
}

/// A decoded cursor value, ready to rebuild an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Str(String),
    Flag,
    List(Vec<String>),
}

/// An option family whose values can be replayed from a `next` cursor.
pub trait PageOption: RequestOption + Sized {
    /// Keys recognised in a cursor, in the order options are rebuilt.
    const VOCABULARY: &'static [(&'static str, ParamKind)];

    /// Rebuild the option for `key`. Called only for keys in [`Self::VOCABULARY`].
    fn from_param(key: &str, value: ParamValue) -> Option<Self>;
}

/// The service's truthy spellings: `true`, `t` and `1`, in any case.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "t" | "1")
}

/// Rebuild the options encoded in a `next` cursor.
///
/// Unknown keys are ignored. Flags whose value is not truthy are treated as
/// absent, never as an explicit "off".
pub fn parse_next<O: PageOption>(next: &str) -> Result<Vec<O>> {
    if next.is_empty() {
        return Err(Error::MissingNextPage);
    }
    let mut parts = next.split('?');
    let query = match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(query), None) => query,
        _ => return Err(Error::InvalidNextPage),
    };
    let values = QueryParams::parse(query)?;

    let mut options = Vec::new();
    for &(key, kind) in O::VOCABULARY {
        let raw = match values.get(key) {
            Some(raw) if !raw.is_empty() => raw,
            _ => continue,
        };
        let value = match kind {
            ParamKind::Int => {
                ParamValue::Int(raw.parse().map_err(|_| Error::InvalidNextPage)?)
            }
            ParamKind::Str => ParamValue::Str(raw.to_string()),
            ParamKind::Flag if parse_bool(raw) => ParamValue::Flag,
            ParamKind::Flag => continue,
            ParamKind::List => ParamValue::List(raw.split(',').map(str::to_string).collect()),
        };
        if let Some(opt) = O::from_param(key, value) {
            options.push(opt);
        }
    }
    Ok(options)
}
