//! Ordered, case-insensitive HTTP header list.
//!
//! Used for caller headers, global headers and the per-segment `Range`
//! header. `set` replaces an existing entry in place so the original order is
//! kept, which is what libcurl will send on the wire.

use std::fmt;

/// Name of the range-selector header set on every segment request.
pub const RANGE: &str = "Range";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any existing entry with the same
    /// name (ASCII case-insensitive). Duplicate entries beyond the first are dropped.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.trim();
        let value = value.trim();
        let mut replaced = false;
        self.entries.retain_mut(|(k, v)| {
            if !k.eq_ignore_ascii_case(name) {
                return true;
            }
            if replaced {
                return false;
            }
            *v = value.to_string();
            replaced = true;
            true
        });
        if !replaced {
            self.entries.push((name.to_string(), value.to_string()));
        }
    }

    /// Removes every entry named `name`. Returns true if anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.entries.len() != before
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy of `self` with every entry of `defaults` whose name is
    /// not already present appended at the end.
    pub fn with_defaults(&self, defaults: &HeaderList) -> HeaderList {
        let mut out = self.clone();
        for (k, v) in defaults.iter() {
            if !out.contains(k) {
                out.entries.push((k.to_string(), v.to_string()));
            }
        }
        out
    }

    /// Parses a `Name: value` line as accepted on the command line.
    pub fn parse_line(line: &str) -> Result<(String, String), InvalidHeader> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| InvalidHeader(line.to_string()))?;
        let name = name.trim();
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidHeader(line.to_string()));
        }
        Ok((name.to_string(), value.trim().to_string()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = HeaderList::new();
        for (k, v) in iter {
            list.set(k.as_ref(), v.as_ref());
        }
        list
    }
}

/// A header line that is not of the form `Name: value`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid header {0:?}: expected \"Name: value\"")]
pub struct InvalidHeader(pub String);

impl fmt::Display for HeaderList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        Ok(())
    }
}
