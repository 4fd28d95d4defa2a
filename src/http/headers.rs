/// Case-insensitive header map holding a single value per name.
///
/// Names are lowercased on every access, so callers never normalize keys
/// themselves. Insertion order is kept, which is also the order headers are
/// written on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// The headers every response starts from before handler overrides.
    pub fn response_defaults() -> Self {
        let mut headers = Self::new();
        headers.set("Connection", "keep-alive");
        headers.set("Content-Type", "text/plain");
        headers.set("Content-Length", "0");
        headers
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Stores `value`, merging with an existing value as `"<new>, <old>"`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(name) {
            Some(idx) => {
                let old = &mut self.entries[idx].1;
                *old = format!("{value}, {old}");
            }
            None => self.entries.push((name.to_ascii_lowercase(), value)),
        }
    }

    /// Overwrites whatever value `name` had.
    pub fn replace(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(name) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((name.to_ascii_lowercase(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
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

    /// True if the comma separated value of `name` lists `token`
    /// (ASCII case-insensitive).
    pub fn has_token(&self, name: &str, token: &str) -> bool {
        self.get(name)
            .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
            .unwrap_or(false)
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.to_ascii_lowercase();
        self.entries.iter().position(|(k, _)| *k == name)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.set(k.as_ref(), v);
        }
        headers
    }
}
