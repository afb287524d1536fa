use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Opaque credential values keyed by name (`GITHUB_TOKEN`, ...)
///
/// Values are passed through to request headers untouched and never shown
/// by `Debug`.
#[derive(Clone, Default)]
pub struct Credentials {
    values: HashMap<String, String>,
    /// Names missing from `values` are read from the environment on demand
    env_fallback: bool,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the named variables that are set in the environment
    ///
    /// Names declared later, by catalogue files or learned services, are
    /// read from the environment when first asked for.
    pub fn from_env<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            values: tooling::config::read_present(names),
            env_fallback: true,
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<Cow<'_, str>> {
        if let Some(value) = self.values.get(name) {
            return Some(Cow::Borrowed(value.as_str()));
        }
        if !self.env_fallback {
            return None;
        }
        tooling::config::get_env(name).ok().flatten().map(Cow::Owned)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Credentials").field("names", &names).finish()
    }
}
