//! Request-time environment lookups.

use std::collections::HashMap;
use std::sync::Arc;

pub const GITHUB_CLIENT_ID: &str = "GITHUB_CLIENT_ID";
pub const GITHUB_CLIENT_SECRET: &str = "GITHUB_CLIENT_SECRET";
pub const DECAP_SITE_URL: &str = "DECAP_SITE_URL";
pub const DECAP_DISPLAY_URL: &str = "DECAP_DISPLAY_URL";

/// Source of environment values, read on every request.
///
/// The process environment is used unless a fixed set of values was given,
/// which keeps handlers testable without mutating global state.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    fixed: Option<Arc<HashMap<String, String>>>,
}

impl Environment {
    /// Read from the process environment.
    pub fn process() -> Self {
        Self::default()
    }

    /// An environment with nothing set.
    pub fn empty() -> Self {
        Self {
            fixed: Some(Arc::new(HashMap::new())),
        }
    }

    /// Read only from the given pairs.
    pub fn fixed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            fixed: Some(Arc::new(map)),
        }
    }

    /// Look up a variable. Empty values count as unset.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match &self.fixed {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        value.filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_values_shadow_process_env() {
        let env = Environment::fixed([(GITHUB_CLIENT_ID, "abc"), (DECAP_SITE_URL, "")]);

        assert_eq!(env.get(GITHUB_CLIENT_ID).as_deref(), Some("abc"));
        assert_eq!(env.get(DECAP_SITE_URL), None);
        assert_eq!(env.get("PATH"), None);
    }
}
