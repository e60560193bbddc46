use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::EnvVar;

/// Ordered list of environment variables for a container.
///
/// Serialized as a plain array. Duplicate names are allowed in the file; [`Env::resolved`]
/// collapses them so the last definition wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct Env(pub Vec<EnvVar>);

impl Env {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a variable. Later entries override earlier ones.
    pub fn push<N, V>(&mut self, name: N, value: V) -> &mut Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.0.push(EnvVar::new(name, value));
        self
    }

    /// Value of the last entry named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|var| var.name() == name)
            .map(EnvVar::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvVar> {
        self.0.iter()
    }

    /// Deduplicated view: one entry per name, in first-seen order, carrying the last value.
    pub fn resolved(&self) -> Vec<EnvVar> {
        let mut out: Vec<EnvVar> = Vec::with_capacity(self.0.len());
        for var in &self.0 {
            match out.iter_mut().find(|seen| seen.name() == var.name()) {
                Some(seen) => *seen = var.clone(),
                None => out.push(var.clone()),
            }
        }
        out
    }
}

impl FromIterator<EnvVar> for Env {
    fn from_iter<I: IntoIterator<Item = EnvVar>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::Env;

    #[test]
    fn get_returns_last_definition() {
        let mut env = Env::new();
        env.push("MODE", "dry-run").push("LEVEL", "1").push("MODE", "apply");

        assert_eq!(env.get("MODE"), Some("apply"));
        assert_eq!(env.get("LEVEL"), Some("1"));
        assert!(env.get("MISSING").is_none());
    }

    #[test]
    fn resolved_keeps_first_position_and_last_value() {
        let mut env = Env::new();
        env.push("A", "1").push("B", "2").push("A", "3");

        let resolved = env.resolved();
        let pairs: Vec<_> = resolved.iter().map(|v| (v.name(), v.value())).collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn deserializes_from_array() {
        let json = r#"[{"name":"A","value":"x"},{"name":"B","value":"y"}]"#;
        let env: Env = serde_json::from_str(json).unwrap();

        assert_eq!(env.len(), 2);
        assert_eq!(env.get("B"), Some("y"));
    }
}
