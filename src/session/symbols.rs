use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Variable bindings produced by assignment results, sent with every request
/// so the service can resolve names from earlier sketches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    vars: BTreeMap<String, Value>,
}

impl SymbolTable {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Binds `name`, replacing any earlier value.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::SymbolTable;
    use serde_json::json;

    #[test]
    fn later_assignment_wins() {
        let mut symbols = SymbolTable::default();
        symbols.assign("x", json!(5));
        symbols.assign("x", json!(7));
        assert_eq!(symbols.get("x"), Some(&json!(7)));
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut symbols = SymbolTable::default();
        symbols.assign("b", json!("two"));
        symbols.assign("a", json!(1));
        assert_eq!(
            serde_json::to_string(&symbols).expect("serialize"),
            r#"{"a":1,"b":"two"}"#
        );
    }
}
