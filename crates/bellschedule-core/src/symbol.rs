//! Symbol table: configurable text fragments substituted into period names.
//!
//! Period names in the dataset embed placeholders such as `$(per2)`. Each
//! placeholder resolves to a [`Symbol`], whose effective value is either the
//! dataset default or, for configurable symbols, the user's override.

use std::collections::BTreeMap;

use log::warn;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Document, LoadError, Result};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\(([^()]*)\)").expect("valid placeholder regex"));

/// A single substitutable symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    key: String,
    default_value: String,
    configurable: bool,
    configured_value: Option<String>,
}

impl Symbol {
    pub fn new(
        key: impl Into<String>,
        default_value: impl Into<String>,
        configurable: bool,
    ) -> Self {
        Self {
            key: key.into(),
            default_value: default_value.into(),
            configurable,
            configured_value: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn is_configurable(&self) -> bool {
        self.configurable
    }

    pub fn configured_value(&self) -> Option<&str> {
        self.configured_value.as_deref()
    }

    /// Stores a user override. Blank input clears it.
    pub fn set_configured_value(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.configured_value = None;
        } else {
            self.configured_value = Some(value.to_string());
        }
    }

    /// The value placeholders resolve to.
    pub fn effective_value(&self) -> &str {
        match (&self.configured_value, self.configurable) {
            (Some(v), true) => v,
            _ => &self.default_value,
        }
    }
}

/// Cached wire form of a symbol table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SymbolRecord {
    configurable: bool,
    value: String,
}

/// The two serialized projections of a [`SymbolTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTableExport {
    /// Full table of defaults, `{key: {configurable, value}}`.
    pub symbol_table: String,
    /// Non-empty user overrides only, `{key: value}`.
    pub custom_symbols: String,
}

/// Mapping from symbol key to [`Symbol`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            symbols: symbols.into_iter().map(|s| (s.key.clone(), s)).collect(),
        }
    }

    /// Builds a table from the dataset's symbols document.
    ///
    /// Entries lacking a boolean `configurable` or a string `value` are dropped.
    pub fn from_value(value: &Value) -> Result<Self, LoadError> {
        let object = value
            .as_object()
            .ok_or_else(|| LoadError::shape(Document::Symbols, "expected an object of symbols"))?;

        let symbols = object
            .iter()
            .filter_map(|(key, entry)| {
                let record: SymbolRecord = serde_json::from_value(entry.clone()).ok()?;
                Some(Symbol::new(key.as_str(), record.value, record.configurable))
            })
            .collect::<Vec<_>>();

        Ok(Self::new(symbols))
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| LoadError::missing(Document::Symbols, e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn get(&self, key: &str) -> Option<&Symbol> {
        self.symbols.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Substitutes every known `$(key)` placeholder in one pass.
    ///
    /// Unknown placeholders are kept verbatim. Substituted values are not
    /// rescanned, so a value that itself contains a placeholder is emitted
    /// literally.
    pub fn render(&self, template: &str) -> String {
        PLACEHOLDER_RE
            .replace_all(template, |caps: &Captures| match self.symbols.get(&caps[1]) {
                Some(symbol) => symbol.effective_value().to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Applies user overrides to configurable symbols.
    ///
    /// Unknown and non-configurable keys are logged and skipped. Returns the
    /// number of overrides applied.
    pub fn register_overrides<'a, I>(&mut self, overrides: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut applied = 0;
        for (key, value) in overrides {
            match self.symbols.get_mut(key) {
                Some(symbol) if symbol.configurable => {
                    symbol.set_configured_value(value);
                    applied += 1;
                }
                _ => warn!("ignoring override for invalid symbol: {key} = {value}"),
            }
        }
        applied
    }

    /// Sets or clears one override. Returns false when the key is not configurable.
    pub fn set_override(&mut self, key: &str, value: &str) -> bool {
        match self.symbols.get_mut(key) {
            Some(symbol) if symbol.configurable => {
                symbol.set_configured_value(value);
                true
            }
            _ => false,
        }
    }

    /// Non-empty overrides of configurable symbols.
    pub fn overrides(&self) -> BTreeMap<String, String> {
        self.symbols
            .values()
            .filter(|s| s.configurable)
            .filter_map(|s| Some((s.key.clone(), s.configured_value.clone()?)))
            .collect()
    }

    /// Serializes the defaults table, without overrides.
    pub fn to_value(&self) -> Value {
        let records: BTreeMap<&str, SymbolRecord> = self
            .symbols
            .values()
            .map(|s| {
                (
                    s.key.as_str(),
                    SymbolRecord {
                        configurable: s.configurable,
                        value: s.default_value.clone(),
                    },
                )
            })
            .collect();
        serde_json::to_value(records).unwrap_or(Value::Null)
    }

    pub fn export(&self) -> Result<SymbolTableExport> {
        Ok(SymbolTableExport {
            symbol_table: serde_json::to_string(&self.to_value())?,
            custom_symbols: serde_json::to_string(&self.overrides())?,
        })
    }
}

/// Parses a `{key: value}` overrides document, skipping non-string values.
pub fn parse_overrides(json: &str) -> Result<BTreeMap<String, String>, LoadError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| LoadError::missing(Document::CustomSymbols, e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| LoadError::shape(Document::CustomSymbols, "expected an object"))?;

    Ok(object
        .iter()
        .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> SymbolTable {
        SymbolTable::from_value(&json!({
            "per1": { "configurable": true, "value": "Period 1" },
            "per2": { "configurable": true, "value": "Period 2" },
            "lunch": { "configurable": false, "value": "Lunch" },
            "broken": { "value": "no flag" },
        }))
        .unwrap()
    }

    #[test]
    fn drops_malformed_entries() {
        let t = table();
        assert_eq!(t.len(), 3);
        assert!(t.get("broken").is_none());
    }

    #[test]
    fn rejects_non_object_document() {
        let err = SymbolTable::from_value(&json!(["per1"])).unwrap_err();
        assert!(matches!(err, LoadError::UnexpectedShape { .. }));
    }

    #[test]
    fn non_configurable_symbol_ignores_overrides() {
        let mut t = table();
        let overrides = BTreeMap::from([("lunch".to_string(), "Brunch".to_string())]);
        assert_eq!(t.register_overrides(&overrides), 0);
        assert_eq!(t.get("lunch").unwrap().effective_value(), "Lunch");
        assert!(!t.set_override("lunch", "Brunch"));
    }

    #[test]
    fn configurable_override_and_clear() {
        let mut t = table();
        assert!(t.set_override("per2", "Chem"));
        assert_eq!(t.render("$(per2)"), "Chem");

        assert!(t.set_override("per2", "   "));
        assert_eq!(t.get("per2").unwrap().configured_value(), None);
        assert_eq!(t.render("$(per2)"), "Period 2");
    }

    #[test]
    fn unknown_override_keys_are_dropped() {
        let mut t = table();
        let overrides = BTreeMap::from([
            ("perX".to_string(), "Nope".to_string()),
            ("per1".to_string(), "Math".to_string()),
        ]);
        assert_eq!(t.register_overrides(&overrides), 1);
        assert_eq!(t.overrides().len(), 1);
    }

    #[test]
    fn render_substitutes_known_placeholders() {
        let t = SymbolTable::new([Symbol::new("per2", "Chemistry", true)]);
        assert_eq!(t.render("$(per2) starts"), "Chemistry starts");
        assert_eq!(t.render("$(perX) starts"), "$(perX) starts");
        assert_eq!(t.render("$(per2) and $(per2)"), "Chemistry and Chemistry");
    }

    #[test]
    fn render_does_not_rescan_substituted_values() {
        let t = SymbolTable::new([
            Symbol::new("a", "$(b)", false),
            Symbol::new("b", "bee", false),
        ]);
        assert_eq!(t.render("$(a)/$(b)"), "$(b)/bee");
    }

    #[test]
    fn export_round_trips_overrides() {
        let mut t = table();
        t.set_override("per1", "Math");
        t.set_override("per2", "Chem");
        let export = t.export().unwrap();

        let mut fresh = SymbolTable::from_json(&export.symbol_table).unwrap();
        assert!(fresh.overrides().is_empty());
        let overrides = parse_overrides(&export.custom_symbols).unwrap();
        fresh.register_overrides(&overrides);

        for symbol in t.iter() {
            assert_eq!(
                fresh.get(symbol.key()).unwrap().effective_value(),
                symbol.effective_value()
            );
        }
    }

    #[test]
    fn parse_overrides_skips_non_strings() {
        let parsed = parse_overrides(r#"{"per1": "Math", "per2": 4}"#).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["per1"], "Math");
    }
}
