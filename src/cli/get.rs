//! Get subcommand for optstore CLI

use crate::store::{OptionSource, OptionStore};
use clap::{Args, ValueEnum};
use serde_json::Value;

/// How to coerce the value before printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ValueKind {
    /// Stored value as JSON
    #[default]
    Raw,
    String,
    Bool,
    Int,
    Uint,
    Float,
    Duration,
    /// String list, one element per line
    List,
    /// Integer list, one element per line
    IntList,
    /// Map at the key (or the parent map of a leaf) as JSON
    Map,
}

/// Arguments for the get subcommand
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Option key, relative to the application prefix unless --raw
    pub key: String,

    /// Coercion applied before printing
    #[arg(long = "as", value_enum, default_value_t = ValueKind::Raw)]
    pub kind: ValueKind,

    /// Use the key exactly as given, without the application prefix
    #[arg(long)]
    pub raw: bool,
}

impl GetArgs {
    /// Absolute key this invocation reads.
    pub fn resolved_key(&self, store: &OptionStore) -> String {
        if self.raw {
            self.key.clone()
        } else {
            store.settings().wrap_key(&self.key)
        }
    }

    /// Render the requested option as printable text.
    pub fn render(&self, store: &OptionStore) -> String {
        let key = self.resolved_key(store);
        match self.kind {
            ValueKind::Raw => store.get(&key).to_string(),
            ValueKind::String => store.get_string(&key),
            ValueKind::Bool => store.get_bool(&key).to_string(),
            ValueKind::Int => store.get_int(&key).to_string(),
            ValueKind::Uint => store.get_uint(&key).to_string(),
            ValueKind::Float => store.get_f64(&key).to_string(),
            ValueKind::Duration => humantime::format_duration(store.get_duration(&key)).to_string(),
            ValueKind::List => store.get_string_slice(&key).join("\n"),
            ValueKind::IntList => store
                .get_int_slice(&key)
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            ValueKind::Map => store
                .get_map(&key)
                .map(Value::Object)
                .unwrap_or(Value::Null)
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(key: &str, kind: ValueKind, raw: bool) -> GetArgs {
        GetArgs {
            key: key.to_string(),
            kind,
            raw,
        }
    }

    #[test]
    fn test_render_kinds() {
        let store = OptionStore::new();
        store.set("port", "8080");
        store.set("hosts", json!(["a", "b"]));
        store.set("timeout", "90s");
        store.set_nx("owner.name", "Tom");

        assert_eq!(args("port", ValueKind::Raw, false).render(&store), "\"8080\"");
        assert_eq!(args("port", ValueKind::Int, false).render(&store), "8080");
        assert_eq!(args("hosts", ValueKind::List, false).render(&store), "a\nb");
        assert_eq!(
            args("timeout", ValueKind::Duration, false).render(&store),
            "1m 30s"
        );
        assert_eq!(
            args("owner.name", ValueKind::String, true).render(&store),
            "Tom"
        );
        assert_eq!(
            args("owner", ValueKind::Map, true).render(&store),
            r#"{"name":"Tom"}"#
        );
        assert_eq!(args("missing", ValueKind::Raw, false).render(&store), "null");
    }
}
