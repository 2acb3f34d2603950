use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Field selection for a resource, compiled into the API's
/// `key:(child,child)` grammar.
///
/// Mapping keys are kept in a `BTreeMap` so that the compiled string does not
/// depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    Field(String),
    List(Vec<Selector>),
    Map(BTreeMap<String, Selector>),
}

impl Selector {
    pub fn field<T: Into<String>>(name: T) -> Self {
        Selector::Field(name.into())
    }

    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Selector>,
    {
        Selector::List(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Selector>,
    {
        Selector::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Shorthand for a single-key mapping.
    pub fn nested<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Selector>,
    {
        Selector::map(std::iter::once((key, value)))
    }

    pub fn compile(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Selector::Field(name) => out.push_str(name),
            Selector::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_to(out);
                }
            }
            Selector::Map(entries) => {
                for (key, value) in entries {
                    out.push_str(key);
                    out.push_str(":(");
                    value.write_to(out);
                    out.push(')');
                }
            }
        }
    }

    /// Appends `:(compiled)` to `url`, or returns `url` untouched when the
    /// selector compiles to nothing.
    pub fn apply_to(&self, url: &str) -> String {
        let compiled = self.compile();
        if compiled.is_empty() {
            url.to_string()
        } else {
            format!("{}:({})", url, compiled)
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compile())
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Selector::Field(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Selector::Field(name)
    }
}

impl<T: Into<Selector>> From<Vec<T>> for Selector {
    fn from(items: Vec<T>) -> Self {
        Selector::list(items)
    }
}

impl<V: Into<Selector>> From<BTreeMap<String, V>> for Selector {
    fn from(entries: BTreeMap<String, V>) -> Self {
        Selector::map(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar() {
        assert_eq!(Selector::field("id").compile(), "id");
    }

    #[test]
    fn list_is_comma_joined() {
        assert_eq!(Selector::list(vec!["x", "y"]).compile(), "x,y");
    }

    #[test]
    fn map_wraps_children() {
        let selector = Selector::nested("a", vec!["b", "c"]);
        assert_eq!(selector.compile(), "a:(b,c)");
    }

    #[test]
    fn map_keys_are_adjacent() {
        let selector = Selector::map(vec![
            ("positions", Selector::list(vec!["title"])),
            ("educations", Selector::list(vec!["degree", "school-name"])),
        ]);
        assert_eq!(
            selector.compile(),
            "educations:(degree,school-name)positions:(title)"
        );
    }

    #[test]
    fn deep_nesting() {
        let selector = Selector::list(vec![
            Selector::field("id"),
            Selector::nested(
                "positions",
                Selector::list(vec![
                    Selector::field("title"),
                    Selector::nested("company", vec!["name", "industry"]),
                ]),
            ),
        ]);
        assert_eq!(
            selector.compile(),
            "id,positions:(title,company:(name,industry))"
        );
    }

    #[test]
    fn empty_containers() {
        assert_eq!(Selector::List(vec![]).compile(), "");
        assert_eq!(Selector::Map(BTreeMap::new()).compile(), "");
    }

    #[test]
    fn compile_is_deterministic() {
        let a = Selector::map(vec![("b", "x"), ("a", "y"), ("c", "z")]);
        let b = Selector::map(vec![("c", "z"), ("a", "y"), ("b", "x")]);
        assert_eq!(a.compile(), a.compile());
        assert_eq!(a.compile(), b.compile());
        assert_eq!(a.to_string(), "a:(y)b:(x)c:(z)");
    }

    #[test]
    fn apply_and_strip_recovers_url() {
        let url = "https://api.example.com/v1/people/~";
        let selector = Selector::list(vec![
            Selector::field("id"),
            Selector::nested("location", vec!["name"]),
        ]);
        let applied = selector.apply_to(url);
        assert_eq!(
            applied,
            "https://api.example.com/v1/people/~:(id,location:(name))"
        );
        let suffix = format!(":({})", selector.compile());
        assert_eq!(applied.strip_suffix(suffix.as_str()).unwrap(), url);
    }

    #[test]
    fn empty_selector_is_omitted() {
        let url = "https://api.example.com/v1/people/~";
        assert_eq!(Selector::List(vec![]).apply_to(url), url);
    }

    #[test]
    fn deserialize_from_json() {
        let selector: Selector =
            serde_json::from_str(r#"["id", {"positions": ["title", "summary"]}]"#).unwrap();
        assert_eq!(selector.compile(), "id,positions:(title,summary)");
    }
}
