//! Sources of build-time properties, such as credentials.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::Path;

use failure::{Error, ResultExt};

use crate::errors::InvalidProperties;

/// The prefix used by [`Environment::default()`].
pub const DEFAULT_ENV_PREFIX: &str = "REPO_AUTH_PROP_";

/// A read-only lookup from property names to their values.
///
/// Unknown keys are reported as `None`, never as an error.
pub trait PropertySource {
    fn property(&self, key: &str) -> Option<String>;
}

impl<'a, P: PropertySource + ?Sized> PropertySource for &'a P {
    fn property(&self, key: &str) -> Option<String> {
        (**self).property(key)
    }
}

impl<P: PropertySource + ?Sized> PropertySource for Box<P> {
    fn property(&self, key: &str) -> Option<String> {
        (**self).property(key)
    }
}

impl PropertySource for HashMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl PropertySource for BTreeMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Properties read from the process environment, with every key prefixed.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    prefix: String,
}

impl Environment {
    pub fn with_prefix<S: Into<String>>(prefix: S) -> Environment {
        Environment {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for Environment {
    fn default() -> Environment {
        Environment::with_prefix(DEFAULT_ENV_PREFIX)
    }
}

impl PropertySource for Environment {
    fn property(&self, key: &str) -> Option<String> {
        env::var(format!("{}{}", self.prefix, key)).ok()
    }
}

/// Several property sources, consulted in order. The first source with a
/// value wins.
#[derive(Default)]
pub struct Layered {
    sources: Vec<Box<dyn PropertySource>>,
}

impl Layered {
    pub fn new() -> Layered {
        Layered::default()
    }

    /// Add a source with lower precedence than every source added so far.
    pub fn push<P: PropertySource + 'static>(&mut self, source: P) -> &mut Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl PropertySource for Layered {
    fn property(&self, key: &str) -> Option<String> {
        self.sources.iter().filter_map(|s| s.property(key)).next()
    }
}

/// A table of properties in the Java `.properties` file format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn new() -> Properties {
        Properties::default()
    }

    /// Load a properties file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Properties, Error> {
        let path = path.as_ref();
        debug!("Reading properties from {}", path.display());

        let contents = fs::read_to_string(path)
            .with_context(|_| format!("Unable to read \"{}\"", path.display()))?;

        Properties::parse(&contents).map_err(|e| {
            Error::from(InvalidProperties {
                file: path.to_path_buf(),
                ..e
            })
        })
    }

    /// Parse the contents of a properties file.
    pub fn parse(src: &str) -> Result<Properties, InvalidProperties> {
        let mut props = Properties::new();

        for (line_no, logical) in logical_lines(src) {
            let (key, value) = split_entry(&logical);
            let key = unescape(key).map_err(|msg| invalid(line_no, msg))?;
            let value = unescape(value).map_err(|msg| invalid(line_no, msg))?;

            trace!("Found property {:?} on line {}", key, line_no);
            props.set(key, value);
        }

        Ok(props)
    }

    /// Set a property, replacing any previous value for the key.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Property names, in the order they were first defined.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertySource for Properties {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).map(String::from)
    }
}

impl<K: Into<String>, V: Into<String>> std::iter::FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Properties {
        let mut props = Properties::new();
        for (k, v) in iter {
            props.set(k, v);
        }
        props
    }
}

fn invalid(line: usize, msg: String) -> InvalidProperties {
    InvalidProperties {
        file: Default::default(),
        line,
        msg,
    }
}

/// Join continuation lines and drop comments and blank lines, yielding each
/// logical line along with the (1-based) line number it started on.
fn logical_lines(src: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (i, raw) in src.lines().enumerate() {
        let trimmed = raw.trim_start();

        let (start, mut text) = match current.take() {
            Some((start, text)) => (start, text),
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (i + 1, String::new())
            }
        };

        if ends_with_continuation(trimmed) {
            text.push_str(&trimmed[..trimmed.len() - 1]);
            current = Some((start, text));
        } else {
            text.push_str(trimmed);
            lines.push((start, text));
        }
    }

    if let Some(last) = current {
        lines.push(last);
    }

    lines
}

/// A line continues onto the next if it ends in an odd number of
/// backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into its (still escaped) key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();

    if rest.starts_with('=') || rest.starts_with(':') {
        rest = rest[1..].trim_start();
    }

    (key, rest)
}

fn unescape(src: &str) -> Result<String, String> {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(std::char::from_u32)
                    .ok_or_else(|| format!("Malformed \\uxxxx encoding: \\u{}", hex))?;
                out.push(code);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_properties() {
        let src = "myRepoUsername=user\nmyRepoPassword=pass\n";

        let got = Properties::parse(src).unwrap();

        assert_eq!(got.get("myRepoUsername"), Some("user"));
        assert_eq!(got.get("myRepoPassword"), Some("pass"));
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let src = "# a comment\n   ! another one\n\n   \nkey = value\n";

        let got = Properties::parse(src).unwrap();

        assert_eq!(got.keys().collect::<Vec<_>>(), vec!["key"]);
        assert_eq!(got.get("key"), Some("value"));
    }

    #[test]
    fn all_separators_are_recognised() {
        let src = "a=1\nb:2\nc 3\nd = 4\ne   :   5\nf\n";

        let got = Properties::parse(src).unwrap();

        assert_eq!(got.get("a"), Some("1"));
        assert_eq!(got.get("b"), Some("2"));
        assert_eq!(got.get("c"), Some("3"));
        assert_eq!(got.get("d"), Some("4"));
        assert_eq!(got.get("e"), Some("5"));
        assert_eq!(got.get("f"), Some(""));
    }

    #[test]
    fn values_keep_embedded_separators() {
        let got = Properties::parse("url=http://localhost:3000/a=b").unwrap();

        assert_eq!(got.get("url"), Some("http://localhost:3000/a=b"));
    }

    #[test]
    fn continuation_lines_are_joined() {
        let src = "fruits = apple, \\\n         banana, \\\n         pear\nnext=1";

        let got = Properties::parse(src).unwrap();

        assert_eq!(got.get("fruits"), Some("apple, banana, pear"));
        assert_eq!(got.get("next"), Some("1"));
    }

    #[test]
    fn escaped_backslash_does_not_continue() {
        let got = Properties::parse("path=C:\\\\\nnext=1").unwrap();

        assert_eq!(got.get("path"), Some("C:\\"));
        assert_eq!(got.get("next"), Some("1"));
    }

    #[test]
    fn escapes_in_keys_and_values() {
        let src = "key\\=with\\:seps\\ x = tab\\there \\u0041\\\\";

        let got = Properties::parse(src).unwrap();

        assert_eq!(got.get("key=with:seps x"), Some("tab\there A\\"));
    }

    #[test]
    fn malformed_unicode_escape_names_the_line() {
        let err = Properties::parse("ok=1\nbad=\\u12zz").unwrap_err();

        assert_eq!(err.line, 2);
    }

    #[test]
    fn parse_errors_name_the_file_and_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("repo-auth.properties");
        fs::write(&path, "ok=1\nbad=\\u12zz\n").unwrap();

        let err = Properties::from_file(&path).unwrap_err();

        let inner = err.downcast_ref::<InvalidProperties>().unwrap();
        assert_eq!(inner.file, path);
        assert_eq!(
            err.to_string(),
            format!(
                "{}:2: Malformed \\uxxxx encoding: \\u12zz",
                path.display()
            )
        );
    }

    #[test]
    fn later_definitions_override_earlier_ones() {
        let got = Properties::parse("a=1\nb=2\na=3").unwrap();

        assert_eq!(got.get("a"), Some("3"));
        assert_eq!(got.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn first_layer_wins() {
        let high: Properties = vec![("shared", "high")].into_iter().collect();
        let low: Properties = vec![("shared", "low"), ("only-low", "low")]
            .into_iter()
            .collect();

        let mut layered = Layered::new();
        layered.push(high).push(low);

        assert_eq!(layered.property("shared"), Some(String::from("high")));
        assert_eq!(layered.property("only-low"), Some(String::from("low")));
        assert_eq!(layered.property("missing"), None);
    }

    #[test]
    fn environment_variables_are_prefixed() {
        env::set_var("REPO_AUTH_TEST_PREFIX_myRepoUsername", "from-env");
        let source = Environment::with_prefix("REPO_AUTH_TEST_PREFIX_");

        assert_eq!(
            source.property("myRepoUsername"),
            Some(String::from("from-env"))
        );
        assert_eq!(source.property("myRepoPassword"), None);
    }
}
