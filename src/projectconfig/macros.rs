//! Macro table used for substitution and condition evaluation

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn macro_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"))
}

/// Case-insensitive mapping of macro names to values
///
/// A name that is present doubles as a true condition unless its value is
/// `0`. Cloning gives a fully independent table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    entries: BTreeMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base table for a POSIX (Linux) build of the native project
    pub fn posix_defaults() -> Self {
        let mut table = Self::new();
        table.set("GAMENAME", "pysource");
        table.set("OUTDLLEXT", ".so");
        table.set("_DLL_EXT", ".so");
        table.set("PLATFORM", "POSIX=1");

        // Conditions
        table.set("POSIX", "");
        table.set("LINUX", "");
        table.set("LINUXALL", "");
        table.set("SOURCESDK", "");
        table
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(name.to_ascii_uppercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_uppercase())
    }

    /// Truth value of `name` as a condition
    pub fn is_true(&self, name: &str) -> bool {
        matches!(self.get(name), Some(value) if value.trim() != "0")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `other` over this table, replacing values for shared names
    pub fn extend<'a, I>(&mut self, other: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, value) in other {
            self.set(name, value.clone());
        }
    }

    /// Replace every `$NAME` reference with its value
    ///
    /// When the full identifier after `$` is unknown, shorter prefixes are
    /// tried longest first; references that match nothing stay as written.
    pub fn substitute(&self, text: &str) -> String {
        if !text.contains('$') {
            return text.to_string();
        }

        macro_ref_regex()
            .replace_all(text, |caps: &Captures<'_>| {
                let ident = &caps[1];
                for end in (1..=ident.len()).rev() {
                    if let Some(value) = self.get(&ident[..end]) {
                        return format!("{}{}", value, &ident[end..]);
                    }
                }
                caps[0].to_string()
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_defaults() {
        let table = MacroTable::posix_defaults();
        assert_eq!(table.get("OUTDLLEXT"), Some(".so"));
        assert_eq!(table.get("platform"), Some("POSIX=1"));
        assert!(table.is_true("POSIX"));
        assert!(table.is_true("linux"));
        assert!(!table.is_true("WIN32"));
    }

    #[test]
    fn test_zero_is_false() {
        let mut table = MacroTable::new();
        table.set("X360", "0");
        assert!(table.contains("X360"));
        assert!(!table.is_true("X360"));
    }

    #[test]
    fn test_substitute() {
        let mut table = MacroTable::new();
        table.set("SRCDIR", "../..");
        table.set("GAMENAME", "mod");

        assert_eq!(
            table.substitute("$SRCDIR/game/$GAMENAME;$UNKNOWN"),
            "../../game/mod;$UNKNOWN"
        );
        assert_eq!(table.substitute("no macros"), "no macros");
    }

    #[test]
    fn test_substitute_is_case_insensitive() {
        let mut table = MacroTable::new();
        table.set("SrcDir", "/src");
        assert_eq!(table.substitute("$SRCDIR/x $srcdir/y"), "/src/x /src/y");
    }

    #[test]
    fn test_substitute_longest_prefix() {
        let mut table = MacroTable::new();
        table.set("OUT", "short");
        table.set("OUTDIR", "long");

        assert_eq!(table.substitute("$OUTDIR"), "long");
        assert_eq!(table.substitute("$OUTDIRX"), "longX");
        assert_eq!(table.substitute("$OUTX"), "shortX");
    }

    #[test]
    fn test_clones_are_independent() {
        let base = MacroTable::posix_defaults();
        let mut server = base.clone();
        let client = base.clone();

        server.set("SRCDIR", "server");
        server.set("POSIX", "0");

        assert!(client.get("SRCDIR").is_none());
        assert!(client.is_true("POSIX"));
        assert_eq!(base, client);
    }

    #[test]
    fn test_extend_overrides() {
        let mut table = MacroTable::posix_defaults();
        let mut extra = BTreeMap::new();
        extra.insert("GAMENAME".to_string(), "mymod".to_string());
        extra.insert("DEDICATED".to_string(), "1".to_string());

        table.extend(&extra);

        assert_eq!(table.get("GAMENAME"), Some("mymod"));
        assert!(table.is_true("DEDICATED"));
    }
}
