//! dotproduct-cfg reads SubSpace-style `server.cfg` files into a two-level map
//! of raw strings: section name → key → value.
//!
//! The format is a loose INI dialect. Section headers are lines starting with
//! `[`, settings are `Key=Value` lines, and everything else (comments, blank
//! lines, garbage) is skipped. No values are interpreted here; every value is
//! kept exactly as it appears after the first `=` on its line.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dotproduct_cfg::LegacySettings;
//! let text = "
//! ; Ship settings
//! [Warbird]
//! InitialSpeed=2000
//! Radius=0
//!
//! [Misc]
//! BounceFactor=16
//! ";
//! let settings: LegacySettings = text.parse()?;
//! assert_eq!(settings.get("Warbird", "InitialSpeed"), Some("2000"));
//! assert_eq!(settings.get("Misc", "BounceFactor"), Some("16"));
//! assert_eq!(settings.get("Misc", "Radius"), None);
//! # Ok(()) }
//! ```
//!
//! Files produced by the original Windows server are Windows-1252 encoded.
//! [`LegacySettings::read_from`] decodes them before parsing:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dotproduct_cfg::LegacySettings;
//! use std::io::Cursor;
//! let bytes = b"[Misc]\nGreetMessage=Caf\xe9\n";
//! let settings = LegacySettings::read_from(Cursor::new(&bytes[..]))?;
//! assert_eq!(settings.get("Misc", "GreetMessage"), Some("Café"));
//! # Ok(()) }
//! ```

#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused)]

use encoding_rs::WINDOWS_1252;
use encoding_rs_io::DecodeReaderBytesBuilder;
use std::collections::hash_map::{Iter, Keys};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read};
use std::ops::Index;
use std::str::FromStr;

/// Errors that may occur when reading a settings file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A `Key=Value` line appeared before any `[Section]` header, so there is
    /// no section to attach it to.
    #[error("line {line}: setting appears before any [section] header")]
    KeyOutsideSection {
        /// 1-based line number of the offending setting.
        line: usize,
    },
    /// An error occurred while reading data from the file.
    #[error(transparent)]
    IoError(#[from] io::Error),
}

/// The raw key-value pairs of a single `[Section]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Section(HashMap<String, String>);

impl Section {
    /// Creates an empty section.
    pub fn new() -> Self {
        Section(HashMap::new())
    }

    /// Returns the raw value for `key`, if it was set.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotproduct_cfg::Section;
    ///
    /// let mut section = Section::new();
    /// section.insert("Radius", "14");
    /// assert_eq!(section.get("Radius"), Some("14"));
    /// assert_eq!(section.get("radius"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` if the section contains a value for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Sets `key` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the number of keys in this section.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if this section has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An iterator visiting all key-value pairs in an arbitrary order.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }

    /// An iterator visiting all keys in an arbitrary order.
    pub fn keys(&self) -> Keys<'_, String, String> {
        self.0.keys()
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Section {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Section {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut section = Section::new();
        section.extend(iter);
        section
    }
}

impl Index<&str> for Section {
    type Output = String;
    fn index(&self, key: &str) -> &String {
        self.0.index(key)
    }
}

/// A parsed settings file: a mapping of section names to [`Section`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegacySettings(HashMap<String, Section>);

impl LegacySettings {
    /// Creates an empty settings map.
    pub fn new() -> Self {
        LegacySettings(HashMap::new())
    }

    /// Reads a settings file from an input reader.
    ///
    /// The input is assumed to be encoded as Windows codepage 1252.
    ///
    /// Returns a `ParseError` if the input could not be read, or if a setting
    /// appears outside of a section.
    pub fn read_from(input: impl Read) -> Result<Self, ParseError> {
        let input = DecodeReaderBytesBuilder::new()
            .encoding(Some(WINDOWS_1252))
            .build(input);
        let input = BufReader::new(input);
        let acc = input
            .lines()
            .enumerate()
            .try_fold(Accumulator::default(), |acc, (index, line)| {
                acc.feed(index + 1, &line?)
            })?;
        Ok(acc.finish())
    }

    /// Parses settings from a sequence of text lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotproduct_cfg::{LegacySettings, ParseError};
    ///
    /// let settings = LegacySettings::parse_lines(["[Bomb]", "BombAliveTime=6000"]).unwrap();
    /// assert_eq!(settings.get("Bomb", "BombAliveTime"), Some("6000"));
    ///
    /// let err = LegacySettings::parse_lines(["; header", "Orphan=1"]).unwrap_err();
    /// assert!(matches!(err, ParseError::KeyOutsideSection { line: 2 }));
    /// ```
    pub fn parse_lines<I, S>(lines: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let acc = lines
            .into_iter()
            .enumerate()
            .try_fold(Accumulator::default(), |acc, (index, line)| {
                acc.feed(index + 1, line.as_ref())
            })?;
        Ok(acc.finish())
    }

    /// Returns the section called `name`, if the file declared one.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.0.get(name)
    }

    /// Returns the raw value of `key` in section `section`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Returns `true` if a section called `name` was declared.
    pub fn contains_section(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Inserts a whole section, replacing any existing section with the same
    /// name.
    pub fn insert_section(&mut self, name: impl Into<String>, section: Section) -> Option<Section> {
        self.0.insert(name.into(), section)
    }

    /// Returns the number of sections.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no sections were declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// An iterator visiting all sections in an arbitrary order.
    pub fn iter(&self) -> Iter<'_, String, Section> {
        self.0.iter()
    }

    /// An iterator visiting all section names in an arbitrary order.
    pub fn sections(&self) -> Keys<'_, String, Section> {
        self.0.keys()
    }
}

impl FromStr for LegacySettings {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LegacySettings::parse_lines(s.lines())
    }
}

impl<'a> IntoIterator for &'a LegacySettings {
    type Item = (&'a String, &'a Section);
    type IntoIter = Iter<'a, String, Section>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>> Extend<(K, Section)> for LegacySettings {
    fn extend<T: IntoIterator<Item = (K, Section)>>(&mut self, iter: T) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v)));
    }
}

impl<K: Into<String>> FromIterator<(K, Section)> for LegacySettings {
    fn from_iter<T: IntoIterator<Item = (K, Section)>>(iter: T) -> Self {
        let mut settings = LegacySettings::new();
        settings.extend(iter);
        settings
    }
}

impl Index<&str> for LegacySettings {
    type Output = Section;
    fn index(&self, name: &str) -> &Section {
        self.0.index(name)
    }
}

/// Writes the settings back out in `server.cfg` syntax, with sections and
/// keys sorted by name.
impl fmt::Display for LegacySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.0.keys().collect();
        names.sort();
        for name in names {
            writeln!(f, "[{}]", name)?;
            let section = &self.0[name];
            let mut keys: Vec<&String> = section.keys().collect();
            keys.sort();
            for key in keys {
                writeln!(f, "{}={}", key, section[key.as_str()])?;
            }
        }
        Ok(())
    }
}

/// Parser state threaded through the lines of a file.
#[derive(Debug, Default)]
struct Accumulator {
    settings: LegacySettings,
    /// Name of the most recently opened section.
    current: Option<String>,
}

impl Accumulator {
    /// Consumes one line of input.
    fn feed(mut self, line_number: usize, line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if let Some(header) = line.strip_prefix('[') {
            let name = section_name(header);
            log::trace!("line {}: opening section [{}]", line_number, name);
            self.settings
                .0
                .insert(name.to_string(), Section::new());
            self.current = Some(name.to_string());
        } else if let Some((key, value)) = line.split_once('=') {
            let name = match &self.current {
                Some(name) => name,
                None => return Err(ParseError::KeyOutsideSection { line: line_number }),
            };
            self.settings
                .0
                .entry(name.clone())
                .or_default()
                .insert(key, value);
        }
        Ok(self)
    }

    fn finish(self) -> LegacySettings {
        log::debug!("Read {} settings sections", self.settings.len());
        self.settings
    }
}

/// Drops the closing character of a section header, whatever it is.
///
/// `header` is the line without its leading `[`.
fn section_name(header: &str) -> &str {
    let mut chars = header.chars();
    chars.next_back();
    chars.as_str()
}
