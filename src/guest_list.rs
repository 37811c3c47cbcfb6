//! Guest list
//!
//! Newline-delimited names. Blank lines and lines starting with `#` are
//! ignored on load; the file is rewritten with a comment header on every
//! change. Names are unique case-insensitively. An empty list means anyone
//! may RSVP.

use crate::error::RsvpError;

/// Header written at the top of the guest-list file
pub const HEADER: &str = "# Guest List for Wedding Website\n\
# One name per line - case insensitive fuzzy matching is used\n\
# If this file doesn't exist, anyone can RSVP\n\n";

/// Reduce a name to a form that survives the line-based file format.
///
/// Whitespace runs, line breaks included, collapse to one space and leading
/// `#` marks are dropped so the entry is not re-read as a comment.
pub fn clean_entry(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_start_matches(|c: char| c == '#' || c.is_whitespace())
        .to_string()
}

/// Ordered, case-insensitively unique list of invited names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestList {
    names: Vec<String>,
}

impl GuestList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the on-disk text form
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Render the on-disk text form, header included
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        out.push_str(&self.names.join("\n"));
        out
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let folded = name.to_lowercase();
        self.names.iter().position(|n| n.to_lowercase() == folded)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Append a name unless it is already present in any case.
    ///
    /// The name is passed through [`clean_entry`] first; returns the form
    /// actually stored.
    pub fn add(&mut self, name: &str) -> Result<String, RsvpError> {
        let name = clean_entry(name);
        if name.is_empty() {
            return Err(RsvpError::MissingFields);
        }
        if self.contains(&name) {
            return Err(RsvpError::AlreadyExists(format!("Guest '{name}'")));
        }
        self.names.push(name.clone());
        Ok(name)
    }

    /// Remove a name, matched case-insensitively. Returns the stored form.
    pub fn remove(&mut self, name: &str) -> Result<String, RsvpError> {
        match self.position(name) {
            Some(index) => Ok(self.names.remove(index)),
            None => Err(RsvpError::NotFound(format!("Guest '{name}'"))),
        }
    }
}

impl FromIterator<String> for GuestList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut list = Self::new();
        for name in iter {
            // duplicates are dropped
            let _ = list.add(&name);
        }
        list
    }
}
