//! Set of participants currently connected to the room.

use std::collections::HashSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Participants(HashSet<String>);

impl Participants {
    /// Returns false if the participant was already present.
    pub fn join(&mut self, name: &str) -> bool {
        self.0.insert(name.to_string())
    }

    /// Returns false if the participant was not present.
    pub fn leave(&mut self, name: &str) -> bool {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Participant names in alphabetical order, for display.
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
