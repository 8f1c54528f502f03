//! Unique ids for headings.

use std::collections::HashSet;

/// Generates ids that are unique within one document.
///
/// The id is the prefix followed by the letters and digits of the text. A repeated id gets a
/// numeric suffix counting up from 0: `HTitle`, `HTitle0`, `HTitle1`, ...
#[derive(Debug, Default)]
pub struct IdGenerator {
    generated: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_unique_id(&mut self, prefix: &str, text: &str) -> String {
        let base: String = prefix
            .chars()
            .chain(text.chars())
            .filter(|c| c.is_alphanumeric())
            .collect();

        let mut candidate = base.clone();
        let mut suffix = 0usize;
        while self.generated.contains(&candidate) {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
        self.generated.insert(candidate.clone());
        candidate
    }

    /// Forget every id handed out so far.
    pub fn reset(&mut self) {
        self.generated.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_non_alphanumerics() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.generate_unique_id("H", "Hello, world!"), "HHelloworld");
    }

    #[test]
    fn duplicates_get_increasing_suffixes() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.generate_unique_id("H", "Title"), "HTitle");
        assert_eq!(ids.generate_unique_id("H", "Title"), "HTitle0");
        assert_eq!(ids.generate_unique_id("H", "Title"), "HTitle1");
    }

    #[test]
    fn suffix_skips_ids_already_taken() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.generate_unique_id("H", "Title0"), "HTitle0");
        assert_eq!(ids.generate_unique_id("H", "Title"), "HTitle");
        assert_eq!(ids.generate_unique_id("H", "Title"), "HTitle1");
    }

    #[test]
    fn reset_starts_over() {
        let mut ids = IdGenerator::new();
        ids.generate_unique_id("H", "A");
        ids.reset();
        assert_eq!(ids.generate_unique_id("H", "A"), "HA");
    }
}
