//! Collision-safe worksheet naming
//!
//! Worksheet names are capped at 31 characters and cannot contain
//! `: \ / ? * [ ]`. Labels are sanitized and truncated, and collisions within
//! one workbook are resolved by re-truncating and appending a numeric suffix,
//! so the label → name mapping is deterministic and injective per export.

use std::collections::HashSet;

/// Assigns workbook-unique sheet names derived from result labels.
#[derive(Debug, Default)]
pub struct SheetNamer {
    used: HashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive and reserve a sheet name for a label.
    ///
    /// Forbidden characters become `_`, the result is truncated to 31
    /// characters, and on collision the name is rebuilt from a 28-character
    /// prefix plus `_<n>` for the smallest `n` that is free.
    pub fn assign(&mut self, label: &str) -> String {
        let sanitized: String = label
            .chars()
            .map(|c| match c {
                ':' | '\\' | '/' | '?' | '*' | '[' | ']' => '_',
                other => other,
            })
            .collect();

        let base = truncate_chars(&sanitized, 31);
        let mut name = base.clone();
        let mut n = 1usize;
        while self.used.contains(&name) {
            let suffix = format!("_{}", n);
            // 28-char prefix normally; shrink further if the suffix alone
            // would push past 31.
            let prefix_len = 28.min(31usize.saturating_sub(suffix.chars().count()));
            name = format!("{}{}", truncate_chars(&base, prefix_len), suffix);
            n += 1;
        }
        self.used.insert(name.clone());
        name
    }
}

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_characters_become_underscores() {
        let mut namer = SheetNamer::new();
        assert_eq!(namer.assign("SALES.PUBLIC [TABLE]"), "SALES.PUBLIC _TABLE_");
        assert_eq!(namer.assign("a:b\\c/d?e*f"), "a_b_c_d_e_f");
    }

    #[test]
    fn long_labels_truncate_to_31_characters() {
        let mut namer = SheetNamer::new();
        let label = "X".repeat(40);
        let name = namer.assign(&label);
        assert_eq!(name.chars().count(), 31);
        assert_eq!(name, "X".repeat(31));
    }

    #[test]
    fn collision_after_truncation_gets_numeric_suffix() {
        let mut namer = SheetNamer::new();
        let long_a = format!("{}{}", "VERY_LONG_DATABASE_NAME_", "A".repeat(20));
        let long_b = format!("{}{}", "VERY_LONG_DATABASE_NAME_", "A".repeat(21));

        let first = namer.assign(&long_a);
        let second = namer.assign(&long_b);

        assert_eq!(first.chars().count(), 31);
        assert_ne!(first, second);
        assert!(second.ends_with("_1"));
        assert_eq!(second.chars().count(), 30); // 28-char prefix + "_1"
    }

    #[test]
    fn exact_duplicates_count_upward() {
        let mut namer = SheetNamer::new();
        assert_eq!(namer.assign("PUBLIC"), "PUBLIC");
        assert_eq!(namer.assign("PUBLIC"), "PUBLIC_1");
        assert_eq!(namer.assign("PUBLIC"), "PUBLIC_2");
    }

    #[test]
    fn names_are_pairwise_distinct_and_bounded() {
        let mut namer = SheetNamer::new();
        let mut seen = HashSet::new();
        // Every label collides on the same 31-char prefix.
        for i in 0..150 {
            let label = format!("{}{}", "C".repeat(35), i);
            let name = namer.assign(&label);
            assert!(name.chars().count() <= 31, "{} too long", name);
            assert!(seen.insert(name));
        }
    }

    #[test]
    fn multibyte_labels_count_characters_not_bytes() {
        let mut namer = SheetNamer::new();
        let label = "パ".repeat(40);
        let name = namer.assign(&label);
        assert_eq!(name.chars().count(), 31);
    }
}
