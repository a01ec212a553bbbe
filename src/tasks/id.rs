//! Entity ID generation utilities.
//!
//! IDs are generated from a display string (task title or project name) by:
//! 1. Converting to lowercase
//! 2. Replacing non-alphanumeric characters with hyphens
//! 3. Collapsing multiple hyphens
//! 4. Trimming leading/trailing hyphens
//! 5. Appending 8 random hex characters
//!
//! Generated IDs are only probabilistically unique; the stores check them
//! against every ID they have seen and regenerate on collision.

use std::cell::Cell;

thread_local! {
    /// Counter for deterministic ID generation in tests.
    static TEST_COUNTER: Cell<u64> = const { Cell::new(0) };

    /// Whether to use deterministic IDs (for testing).
    static USE_DETERMINISTIC_IDS: Cell<bool> = const { Cell::new(false) };
}

/// Maximum slug length.
const MAX_SLUG_LEN: usize = 32;

/// Enable deterministic ID generation for testing.
///
/// When enabled, IDs generated on the current thread use a counter
/// instead of random hex. The counter restarts at zero.
pub fn enable_deterministic_ids() {
    USE_DETERMINISTIC_IDS.with(|flag| flag.set(true));
    TEST_COUNTER.with(|counter| counter.set(0));
}

/// Disable deterministic ID generation on the current thread.
pub fn disable_deterministic_ids() {
    USE_DETERMINISTIC_IDS.with(|flag| flag.set(false));
}

/// Convert a title to a slug.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // Start true to avoid leading hyphen

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Generate a random 8-character hex suffix.
#[allow(clippy::cast_possible_truncation)]
fn random_suffix() -> String {
    if USE_DETERMINISTIC_IDS.with(Cell::get) {
        let count = TEST_COUNTER.with(|counter| counter.replace(counter.get() + 1));
        format!("{count:08x}")
    } else {
        use std::collections::hash_map::RandomState;
        use std::hash::{BuildHasher, Hasher};

        let mut hasher = RandomState::new().build_hasher();
        // Truncation is intentional - we only need entropy, not precision
        hasher.write_u64(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.as_nanos() as u64),
        );
        format!("{:08x}", hasher.finish() & 0xFFFF_FFFF)
    }
}

/// Generate an ID from a display string, with `fallback` as the slug for
/// strings that contain no ASCII alphanumerics.
#[must_use]
pub fn generate_id(text: &str, fallback: &str) -> String {
    let slug = slugify(text);
    let suffix = random_suffix();

    if slug.is_empty() {
        format!("{fallback}-{suffix}")
    } else {
        format!("{slug}-{suffix}")
    }
}

/// Generate a task ID from a title.
#[must_use]
pub fn generate_task_id(title: &str) -> String {
    generate_id(title, "task")
}

/// Generate a project ID from a name.
#[must_use]
pub fn generate_project_id(name: &str) -> String {
    generate_id(name, "project")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Buy milk"), "buy-milk");
        assert_eq!(slugify("Call Mom!"), "call-mom");
        assert_eq!(slugify("simple"), "simple");
    }

    #[test]
    fn test_slugify_whitespace_and_symbols() {
        assert_eq!(slugify("  leading spaces"), "leading-spaces");
        assert_eq!(slugify("trailing spaces  "), "trailing-spaces");
        assert_eq!(slugify("@home: fix sink"), "home-fix-sink");
    }

    #[test]
    fn test_slugify_empty_and_unicode() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("日本語"), "");
        assert_eq!(slugify("café"), "caf");
    }

    #[test]
    fn test_slugify_truncation_drops_trailing_hyphen() {
        let slug = slugify("this is a very long task title that keeps going on");
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_generate_task_id_format() {
        enable_deterministic_ids();

        let id = generate_task_id("Buy milk");
        assert_eq!(id, "buy-milk-00000000");

        disable_deterministic_ids();
    }

    #[test]
    fn test_generate_id_fallbacks() {
        enable_deterministic_ids();

        assert_eq!(generate_task_id("!!!"), "task-00000000");
        assert_eq!(generate_project_id("日本"), "project-00000001");

        disable_deterministic_ids();
    }

    #[test]
    fn test_deterministic_ids_increment() {
        enable_deterministic_ids();

        let id1 = generate_task_id("test");
        let id2 = generate_task_id("test");
        assert!(id1.ends_with("-00000000"));
        assert!(id2.ends_with("-00000001"));

        disable_deterministic_ids();
    }

    #[test]
    fn test_random_suffix_shape() {
        disable_deterministic_ids();

        let id = generate_task_id("test");
        let suffix = id.strip_prefix("test-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
