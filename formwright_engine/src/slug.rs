//! URL slug derivation and validation.
//!
//! Slugs are lowercase ASCII letters, digits and single hyphens, never starting
//! or ending with a hyphen, between [`MIN_LEN`] and [`MAX_LEN`] characters long.
//! Uniqueness is not enforced here; callers pass the set of slugs already taken
//! to [`unique`].

use std::collections::HashSet;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use regex::Regex;
use time::OffsetDateTime;

pub const MIN_LEN: usize = 3;
pub const MAX_LEN: usize = 50;

/// Prefix used for titles that produce no slug of their own.
pub const DEFAULT_FALLBACK_PREFIX: &str = "questionnaire";

static SLUG_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("slug pattern compiles"));

/// Last fallback token handed out, so rapid calls never repeat one.
static LAST_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Normalize free text into slug form.
///
/// Never fails; text with nothing usable in it becomes the empty string, which
/// [`is_valid`] rejects.
pub fn sanitize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for ch in lowered.trim_matches(is_separator_space).chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else if ch == '-' || ch == '_' || is_separator_space(ch) {
            pending_dash = true;
        }
        // anything else is dropped without separating its neighbours
    }
    slug
}

/// Characters that separate words in a title: ASCII whitespace, the Unicode
/// space separators, U+2028/U+2029 and U+FEFF. Unlike [`char::is_whitespace`]
/// this excludes U+0085.
fn is_separator_space(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' ' | '\u{A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}'
            | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}' | '\u{FEFF}'
    )
}

/// True if `slug` has slug shape and an acceptable length.
pub fn is_valid(slug: &str) -> bool {
    (MIN_LEN..=MAX_LEN).contains(&slug.len()) && SLUG_SHAPE.is_match(slug)
}

/// Return `base`, or the first of `base-1`, `base-2`, ... not already in `existing`.
pub fn unique(base: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }
    // at most existing.len() candidates can be taken, so this terminates
    (1..)
        .map(|n: u64| format!("{base}-{n}"))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Slug derivation with a configurable fallback for blank titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCodec {
    fallback_prefix: String,
}

impl Default for SlugCodec {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_PREFIX)
    }
}

impl SlugCodec {
    /// Build a codec; the prefix is sanitized and replaced by the default if
    /// nothing valid remains.
    pub fn new(fallback_prefix: &str) -> Self {
        let prefix = sanitize(fallback_prefix);
        let fallback_prefix = if prefix.is_empty() || prefix.len() > MAX_LEN / 2 {
            DEFAULT_FALLBACK_PREFIX.to_string()
        } else {
            prefix
        };
        Self { fallback_prefix }
    }

    pub fn fallback_prefix(&self) -> &str {
        &self.fallback_prefix
    }

    /// Derive a slug from a title.
    ///
    /// Blank titles get `<prefix>-<token>` where the token increases on every
    /// call. Titles that sanitize to nothing valid are returned sanitized, so
    /// callers must still check [`is_valid`].
    pub fn from_title(&self, title: &str) -> String {
        if title.trim().is_empty() {
            return self.fallback();
        }
        sanitize(title)
    }

    fn fallback(&self) -> String {
        let slug = format!("{}-{}", self.fallback_prefix, next_token());
        if is_valid(&slug) {
            return slug;
        }
        let mut slug = format!("{DEFAULT_FALLBACK_PREFIX}-{}", next_token());
        slug.truncate(MAX_LEN);
        slug.trim_end_matches('-').to_string()
    }
}

/// Milliseconds since the epoch, bumped past the previous token when the
/// clock has not advanced.
fn next_token() -> u64 {
    let now = u64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
    let mut last = LAST_TOKEN.load(Ordering::Relaxed);
    loop {
        let token = now.max(last + 1);
        match LAST_TOKEN.compare_exchange_weak(last, token, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return token,
            Err(observed) => last = observed,
        }
    }
}
