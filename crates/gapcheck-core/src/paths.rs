use crate::error::{GapError, Result};
use rand::Rng;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const GAPCHECK_DIR: &str = ".gapcheck";
pub const REPORTS_DIR: &str = ".gapcheck/reports";
pub const CONFIG_FILE: &str = ".gapcheck/config.yaml";
pub const REDB_FILE: &str = ".gapcheck/reports.redb";

/// Namespace prefix for report storage keys.
pub const REPORT_KEY_PREFIX: &str = "report-";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn gapcheck_dir(root: &Path) -> PathBuf {
    root.join(GAPCHECK_DIR)
}

pub fn reports_dir(root: &Path) -> PathBuf {
    root.join(REPORTS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn redb_path(root: &Path) -> PathBuf {
    root.join(REDB_FILE)
}

/// Storage key for a report slug: `report-<slug>`.
pub fn report_key(slug: &str) -> String {
    format!("{REPORT_KEY_PREFIX}{slug}")
}

/// Inverse of [`report_key`]. Returns `None` for keys outside the report namespace.
pub fn slug_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(REPORT_KEY_PREFIX).filter(|s| !s.is_empty())
}

/// Shareable link for a report: `<base_url>/reports/<slug>`.
pub fn share_url(base_url: &str, slug: &str) -> String {
    format!("{}/reports/{}", base_url.trim_end_matches('/'), slug)
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Longest slug a report can be stored under.
pub const MAX_SLUG_LEN: usize = 96;

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN || !slug_re().is_match(slug) {
        return Err(GapError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Derive a URL-safe slug from a company name.
///
/// Lowercases, turns whitespace runs into a single hyphen and drops anything
/// outside `[a-z0-9-]`. Long names are cut to [`MAX_SLUG_LEN`] at the last
/// word boundary that fits. Returns `None` when nothing usable remains.
pub fn slugify(name: &str) -> Option<String> {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        }
    }
    let mut slug = slug.trim_end_matches('-');
    if slug.len() > MAX_SLUG_LEN {
        // ASCII only, so any byte index is a char boundary
        let cut = &slug[..MAX_SLUG_LEN];
        slug = match cut.rfind('-') {
            Some(i) if !slug[MAX_SLUG_LEN..].starts_with('-') => &cut[..i],
            _ => cut,
        };
        slug = slug.trim_end_matches('-');
    }
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// Random fallback slug, `company-` followed by 8 base36 characters.
pub fn random_slug() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("company-{suffix}")
}

/// Slug for a company name, falling back to [`random_slug`] when the name is
/// absent or slugifies to nothing.
pub fn slug_for(company_name: Option<&str>) -> String {
    company_name.and_then(slugify).unwrap_or_else(random_slug)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
