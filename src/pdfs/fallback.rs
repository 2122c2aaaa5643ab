//! Source URL validation and the ordered fallback ladder.
//!
//! Uploaded objects are sometimes stored under a path that differs from the recorded URL
//! (a doubled `.pdf.pdf` suffix, or `raw` versus `image` delivery). The ladder lists the stored
//! URL first, then the variants worth trying, without duplicates.

use reqwest::Url;

/// Marker separating the delivery prefix from the storage path.
pub const UPLOAD_MARKER: &str = "/upload/";

const PDF_SUFFIX: &str = ".pdf";
const DUPLICATED_SUFFIX: &str = ".pdf.pdf";
const RESOURCE_KINDS: [&str; 2] = ["raw", "image"];

/// Check that `url` is a non-empty absolute `http`/`https` URL.
pub fn validate_source(url: &str) -> Result<Url, String> {
    if url.trim().is_empty() {
        return Err("stored URL is empty".to_string());
    }

    let parsed = Url::parse(url).map_err(|error| format!("'{url}' is not a valid URL: {error}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("'{url}' is not an HTTP(S) URL"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(format!("'{url}' has no host"));
    }
    Ok(parsed)
}

/// Build the ordered list of URLs to try for a stored PDF URL.
///
/// 1. The URL as stored.
/// 2. With a doubled `.pdf.pdf` suffix reduced to `.pdf`.
/// 3. The storage path after [`UPLOAD_MARKER`], extension normalized to a single `.pdf`,
///    re-derived under the `raw` and then the `image` resource kind.
pub fn fallback_candidates(url: &str) -> Vec<String> {
    let mut candidates = vec![url.to_string()];

    if url.ends_with(DUPLICATED_SUFFIX)
        && let Some(stripped) = url.strip_suffix(PDF_SUFFIX)
    {
        candidates.push(stripped.to_string());
    }

    candidates.extend(rederived_candidates(url));

    let mut unique = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

fn rederived_candidates(url: &str) -> Vec<String> {
    let Some((before_marker, storage_path)) = url.split_once(UPLOAD_MARKER) else {
        return Vec::new();
    };
    // `before_marker` ends with the resource kind segment, e.g. `.../<cloud>/raw`.
    let Some((prefix, _kind)) = before_marker.rsplit_once('/') else {
        return Vec::new();
    };
    if !prefix.contains("://") {
        return Vec::new();
    }

    let stem = strip_pdf_extension(storage_path);
    if stem.is_empty() {
        return Vec::new();
    }

    RESOURCE_KINDS
        .iter()
        .map(|kind| format!("{prefix}/{kind}{UPLOAD_MARKER}{stem}{PDF_SUFFIX}"))
        .collect()
}

fn strip_pdf_extension(path: &str) -> &str {
    path.strip_suffix(DUPLICATED_SUFFIX)
        .or_else(|| path.strip_suffix(PDF_SUFFIX))
        .unwrap_or(path)
}
