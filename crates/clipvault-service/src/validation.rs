use clipvault_core::EngineLimits;
use clipvault_error::ValidationError;

pub(crate) fn validate_content(content: &str, limits: &EngineLimits) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if content.len() > limits.max_snippet_bytes {
        return Err(ValidationError::ContentTooLarge {
            size: content.len(),
            max: limits.max_snippet_bytes,
        });
    }
    Ok(())
}

pub(crate) fn validate_source_url(
    source_url: Option<&str>,
    limits: &EngineLimits,
) -> Result<(), ValidationError> {
    if let Some(url) = source_url {
        if url.len() > limits.max_source_url_bytes {
            return Err(ValidationError::SourceUrlTooLong {
                len: url.len(),
                max: limits.max_source_url_bytes,
            });
        }
    }
    Ok(())
}

/// Enforce the word ceiling without paying for a full scan of huge inputs.
///
/// Inputs above `word_validation_skip_bytes` skip counting entirely; below
/// that, at most `word_scan_limit_bytes` are scanned and the count is
/// extrapolated linearly over the full length. Both cutoffs are documented
/// behavior: the ceiling is approximate by design on large inputs.
pub(crate) fn validate_word_count(
    content: &str,
    limits: &EngineLimits,
) -> Result<(), ValidationError> {
    if content.len() > limits.word_validation_skip_bytes {
        return Ok(());
    }
    let words = estimate_words(content.as_bytes(), limits.word_scan_limit_bytes);
    if words > limits.max_words {
        return Err(ValidationError::WordLimitExceeded {
            words,
            max: limits.max_words,
        });
    }
    Ok(())
}

/// Count whitespace→non-whitespace transitions over at most `scan_limit`
/// bytes; when the input is longer, extrapolate `count * total / scanned`.
pub fn estimate_words(bytes: &[u8], scan_limit: usize) -> u64 {
    let scanned = bytes.len().min(scan_limit);
    if scanned == 0 {
        return 0;
    }
    let mut count = 0u64;
    let mut in_word = false;
    for &b in &bytes[..scanned] {
        let is_ws = b.is_ascii_whitespace();
        if !is_ws && !in_word {
            count += 1;
        }
        in_word = !is_ws;
    }
    if bytes.len() > scanned {
        count * bytes.len() as u64 / scanned as u64
    } else {
        count
    }
}
