//! Source-code extraction from LLM responses.
//!
//! Models rarely honor formatting instructions perfectly, so extraction is a
//! pure, total function over text with an explicit fallback chain rather than
//! ad hoc string slicing. It always returns *some* string; when no structure
//! is recognized the raw output is passed through and downstream execution
//! fails fast, which the repair loop treats as a normal failure.
//!
//! # Extraction Strategies
//!
//! Two policies exist because the synthesis and repair prompts ask for
//! different response shapes:
//!
//! - [`ExtractionPolicy::TagThenFence`] (synthesis): the prompt requests an
//!   explicit `<code>` block, so tags are tried first, then fences, then raw.
//! - [`ExtractionPolicy::FenceOnly`] (repair): the prompt requests *only*
//!   code with no tags, so only fences are tried before falling back to raw.

/// Open marker for an explicitly tagged code block.
pub const CODE_OPEN_TAG: &str = "<code>";

/// Close marker for an explicitly tagged code block.
pub const CODE_CLOSE_TAG: &str = "</code>";

/// Fence marker delimiting a markdown code block.
pub const FENCE_MARKER: &str = "```";

/// Language-name tokens that may open a fenced block in this domain.
const LANGUAGE_TAGS: &[&str] = &["python", "python3", "py"];

/// Which fallback chain to apply when extracting code from model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPolicy {
    /// Tagged block first, then fenced block, then raw output.
    TagThenFence,
    /// Fenced block only, then raw output.
    FenceOnly,
}

/// Extracts the best-guess source-code payload from raw model output.
///
/// Never fails: if no recognizable block is found the raw output is returned
/// unchanged.
pub fn extract_code(output: &str, policy: ExtractionPolicy) -> String {
    if policy == ExtractionPolicy::TagThenFence {
        if let Some(code) = extract_tagged_block(output) {
            return code;
        }
    }

    if let Some(code) = extract_fenced_block(output) {
        return code;
    }

    tracing::debug!(
        len = output.len(),
        "No tagged or fenced block recognized, using raw output"
    );
    output.to_string()
}

/// Extracts the text strictly between the first `<code>` marker and the first
/// subsequent `</code>` marker, trimmed.
///
/// A missing close marker yields everything after the open marker: a model
/// that was cut off mid-block still produced code worth executing.
pub fn extract_tagged_block(output: &str) -> Option<String> {
    let (_, rest) = output.split_once(CODE_OPEN_TAG)?;
    let code = match rest.split_once(CODE_CLOSE_TAG) {
        Some((inner, _)) => inner,
        None => rest,
    };
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    Some(code.to_string())
}

/// Extracts everything between the first and last fence marker.
///
/// Splitting on the marker and rejoining the interior chunks treats all
/// fence-delimited content as one region, which correctly handles both
/// explanatory prose around a single fence and multiple disjoint fences
/// (they collapse into one joined block). A leading bare language-name line
/// is stripped case-insensitively.
pub fn extract_fenced_block(output: &str) -> Option<String> {
    let chunks: Vec<&str> = output.split(FENCE_MARKER).collect();
    if chunks.len() < 3 {
        // Fewer than two markers: no delimited region exists.
        return None;
    }

    let inner = chunks[1..chunks.len() - 1].join(FENCE_MARKER);
    let code = strip_language_tag(inner.trim()).trim();
    if code.is_empty() {
        return None;
    }
    Some(code.to_string())
}

/// Drops the first line when it is a bare language-name token.
fn strip_language_tag(code: &str) -> &str {
    let Some(first_line) = code.lines().next() else {
        return code;
    };

    let token = first_line.trim().to_lowercase();
    if LANGUAGE_TAGS.contains(&token.as_str()) {
        match code.split_once('\n') {
            Some((_, rest)) => rest,
            None => "",
        }
    } else {
        code
    }
}
