// IDOR hint detection for authprobe
// Flags path templates that look like they address a specific object.
// This is a triage heuristic; false positives are expected.

const IDOR_KEYWORDS: &[&str] = &["user", "account", "project", "org", "team", "profile"];

/// True when the template has a path parameter (any `{` plus any `}`, matched
/// or not) or contains one of the object-ish keywords as a substring, case-insensitively.
pub fn is_idor_candidate(path: &str) -> bool {
    if path.contains('{') && path.contains('}') {
        return true;
    }

    let lower = path.to_lowercase();
    IDOR_KEYWORDS.iter().any(|kw| lower.contains(kw))
}
