//! Fuzzy matching for data source and attribute names
//!
//! Uses Levenshtein distance to propose the closest known name when a
//! lookup misses.

use kbmanifest_core::naming::to_snake_case;

/// Maximum Levenshtein distance for short names (kinds, attributes)
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Suggestion result with confidence scoring
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggested correction
    pub text: String,
    /// Levenshtein distance (lower = better match)
    pub distance: usize,
}

/// Calculate Levenshtein distance between two strings
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Distance allowed between `input` and a candidate of similar length
///
/// Data source names are long, so a fixed budget would reject most typos.
fn allowed_distance(input: &str) -> usize {
    MAX_SUGGESTION_DISTANCE.max(input.len() / 6)
}

/// Find closest matches from a list of candidates
pub fn find_closest_matches(
    input: &str,
    candidates: &[&str],
    max_results: usize,
) -> Vec<Suggestion> {
    let budget = allowed_distance(input);

    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = levenshtein(input, candidate);
            if distance <= budget && distance > 0 {
                Some(Suggestion {
                    text: candidate.to_string(),
                    distance,
                })
            } else {
                None
            }
        })
        .collect();

    // Sort by distance (best matches first)
    suggestions.sort_by_key(|s| s.distance);
    suggestions.truncate(max_results);
    suggestions
}

/// Suggest a data source for a name that did not resolve
pub fn suggest_data_source(name: &str, data_sources: &[&str]) -> Option<String> {
    let matches = find_closest_matches(name, data_sources, 3);
    if !matches.is_empty() {
        let suggestions: Vec<String> = matches.iter().map(|s| format!("`{}`", s.text)).collect();
        return Some(format!("Did you mean {}?", suggestions.join(" or ")));
    }

    // A bare kind such as `opsrequests` or `ops_request`
    let wanted = to_snake_case(name).trim_end_matches('s').replace('_', "");
    let by_kind: Vec<String> = data_sources
        .iter()
        .filter(|ds| ds.replace('_', "").contains(&wanted))
        .map(|ds| format!("`{}`", ds))
        .collect();
    if !wanted.is_empty() && !by_kind.is_empty() {
        return Some(format!("Did you mean {}?", by_kind.join(" or ")));
    }

    Some("Run `kbmanifest list` to see the available data sources".to_string())
}

/// Suggest a known attribute for an unexpected configuration key
///
/// The common mistake is using the manifest's camelCase name
/// (`serviceKind`) instead of the attribute name (`service_kind`).
pub fn suggest_attribute(attempted: &str, available: &[&str]) -> Option<String> {
    let snake = to_snake_case(attempted);
    if snake != attempted && available.contains(&snake.as_str()) {
        return Some(format!(
            "Attributes use snake_case: did you mean `{}`?",
            snake
        ));
    }

    let matches = find_closest_matches(attempted, available, 1);
    matches
        .first()
        .map(|s| format!("Did you mean `{}`?", s.text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_SOURCES: &[&str] = &[
        "k8s_apps_kubeblocks_io_backup_policy_template_v1alpha1_manifest",
        "k8s_apps_kubeblocks_io_ops_request_v1alpha1_manifest",
        "k8s_apps_kubeblocks_io_service_descriptor_v1alpha1_manifest",
    ];

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kind", "kind"), 0);
        assert_eq!(levenshtein("kind", "kin"), 1);
    }

    #[test]
    fn test_suggest_data_source_typo() {
        let suggestion = suggest_data_source(
            "k8s_apps_kubeblocks_io_ops_requests_v1alpha1_manifest",
            DATA_SOURCES,
        )
        .unwrap();
        assert!(suggestion.contains("k8s_apps_kubeblocks_io_ops_request_v1alpha1_manifest"));
    }

    #[test]
    fn test_suggest_data_source_by_kind() {
        let suggestion = suggest_data_source("opsrequests", DATA_SOURCES).unwrap();
        assert!(suggestion.contains("ops_request"));
    }

    #[test]
    fn test_suggest_data_source_fallback() {
        let suggestion = suggest_data_source("deployment", DATA_SOURCES).unwrap();
        assert!(suggestion.contains("kbmanifest list"));
    }

    #[test]
    fn test_suggest_attribute_camel_case() {
        let available = ["service_kind", "service_version", "endpoint"];
        let suggestion = suggest_attribute("serviceKind", &available).unwrap();
        assert!(suggestion.contains("`service_kind`"));
        assert!(suggestion.contains("snake_case"));
    }

    #[test]
    fn test_suggest_attribute_typo() {
        let available = ["service_kind", "service_version", "endpoint"];
        let suggestion = suggest_attribute("endpiont", &available).unwrap();
        assert!(suggestion.contains("`endpoint`"));
        assert!(suggest_attribute("completely_unrelated", &available).is_none());
    }
}
