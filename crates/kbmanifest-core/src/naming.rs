//! Attribute naming
//!
//! Manifest fields are camelCase (`clusterDefinitionRef`), configuration
//! attributes are snake_case (`cluster_definition_ref`).

/// Convert a manifest field or kind name to its snake_case attribute form
///
/// Acronym runs stay together (`ClusterIP` -> `cluster_ip`,
/// `HTTPPort` -> `http_port`). Dots and dashes become underscores.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();

            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };

            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '-' || c == '.' || c == '/' {
            out.push('_');
        } else {
            out.push(c);
        }
    }

    out
}

/// Build the data source type name for a CRD kind
///
/// `apps.kubeblocks.io` / `v1alpha1` / `ServiceDescriptor` becomes
/// `k8s_apps_kubeblocks_io_service_descriptor_v1alpha1_manifest`.
#[must_use]
pub fn data_source_name(group: &str, version: &str, kind: &str) -> String {
    let mut parts = vec!["k8s".to_string()];
    if !group.is_empty() {
        parts.push(to_snake_case(group));
    }
    parts.push(to_snake_case(kind));
    parts.push(to_snake_case(version));
    parts.push("manifest".to_string());
    parts.join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_fields() {
        assert_eq!(to_snake_case("serviceKind"), "service_kind");
        assert_eq!(to_snake_case("clusterDefinitionRef"), "cluster_definition_ref");
        assert_eq!(
            to_snake_case("useTargetPodServiceAccount"),
            "use_target_pod_service_account"
        );
        assert_eq!(to_snake_case("name"), "name");
    }

    #[test]
    fn test_acronyms() {
        assert_eq!(to_snake_case("TTL"), "ttl");
        assert_eq!(to_snake_case("ClusterIP"), "cluster_ip");
        assert_eq!(to_snake_case("HTTPPort"), "http_port");
        assert_eq!(to_snake_case("ttlSecondsAfterSucceed"), "ttl_seconds_after_succeed");
    }

    #[test]
    fn test_digits_and_separators() {
        assert_eq!(to_snake_case("v1alpha1"), "v1alpha1");
        assert_eq!(to_snake_case("apps.kubeblocks.io"), "apps_kubeblocks_io");
        assert_eq!(to_snake_case("x-kubernetes-int"), "x_kubernetes_int");
    }

    #[test]
    fn test_data_source_name() {
        assert_eq!(
            data_source_name("apps.kubeblocks.io", "v1alpha1", "ServiceDescriptor"),
            "k8s_apps_kubeblocks_io_service_descriptor_v1alpha1_manifest"
        );
        assert_eq!(
            data_source_name("apps.kubeblocks.io", "v1alpha1", "OpsRequest"),
            "k8s_apps_kubeblocks_io_ops_request_v1alpha1_manifest"
        );
        assert_eq!(data_source_name("", "v1", "ConfigMap"), "k8s_config_map_v1_manifest");
    }
}
