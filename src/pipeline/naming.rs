// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Kubernetes-safe names
//!
//! Task and pipeline names end up as resource names in the manifest, which
//! must be RFC 1123 labels: lowercase alphanumerics and '-', at most 63 chars.

use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of an RFC 1123 label
pub const MAX_NAME_LEN: usize = 63;

fn invalid_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"))
}

/// Convert an arbitrary name into an RFC 1123 label
///
/// `model_training_pipeline_kfp` becomes `model-training-pipeline-kfp`.
pub fn sanitize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let replaced = invalid_run().replace_all(&lowered, "-");
    let mut label: String = replaced.trim_matches('-').chars().take(MAX_NAME_LEN).collect();

    while label.ends_with('-') {
        label.pop();
    }

    if label.is_empty() {
        "task".to_string()
    } else {
        label
    }
}

/// Whether a name is already a valid RFC 1123 label
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && sanitize_name(name) == name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_underscores_and_case() {
        assert_eq!(
            sanitize_name("model_training_pipeline_kfp"),
            "model-training-pipeline-kfp"
        );
        assert_eq!(sanitize_name("Ingest Data"), "ingest-data");
    }

    #[test]
    fn test_sanitize_trims_separators() {
        assert_eq!(sanitize_name("__train__"), "train");
        assert_eq!(sanitize_name("a..b"), "a-b");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(100);
        assert_eq!(sanitize_name(&long).len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_name("___"), "task");
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("convert-model"));
        assert!(!is_valid_name("convert_model"));
        assert!(!is_valid_name(""));
    }
}
