use reqwest::blocking::Client;
use serde_json::Value;
use sha2::{Digest, Sha224};

use crate::category::Category;

/// Production classification endpoint.
pub const SERVER_DOMAIN: &str = "https://av9kmkrq4f.execute-api.eu-west-2.amazonaws.com/Prod/";

/// Endpoint used when developing against a locally-run classification server.
pub const LOCAL_DOMAIN: &str = "http://127.0.0.1:3000/";

/// A commit paired with its (possibly undetermined) category.
pub type ClassifiedCommit = (Option<Category>, String);

/// Settings for the remote classification service, resolved by the caller
/// up front instead of read from the process environment ad hoc.
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    pub api_key: Option<String>,
    pub run_locally: bool,
    pub project_name: String,
}

/// Optional refinement of locally-classified commits.
pub trait Classifier {
    /// Returns refined classifications for the batch, or `None` when no
    /// refinement is available. Callers fall back to the submitted batch.
    fn classify_batch(&self, batch: &[ClassifiedCommit], version: &str)
        -> Option<Vec<ClassifiedCommit>>;
}

/// Classifier used when no API credential is configured. The local
/// heuristic classification always stands.
pub struct LocalClassifier;

impl Classifier for LocalClassifier {
    fn classify_batch(
        &self,
        _batch: &[ClassifiedCommit],
        _version: &str,
    ) -> Option<Vec<ClassifiedCommit>> {
        None
    }
}

/// Classifier backed by the remote classification service.
///
/// Sends the project name only as a SHA-224 digest, for usage logging.
pub struct HttpClassifier {
    client: Client,
    base_url: String,
    api_key: String,
    project_hash: String,
}

impl HttpClassifier {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, project_name: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            project_hash: hash_project_name(project_name),
        }
    }

    #[must_use]
    pub fn project_hash(&self) -> &str {
        &self.project_hash
    }
}

impl Classifier for HttpClassifier {
    fn classify_batch(
        &self,
        batch: &[ClassifiedCommit],
        version: &str,
    ) -> Option<Vec<ClassifiedCommit>> {
        let url = format!("{}/classify", self.base_url.trim_end_matches('/'));
        let body: Vec<(Option<&str>, &str)> = batch
            .iter()
            .map(|(category, text)| (category.map(Category::name), text.as_str()))
            .collect();

        let response = self
            .client
            .post(url)
            .query(&[("project", self.project_hash.as_str()), ("version", version)])
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let payload: Value = response.json().ok()?;
        let mut message = payload.get("message")?.clone();

        // The payload is either already structured, or a string holding JSON.
        if let Value::String(text) = &message {
            if let Ok(parsed) = serde_json::from_str::<Value>(text) {
                message = parsed;
            }
        }

        decode_pairs(&message)
    }
}

/// Builds the classifier matching the resolved configuration: HTTP-backed
/// when a credential is present, otherwise the no-refinement local one.
#[must_use]
pub fn classifier_for(config: &RemoteConfig) -> Box<dyn Classifier> {
    match &config.api_key {
        Some(api_key) => {
            let domain = if config.run_locally {
                LOCAL_DOMAIN
            } else {
                SERVER_DOMAIN
            };
            Box::new(HttpClassifier::new(domain, api_key, &config.project_name))
        }
        None => Box::new(LocalClassifier),
    }
}

fn hash_project_name(project_name: &str) -> String {
    let digest = Sha224::digest(project_name.as_bytes());
    format!("{digest:x}")
}

fn decode_pairs(value: &Value) -> Option<Vec<ClassifiedCommit>> {
    value
        .as_array()?
        .iter()
        .map(|item| {
            let pair = item.as_array()?;
            let category = match pair.first()? {
                Value::Null => None,
                Value::String(name) => Some(Category::parse(name)?),
                _ => return None,
            };
            let text = pair.get(1)?.as_str()?.to_string();
            Some((category, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_pair_list() {
        let payload = json!([["Fixed", "The login bug"], [null, "Something vague"]]);

        let pairs = decode_pairs(&payload).unwrap();

        assert_eq!(
            pairs,
            vec![
                (Some(Category::Fixed), "The login bug".to_string()),
                (None, "Something vague".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert_eq!(decode_pairs(&json!("not a list")), None);
        assert_eq!(decode_pairs(&json!([["Fixed"]])), None);
        assert_eq!(decode_pairs(&json!([[42, "text"]])), None);
        assert_eq!(decode_pairs(&json!([["NotACategory", "text"]])), None);
    }

    #[test]
    fn hashes_project_name_to_sha224_hex() {
        let hash = hash_project_name("DefaultProject");

        // SHA-224 digests are 28 bytes, so 56 hex characters.
        assert_eq!(hash.len(), 56);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_project_name("DefaultProject"));
        assert_ne!(hash, hash_project_name("AnotherProject"));
    }

    #[test]
    fn local_classifier_never_refines() {
        let batch = vec![(None, "Gazumped the tests".to_string())];

        assert!(LocalClassifier.classify_batch(&batch, "1.0.0").is_none());
    }

    #[test]
    fn classifier_for_uses_local_without_credential() {
        let config = RemoteConfig::default();
        let classifier = classifier_for(&config);

        assert!(classifier.classify_batch(&[], "1.0.0").is_none());
    }
}
