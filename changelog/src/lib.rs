pub mod category;
pub mod document;
pub mod error;
pub mod patterns;
pub mod release;
pub mod remote;
pub mod section;

pub use category::{classify, Category};
pub use document::ChangelogDoc;
pub use error::{ChangelogError, Result};
pub use release::Release;
pub use remote::{classifier_for, Classifier, HttpClassifier, LocalClassifier, RemoteConfig};
pub use section::Section;
