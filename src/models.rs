use serde::Serialize;
use std::path::PathBuf;

/// An upload after it has been written to the scratch directory.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_name: String,
    pub stored_name: String,
    pub path: PathBuf,
    pub content_type: String,
    pub size: u64,
}

impl UploadedImage {
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.stored_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub class_index: usize,
    pub label: String,
}

impl PredictionResult {
    pub fn message(&self) -> String {
        format!("Prediction: {}", self.label)
    }
}

/// Ordered class index to display label mapping.
#[derive(Debug, Clone)]
pub struct ClassLabelTable {
    labels: Vec<String>,
}

impl ClassLabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

#[derive(Debug, Serialize)]
pub struct ResultPage<'a> {
    pub prediction: &'a str,
    pub uploaded_file: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_lookup_is_bounded() {
        let table = ClassLabelTable::new(vec!["cat".into(), "dog".into()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some("dog"));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn prediction_message_format() {
        let result = PredictionResult {
            class_index: 1,
            label: "Pneumonia".into(),
        };
        assert_eq!(result.message(), "Prediction: Pneumonia");
    }
}
