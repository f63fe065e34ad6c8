use crate::classifier::Classifier;
use crate::config::AppConfig;
use crate::models::ClassLabelTable;
use crate::templates::Pages;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a request needs, built once before the server starts and never mutated.
pub struct AppContext {
    pub classifier: Arc<dyn Classifier>,
    pub labels: Arc<ClassLabelTable>,
    pub pages: Pages,
    pub upload_dir: PathBuf,
}

impl AppContext {
    pub fn new(config: &AppConfig, classifier: Arc<dyn Classifier>, pages: Pages) -> Self {
        Self {
            classifier,
            labels: Arc::new(ClassLabelTable::new(config.class_labels.clone())),
            pages,
            upload_dir: config.upload_dir.clone(),
        }
    }
}
