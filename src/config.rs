use std::path::PathBuf;

/// Side length of the square input the classifier was trained on.
pub const INPUT_SIDE: u32 = 64;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: (String, u16),
    pub model_path: PathBuf,
    pub upload_dir: PathBuf,
    pub class_labels: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: ("127.0.0.1".to_string(), 8080),
            model_path: PathBuf::from("model.onnx"),
            upload_dir: PathBuf::from("uploads"),
            class_labels: vec!["No Pneumonia".to_string(), "Pneumonia".to_string()],
        }
    }
}
