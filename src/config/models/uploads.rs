//! Upload configuration

use serde::{Deserialize, Serialize};

/// File upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded files are written to and served from
    #[serde(default = "default_upload_dir")]
    pub directory: String,
    /// Per-file size limit in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    /// Files accepted by a single multi-upload request
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Accepted extensions, lowercase without the dot
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: default_upload_dir(),
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl UploadConfig {
    /// Validate upload configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("Upload directory cannot be empty".to_string());
        }
        if self.max_file_size == 0 {
            return Err("Max file size cannot be 0".to_string());
        }
        if self.max_files == 0 {
            return Err("Max files cannot be 0".to_string());
        }
        Ok(())
    }
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

fn default_max_files() -> usize {
    10
}

fn default_allowed_extensions() -> Vec<String> {
    [
        "jpeg", "jpg", "png", "gif", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt",
        "zip", "rar",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
