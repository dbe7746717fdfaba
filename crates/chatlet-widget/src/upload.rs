// SPDX-FileCopyrightText: 2026 Chatlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local upload checks run before any request is made.

use chatlet_config::model::UploadConfig;
use chatlet_core::FileUpload;
use thiserror::Error;

/// Why a file was rejected before upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadViolation {
    #[error("file type `{mime_type}` is not allowed")]
    UnsupportedType { mime_type: String },

    #[error("file is {size} bytes, limit is {max}")]
    TooLarge { size: u64, max: u64 },
}

/// MIME allow-list and size limit for uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    max_file_size: u64,
    allowed_file_types: Vec<String>,
}

impl UploadPolicy {
    pub fn new(max_file_size: u64, allowed_file_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_file_types,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.max_file_size, config.allowed_file_types.clone())
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// MIME types compare case-insensitively.
    pub fn allows_type(&self, mime_type: &str) -> bool {
        self.allowed_file_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }

    /// Checks the type first, then the size. A file exactly at the limit passes.
    pub fn check(&self, file: &FileUpload) -> Result<(), UploadViolation> {
        if !self.allows_type(&file.mime_type) {
            return Err(UploadViolation::UnsupportedType {
                mime_type: file.mime_type.clone(),
            });
        }
        if file.size() > self.max_file_size {
            return Err(UploadViolation::TooLarge {
                size: file.size(),
                max: self.max_file_size,
            });
        }
        Ok(())
    }
}

/// Chat text for an uploaded image.
pub fn image_markdown(name: &str, url: &str) -> String {
    format!("![{name}]({url})")
}
