//! Application configuration.
//!
//! Stored at `<config dir>/silamba/config.json`. A few settings can be
//! overridden from the environment (or a `.env` file loaded by the binary):
//!
//! - `SILAMBA_API_URL`: REST server base URL
//! - `SILAMBA_IMAGEKIT_PUBLIC_KEY`
//! - `SILAMBA_CLOUDINARY_CLOUD_NAME`

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;
use crate::upload::{UploadError, UploadProvider, UploadTarget, DEFAULT_CLOUDINARY_PRESET};

/// Application name used for config/data directory paths
const APP_NAME: &str = "silamba";

const CONFIG_FILE: &str = "config.json";

pub const API_URL_ENV: &str = "SILAMBA_API_URL";
const IMAGEKIT_KEY_ENV: &str = "SILAMBA_IMAGEKIT_PUBLIC_KEY";
const CLOUDINARY_CLOUD_ENV: &str = "SILAMBA_CLOUDINARY_CLOUD_NAME";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub upload_provider: UploadProvider,
    pub imagekit_public_key: Option<String>,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_upload_preset: Option<String>,
    /// Admin tab shown when the admin screen last closed.
    pub last_admin_tab: Option<String>,
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the local document, admin flag and logs.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Environment, then config file, then the local default.
    pub fn api_base_url(&self) -> String {
        env_value(API_URL_ENV)
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Account details for the configured upload provider.
    pub fn upload_target(&self) -> Result<UploadTarget, UploadError> {
        match self.upload_provider {
            UploadProvider::ImageKit => {
                let public_key = env_value(IMAGEKIT_KEY_ENV)
                    .or_else(|| self.imagekit_public_key.clone())
                    .ok_or(UploadError::NotConfigured("imagekit_public_key"))?;
                Ok(UploadTarget::ImageKit { public_key })
            }
            UploadProvider::Cloudinary => {
                let cloud_name = env_value(CLOUDINARY_CLOUD_ENV)
                    .or_else(|| self.cloudinary_cloud_name.clone())
                    .ok_or(UploadError::NotConfigured("cloudinary_cloud_name"))?;
                let upload_preset = self
                    .cloudinary_upload_preset
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CLOUDINARY_PRESET.to_string());
                Ok(UploadTarget::Cloudinary {
                    cloud_name,
                    upload_preset,
                })
            }
        }
    }
}
