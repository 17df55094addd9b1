use std::{collections::HashMap, fs};

use openai_integration::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub public_dir: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_image_model: String,
    pub provider_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            public_dir: "public".into(),
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.into(),
            openai_image_model: DEFAULT_IMAGE_MODEL.into(),
            provider_timeout_seconds: 120,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file_config(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("PORT") {
        if v.parse::<u16>().is_ok() {
            settings.server_bind = format!("0.0.0.0:{v}");
        }
    }

    if let Ok(v) = std::env::var("PUBLIC_DIR") {
        settings.public_dir = v;
    }

    if let Ok(v) = std::env::var("OPENAI_API_KEY") {
        if !v.trim().is_empty() {
            settings.openai_api_key = Some(v);
        }
    }
    if let Ok(v) = std::env::var("OPENAI_BASE_URL") {
        settings.openai_base_url = v;
    }
    if let Ok(v) = std::env::var("OPENAI_IMAGE_MODEL") {
        settings.openai_image_model = v;
    }

    if let Ok(v) = std::env::var("PROVIDER_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.provider_timeout_seconds = parsed;
        }
    }

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("public_dir") {
        settings.public_dir = v.clone();
    }
    if let Some(v) = file_cfg.get("openai_api_key") {
        if !v.trim().is_empty() {
            settings.openai_api_key = Some(v.clone());
        }
    }
    if let Some(v) = file_cfg.get("openai_base_url") {
        settings.openai_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("openai_image_model") {
        settings.openai_image_model = v.clone();
    }
    if let Some(v) = file_cfg.get("provider_timeout_seconds") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.provider_timeout_seconds = parsed;
        }
    }
}
