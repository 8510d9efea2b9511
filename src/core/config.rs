//! Environment configuration.
//!
//! Values are read from the process environment, after loading an optional
//! `.env` file.

use di::{inject, injectable};
use log::warn;
use std::env;
use std::str::FromStr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_DATABASE_URL: &str = "sqlite:chat.db?mode=rwc";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Server configuration.
///
/// | Variable       | Default                                       |
/// |----------------|-----------------------------------------------|
/// | `BIND_ADDR`    | `0.0.0.0:5000`                                |
/// | `DATABASE_URL` | `sqlite:chat.db?mode=rwc`                     |
/// | `CORS_ORIGINS` | `http://localhost:3000,http://localhost:5173` |
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into())
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Fixed parameters of the completion call.
///
/// | Variable                   | Default                                            |
/// |----------------------------|----------------------------------------------------|
/// | `GEMINI_API_KEY`           | empty                                              |
/// | `GEMINI_MODEL`             | `gemini-2.0-flash`                                 |
/// | `GEMINI_BASE_URL`          | `https://generativelanguage.googleapis.com/v1beta` |
/// | `GEMINI_MAX_OUTPUT_TOKENS` | `500`                                              |
/// | `GEMINI_TEMPERATURE`       | `0.7`                                              |
#[derive(Clone, Debug)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[injectable]
impl CompletionConfig {
    #[inject]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into()),
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into()),
            max_output_tokens: parse_var("GEMINI_MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS),
            temperature: parse_var("GEMINI_TEMPERATURE", DEFAULT_TEMPERATURE),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    parse_value(name, env::var(name).ok().as_deref(), default)
}

/// Parses a raw variable value, warning and falling back on malformed input.
fn parse_value<T: FromStr>(name: &str, raw: Option<&str>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match T::from_str(raw.trim()) {
        Ok(value) => value,
        Err(_) => {
            warn!("ignoring malformed {name}={raw:?}, using the default");
            default
        }
    }
}
