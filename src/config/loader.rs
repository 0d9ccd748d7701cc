use crate::config::config::AppConfig;
use crate::services::notes::min_prompt_chars;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// 已知的嵌入/生成后端
const KNOWN_BACKENDS: &[&str] = &["simple", "ollama", "none"];

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 合并顺序：
    /// 1. 开发环境默认值
    /// 2. ./chartline.toml
    /// 3. 环境变量（CHARTLINE_ 前缀，`__` 分隔层级）
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        Figment::from(Serialized::defaults(AppConfig::development()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CHARTLINE_").split("__"))
            .extract()
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.embedding.dimension == 0 {
            return Err(ConfigValidationError::InvalidDimension);
        }

        if config.generation.max_prompt_chars == 0 || config.generation.max_output_tokens == 0 {
            return Err(ConfigValidationError::InvalidGenerationLimits);
        }

        let min_prompt = min_prompt_chars();
        if config.generation.max_prompt_chars < min_prompt {
            return Err(ConfigValidationError::PromptLimitTooSmall {
                min: min_prompt,
                got: config.generation.max_prompt_chars,
            });
        }

        for backend in [&config.embedding.backend, &config.generation.backend] {
            if !KNOWN_BACKENDS.contains(&backend.as_str()) {
                return Err(ConfigValidationError::UnknownBackend(backend.clone()));
            }
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("向量维度无效，必须大于 0")]
    InvalidDimension,

    #[error("生成长度限制无效，必须大于 0")]
    InvalidGenerationLimits,

    #[error("提示词长度上限过小: 至少 {min}，实际 {got}")]
    PromptLimitTooSmall { min: usize, got: usize },

    #[error("未知的后端类型: {0}")]
    UnknownBackend(String),
}

impl From<ConfigValidationError> for crate::error::AppError {
    fn from(e: ConfigValidationError) -> Self {
        crate::error::AppError::Config(e.to_string())
    }
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("chartline.toml")
}
