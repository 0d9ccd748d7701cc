use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 允许跨域访问的前端地址
    pub cors_origins: Vec<String>,
    /// 请求超时（秒）
    pub request_timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件目录
    pub log_dir: Option<PathBuf>,
}

/// 嵌入模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding 后端类型: "simple"、"ollama" 或 "none"
    pub backend: String,
    /// 模型名称
    pub model_name: String,
    /// Ollama 服务器地址
    pub ollama_url: String,
    /// 请求超时（秒）
    pub timeout: u64,
    /// 向量维度
    pub dimension: usize,
}

/// 文本生成配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenerationConfig {
    /// 生成后端类型: "simple"、"ollama" 或 "none"
    pub backend: String,
    /// 模型名称
    pub model_name: String,
    /// Ollama 服务器地址
    pub ollama_url: String,
    /// 请求超时（秒）
    pub timeout: u64,
    /// 提示词最大字符数，超出部分确定性截断
    pub max_prompt_chars: usize,
    /// 最大输出 token 数
    pub max_output_tokens: u32,
}

/// 患者配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PatientConfig {
    /// 年龄
    pub age: u32,
    /// 性别
    pub gender: String,
    /// 启动时写入演示事件
    pub seed_demo_events: bool,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 嵌入模型配置
    pub embedding: EmbeddingConfig,
    /// 文本生成配置
    pub generation: GenerationConfig,
    /// 患者配置
    pub patient: PatientConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8000,
                cors_origins: vec!["http://localhost:3000".into()],
                request_timeout: 120,
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
                log_dir: None,
            },
            embedding: EmbeddingConfig {
                backend: "simple".into(),
                model_name: "bio-clinical-bert".into(),
                ollama_url: "http://localhost:11434".into(),
                timeout: 30,
                dimension: 768,
            },
            generation: GenerationConfig {
                backend: "simple".into(),
                model_name: "flan-t5-small".into(),
                ollama_url: "http://localhost:11434".into(),
                timeout: 60,
                max_prompt_chars: 2048,
                max_output_tokens: 200,
            },
            patient: PatientConfig {
                age: 62,
                gender: "male".into(),
                seed_demo_events: true,
            },
            app_name: "chartline".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config.embedding.backend = "ollama".into();
        config.generation.backend = "ollama".into();
        config.patient.seed_demo_events = false;
        config
    }
}
