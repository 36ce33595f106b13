// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含缓存与搜索两组配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 缓存配置
    pub cache: CacheSettings,
    /// 搜索配置
    pub search: SearchSettings,
}

/// 缓存配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// 是否启用缓存
    pub enabled: bool,
    /// 缓存TTL（分钟）
    pub ttl_minutes: u64,
    /// 内存热层最大条目数
    pub max_entries: usize,
    /// 持久层Redis连接URL，缺省时仅用内存层
    pub redis_url: Option<String>,
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes * 60)
    }
}

/// 搜索配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// 单批搜索任务的超时时间（秒）
    pub plugin_timeout_secs: u64,
}

impl SearchSettings {
    pub fn plugin_timeout(&self) -> Duration {
        Duration::from_secs(self.plugin_timeout_secs)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件与环境变量加载，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default cache settings
            .set_default("cache.enabled", true)?
            .set_default("cache.ttl_minutes", 60)?
            .set_default("cache.max_entries", 10000)?
            // Default search settings
            .set_default("search.plugin_timeout_secs", 30)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SEARCHRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache: CacheSettings {
                enabled: true,
                ttl_minutes: 60,
                max_entries: 10000,
                redis_url: None,
            },
            search: SearchSettings {
                plugin_timeout_secs: 30,
            },
        }
    }
}
