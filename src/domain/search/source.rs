// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::search_result::SearchResult;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SourceError {
    #[error("Plugin error: {0}")]
    Plugin(String),
    #[error("Scraper error: {0}")]
    Scraper(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout")]
    Timeout,
}

/// 具名插件搜索源
#[async_trait]
pub trait SearchPlugin: Send + Sync {
    /// 获取插件名称
    fn name(&self) -> &str;

    /// 执行插件搜索
    async fn search(
        &self,
        keyword: &str,
        ext: &Map<String, Value>,
    ) -> Result<Vec<SearchResult>, SourceError>;
}

/// 频道抓取器
///
/// 针对指定频道抓取关键词的搜索结果
#[async_trait]
pub trait ChannelScraper: Send + Sync {
    async fn scrape(
        &self,
        keyword: &str,
        channel: &str,
    ) -> Result<Vec<SearchResult>, SourceError>;
}
