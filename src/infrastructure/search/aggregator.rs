// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::application::dto::search_request::{ResultType, SearchRequest, SourceType};
use crate::config::settings::Settings;
use crate::domain::models::search_response::SearchResponse;
use crate::domain::models::search_result::{Link, SearchResult};
use crate::domain::search::source::ChannelScraper;
use crate::domain::services::{grouper, merger, ranker};
use crate::infrastructure::cache::two_level_cache::TwoLevelCache;
use crate::infrastructure::search::channel_search::ChannelSearchDriver;
use crate::infrastructure::search::plugin_search::PluginSearchDriver;
use crate::infrastructure::search::registry::PluginRegistry;

/// 聚合搜索器
///
/// 把一次请求规范化后并发分发给频道与插件两族驱动，
/// 再经合并、过滤排序、分组与视图装配产出统一响应
pub struct SearchAggregator {
    registry: Arc<PluginRegistry>,
    cache: Option<Arc<TwoLevelCache>>,
    channel_driver: ChannelSearchDriver,
    plugin_driver: PluginSearchDriver,
}

impl SearchAggregator {
    /// 创建聚合器
    ///
    /// 启用缓存时在此一次性完成缓存初始化，增强型失败
    /// 自动回退基础型，之后不再降级
    pub async fn new(
        settings: &Settings,
        registry: Arc<PluginRegistry>,
        scraper: Arc<dyn ChannelScraper>,
    ) -> Self {
        let cache = if settings.cache.enabled {
            Some(Arc::new(TwoLevelCache::new(&settings.cache).await))
        } else {
            info!("Search result caching disabled");
            None
        };

        let cache_ttl = settings.cache.ttl();
        let timeout = settings.search.plugin_timeout();

        Self {
            registry: Arc::clone(&registry),
            cache: cache.clone(),
            channel_driver: ChannelSearchDriver::new(scraper, cache.clone(), cache_ttl, timeout),
            plugin_driver: PluginSearchDriver::new(registry, cache, cache_ttl, timeout),
        }
    }

    /// 统一搜索入口
    ///
    /// 两族驱动在同一请求future内并发执行，调用方对整个
    /// future设置的截止时间会同时中止两者并丢弃部分结果
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        request.validate()?;
        let request = request.normalized(&self.registry);

        let run_channels = matches!(request.source_type, SourceType::All | SourceType::Tg);
        let run_plugins = matches!(request.source_type, SourceType::All | SourceType::Plugin);

        let channel_results = async {
            if run_channels {
                self.channel_driver
                    .search(&request.keyword, &request.channels, request.force_refresh)
                    .await
            } else {
                Ok(Vec::new())
            }
        };
        let plugin_results = async {
            if run_plugins {
                self.plugin_driver
                    .search(
                        &request.keyword,
                        request.plugins.as_deref(),
                        request.force_refresh,
                        request.concurrency,
                        &request.ext,
                    )
                    .await
            } else {
                Ok(Vec::new())
            }
        };

        let (channel_results, plugin_results) = tokio::join!(channel_results, plugin_results);
        // 两族都失败时按约定返回频道族的错误
        let channel_results = channel_results?;
        let plugin_results = plugin_results?;

        debug!(
            "Merging {} channel results with {} plugin results",
            channel_results.len(),
            plugin_results.len()
        );

        let merged = merger::merge(channel_results, plugin_results);
        let mut filtered = ranker::filter_by_keyword(merged, &request.keyword);
        ranker::sort_results(&mut filtered);

        let gated = ranker::apply_results_gate(&filtered);
        let merged_by_type = grouper::group_by_storage_type(&filtered);

        Ok(assemble(request.result_type, gated, merged_by_type))
    }

    /// 缓存句柄
    pub fn cache(&self) -> Option<&Arc<TwoLevelCache>> {
        self.cache.as_ref()
    }

    /// 等待后台缓存写入完成
    ///
    /// 请求路径不依赖后台写入，此钩子供测试与停机排空使用
    pub async fn flush_cache_writes(&self) {
        if let Some(cache) = &self.cache {
            cache.flush_writes().await;
        }
    }
}

/// 按视图模式装配响应
fn assemble(
    result_type: ResultType,
    results: Vec<SearchResult>,
    merged_by_type: HashMap<String, Vec<Link>>,
) -> SearchResponse {
    match result_type {
        ResultType::All => SearchResponse {
            total: results.len(),
            results,
            merged_by_type,
        },
        ResultType::Results => SearchResponse {
            total: results.len(),
            results,
            merged_by_type: HashMap::new(),
        },
        ResultType::MergedByType => SearchResponse {
            total: merged_by_type.values().map(Vec::len).sum(),
            results: Vec::new(),
            merged_by_type,
        },
    }
}
