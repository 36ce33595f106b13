// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::models::search_result::SearchResult;
use crate::infrastructure::cache::cache_key;
use crate::infrastructure::cache::serializer::Serializer;
use crate::infrastructure::cache::two_level_cache::TwoLevelCache;
use crate::infrastructure::pool::worker_pool::WorkerPool;
use crate::infrastructure::search::registry::PluginRegistry;

/// 插件搜索驱动
///
/// 对已注册插件做缓存化的并发检索。缓存读取优先持久层，
/// 外部刷新器写入的结果在这里能直接被命中
pub struct PluginSearchDriver {
    registry: Arc<PluginRegistry>,
    cache: Option<Arc<TwoLevelCache>>,
    cache_ttl: Duration,
    timeout: Duration,
}

impl PluginSearchDriver {
    pub fn new(
        registry: Arc<PluginRegistry>,
        cache: Option<Arc<TwoLevelCache>>,
        cache_ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            cache,
            cache_ttl,
            timeout,
        }
    }

    /// 执行插件族搜索
    ///
    /// `plugins` 应当已经过规范化：`None` 表示全部已注册插件
    pub async fn search(
        &self,
        keyword: &str,
        plugins: Option<&[String]>,
        force_refresh: bool,
        concurrency: usize,
        ext: &Map<String, Value>,
    ) -> Result<Vec<SearchResult>> {
        let key = cache_key::plugin_key(keyword, plugins);

        if !force_refresh {
            if let Some(cached) = self.read_cache(&key).await {
                info!("Plugin search cache hit for keyword: {}", keyword);
                return Ok(cached);
            }
        }

        let resolved = self.registry.resolve(plugins);
        debug!("Dispatching plugin search to {} plugins", resolved.len());

        let tasks: Vec<_> = resolved
            .into_iter()
            .map(|plugin| {
                let keyword = keyword.to_string();
                let ext = ext.clone();
                async move {
                    match plugin.search(&keyword, &ext).await {
                        Ok(results) => Some(results),
                        Err(e) => {
                            warn!("Plugin {} search failed: {}", plugin.name(), e);
                            None
                        }
                    }
                }
            })
            .collect();

        let outputs = WorkerPool::execute_batch_with_timeout(tasks, concurrency, self.timeout).await;
        let results: Vec<SearchResult> = outputs.into_iter().flatten().flatten().collect();

        self.write_cache_detached(key, &results);
        Ok(results)
    }

    async fn read_cache(&self, key: &str) -> Option<Vec<SearchResult>> {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(Some(bytes)) => match Serializer::deserialize(&bytes) {
                Ok(results) => Some(results),
                Err(e) => {
                    debug!("Plugin cache payload corrupt for key {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!("Plugin cache read failed for key {}: {}", key, e);
                None
            }
        }
    }

    fn write_cache_detached(&self, key: String, results: &[SearchResult]) {
        let Some(cache) = &self.cache else {
            return;
        };
        match Serializer::serialize(&results) {
            Ok(bytes) => cache.set_detached(key, bytes, self.cache_ttl),
            Err(e) => debug!("Plugin cache write skipped for key {}: {}", key, e),
        }
    }
}
