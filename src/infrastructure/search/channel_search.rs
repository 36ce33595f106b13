// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::models::search_result::SearchResult;
use crate::domain::search::source::ChannelScraper;
use crate::infrastructure::cache::cache_key;
use crate::infrastructure::cache::serializer::Serializer;
use crate::infrastructure::cache::two_level_cache::TwoLevelCache;
use crate::infrastructure::pool::worker_pool::WorkerPool;

/// 频道搜索驱动
///
/// 对一组频道做缓存化的并发抓取。单个频道失败或超时
/// 不影响整体，只是不贡献结果
pub struct ChannelSearchDriver {
    scraper: Arc<dyn ChannelScraper>,
    cache: Option<Arc<TwoLevelCache>>,
    cache_ttl: Duration,
    timeout: Duration,
}

impl ChannelSearchDriver {
    pub fn new(
        scraper: Arc<dyn ChannelScraper>,
        cache: Option<Arc<TwoLevelCache>>,
        cache_ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            scraper,
            cache,
            cache_ttl,
            timeout,
        }
    }

    pub async fn search(
        &self,
        keyword: &str,
        channels: &[String],
        force_refresh: bool,
    ) -> Result<Vec<SearchResult>> {
        let key = cache_key::tg_key(keyword, channels);

        if !force_refresh {
            if let Some(cached) = self.read_cache(&key).await {
                info!("Channel search cache hit for keyword: {}", keyword);
                return Ok(cached);
            }
        }

        let tasks: Vec<_> = channels
            .iter()
            .map(|channel| {
                let scraper = Arc::clone(&self.scraper);
                let keyword = keyword.to_string();
                let channel = channel.clone();
                async move {
                    match scraper.scrape(&keyword, &channel).await {
                        Ok(results) => Some(results),
                        Err(e) => {
                            warn!("Channel {} search failed: {}", channel, e);
                            None
                        }
                    }
                }
            })
            .collect();

        let outputs =
            WorkerPool::execute_batch_with_timeout(tasks, channels.len().max(1), self.timeout)
                .await;
        let results: Vec<SearchResult> = outputs.into_iter().flatten().flatten().collect();

        self.write_cache_detached(key, &results);
        Ok(results)
    }

    /// 读缓存，读失败或载荷损坏都按未命中处理
    async fn read_cache(&self, key: &str) -> Option<Vec<SearchResult>> {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(Some(bytes)) => match Serializer::deserialize(&bytes) {
                Ok(results) => Some(results),
                Err(e) => {
                    debug!("Channel cache payload corrupt for key {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                debug!("Channel cache read failed for key {}: {}", key, e);
                None
            }
        }
    }

    /// 异步回写缓存，序列化失败则放弃本次写入
    fn write_cache_detached(&self, key: String, results: &[SearchResult]) {
        let Some(cache) = &self.cache else {
            return;
        };
        match Serializer::serialize(&results) {
            Ok(bytes) => cache.set_detached(key, bytes, self.cache_ttl),
            Err(e) => debug!("Channel cache write skipped for key {}: {}", key, e),
        }
    }
}
