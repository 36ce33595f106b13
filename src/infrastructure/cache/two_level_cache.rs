// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::settings::CacheSettings;
use crate::infrastructure::cache::redis_client::RedisClient;

/// 缓存条目
struct CacheEntry {
    data: Vec<u8>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// 热层内存缓存
struct MemoryTier {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl MemoryTier {
    fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                return None;
            }
            return Some(entry.data.clone());
        }
        None
    }

    fn set(&self, key: &str, data: Vec<u8>, ttl: Duration) {
        self.entries.insert(key.to_string(), CacheEntry::new(data, ttl));
        self.evict_if_needed();
    }

    fn evict_if_needed(&self) {
        let current_size = self.entries.len();
        if current_size <= self.max_entries {
            return;
        }

        // 多淘汰10%，避免每次写入都触发淘汰
        let to_evict = current_size - self.max_entries + (self.max_entries / 10);

        let mut entries: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().created_at))
            .collect();
        entries.sort_by_key(|(_, created_at)| *created_at);

        for (key, _) in entries.iter().take(to_evict) {
            self.entries.remove(key);
        }

        debug!("Evicted {} entries from memory cache tier", to_evict);
    }
}

/// 两级缓存
///
/// 内存热层叠加Redis持久层。构造时优先尝试增强型（内存+Redis），
/// Redis不可用时回退为仅内存的基础型；调用方不感知具体形态。
/// 读取优先走持久层，使外部刷新器写入的结果能够被观察到
pub struct TwoLevelCache {
    memory: MemoryTier,
    persistent: Option<RedisClient>,
    memory_ttl: Duration,
    pending_writes: Mutex<Vec<JoinHandle<()>>>,
}

impl TwoLevelCache {
    /// 按配置构造缓存
    pub async fn new(config: &CacheSettings) -> Self {
        let persistent = match &config.redis_url {
            Some(url) => match Self::connect_persistent(url).await {
                Ok(client) => {
                    info!("Two-level cache initialized with persistent tier");
                    Some(client)
                }
                Err(e) => {
                    warn!(
                        "Persistent cache tier unavailable, falling back to memory-only: {}",
                        e
                    );
                    None
                }
            },
            None => None,
        };

        Self {
            memory: MemoryTier::new(config.max_entries),
            persistent,
            memory_ttl: config.ttl(),
            pending_writes: Mutex::new(Vec::new()),
        }
    }

    async fn connect_persistent(url: &str) -> Result<RedisClient> {
        let client = RedisClient::new(url)?;
        client.ping().await?;
        Ok(client)
    }

    /// 读取缓存
    ///
    /// 持久层读取失败按未命中处理，再回退热层
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(redis) = &self.persistent {
            match redis.get(key).await {
                Ok(Some(data)) => {
                    // 回填热层
                    self.memory.set(key, data.clone(), self.memory_ttl);
                    return Ok(Some(data));
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("Persistent tier read failed for key {}: {}", key, e);
                }
            }
        }

        Ok(self.memory.get(key))
    }

    /// 写入两层缓存
    pub async fn set(&self, key: &str, data: Vec<u8>, ttl: Duration) -> Result<()> {
        self.memory.set(key, data.clone(), ttl);

        if let Some(redis) = &self.persistent {
            redis.set(key, &data, ttl.as_secs().max(1)).await?;
        }
        Ok(())
    }

    /// 后台异步写入
    ///
    /// 写入任务脱离请求路径执行，失败被丢弃
    pub fn set_detached(self: &Arc<Self>, key: String, data: Vec<u8>, ttl: Duration) {
        let cache = Arc::clone(self);
        let handle = tokio::spawn(async move {
            if let Err(e) = cache.set(&key, data, ttl).await {
                debug!("Background cache write dropped for key {}: {}", key, e);
            }
        });

        let mut pending = self.pending_writes.lock().unwrap();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// 等待所有后台写入落盘
    ///
    /// 请求路径不会调用，供测试与停机排空使用
    pub async fn flush_writes(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending_writes.lock().unwrap();
            pending.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_only_settings() -> CacheSettings {
        CacheSettings {
            enabled: true,
            ttl_minutes: 60,
            max_entries: 100,
            redis_url: None,
        }
    }

    #[tokio::test]
    async fn test_set_and_get_memory_tier() {
        let cache = TwoLevelCache::new(&memory_only_settings()).await;

        cache
            .set("k1", b"payload".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();

        let cached = cache.get("k1").await.unwrap();
        assert_eq!(cached, Some(b"payload".to_vec()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = TwoLevelCache::new(&memory_only_settings()).await;

        cache
            .set("k1", b"payload".to_vec(), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_memory_only() {
        let settings = CacheSettings {
            redis_url: Some("redis://127.0.0.1:1/".to_string()),
            ..memory_only_settings()
        };

        // Then: 构造不报错，基础型缓存仍然可用
        let cache = TwoLevelCache::new(&settings).await;
        cache
            .set("k1", b"payload".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.get("k1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_detached_write_lands_after_flush() {
        let cache = Arc::new(TwoLevelCache::new(&memory_only_settings()).await);

        cache.set_detached("k1".to_string(), b"payload".to_vec(), Duration::from_secs(60));
        cache.flush_writes().await;

        assert!(cache.get("k1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_eviction_bounds_entry_count() {
        let settings = CacheSettings {
            max_entries: 10,
            ..memory_only_settings()
        };
        let cache = TwoLevelCache::new(&settings).await;

        for i in 0..30 {
            cache
                .set(&format!("k{}", i), vec![0u8], Duration::from_secs(60))
                .await
                .unwrap();
        }

        assert!(cache.memory.entries.len() <= 11);
    }
}
