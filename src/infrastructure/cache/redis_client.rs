// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

/// 持久层Redis访问器
///
/// 两级缓存的载荷契约是序列化后的字节序列，这里按原始字节
/// 读写，编解码完全交给上层的序列化器
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    /// 解析连接URL
    ///
    /// 仅做URL解析，不建立连接；连通性由 `ping` 单独探测
    pub fn new(redis_url: &str) -> Result<Self> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// 连通性探测
    ///
    /// 增强型缓存构造时以此判定持久层是否可用，失败则回退
    /// 仅内存的基础型
    pub async fn ping(&self) -> Result<()> {
        let mut con = self.connection().await?;
        redis::cmd("PING").query_async::<()>(&mut con).await?;
        Ok(())
    }

    /// 读取键对应的载荷，键不存在时返回 `None`
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut con = self.connection().await?;
        Ok(con.get(key).await?)
    }

    /// 写入载荷并设置过期时间（秒）
    pub async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()> {
        let mut con = self.connection().await?;
        con.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }
}
