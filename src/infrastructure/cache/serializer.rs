// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// 缓存序列化器
///
/// 负责缓存载荷的JSON编解码
pub struct Serializer;

impl Serializer {
    /// 序列化为字节
    pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// 从字节反序列化
    pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
