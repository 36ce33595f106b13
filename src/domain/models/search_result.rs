// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 未知存储类型归入的桶
pub const OTHER_STORAGE: &str = "others";

/// 已知的网盘存储类型集合
static STORAGE_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "baidu", "aliyun", "quark", "tianyi", "uc", "mobile", "115", "pikpak", "xunlei", "123",
        "magnet", "ed2k", OTHER_STORAGE,
    ])
});

/// 单条搜索结果
///
/// `unique_id` 是跨来源的稳定标识，用于合并去重；
/// `datetime` 缺失表示来源未提供发布时间
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub unique_id: String,
    pub title: String,
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
    /// 产生该结果的频道或插件名称
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SearchResult {
    pub fn new(unique_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            title: title.into(),
            datetime: None,
            links: Vec::new(),
            source: String::new(),
            content: String::new(),
            tags: Vec::new(),
        }
    }
}

/// 网盘链接
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub url: String,
    pub storage_type: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl Link {
    /// 创建链接，未知的存储类型归入 `others`
    pub fn new(url: impl Into<String>, storage_type: &str) -> Self {
        Self {
            url: url.into(),
            storage_type: normalize_storage_type(storage_type),
            password: None,
        }
    }
}

/// 规范化存储类型标签
pub fn normalize_storage_type(tag: &str) -> String {
    let lowered = tag.trim().to_lowercase();
    if STORAGE_TYPES.contains(lowered.as_str()) {
        lowered
    } else {
        OTHER_STORAGE.to_string()
    }
}
