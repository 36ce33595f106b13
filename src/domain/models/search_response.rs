// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::models::search_result::{Link, SearchResult};

/// 聚合搜索响应
///
/// `total` 的含义取决于视图模式：按类型合并视图统计所有链接数，
/// 其余视图统计过滤后的结果条数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub merged_by_type: HashMap<String, Vec<Link>>,
}
