// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::domain::models::search_result::SearchResult;

/// 合并两个来源族的结果
///
/// 按 `unique_id` 取并集，冲突时保留发布时间严格更新的一条，
/// 缺失时间的条目输给任何带时间的条目。输出顺序不作保证，
/// 由后续排序统一处理
pub fn merge(tg: Vec<SearchResult>, plugin: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut by_id: HashMap<String, SearchResult> = HashMap::with_capacity(tg.len() + plugin.len());

    for result in tg.into_iter().chain(plugin) {
        match by_id.entry(result.unique_id.clone()) {
            Entry::Occupied(mut slot) => {
                // Option 的排序语义：None 小于任何 Some
                if result.datetime > slot.get().datetime {
                    slot.insert(result);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(result);
            }
        }
    }

    by_id.into_values().collect()
}
