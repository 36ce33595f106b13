// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::cmp::Reverse;

use crate::domain::models::search_result::SearchResult;

/// 标题中标记编辑优先级的关键词
pub const PRIORITY_KEYWORDS: [&str; 6] = ["全", "合集", "系列", "完", "最新", "附"];

/// 计算标题的优先级得分
///
/// 统计标题命中的优先关键词个数，每个关键词至多计一次
pub fn priority(title: &str) -> usize {
    PRIORITY_KEYWORDS
        .iter()
        .filter(|keyword| title.contains(*keyword))
        .count()
}

/// 关键词过滤
///
/// 丢弃标题不包含关键词的条目，匹配不区分大小写
pub fn filter_by_keyword(results: Vec<SearchResult>, keyword: &str) -> Vec<SearchResult> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return results;
    }

    results
        .into_iter()
        .filter(|result| result.title.to_lowercase().contains(&needle))
        .collect()
}

/// 复合排序
///
/// 带时间的条目排在无时间条目之前；带时间条目内部先按优先级
/// 降序再按时间降序；无时间条目按优先级降序，其余保持插入顺序
pub fn sort_results(results: &mut [SearchResult]) {
    results.sort_by_cached_key(|result| {
        (
            result.datetime.is_none(),
            Reverse(priority(&result.title)),
            Reverse(result.datetime),
        )
    });
}

/// 结果闸门
///
/// 仅保留有发布时间或命中优先关键词的条目，被淘汰的条目
/// 仍参与按存储类型的链接分组
pub fn apply_results_gate(results: &[SearchResult]) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|result| result.datetime.is_some() || priority(&result.title) > 0)
        .cloned()
        .collect()
}
