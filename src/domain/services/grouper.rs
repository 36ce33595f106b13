// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

use crate::domain::models::search_result::{Link, SearchResult};

/// 按存储类型分组链接
///
/// 输入为过滤排序后的完整结果集（闸门前），桶内保持追加顺序。
/// 分组只把存储类型当作不透明键使用
pub fn group_by_storage_type(results: &[SearchResult]) -> HashMap<String, Vec<Link>> {
    let mut buckets: HashMap<String, Vec<Link>> = HashMap::new();

    for result in results {
        for link in &result.links {
            buckets
                .entry(link.storage_type.clone())
                .or_default()
                .push(link.clone());
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_links(unique_id: &str, links: Vec<Link>) -> SearchResult {
        let mut result = SearchResult::new(unique_id, format!("title {}", unique_id));
        result.links = links;
        result
    }

    #[test]
    fn test_links_grouped_by_storage_type_in_order() {
        let results = vec![
            result_with_links(
                "a",
                vec![Link::new("u1", "baidu"), Link::new("u2", "quark")],
            ),
            result_with_links("b", vec![Link::new("u3", "baidu")]),
        ];

        let buckets = group_by_storage_type(&results);
        assert_eq!(buckets.len(), 2);

        let baidu: Vec<&str> = buckets["baidu"].iter().map(|l| l.url.as_str()).collect();
        assert_eq!(baidu, vec!["u1", "u3"]);
        assert_eq!(buckets["quark"].len(), 1);
    }

    #[test]
    fn test_result_without_links_contributes_nothing() {
        let results = vec![result_with_links("a", Vec::new())];
        let buckets = group_by_storage_type(&results);
        assert!(buckets.is_empty());
    }
}
