// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::infrastructure::search::registry::PluginRegistry;

/// 响应视图模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// 同时返回平铺结果与按类型分组
    #[default]
    All,
    /// 仅返回平铺结果
    Results,
    /// 仅返回按类型分组
    MergedByType,
}

impl ResultType {
    /// 解析视图模式，空串视为 all
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "" | "all" => Some(Self::All),
            "results" => Some(Self::Results),
            "merged_by_type" => Some(Self::MergedByType),
            _ => None,
        }
    }
}

/// 搜索来源族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// 频道与插件两族
    #[default]
    All,
    /// 仅频道族
    Tg,
    /// 仅插件族
    Plugin,
}

impl SourceType {
    /// 解析来源族，空串视为 all
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "" | "all" => Some(Self::All),
            "tg" => Some(Self::Tg),
            "plugin" => Some(Self::Plugin),
            _ => None,
        }
    }
}

/// 聚合搜索请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, message = "Keyword cannot be empty"))]
    pub keyword: String,
    #[serde(default)]
    pub channels: Vec<String>,
    /// 0 表示按解析出的插件数自动推导
    #[serde(default)]
    pub concurrency: usize,
    #[serde(default)]
    pub force_refresh: bool,
    #[serde(default, deserialize_with = "de_result_type")]
    pub result_type: ResultType,
    #[serde(default, deserialize_with = "de_source_type")]
    pub source_type: SourceType,
    /// `None` 表示全部已注册插件
    #[serde(default)]
    pub plugins: Option<Vec<String>>,
    #[serde(default)]
    pub ext: Map<String, Value>,
}

impl SearchRequest {
    /// 以默认参数构造请求
    pub fn with_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            channels: Vec::new(),
            concurrency: 0,
            force_refresh: false,
            result_type: ResultType::All,
            source_type: SourceType::All,
            plugins: None,
            ext: Map::new(),
        }
    }

    /// 规范化请求参数
    ///
    /// 把等价请求折叠到同一规范形态，保证缓存键命中率与
    /// 行为确定性。规范化是幂等的
    pub fn normalized(mut self, registry: &PluginRegistry) -> Self {
        if self.source_type == SourceType::Tg {
            // 仅频道族时插件选择无意义
            self.plugins = None;
        } else {
            self.plugins = normalize_plugins(self.plugins, registry);
        }

        if self.concurrency == 0 {
            let resolved = match self.source_type {
                SourceType::Tg => 0,
                _ => self.plugins.as_ref().map_or(registry.len(), Vec::len),
            };
            self.concurrency = resolved + 10;
        }

        self
    }
}

/// 规范化插件选择
///
/// 去掉空串、小写、去重并排序；空集或恰为全量注册集时
/// 折叠为 `None`，使两种等价写法共享一个缓存键
fn normalize_plugins(
    plugins: Option<Vec<String>>,
    registry: &PluginRegistry,
) -> Option<Vec<String>> {
    let list = plugins?;

    let mut canonical: Vec<String> = list
        .iter()
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    canonical.sort();
    canonical.dedup();

    if canonical.is_empty() {
        return None;
    }

    let full_set = registry.name_set();
    if !full_set.is_empty()
        && canonical.len() == full_set.len()
        && canonical.iter().all(|name| full_set.contains(name))
    {
        return None;
    }

    Some(canonical)
}

fn de_result_type<'de, D>(deserializer: D) -> Result<ResultType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    ResultType::parse(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown result_type: {}", raw)))
}

fn de_source_type<'de, D>(deserializer: D) -> Result<SourceType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    SourceType::parse(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown source_type: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::search_result::SearchResult;
    use crate::domain::search::source::{SearchPlugin, SourceError};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NamedPlugin {
        name: &'static str,
    }

    #[async_trait]
    impl SearchPlugin for NamedPlugin {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(
            &self,
            _keyword: &str,
            _ext: &Map<String, Value>,
        ) -> Result<Vec<SearchResult>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn registry_with(names: &[&'static str]) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        for name in names.iter().copied() {
            registry.register(Arc::new(NamedPlugin { name }));
        }
        registry
    }

    #[test]
    fn test_empty_source_type_parses_as_all() {
        assert_eq!(SourceType::parse(""), Some(SourceType::All));
        assert_eq!(ResultType::parse(""), Some(ResultType::All));
        assert_eq!(SourceType::parse("bogus"), None);
    }

    #[test]
    fn test_tg_source_discards_plugin_selection() {
        let registry = registry_with(&["p1"]);
        let mut request = SearchRequest::with_keyword("foo");
        request.source_type = SourceType::Tg;
        request.plugins = Some(vec!["p1".to_string()]);

        let normalized = request.normalized(&registry);
        assert_eq!(normalized.plugins, None);
    }

    #[test]
    fn test_empty_strings_collapse_to_none() {
        let registry = registry_with(&["p1", "p2"]);
        let mut request = SearchRequest::with_keyword("foo");
        request.plugins = Some(vec!["".to_string(), "".to_string()]);

        let normalized = request.normalized(&registry);
        assert_eq!(normalized.plugins, None);
    }

    #[test]
    fn test_full_registry_selection_collapses_to_none() {
        let registry = registry_with(&["P1", "P2"]);
        let mut request = SearchRequest::with_keyword("foo");
        request.plugins = Some(vec!["p1".to_string(), "p2".to_string()]);

        let normalized = request.normalized(&registry);
        assert_eq!(normalized.plugins, None);
    }

    #[test]
    fn test_partial_selection_is_canonicalized() {
        let registry = registry_with(&["p1", "p2", "p3"]);
        let mut request = SearchRequest::with_keyword("foo");
        request.plugins = Some(vec!["P2".to_string(), "p1".to_string(), "p2 ".to_string()]);

        let normalized = request.normalized(&registry);
        assert_eq!(
            normalized.plugins,
            Some(vec!["p1".to_string(), "p2".to_string()])
        );
    }

    #[test]
    fn test_concurrency_defaults_from_resolved_plugins() {
        let registry = registry_with(&["p1", "p2"]);

        let normalized = SearchRequest::with_keyword("foo").normalized(&registry);
        assert_eq!(normalized.concurrency, 12);

        let mut request = SearchRequest::with_keyword("foo");
        request.concurrency = 3;
        let normalized = request.normalized(&registry);
        assert_eq!(normalized.concurrency, 3);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let registry = registry_with(&["p1", "p2", "p3"]);
        let mut request = SearchRequest::with_keyword("foo");
        request.plugins = Some(vec!["P2".to_string(), "p1".to_string()]);

        let once = request.normalized(&registry);
        let twice = once.clone().normalized(&registry);
        assert_eq!(once.plugins, twice.plugins);
        assert_eq!(once.concurrency, twice.concurrency);
    }

    #[test]
    fn test_deserialize_with_string_modes() {
        let raw = r#"{
            "keyword": "foo",
            "source_type": "",
            "result_type": "merged_by_type"
        }"#;

        let request: SearchRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.source_type, SourceType::All);
        assert_eq!(request.result_type, ResultType::MergedByType);
        assert!(request.ext.is_empty());
    }
}
