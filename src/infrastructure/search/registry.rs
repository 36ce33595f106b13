// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use crate::domain::search::source::SearchPlugin;

/// 插件注册表
///
/// 维护已注册插件的有序列表，名称匹配不区分大小写
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn SearchPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册插件，重名插件被忽略
    pub fn register(&mut self, plugin: Arc<dyn SearchPlugin>) {
        let name = plugin.name().to_lowercase();
        if self
            .plugins
            .iter()
            .any(|existing| existing.name().to_lowercase() == name)
        {
            warn!("Plugin {} already registered, ignoring", name);
            return;
        }
        self.plugins.push(plugin);
    }

    /// 获取全部已注册插件
    pub fn plugins(&self) -> &[Arc<dyn SearchPlugin>] {
        &self.plugins
    }

    /// 已注册插件的小写名称集合
    pub fn name_set(&self) -> HashSet<String> {
        self.plugins
            .iter()
            .map(|plugin| plugin.name().to_lowercase())
            .collect()
    }

    /// 解析要执行的插件集合
    ///
    /// `names` 为 `None` 表示全部已注册插件；否则按小写名称
    /// 过滤，保持注册顺序
    pub fn resolve(&self, names: Option<&[String]>) -> Vec<Arc<dyn SearchPlugin>> {
        match names {
            None => self.plugins.clone(),
            Some(names) => {
                let wanted: HashSet<String> =
                    names.iter().map(|name| name.to_lowercase()).collect();
                self.plugins
                    .iter()
                    .filter(|plugin| wanted.contains(&plugin.name().to_lowercase()))
                    .cloned()
                    .collect()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
