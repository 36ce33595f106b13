// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 频道搜索缓存键
///
/// 对关键词与频道列表生成稳定指纹，频道列表先规范化，
/// 与插件族的键空间通过命名空间前缀隔离
pub fn tg_key(keyword: &str, channels: &[String]) -> String {
    namespaced_key("tg", keyword, Some(channels))
}

/// 插件搜索缓存键
///
/// `plugins` 为 `None` 表示"全部已注册插件"
pub fn plugin_key(keyword: &str, plugins: Option<&[String]>) -> String {
    namespaced_key("plugin", keyword, plugins)
}

fn namespaced_key(namespace: &str, keyword: &str, list: Option<&[String]>) -> String {
    let keyword = keyword.trim().to_lowercase();
    let digest = md5::compute(format!("{}:{}:{}", namespace, keyword, list_hash(list)));
    format!("{:x}", digest)
}

/// 列表指纹
///
/// 小写、去重、排序后拼接再取md5，保证与顺序无关且跨进程稳定
fn list_hash(list: Option<&[String]>) -> String {
    let joined = match list {
        None => "all".to_string(),
        Some(items) => {
            let mut canonical: Vec<String> = items
                .iter()
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect();
            canonical.sort();
            canonical.dedup();
            canonical.join(",")
        }
    };

    format!("{:x}", md5::compute(joined))
}
