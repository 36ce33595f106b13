// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// 有界工作池
///
/// 以信号量限制批次内的并发度，并对整个批次施加统一的
/// 墙钟截止时间。超时或失败的任务在对应位置产出 `None`，
/// 批次完成后的输出顺序与提交顺序一致
pub struct WorkerPool;

impl WorkerPool {
    /// 带超时地执行一批任务
    ///
    /// 截止时间从批次启动时刻起算，仍在排队的任务过了截止
    /// 时间同样产出 `None`，不会延后启动
    pub async fn execute_batch_with_timeout<T, F>(
        tasks: Vec<F>,
        concurrency: usize,
        timeout: Duration,
    ) -> Vec<Option<T>>
    where
        F: Future<Output = Option<T>> + Send,
        T: Send,
    {
        let deadline = Instant::now() + timeout;
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

        let bounded = tasks.into_iter().map(|task| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let outcome = tokio::time::timeout_at(deadline, async move {
                    let _permit = semaphore.acquire().await.ok()?;
                    task.await
                })
                .await;

                outcome.unwrap_or(None)
            }
        });

        join_all(bounded).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delayed(ms: u64, value: i32) -> impl Future<Output = Option<i32>> + Send {
        async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Some(value)
        }
    }

    #[tokio::test]
    async fn test_outputs_preserve_submission_order() {
        // 先提交的任务较慢，输出顺序仍按提交顺序
        let tasks = vec![delayed(30, 1), delayed(5, 2)];

        let outputs =
            WorkerPool::execute_batch_with_timeout(tasks, 4, Duration::from_secs(1)).await;
        assert_eq!(outputs, vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_slow_task_contributes_none() {
        let tasks = vec![
            Box::pin(async { Some(1) }) as std::pin::Pin<Box<dyn Future<Output = Option<i32>> + Send>>,
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Some(2)
            }),
        ];

        let outputs =
            WorkerPool::execute_batch_with_timeout(tasks, 4, Duration::from_millis(50)).await;
        assert_eq!(outputs, vec![Some(1), None]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Some(())
                }
            })
            .collect();

        WorkerPool::execute_batch_with_timeout(tasks, 2, Duration::from_secs(2)).await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_floored_to_one() {
        let tasks = vec![async { Some(1) }];
        let outputs =
            WorkerPool::execute_batch_with_timeout(tasks, 0, Duration::from_secs(1)).await;
        assert_eq!(outputs, vec![Some(1)]);
    }
}
