// crates/ff_foundation/src/barrier.rs

//! 延迟配置错误屏障
//!
//! 初始化阶段的配置错误不立即中止：每次检出追加一条消息并继续，
//! 以便一次运行尽可能多地暴露配置问题；初始化结束处调用
//! [`SetupErrorBarrier::check`]，若有任何记录则统一中止。
//!
//! 迭代过程中的不变量破坏不走本机制，应立即返回
//! [`crate::error::FfError::InvariantViolation`]。

use crate::error::{FfError, FfResult};

/// 延迟配置错误屏障
///
/// # 使用流程
///
/// 1. 初始化各阶段通过 [`push`](Self::push) 记录配置错误
/// 2. 初始化末尾调用 [`check`](Self::check)
/// 3. 有记录则返回 `FfError::Config` 并携带全部消息
#[derive(Debug, Default)]
pub struct SetupErrorBarrier {
    messages: Vec<String>,
    warnings: Vec<String>,
}

impl SetupErrorBarrier {
    /// 创建空屏障
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条配置错误，不中止
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.messages.push(message);
    }

    /// 记录一条警告（永不致命）
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.warnings.push(message);
    }

    /// 已记录的错误数
    pub fn error_count(&self) -> usize {
        self.messages.len()
    }

    /// 已记录的警告数
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 已记录的错误消息
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// 屏障检查：有任何错误记录则中止
    pub fn check(&self) -> FfResult<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        Err(FfError::config(format!(
            "初始化检出 {} 个配置错误:\n{}",
            self.messages.len(),
            self.messages.join("\n"),
        )))
    }
}
