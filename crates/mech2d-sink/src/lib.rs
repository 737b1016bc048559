//! 数据汇（Sink）能力契约
//!
//! 机构树（mech2d）把自身状态发布到两类相互独立的数据汇：
//!
//! - **实时汇**（[`LiveSink`] / [`LiveNamespace`]）：基于 Handle 的发布模型。
//!   每个字段发布后返回一个 Publisher Handle，后续可以通过 `set()` 刷新取值，
//!   Handle 被 Drop 时该字段停止发布（对应网络表的 unpublish）。
//! - **日志汇**（[`LogNamespace`]）：只写模型。每次写入都是完整快照，
//!   没有任何 Handle 生命周期，适合周期性结构化日志。
//!
//! 机构树只依赖这里的 trait，不关心传输实现（网络表协议、日志文件格式
//! 都由外部 Sink 实现负责）。
//!
//! # 资源模型
//!
//! Publisher Handle 采用作用域所有权：创建者独占持有，替换绑定时必须先
//! Drop 旧 Handle 再创建新 Handle（close-then-open），不存在部分释放。
//!
//! # 错误语义
//!
//! 所有发布/写入失败通过 [`SinkError`] 原样向上传播，本层不做重试、
//! 不做回滚；弹性策略由 Sink 实现自行承担。

use std::sync::Arc;
use thiserror::Error;

#[cfg(feature = "mock")]
pub mod mock;

/// Sink 层错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    /// 实时汇字段发布失败
    #[error("Failed to publish field `{field}`: {reason}")]
    Publish { field: String, reason: String },

    /// 日志汇字段写入失败
    #[error("Failed to write field `{field}`: {reason}")]
    Write { field: String, reason: String },

    /// 命名空间不可用（如 Sink 尚未连接）
    #[error("Namespace `{0}` unavailable")]
    NamespaceUnavailable(String),

    /// Sink 后端错误（由外部实现包装自身错误类型）
    #[error("Sink backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// 标量字段的 Publisher Handle
///
/// Drop 时停止发布该字段。
pub trait ScalarPublisher: Send {
    /// 刷新字段取值
    fn set(&self, value: f64) -> Result<(), SinkError>;
}

/// 数组字段的 Publisher Handle
pub trait ArrayPublisher: Send {
    fn set(&self, value: &[f64]) -> Result<(), SinkError>;
}

/// 字符串字段的 Publisher Handle
pub trait StringPublisher: Send {
    fn set(&self, value: &str) -> Result<(), SinkError>;
}

/// 实时汇的层级命名空间
///
/// 命名空间本身可以被多个节点共享（`Arc`），字段 Handle 则由创建节点独占。
pub trait LiveNamespace: Send + Sync {
    /// 声明本命名空间发布的类型标签（仅顶层命名空间调用）
    fn set_type(&self, type_tag: &str) -> Result<(), SinkError>;

    /// 发布标量字段，返回独占 Handle
    fn publish_scalar(&self, field: &str, initial: f64)
    -> Result<Box<dyn ScalarPublisher>, SinkError>;

    /// 发布 f64 数组字段，返回独占 Handle
    fn publish_array(&self, field: &str, initial: &[f64])
    -> Result<Box<dyn ArrayPublisher>, SinkError>;

    /// 发布字符串字段，返回独占 Handle
    fn publish_string(&self, field: &str, initial: &str)
    -> Result<Box<dyn StringPublisher>, SinkError>;

    /// 获取子命名空间（不存在则创建）
    fn subspace(&self, name: &str) -> Arc<dyn LiveNamespace>;
}

/// 实时汇入口：按名字绑定顶层命名空间
pub trait LiveSink {
    fn bind_namespace(&self, name: &str) -> Result<Arc<dyn LiveNamespace>, SinkError>;
}

/// 日志汇的层级命名空间（只写，无 Handle 生命周期）
pub trait LogNamespace {
    fn put_scalar(&self, field: &str, value: f64) -> Result<(), SinkError>;
    fn put_array(&self, field: &str, value: &[f64]) -> Result<(), SinkError>;
    fn put_string(&self, field: &str, value: &str) -> Result<(), SinkError>;
    fn put_bool(&self, field: &str, value: bool) -> Result<(), SinkError>;

    /// 获取子表（不存在则创建）
    fn subtable(&self, name: &str) -> Box<dyn LogNamespace + '_>;
}
