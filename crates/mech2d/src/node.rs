//! 节点抽象层
//!
//! 所有树节点（Root / Ligament）共享的能力契约与递归遍历辅助。
//!
//! # 锁序约定
//!
//! 锁的获取顺序严格自上而下：树锁 → Root 锁 → Ligament 锁 → 更深层
//! Ligament 锁，任何操作都不得反向获取。`attach` / `log_to` 在持有本节点锁
//! 的情况下递归进入子节点，get-or-create 在持有父节点锁的情况下对新建
//! 子节点执行 attach，两者都符合该顺序，不会死锁。

use crate::ligament::MechanismLigament;
use mech2d_sink::{LiveNamespace, LogNamespace, SinkError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// 机构树节点的公共能力契约
///
/// 每个节点都有不可变的名字、按名字索引的子节点集合，并且能把自身
/// （连同全部子孙，深度优先）发布到实时汇或序列化到日志汇。
pub trait MechanismObject: Send + Sync {
    /// 节点名（创建后不可变，仅要求同一父节点下唯一）
    fn name(&self) -> &str;

    /// 绑定到实时汇命名空间，发布完整字段集并递归 attach 子节点
    ///
    /// 可重入：再次调用（如 Sink 重连后换新命名空间）会先 Drop 旧绑定的
    /// 全部字段 Handle，再完整重新发布当前状态，不做增量 diff。
    fn attach(&self, namespace: Arc<dyn LiveNamespace>) -> Result<(), SinkError>;

    /// 把当前完整状态写入日志汇（只写，不保留任何绑定）
    fn log_to(&self, table: &dyn LogNamespace) -> Result<(), SinkError>;

    /// 释放本节点及全部子孙持有的实时汇 Handle
    fn close(&self);
}

/// 按名字 get-or-create 一条子 Ligament（Root 与 Ligament 共用）
///
/// 调用方必须持有父节点锁。若同名子节点已存在，传入的构造参数被丢弃，
/// 原样返回现有节点；否则创建并登记新节点，且当父节点处于 attach 状态时
/// 立即在父命名空间下 attach 新节点。
pub(crate) fn get_or_create_ligament(
    parent_name: &str,
    children: &mut HashMap<String, MechanismLigament>,
    live_namespace: Option<&Arc<dyn LiveNamespace>>,
    name: &str,
    length: f64,
    angle_deg: f64,
    line_width: f64,
    color: &str,
) -> Result<MechanismLigament, SinkError> {
    if let Some(existing) = children.get(name) {
        trace!(parent = parent_name, child = name, "ligament already exists");
        return Ok(existing.clone());
    }

    let child = MechanismLigament::new(name, length, angle_deg, line_width, color);
    children.insert(name.to_string(), child.clone());
    debug!(parent = parent_name, child = name, "created mechanism ligament");

    if let Some(namespace) = live_namespace {
        child.attach(namespace.subspace(name))?;
    }
    Ok(child)
}

/// 深度优先 attach 全部子节点（调用方持有父节点锁）
pub(crate) fn attach_children(
    children: &HashMap<String, MechanismLigament>,
    namespace: &dyn LiveNamespace,
) -> Result<(), SinkError> {
    for (name, child) in children {
        child.attach(namespace.subspace(name))?;
    }
    Ok(())
}

/// 深度优先序列化全部子节点到日志汇（调用方持有父节点锁）
pub(crate) fn log_children(
    children: &HashMap<String, MechanismLigament>,
    table: &dyn LogNamespace,
) -> Result<(), SinkError> {
    for (name, child) in children {
        child.log_to(table.subtable(name).as_ref())?;
    }
    Ok(())
}

/// 递归释放全部子节点的 Handle（调用方持有父节点锁）
pub(crate) fn close_children(children: &HashMap<String, MechanismLigament>) {
    for child in children.values() {
        child.close();
    }
}
