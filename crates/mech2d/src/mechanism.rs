//! Mechanism2d：机构树的根聚合
//!
//! 持有画布尺寸、背景色和按名字索引的 Root 集合，负责：
//!
//! - Root 的幂等 get-or-create（树锁保护）；
//! - 整树绑定到实时汇（完整快照发布 + 记住绑定，后续变更实时可见）；
//! - 整树序列化到日志汇（每次都是完整快照，不保留绑定）。
//!
//! 画布尺寸构造后不可变，只有背景色可变。树只增不减：没有任何移除
//! Root / Ligament 的操作。
//!
//! # Example
//!
//! ```
//! use mech2d::Mechanism2d;
//!
//! # fn main() -> Result<(), mech2d::SinkError> {
//! let mech = Mechanism2d::new(3.0, 3.0);
//! let arm = mech.root("arm", 1.5, 0.0)?;
//! let shoulder = arm.ligament("shoulder", 1.0, 90.0, 4.0, "#FF8000")?;
//! let elbow = shoulder.ligament("elbow", 0.8, -45.0, 4.0, "#00FF00")?;
//!
//! // 控制周期内更新参数
//! shoulder.set_angle(75.0)?;
//! elbow.set_angle(-30.0)?;
//! # Ok(())
//! # }
//! ```

use crate::color::DEFAULT_BACKGROUND_COLOR;
use crate::node::MechanismObject;
use crate::MechanismRoot;
use mech2d_sink::{
    ArrayPublisher, LiveNamespace, LiveSink, LogNamespace, SinkError, StringPublisher,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 实时汇发布的类型标签
const MECHANISM_TYPE: &str = "Mechanism2d";

struct MechanismPublishers {
    namespace: Arc<dyn LiveNamespace>,
    // 尺寸构造后不可变，Handle 仅为维持发布而持有
    _dims: Box<dyn ArrayPublisher>,
    color: Box<dyn StringPublisher>,
}

struct MechanismInner {
    background_color: String,
    roots: HashMap<String, MechanismRoot>,
    live: Option<MechanismPublishers>,
}

/// 机构树根聚合
pub struct Mechanism2d {
    /// 画布尺寸 [width, height]（构造后不可变）
    dims: [f64; 2],
    inner: Mutex<MechanismInner>,
}

impl Mechanism2d {
    /// 创建机构树，背景色为默认深蓝
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_background_color(width, height, DEFAULT_BACKGROUND_COLOR)
    }

    /// 创建机构树并指定背景色（十六进制字符串）
    pub fn with_background_color(width: f64, height: f64, color: impl Into<String>) -> Self {
        Mechanism2d {
            dims: [width, height],
            inner: Mutex::new(MechanismInner {
                background_color: color.into(),
                roots: HashMap::new(),
                live: None,
            }),
        }
    }

    /// get-or-create 一个 Root
    ///
    /// 幂等：同名 Root 已存在时丢弃传入坐标并返回现有节点。若整树当前
    /// 处于 attach 状态，新建的 Root 立即在树命名空间下发布。
    pub fn root(&self, name: &str, x: f64, y: f64) -> Result<MechanismRoot, SinkError> {
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.roots.get(name) {
            return Ok(existing.clone());
        }

        let root = MechanismRoot::new(name, x, y);
        inner.roots.insert(name.to_string(), root.clone());
        debug!(root = name, "created mechanism root");

        if let Some(live) = &inner.live {
            root.attach(live.namespace.subspace(name))?;
        }
        Ok(root)
    }

    /// 设置画布背景色；已 attach 时立即重新发布
    ///
    /// 只影响树自身的颜色字段，对已 attach 的 Root 无任何影响。
    pub fn set_background_color(&self, color: impl Into<String>) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        inner.background_color = color.into();
        if let Some(live) = &inner.live {
            live.color.set(&inner.background_color)?;
        }
        Ok(())
    }

    /// 绑定整树到实时汇命名空间并发布完整快照
    ///
    /// 顺序保证：树级字段（类型标签、尺寸、背景色）先于任何 Root 发布。
    /// 可重入：再次调用（如 Sink 重连）会先 Drop 旧绑定的全部 Handle，
    /// 再完整重新发布，不做增量 diff。
    pub fn attach(&self, namespace: Arc<dyn LiveNamespace>) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        namespace.set_type(MECHANISM_TYPE)?;

        // 先 Drop 旧绑定的全部 Handle，再创建新 Handle（close-then-open）
        inner.live = None;
        let live = MechanismPublishers {
            _dims: namespace.publish_array("dims", &self.dims)?,
            color: namespace.publish_string("backgroundColor", &inner.background_color)?,
            namespace: Arc::clone(&namespace),
        };
        inner.live = Some(live);
        debug!(roots = inner.roots.len(), "mechanism attached to live sink");

        for (name, root) in &inner.roots {
            root.attach(namespace.subspace(name))?;
        }
        Ok(())
    }

    /// 通过 [`LiveSink`] 入口绑定：`bind_namespace(name)` 后执行 [`attach`](Self::attach)
    pub fn attach_to(&self, sink: &dyn LiveSink, name: &str) -> Result<(), SinkError> {
        self.attach(sink.bind_namespace(name)?)
    }

    /// 把整树当前状态写入日志汇（完整快照，与实时汇绑定状态无关）
    pub fn log_to(&self, table: &dyn LogNamespace) -> Result<(), SinkError> {
        let inner = self.inner.lock();
        table.put_string(".type", MECHANISM_TYPE)?;
        table.put_bool(".controllable", false)?;
        table.put_array("dims", &self.dims)?;
        table.put_string("backgroundColor", &inner.background_color)?;
        for (name, root) in &inner.roots {
            root.log_to(table.subtable(name).as_ref())?;
        }
        Ok(())
    }

    /// 释放整树持有的全部实时汇 Handle（递归）
    ///
    /// 之后树仍可正常变更、序列化，也可重新 attach。
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.live = None;
        for root in inner.roots.values() {
            root.close();
        }
        debug!("mechanism closed");
    }

    pub fn width(&self) -> f64 {
        self.dims[0]
    }

    pub fn height(&self) -> f64 {
        self.dims[1]
    }

    pub fn background_color(&self) -> String {
        self.inner.lock().background_color.clone()
    }

    /// 当前 Root 名集合（排序后）
    pub fn root_names(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut names: Vec<String> = inner.roots.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Drop for Mechanism2d {
    fn drop(&mut self) {
        // 调用方可能仍持有 Root / Ligament 的克隆句柄，绑定不能比树活得久
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试默认背景色与画布尺寸
    #[test]
    fn test_new_defaults() {
        let mech = Mechanism2d::new(10.0, 10.0);
        assert_eq!(mech.width(), 10.0);
        assert_eq!(mech.height(), 10.0);
        assert_eq!(mech.background_color(), "#000020");
        assert!(mech.root_names().is_empty());
    }

    /// 测试 Root 的幂等 get-or-create：重复创建丢弃新坐标
    #[test]
    fn test_get_or_create_root_is_idempotent() {
        let mech = Mechanism2d::new(10.0, 10.0);

        let arm = mech.root("arm", 1.0, 1.0).unwrap();
        let duplicate = mech.root("arm", 99.0, 99.0).unwrap();

        assert_eq!(arm.position(), (1.0, 1.0));
        assert_eq!(duplicate.position(), (1.0, 1.0));
        assert_eq!(mech.root_names(), vec!["arm".to_string()]);
    }

    /// 测试背景色可变、尺寸不可变
    #[test]
    fn test_only_background_color_is_mutable() {
        let mech = Mechanism2d::with_background_color(4.0, 2.0, "#101010");
        assert_eq!(mech.background_color(), "#101010");

        mech.set_background_color("#202020").unwrap();
        assert_eq!(mech.background_color(), "#202020");
        assert_eq!(mech.width(), 4.0);
        assert_eq!(mech.height(), 2.0);
    }
}
