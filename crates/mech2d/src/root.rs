//! Root 节点：机构树某一分支的锚点
//!
//! Root 只有画布坐标 (x, y)，没有可见形状，也不发布类型标签——它是
//! Ligament 链的起点。Root 由 [`Mechanism2d`](crate::Mechanism2d) 的
//! get-or-create 创建并持有，调用方拿到的是可克隆的共享句柄。

use crate::node::{self, MechanismObject};
use crate::MechanismLigament;
use mech2d_sink::{LiveNamespace, LogNamespace, ScalarPublisher, SinkError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

struct RootPublishers {
    namespace: Arc<dyn LiveNamespace>,
    x: Box<dyn ScalarPublisher>,
    y: Box<dyn ScalarPublisher>,
}

struct RootInner {
    x: f64,
    y: f64,
    children: HashMap<String, MechanismLigament>,
    live: Option<RootPublishers>,
}

/// Root 节点句柄（可克隆，跨线程共享）
#[derive(Clone)]
pub struct MechanismRoot {
    name: Arc<str>,
    inner: Arc<Mutex<RootInner>>,
}

impl MechanismRoot {
    pub(crate) fn new(name: &str, x: f64, y: f64) -> Self {
        MechanismRoot {
            name: Arc::from(name),
            inner: Arc::new(Mutex::new(RootInner {
                x,
                y,
                children: HashMap::new(),
                live: None,
            })),
        }
    }

    /// get-or-create 一条挂在本 Root 下的 Ligament
    ///
    /// 幂等语义同 [`MechanismLigament::ligament`]。
    pub fn ligament(
        &self,
        name: &str,
        length: f64,
        angle_deg: f64,
        line_width: f64,
        color: &str,
    ) -> Result<MechanismLigament, SinkError> {
        let mut inner = self.inner.lock();
        let live_namespace = inner.live.as_ref().map(|live| live.namespace.clone());
        node::get_or_create_ligament(
            &self.name,
            &mut inner.children,
            live_namespace.as_ref(),
            name,
            length,
            angle_deg,
            line_width,
            color,
        )
    }

    /// 设置锚点坐标；已 attach 时立即刷新发布值
    pub fn set_position(&self, x: f64, y: f64) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        inner.x = x;
        inner.y = y;
        trace!(root = %self.name, x, y, "set root position");
        if let Some(live) = &inner.live {
            live.x.set(x)?;
            live.y.set(y)?;
        }
        Ok(())
    }

    pub fn position(&self) -> (f64, f64) {
        let inner = self.inner.lock();
        (inner.x, inner.y)
    }

    /// 当前子节点名集合（排序后）
    pub fn child_names(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut names: Vec<String> = inner.children.keys().cloned().collect();
        names.sort();
        names
    }
}

impl MechanismObject for MechanismRoot {
    fn name(&self) -> &str {
        &self.name
    }

    fn attach(&self, namespace: Arc<dyn LiveNamespace>) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        // 先 Drop 旧绑定的全部 Handle，再创建新 Handle（close-then-open）
        inner.live = None;
        let live = RootPublishers {
            x: namespace.publish_scalar("x", inner.x)?,
            y: namespace.publish_scalar("y", inner.y)?,
            namespace: Arc::clone(&namespace),
        };
        inner.live = Some(live);
        debug!(root = %self.name, "root attached to live sink");
        node::attach_children(&inner.children, namespace.as_ref())
    }

    fn log_to(&self, table: &dyn LogNamespace) -> Result<(), SinkError> {
        let inner = self.inner.lock();
        table.put_scalar("x", inner.x)?;
        table.put_scalar("y", inner.y)?;
        node::log_children(&inner.children, table)
    }

    fn close(&self) {
        let mut inner = self.inner.lock();
        inner.live = None;
        node::close_children(&inner.children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试坐标 setter 与共享句柄
    #[test]
    fn test_set_position_shared_handle() {
        let root = MechanismRoot::new("arm", 1.0, 1.0);
        let clone = root.clone();

        clone.set_position(2.0, 3.0).unwrap();
        assert_eq!(root.position(), (2.0, 3.0));
        assert_eq!(root.name(), "arm");
    }
}
