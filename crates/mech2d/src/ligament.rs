//! Ligament 节点：带长度/角度/线宽/颜色的线段
//!
//! Ligament 是机构树的可见构件（机械臂的一节、电梯的行程段等），
//! 以父节点为原点、按角度和长度画出一条线段，并可继续挂接下级 Ligament。
//!
//! `MechanismLigament` 是廉价克隆的共享句柄（内部 `Arc<Mutex<_>>`）：
//! 控制线程每个周期调用 setter 更新参数，遥测线程并发执行 attach /
//! 日志序列化，互斥由每节点一把的锁保证。

use crate::node::{self, MechanismObject};
use mech2d_sink::{
    LiveNamespace, LogNamespace, ScalarPublisher, SinkError, StringPublisher,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// 实时汇绑定：命名空间 + 各字段的独占 Handle
///
/// 整体替换（close-then-open），不单独替换某个字段。
struct LigamentPublishers {
    namespace: Arc<dyn LiveNamespace>,
    _type_tag: Box<dyn StringPublisher>,
    length: Box<dyn ScalarPublisher>,
    angle: Box<dyn ScalarPublisher>,
    line_width: Box<dyn ScalarPublisher>,
    color: Box<dyn StringPublisher>,
}

struct LigamentInner {
    length: f64,
    angle_deg: f64,
    line_width: f64,
    color: String,
    children: HashMap<String, MechanismLigament>,
    live: Option<LigamentPublishers>,
}

/// Ligament 节点句柄（可克隆，跨线程共享）
#[derive(Clone)]
pub struct MechanismLigament {
    name: Arc<str>,
    inner: Arc<Mutex<LigamentInner>>,
}

impl MechanismLigament {
    pub(crate) fn new(
        name: &str,
        length: f64,
        angle_deg: f64,
        line_width: f64,
        color: &str,
    ) -> Self {
        MechanismLigament {
            name: Arc::from(name),
            inner: Arc::new(Mutex::new(LigamentInner {
                length,
                angle_deg,
                line_width,
                color: color.to_string(),
                children: HashMap::new(),
                live: None,
            })),
        }
    }

    /// get-or-create 一条下级 Ligament
    ///
    /// 幂等：同名子节点已存在时丢弃传入参数并返回现有节点。若本节点当前
    /// 处于 attach 状态，新建的子节点会立即在本节点命名空间下发布。
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

    /// 设置线段长度；已 attach 时立即刷新发布值
    pub fn set_length(&self, length: f64) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        inner.length = length;
        trace!(ligament = %self.name, length, "set length");
        if let Some(live) = &inner.live {
            live.length.set(length)?;
        }
        Ok(())
    }

    /// 设置角度（度，相对父节点）；已 attach 时立即刷新发布值
    pub fn set_angle(&self, angle_deg: f64) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        inner.angle_deg = angle_deg;
        trace!(ligament = %self.name, angle_deg, "set angle");
        if let Some(live) = &inner.live {
            live.angle.set(angle_deg)?;
        }
        Ok(())
    }

    /// 设置线宽；已 attach 时立即刷新发布值
    pub fn set_line_width(&self, line_width: f64) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        inner.line_width = line_width;
        if let Some(live) = &inner.live {
            live.line_width.set(line_width)?;
        }
        Ok(())
    }

    /// 设置线段颜色（十六进制字符串）；已 attach 时立即刷新发布值
    pub fn set_color(&self, color: &str) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        inner.color = color.to_string();
        if let Some(live) = &inner.live {
            live.color.set(color)?;
        }
        Ok(())
    }

    pub fn length(&self) -> f64 {
        self.inner.lock().length
    }

    pub fn angle(&self) -> f64 {
        self.inner.lock().angle_deg
    }

    pub fn line_width(&self) -> f64 {
        self.inner.lock().line_width
    }

    pub fn color(&self) -> String {
        self.inner.lock().color.clone()
    }

    /// 当前子节点名集合（排序后）
    pub fn child_names(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut names: Vec<String> = inner.children.keys().cloned().collect();
        names.sort();
        names
    }
}

impl MechanismObject for MechanismLigament {
    fn name(&self) -> &str {
        &self.name
    }

    fn attach(&self, namespace: Arc<dyn LiveNamespace>) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        // 先 Drop 旧绑定的全部 Handle，再创建新 Handle（close-then-open）
        inner.live = None;
        let live = LigamentPublishers {
            _type_tag: namespace.publish_string(".type", "line")?,
            length: namespace.publish_scalar("length", inner.length)?,
            angle: namespace.publish_scalar("angle", inner.angle_deg)?,
            line_width: namespace.publish_scalar("lineWidth", inner.line_width)?,
            color: namespace.publish_string("color", &inner.color)?,
            namespace: Arc::clone(&namespace),
        };
        inner.live = Some(live);
        debug!(ligament = %self.name, "ligament attached to live sink");
        node::attach_children(&inner.children, namespace.as_ref())
    }

    fn log_to(&self, table: &dyn LogNamespace) -> Result<(), SinkError> {
        let inner = self.inner.lock();
        table.put_string(".type", "line")?;
        table.put_bool(".controllable", false)?;
        table.put_scalar("length", inner.length)?;
        table.put_scalar("angle", inner.angle_deg)?;
        table.put_scalar("lineWidth", inner.line_width)?;
        table.put_string("color", &inner.color)?;
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

    /// 测试 setter 更新内存状态
    #[test]
    fn test_setters_update_state() {
        let ligament = MechanismLigament::new("seg", 1.0, 0.0, 2.0, "#FF0000");

        ligament.set_length(3.5).unwrap();
        ligament.set_angle(45.0).unwrap();
        ligament.set_line_width(4.0).unwrap();
        ligament.set_color("#00FF00").unwrap();

        assert_eq!(ligament.length(), 3.5);
        assert_eq!(ligament.angle(), 45.0);
        assert_eq!(ligament.line_width(), 4.0);
        assert_eq!(ligament.color(), "#00FF00");
    }

    /// 测试 get-or-create 幂等：重复创建丢弃新参数
    #[test]
    fn test_get_or_create_child_is_idempotent() {
        let ligament = MechanismLigament::new("seg", 1.0, 0.0, 2.0, "#FF0000");

        let first = ligament.ligament("tip", 0.5, 90.0, 1.0, "#0000FF").unwrap();
        let second = ligament.ligament("tip", 9.9, 9.9, 9.9, "#FFFFFF").unwrap();

        assert_eq!(second.length(), 0.5);
        assert_eq!(second.angle(), 90.0);
        assert_eq!(second.color(), "#0000FF");
        assert_eq!(ligament.child_names(), vec!["tip".to_string()]);

        // 两个句柄指向同一节点
        first.set_length(7.0).unwrap();
        assert_eq!(second.length(), 7.0);
    }
}
