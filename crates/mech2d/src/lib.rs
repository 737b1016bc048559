//! mech2d - 机构可视化/遥测树
//!
//! 以节点树的形式描述机械联动结构（机械臂、电梯、关节），供实时控制
//! 系统在每个控制周期更新，并发布到两类相互独立的数据汇：
//!
//! - **实时汇**：基于 Handle 的键值网络表（远程可视化），attach 后变更
//!   实时可见，重连时整树重新发布完整快照；
//! - **日志汇**：只写结构化日志，每个周期序列化一次完整快照，不保留绑定。
//!
//! # 架构设计
//!
//! 自底向上分为三层：
//!
//! - **Sink 契约层** (`mech2d-sink`)：实时汇/日志汇的能力契约，传输实现
//!   由外部协作方提供；
//! - **节点层** (`node` / `root` / `ligament`)：多态节点抽象。Root 是分支
//!   锚点（只有坐标），Ligament 是线段（长度/角度/线宽/颜色），两者都可
//!   递归挂接下级 Ligament；
//! - **聚合层** (`mechanism`)：[`Mechanism2d`] 持有画布与 Root 集合，
//!   统一调度整树的 attach 与日志序列化。
//!
//! # 并发模型
//!
//! 普通线程驱动，无异步运行时。每个节点一把 `parking_lot::Mutex`，树
//! 自身另有一把；锁序严格自上而下（树 → Root → 下级节点），控制线程与
//! 遥测线程可并发操作同一棵树。
//!
//! # 快速开始
//!
//! ```
//! use mech2d::Mechanism2d;
//!
//! # fn main() -> Result<(), mech2d::SinkError> {
//! let mech = Mechanism2d::new(10.0, 10.0);
//! let arm = mech.root("arm", 1.0, 1.0)?;
//! let seg = arm.ligament("seg1", 5.0, 0.0, 2.0, "#FF0000")?;
//!
//! // 控制周期内：
//! seg.set_angle(30.0)?;
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod ligament;
pub mod mechanism;
pub mod node;
pub mod root;

// --- 用户以此为界 ---
// 以下是通过 Facade Pattern 提供的公共 API

pub use color::{hex_color, DEFAULT_BACKGROUND_COLOR};
pub use ligament::MechanismLigament;
pub use mechanism::Mechanism2d;
pub use node::MechanismObject;
pub use root::MechanismRoot;

// Sink 契约层常用类型
pub use mech2d_sink::{
    ArrayPublisher, LiveNamespace, LiveSink, LogNamespace, ScalarPublisher, SinkError,
    StringPublisher,
};
