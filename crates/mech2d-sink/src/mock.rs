//! 计数型 Mock Sink
//!
//! 测试专用的两个 Sink 实现（`mock` feature 下编译）：
//!
//! - [`MockLiveSink`]：记录当前在线字段的取值、类型标签，并统计 Handle 的
//!   创建/存活数量，用于验证 re-attach 的 close-then-open 语义。
//! - [`MockLogSink`]：记录每次写入的完整快照，验证日志路径不产生任何 Handle。
//!
//! 两者都支持错误注入（`set_fail_publish` / `set_fail_write`），用于验证
//! Sink 失败原样向上传播。

use crate::{
    ArrayPublisher, LiveNamespace, LiveSink, LogNamespace, ScalarPublisher, SinkError,
    StringPublisher,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Mock Sink 中记录的字段取值
#[derive(Debug, Clone, PartialEq)]
pub enum MockValue {
    Scalar(f64),
    Array(Vec<f64>),
    Str(String),
    Bool(bool),
}

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}/{field}")
    }
}

// === 实时汇 ===

#[derive(Default)]
struct LiveRecorder {
    /// 当前在线字段（Handle 存活期间可见，Drop 后移除）
    values: BTreeMap<String, MockValue>,
    /// 各命名空间声明的类型标签
    types: BTreeMap<String, String>,
    /// 累计创建过的 Handle 数
    opened: usize,
    /// 当前存活的 Handle 数
    live: usize,
    fail_publish: bool,
}

/// 计数型实时汇
///
/// 可克隆（内部 `Arc` 共享状态），测试线程与被测代码可各持一份。
#[derive(Default, Clone)]
pub struct MockLiveSink {
    state: Arc<Mutex<LiveRecorder>>,
}

impl MockLiveSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前存活的 Handle 数
    pub fn live_handles(&self) -> usize {
        self.state.lock().live
    }

    /// 累计创建过的 Handle 数
    pub fn opened_handles(&self) -> usize {
        self.state.lock().opened
    }

    /// 读取某路径当前在线的取值
    pub fn value(&self, path: &str) -> Option<MockValue> {
        self.state.lock().values.get(path).cloned()
    }

    pub fn scalar(&self, path: &str) -> Option<f64> {
        match self.value(path) {
            Some(MockValue::Scalar(v)) => Some(v),
            _ => None,
        }
    }

    pub fn string(&self, path: &str) -> Option<String> {
        match self.value(path) {
            Some(MockValue::Str(v)) => Some(v),
            _ => None,
        }
    }

    pub fn array(&self, path: &str) -> Option<Vec<f64>> {
        match self.value(path) {
            Some(MockValue::Array(v)) => Some(v),
            _ => None,
        }
    }

    /// 某命名空间声明的类型标签
    pub fn type_of(&self, namespace: &str) -> Option<String> {
        self.state.lock().types.get(namespace).cloned()
    }

    /// 当前在线字段的全部路径（排序后）
    pub fn published_paths(&self) -> Vec<String> {
        self.state.lock().values.keys().cloned().collect()
    }

    /// 注入发布失败
    pub fn set_fail_publish(&self, fail: bool) {
        self.state.lock().fail_publish = fail;
    }
}

impl LiveSink for MockLiveSink {
    fn bind_namespace(&self, name: &str) -> Result<Arc<dyn LiveNamespace>, SinkError> {
        Ok(Arc::new(MockLiveNamespace {
            prefix: name.to_string(),
            state: self.state.clone(),
        }))
    }
}

struct MockLiveNamespace {
    prefix: String,
    state: Arc<Mutex<LiveRecorder>>,
}

impl MockLiveNamespace {
    fn open(&self, field: &str, value: MockValue) -> Result<MockHandle, SinkError> {
        let mut state = self.state.lock();
        if state.fail_publish {
            return Err(SinkError::Publish {
                field: field.to_string(),
                reason: "injected mock failure".to_string(),
            });
        }
        let path = join(&self.prefix, field);
        state.opened += 1;
        state.live += 1;
        state.values.insert(path.clone(), value);
        Ok(MockHandle {
            path,
            state: self.state.clone(),
        })
    }
}

impl LiveNamespace for MockLiveNamespace {
    fn set_type(&self, type_tag: &str) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        if state.fail_publish {
            return Err(SinkError::Publish {
                field: ".type".to_string(),
                reason: "injected mock failure".to_string(),
            });
        }
        state.types.insert(self.prefix.clone(), type_tag.to_string());
        Ok(())
    }

    fn publish_scalar(
        &self,
        field: &str,
        initial: f64,
    ) -> Result<Box<dyn ScalarPublisher>, SinkError> {
        Ok(Box::new(self.open(field, MockValue::Scalar(initial))?))
    }

    fn publish_array(
        &self,
        field: &str,
        initial: &[f64],
    ) -> Result<Box<dyn ArrayPublisher>, SinkError> {
        Ok(Box::new(self.open(field, MockValue::Array(initial.to_vec()))?))
    }

    fn publish_string(
        &self,
        field: &str,
        initial: &str,
    ) -> Result<Box<dyn StringPublisher>, SinkError> {
        Ok(Box::new(self.open(field, MockValue::Str(initial.to_string()))?))
    }

    fn subspace(&self, name: &str) -> Arc<dyn LiveNamespace> {
        Arc::new(MockLiveNamespace {
            prefix: join(&self.prefix, name),
            state: self.state.clone(),
        })
    }
}

/// 独占字段 Handle：Drop 时字段下线
struct MockHandle {
    path: String,
    state: Arc<Mutex<LiveRecorder>>,
}

impl MockHandle {
    fn store(&self, value: MockValue) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        if state.fail_publish {
            return Err(SinkError::Publish {
                field: self.path.clone(),
                reason: "injected mock failure".to_string(),
            });
        }
        state.values.insert(self.path.clone(), value);
        Ok(())
    }
}

impl ScalarPublisher for MockHandle {
    fn set(&self, value: f64) -> Result<(), SinkError> {
        self.store(MockValue::Scalar(value))
    }
}

impl ArrayPublisher for MockHandle {
    fn set(&self, value: &[f64]) -> Result<(), SinkError> {
        self.store(MockValue::Array(value.to_vec()))
    }
}

impl StringPublisher for MockHandle {
    fn set(&self, value: &str) -> Result<(), SinkError> {
        self.store(MockValue::Str(value.to_string()))
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.live -= 1;
        state.values.remove(&self.path);
    }
}

// === 日志汇 ===

#[derive(Default)]
struct LogRecorder {
    entries: BTreeMap<String, MockValue>,
    writes: usize,
    fail_write: bool,
}

/// 只写日志汇
#[derive(Default, Clone)]
pub struct MockLogSink {
    state: Arc<Mutex<LogRecorder>>,
}

impl MockLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 顶层日志表
    pub fn table(&self) -> MockLogTable {
        MockLogTable {
            prefix: String::new(),
            state: self.state.clone(),
        }
    }

    /// 读取某路径最近一次写入的取值
    pub fn entry(&self, path: &str) -> Option<MockValue> {
        self.state.lock().entries.get(path).cloned()
    }

    pub fn scalar(&self, path: &str) -> Option<f64> {
        match self.entry(path) {
            Some(MockValue::Scalar(v)) => Some(v),
            _ => None,
        }
    }

    pub fn string(&self, path: &str) -> Option<String> {
        match self.entry(path) {
            Some(MockValue::Str(v)) => Some(v),
            _ => None,
        }
    }

    pub fn array(&self, path: &str) -> Option<Vec<f64>> {
        match self.entry(path) {
            Some(MockValue::Array(v)) => Some(v),
            _ => None,
        }
    }

    pub fn bool(&self, path: &str) -> Option<bool> {
        match self.entry(path) {
            Some(MockValue::Bool(v)) => Some(v),
            _ => None,
        }
    }

    /// 累计写入次数
    pub fn writes(&self) -> usize {
        self.state.lock().writes
    }

    /// 清空记录（模拟新的日志周期）
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// 注入写入失败
    pub fn set_fail_write(&self, fail: bool) {
        self.state.lock().fail_write = fail;
    }
}

/// 日志汇的层级表
pub struct MockLogTable {
    prefix: String,
    state: Arc<Mutex<LogRecorder>>,
}

impl MockLogTable {
    fn put(&self, field: &str, value: MockValue) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        if state.fail_write {
            return Err(SinkError::Write {
                field: field.to_string(),
                reason: "injected mock failure".to_string(),
            });
        }
        state.writes += 1;
        state.entries.insert(join(&self.prefix, field), value);
        Ok(())
    }
}

impl LogNamespace for MockLogTable {
    fn put_scalar(&self, field: &str, value: f64) -> Result<(), SinkError> {
        self.put(field, MockValue::Scalar(value))
    }

    fn put_array(&self, field: &str, value: &[f64]) -> Result<(), SinkError> {
        self.put(field, MockValue::Array(value.to_vec()))
    }

    fn put_string(&self, field: &str, value: &str) -> Result<(), SinkError> {
        self.put(field, MockValue::Str(value.to_string()))
    }

    fn put_bool(&self, field: &str, value: bool) -> Result<(), SinkError> {
        self.put(field, MockValue::Bool(value))
    }

    fn subtable(&self, name: &str) -> Box<dyn LogNamespace + '_> {
        Box::new(MockLogTable {
            prefix: join(&self.prefix, name),
            state: self.state.clone(),
        })
    }
}
