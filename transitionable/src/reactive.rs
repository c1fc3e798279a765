//! # Reactive 模块
//!
//! 可观察的数值字段组。
//!
//! 一个 `ReactiveValueGroup` 在构造时声明一组固定的字段名（如 `x`、`y`），
//! 每次写入任意字段后都会同步调用唯一的变更回调。状态的 `position` 和
//! `scale` 就是用它作为底层存储的：写入字段即触发状态的实时重新应用。
//!
//! ## 设计说明
//!
//! 使用 `RefCell` 实现内部可变性，所有方法都只需要 `&self`：
//! - 回调执行时不持有任何借用，回调内部可以自由读取本组的值
//! - 回调以 `Rc<dyn Fn()>` 保存，调用前先克隆出来再释放借用

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{TransitionError, TransitionResult};

/// 变更回调
pub type ChangeCallback = Rc<dyn Fn()>;

/// 可观察的数值字段组
pub struct ReactiveValueGroup {
    /// 字段名（构造后固定）
    names: Vec<String>,
    /// 字段值（`None` 表示从未写入）
    values: RefCell<Vec<Option<f32>>>,
    /// 变更回调
    on_change: RefCell<Option<ChangeCallback>>,
}

impl std::fmt::Debug for ReactiveValueGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveValueGroup")
            .field("names", &self.names)
            .field("values", &self.values.borrow())
            .field("has_on_change", &self.has_on_change())
            .finish()
    }
}

impl ReactiveValueGroup {
    /// 创建字段组
    ///
    /// 字段名列表不能为空，不能包含空名称或重复名称，否则构造失败。
    pub fn new(names: &[&str]) -> TransitionResult<Self> {
        if names.is_empty() {
            return Err(TransitionError::InvalidFieldNames {
                message: "字段名列表为空".to_string(),
            });
        }

        let mut owned: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if name.is_empty() {
                return Err(TransitionError::InvalidFieldNames {
                    message: "包含空字段名".to_string(),
                });
            }
            if owned.iter().any(|n| n == name) {
                return Err(TransitionError::InvalidFieldNames {
                    message: format!("字段名 '{}' 重复", name),
                });
            }
            owned.push((*name).to_string());
        }

        Ok(Self::from_names(owned))
    }

    /// `{x, y}` 字段组
    pub(crate) fn xy() -> Self {
        Self::from_names(vec!["x".to_string(), "y".to_string()])
    }

    /// 由已校验的字段名构建
    fn from_names(names: Vec<String>) -> Self {
        Self {
            values: RefCell::new(vec![None; names.len()]),
            names,
            on_change: RefCell::new(None),
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// 声明的字段名
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// 读取字段
    ///
    /// 从未写入或未声明的字段返回 `None`。
    pub fn get(&self, name: &str) -> Option<f32> {
        let index = self.index_of(name)?;
        self.values.borrow()[index]
    }

    /// 字段是否被写入过
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 写入字段，随后调用变更回调
    pub fn set(&self, name: &str, value: f32) -> TransitionResult<()> {
        let index = self
            .index_of(name)
            .ok_or_else(|| TransitionError::UnknownField {
                field: name.to_string(),
            })?;

        self.values.borrow_mut()[index] = Some(value);
        self.notify();
        Ok(())
    }

    /// 按声明顺序的下标写入字段（调用方保证下标有效）
    pub(crate) fn write(&self, index: usize, value: f32) {
        if let Some(slot) = self.values.borrow_mut().get_mut(index) {
            *slot = Some(value);
        }
        self.notify();
    }

    /// 同时写入多个字段，每个字段各触发一次回调
    pub fn set_all(&self, values: &[(&str, f32)]) -> TransitionResult<()> {
        for (name, value) in values {
            self.set(name, *value)?;
        }
        Ok(())
    }

    /// 设置变更回调（替换已有回调）
    pub fn set_on_change(&self, callback: impl Fn() + 'static) {
        *self.on_change.borrow_mut() = Some(Rc::new(callback));
    }

    /// 移除变更回调
    pub fn clear_on_change(&self) {
        self.on_change.borrow_mut().take();
    }

    /// 是否设置了变更回调
    pub fn has_on_change(&self) -> bool {
        self.on_change.borrow().is_some()
    }

    fn notify(&self) {
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}
