//! # Error 模块
//!
//! 定义 transitionable 中使用的错误类型。
//!
//! 所有错误都是使用错误（调用方传入了无效参数或在错误的时机调用），
//! 在调用点立即返回，不做重试。

use std::path::PathBuf;

use thiserror::Error;

/// 状态 / 过渡错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// 状态名为空
    #[error("状态名不能为空")]
    EmptyStateName,

    /// 无效的字段名列表
    #[error("无效的字段名列表: {message}")]
    InvalidFieldNames { message: String },

    /// 未声明的字段
    #[error("字段 '{field}' 未声明")]
    UnknownField { field: String },

    /// 过渡正在播放时再次播放
    #[error("过渡 '{from}' -> '{to}' 正在播放")]
    AlreadyPlaying { from: String, to: String },

    /// 过渡两端的状态不属于同一节点
    #[error("状态 '{from}' 与 '{to}' 不属于同一节点")]
    TargetMismatch { from: String, to: String },
}

/// Result 类型别名
pub type TransitionResult<T> = Result<T, TransitionError>;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败: {path} - {source}")]
    Io {
        /// 文件路径
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 配置内容无效
    #[error("配置无效: {message}")]
    Invalid { message: String },

    /// 应用配置时出错
    #[error("应用配置失败: {0}")]
    Apply(#[from] TransitionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TransitionError::AlreadyPlaying {
            from: "up".to_string(),
            to: "over".to_string(),
        };
        assert_eq!(err.to_string(), "过渡 'up' -> 'over' 正在播放");

        let err = TransitionError::UnknownField {
            field: "z".to_string(),
        };
        assert!(err.to_string().contains("'z'"));
    }

    #[test]
    fn test_config_error_from_transition_error() {
        let err: ConfigError = TransitionError::EmptyStateName.into();
        assert!(matches!(err, ConfigError::Apply(TransitionError::EmptyStateName)));
    }
}
