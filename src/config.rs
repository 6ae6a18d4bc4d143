//! 推导参数配置。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constant::{ChanError, Const};

/// 核心参数。`strict` 控制分型最小距离（严格 4 / 宽松 3）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChanConfig {
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

impl Default for ChanConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl ChanConfig {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn relaxed() -> Self {
        Self { strict: false }
    }

    pub fn minimum_distance(&self) -> usize {
        if self.strict {
            Const::STRICT_MINIMUM_DISTANCE
        } else {
            Const::RELAXED_MINIMUM_DISTANCE
        }
    }

    /// 从 YAML / JSON 文件加载，按扩展名区分格式。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChanError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        match path.extension().and_then(|x| x.to_str()) {
            Some("json") => Ok(serde_json::from_str(&text)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&text)?),
            other => Err(ChanError::InvalidConfig(format!(
                "unsupported config file format: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_and_relaxed_distances() {
        assert_eq!(ChanConfig::strict().minimum_distance(), 4);
        assert_eq!(ChanConfig::relaxed().minimum_distance(), 3);
        assert_eq!(ChanConfig::default(), ChanConfig::strict());
    }

    #[test]
    fn yaml_round_trip() {
        let config: ChanConfig = serde_yaml::from_str("strict: false").unwrap();
        assert!(!config.strict);

        let config: ChanConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.strict, "strict defaults to true when omitted");
    }

    #[test]
    fn json_round_trip() {
        let config: ChanConfig = serde_json::from_str(r#"{"strict": false}"#).unwrap();
        assert!(!config.strict);
    }
}
