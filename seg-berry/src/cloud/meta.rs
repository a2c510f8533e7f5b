//! 分割元信息 (`meta.json`).

use crate::consts::{files, SEG_META_TYPE};
use crate::SegResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 分割目录下 `meta.json` 的内容.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SegMeta {
    /// 显示名. 与 `uuid` 相同.
    pub name: String,

    /// 类型标记, 总是 `"seg"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// 分割 id.
    pub uuid: String,

    /// 点云文件名.
    pub vcps: String,

    /// 所属体数据目录名.
    pub volume: String,
}

impl SegMeta {
    /// 以分割 id 和体数据名构建.
    pub fn new(id: &str, volume: &str) -> Self {
        Self {
            name: id.to_string(),
            kind: SEG_META_TYPE.to_string(),
            uuid: id.to_string(),
            vcps: files::POINTSET_VCPS.to_string(),
            volume: volume.to_string(),
        }
    }
}

/// 以缩进两格的 JSON 写出元信息.
pub fn write_metadata<P: AsRef<Path>>(path: P, meta: &SegMeta) -> SegResult<()> {
    std::fs::write(path.as_ref(), serde_json::to_string_pretty(meta)?)?;
    Ok(())
}

/// 读取元信息.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> SegResult<SegMeta> {
    Ok(serde_json::from_slice(&std::fs::read(path.as_ref())?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let meta = SegMeta::new("20230405060708", "20230101120000");
        let v: serde_json::Value = serde_json::to_value(&meta).unwrap();
        assert_eq!(v["type"], "seg");
        assert_eq!(v["name"], "20230405060708");
        assert_eq!(v["uuid"], "20230405060708");
        assert_eq!(v["vcps"], "pointset.vcps");
        assert_eq!(v["volume"], "20230101120000");
    }

    #[test]
    fn test_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        let meta = SegMeta::new("a", "v");
        write_metadata(&path, &meta).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"name\": \"a\""));
        assert_eq!(read_metadata(&path).unwrap(), meta);
    }
}
