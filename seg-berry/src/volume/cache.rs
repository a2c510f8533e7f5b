use super::Volume;
use crate::SegResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 调用方持有的体数据缓存. 同一路径只会打开一次.
///
/// 缓存以路径为键, 不检测磁盘上的文件是否发生变化.
#[derive(Debug, Default)]
pub struct VolumeCache {
    volumes: HashMap<PathBuf, Arc<Volume>>,
}

impl VolumeCache {
    /// 空缓存.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取已缓存的体数据, 未缓存时打开并缓存它.
    pub fn get_or_open<P: AsRef<Path>>(&mut self, path: P) -> SegResult<Arc<Volume>> {
        let path = path.as_ref();
        if let Some(v) = self.volumes.get(path) {
            return Ok(Arc::clone(v));
        }
        let v = Arc::new(Volume::open(path)?);
        self.volumes.insert(path.to_path_buf(), Arc::clone(&v));
        Ok(v)
    }

    /// 仅查询缓存.
    #[inline]
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<Arc<Volume>> {
        self.volumes.get(path.as_ref()).cloned()
    }

    /// 移出缓存. 已分发出去的句柄仍然有效.
    #[inline]
    pub fn evict<P: AsRef<Path>>(&mut self, path: P) -> Option<Arc<Volume>> {
        self.volumes.remove(path.as_ref())
    }

    /// 已缓存的体数据个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// 缓存是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// 清空缓存.
    #[inline]
    pub fn clear(&mut self) {
        self.volumes.clear();
    }
}
