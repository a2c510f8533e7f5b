//! 对 `seg-berry::package` 的更一层封装. 提供更直接的体数据包定位与加载.

use seg_berry::interp::EdgeGuideConfig;
use seg_berry::package;
use seg_berry::{Curve, Volume, VolumeCache};
use std::env;
use std::path::{Path, PathBuf};

/// 获取体数据包路径.
///
/// 1. 若环境变量 `$SEG_VOLPKG_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/volpkg`.
pub fn volpkg_dir_from_env_or_home() -> PathBuf {
    if let Ok(d) = env::var("SEG_VOLPKG_DIR") {
        PathBuf::from(d)
    } else {
        let mut ans = dirs::home_dir().unwrap();
        ans.push("volpkg");
        ans
    }
}

/// 获取边缘引导插值参数.
///
/// 1. 若环境变量 `$SEG_GUIDE_CONFIG` 非空, 则从该 JSON 文件加载;
/// 2. 否则, 使用默认参数.
pub fn guide_config_from_env() -> EdgeGuideConfig {
    match env::var("SEG_GUIDE_CONFIG") {
        Ok(p) => EdgeGuideConfig::from_json_file(&p)
            .unwrap_or_else(|e| panic!("Loading guide config `{p}` error: {e}")),
        Err(_) => EdgeGuideConfig::default(),
    }
}

/// 打开体数据包 `volpkg` 中的体数据 (`volumes/` 下的第一个).
pub fn open_volume<P: AsRef<Path>>(volpkg: P, cache: &mut VolumeCache) -> std::sync::Arc<Volume> {
    let volpkg = volpkg.as_ref();
    let name = package::volume_name(volpkg)
        .unwrap()
        .expect("No volume in package");
    cache
        .get_or_open(volpkg.join(seg_berry::consts::files::VOLUMES_DIR).join(name))
        .unwrap()
}

/// 加载体数据包 `volpkg` 中的全部分割. 无法加载的分割被跳过.
pub fn curves<P: AsRef<Path>>(volpkg: P) -> Vec<(String, Curve)> {
    let paths = package::paths_dir(volpkg);
    package::list_segmentations(&paths)
        .unwrap()
        .into_iter()
        .filter_map(|id| match package::load_segmentation(&paths, &id) {
            Ok(c) => Some((id, c)),
            Err(e) => {
                log::warn!("skipping segmentation `{id}`: {e}");
                None
            }
        })
        .collect()
}
