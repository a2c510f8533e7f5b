//! 体数据包中的分割目录.
//!
//! 体数据包的布局为:
//!
//! ```text
//! <volpkg>/
//!     volumes/<体数据名>/...
//!     paths/<分割 id>/pointset.vcps
//!     paths/<分割 id>/pointset.json
//!     paths/<分割 id>/meta.json
//!     paths/fromInterpolator/       (可选, 存在时保存会额外写一份)
//! ```

use crate::cloud::json::{read_curve_json, write_curve_json};
use crate::cloud::meta::{write_metadata, SegMeta};
use crate::cloud::vcps::{read_vcps, write_ordered_vcps};
use crate::consts::files;
use crate::interp::{interpolate_full, SliceInterpolator};
use crate::{Curve, CurveId, SegError, SegResult};
use std::path::{Path, PathBuf};

/// 所有已保存的分割 id (按名称排序).
///
/// 只列出含有 `pointset.vcps` 的子目录, `fromInterpolator` 除外.
pub fn list_segmentations<P: AsRef<Path>>(paths_dir: P) -> SegResult<Vec<String>> {
    let mut ans = Vec::new();
    for entry in std::fs::read_dir(paths_dir.as_ref())? {
        let path = entry?.path();
        let Some(name) = path.file_name().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        if name != files::FROM_INTERPOLATOR && path.join(files::POINTSET_VCPS).is_file() {
            ans.push(name);
        }
    }
    ans.sort();
    Ok(ans)
}

/// 分割 `id` 的目录, 不存在时创建.
pub fn segmentation_dir<P: AsRef<Path>>(paths_dir: P, id: &str) -> SegResult<PathBuf> {
    let dir = paths_dir.as_ref().join(id);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// 保存一条曲线: 完整插值后写出点云, 元信息和关键切片 JSON. 返回分割目录.
///
/// 若 `paths_dir/fromInterpolator` 目录存在, 点云和元信息会额外写入其中.
///
/// # 注意
///
/// 曲线无法完整插值时不会写出任何文件. 写入中途失败时, 已有的分割文件保持原样,
/// 新建的分割目录也不会被 [`list_segmentations`] 列出.
pub fn save_segmentation<P, S>(
    paths_dir: P,
    id: &CurveId,
    curve: &Curve,
    strategy: &mut S,
    volume_name: &str,
) -> SegResult<PathBuf>
where
    P: AsRef<Path>,
    S: SliceInterpolator + ?Sized,
{
    let paths_dir = paths_dir.as_ref();
    let cloud = interpolate_full(curve, strategy)?;

    let fresh = !paths_dir.join(id.as_str()).exists();
    let dir = segmentation_dir(paths_dir, id.as_str())?;
    let targets = [
        dir.join(files::POINTSET_JSON),
        dir.join(files::META_JSON),
        dir.join(files::POINTSET_VCPS),
    ];
    let written = write_staged(&targets, |[json, meta, vcps]| {
        write_curve_json(json, curve)?;
        write_metadata(meta, &SegMeta::new(id.as_str(), volume_name))?;
        write_ordered_vcps(vcps, &cloud)
    });
    if let Err(e) = written {
        if fresh {
            // 只在目录为空时成功.
            std::fs::remove_dir(&dir).ok();
        }
        return Err(e);
    }

    let mirror = paths_dir.join(files::FROM_INTERPOLATOR);
    if mirror.is_dir() {
        let targets = [
            mirror.join(files::META_JSON),
            mirror.join(files::POINTSET_VCPS),
        ];
        write_staged(&targets, |[meta, vcps]| {
            write_metadata(meta, &SegMeta::new(files::FROM_INTERPOLATOR, volume_name))?;
            write_ordered_vcps(vcps, &cloud)
        })?;
    }
    log::info!("saved segmentation `{id}` to {}", dir.display());
    Ok(dir)
}

/// 先把 `targets` 写成同目录下的 `<文件名>.tmp`, 全部成功后按顺序改名为目标文件.
///
/// 任一步失败时删除已写出的临时文件, 目标文件保持原样.
/// `pointset.vcps` 决定目录是否被视为分割, 因此应放在最后.
fn write_staged<const N: usize, F>(targets: &[PathBuf; N], write: F) -> SegResult<()>
where
    F: FnOnce(&[PathBuf; N]) -> SegResult<()>,
{
    let staged = targets.clone().map(|p| {
        let mut name = p.into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    });
    let result = write(&staged).and_then(|()| {
        for (from, to) in staged.iter().zip(targets) {
            std::fs::rename(from, to)?;
        }
        Ok(())
    });
    if result.is_err() {
        for path in staged.iter().filter(|p| p.is_file()) {
            std::fs::remove_file(path).ok();
        }
    }
    result
}

/// 加载分割 `id` 的关键切片.
///
/// 优先读取 `pointset.json`; 没有时从 `pointset.vcps` 中恢复关键切片 (尽力而为);
/// 两者都没有时返回 `Err(SegError::SegmentationNotFound)`.
pub fn load_segmentation<P: AsRef<Path>>(paths_dir: P, id: &str) -> SegResult<Curve> {
    let dir = paths_dir.as_ref().join(id);
    let json = dir.join(files::POINTSET_JSON);
    if json.is_file() {
        return read_curve_json(json);
    }
    let vcps = dir.join(files::POINTSET_VCPS);
    if vcps.is_file() {
        return read_vcps(vcps)?.to_curve();
    }
    Err(SegError::SegmentationNotFound(id.to_string()))
}

/// 体数据包 `volumes/` 下按名称排序的第一个非隐藏条目名.
pub fn volume_name<P: AsRef<Path>>(volpkg: P) -> SegResult<Option<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(volpkg.as_ref().join(files::VOLUMES_DIR))? {
        let name = entry?.file_name().to_string_lossy().to_string();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    Ok(names.into_iter().min())
}

/// 体数据包下的分割目录.
#[inline]
pub fn paths_dir<P: AsRef<Path>>(volpkg: P) -> PathBuf {
    volpkg.as_ref().join(files::PATHS_DIR)
}
