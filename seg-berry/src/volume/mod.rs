//! 体数据: 按 z 索引随机访问的三维标量数组.
//!
//! 插值引擎只通过 [`SliceSource`] 读取切片. [`Volume`] 是该接口的默认实现,
//! 支持以下三种来源:
//!
//! 1. 切片图像目录: `meta.json` 加上按文件名排序的 `.tif` 切片 (每张一层);
//! 2. `.npy` 数组文件 (`u16` 或 `f32`), 形状为 `(z, h, w)`;
//! 3. `.nii` / `.nii.gz` 文件, 读入后重排为 `(z, h, w)`.

mod cache;

pub use cache::VolumeCache;

use crate::consts::files;
use crate::{Idx2d, Idx3d, SegError, SegResult};
use ndarray::{Array2, Array3, ArrayBase, ArrayView2, ArrayView3, Axis, Data, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 可按切片读取的体数据.
pub trait SliceSource {
    /// 形状 `(z, h, w)`.
    fn shape(&self) -> Idx3d;

    /// 读取第 `z` 张切片, 转换为 `f32`. 越界时返回 `Err`.
    fn slice_f32(&self, z: usize) -> SegResult<Array2<f32>>;

    /// 切片数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }
}

impl<S, A> SliceSource for ArrayBase<S, Ix3>
where
    S: Data<Elem = A>,
    A: Copy + Into<f32>,
{
    #[inline]
    fn shape(&self) -> Idx3d {
        self.dim()
    }

    fn slice_f32(&self, z: usize) -> SegResult<Array2<f32>> {
        let len = self.len_of(Axis(0));
        if z >= len {
            return Err(SegError::SliceOutOfRange { index: z, len });
        }
        Ok(self.index_axis(Axis(0), z).mapv(Into::into))
    }
}

/// 切片图像目录下的 `meta.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeMeta {
    /// 体素边长.
    #[serde(default)]
    pub voxelsize: f64,

    /// 切片数.
    pub slices: usize,

    /// 切片高度.
    pub height: usize,

    /// 切片宽度.
    pub width: usize,
}

/// 完全载入内存的体数据.
#[derive(Clone, Debug)]
pub struct Volume {
    name: String,
    meta: Option<VolumeMeta>,
    data: Array3<f32>,
}

impl Volume {
    /// 用已有数组构建.
    pub fn from_array(name: impl Into<String>, data: Array3<f32>) -> Self {
        Self {
            name: name.into(),
            meta: None,
            data,
        }
    }

    /// 根据路径类型打开体数据. 目录按切片图像目录处理, 文件按扩展名区分.
    pub fn open<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let path = path.as_ref();
        let ans = if path.is_dir() {
            Self::open_tif_dir(path)?
        } else {
            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if name.ends_with(".npy") {
                Self::open_npy(path)?
            } else if name.ends_with(".nii") || name.ends_with(".nii.gz") {
                Self::open_nifti(path)?
            } else {
                return Err(SegError::UnsupportedVolume(path.to_path_buf()));
            }
        };
        log::info!("opened volume `{}` with shape {:?}", ans.name, ans.shape());
        Ok(ans)
    }

    /// 打开切片图像目录.
    ///
    /// # 注意
    ///
    /// 1. 隐藏文件和非 `.tif` / `.tiff` 文件被忽略.
    /// 2. 切片数和每张切片的 `(h, w)` 必须与 `meta.json` 一致.
    pub fn open_tif_dir<P: AsRef<Path>>(dir: P) -> SegResult<Self> {
        let dir = dir.as_ref();
        let meta_path = dir.join(files::META_JSON);
        if !meta_path.is_file() {
            return Err(SegError::MissingMeta(dir.to_path_buf()));
        }
        let meta: VolumeMeta = serde_json::from_slice(&std::fs::read(&meta_path)?)?;

        let slices = list_tif_slices(dir)?;
        if slices.len() != meta.slices {
            return Err(SegError::SliceCountMismatch {
                expected: meta.slices,
                found: slices.len(),
            });
        }
        let expected = (meta.height, meta.width);

        #[cfg(feature = "rayon")]
        let decoded = slices
            .par_iter()
            .map(|p| decode_slice(p, expected))
            .collect::<SegResult<Vec<_>>>()?;
        #[cfg(not(feature = "rayon"))]
        let decoded = slices
            .iter()
            .map(|p| decode_slice(p, expected))
            .collect::<SegResult<Vec<_>>>()?;

        let flat: Vec<f32> = decoded.into_iter().flatten().collect();
        let data = Array3::from_shape_vec((meta.slices, meta.height, meta.width), flat)?;
        Ok(Self {
            name: dir_name(dir),
            meta: Some(meta),
            data,
        })
    }

    /// 打开 `.npy` 文件. 依次尝试 `u16` 和 `f32` 元素类型.
    pub fn open_npy<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let path = path.as_ref();
        let data = match ndarray_npy::read_npy::<_, Array3<u16>>(path) {
            Ok(a) => a.mapv(f32::from),
            Err(_) => ndarray_npy::read_npy::<_, Array3<f32>>(path)?,
        };
        Ok(Self::from_array(dir_name(path), data))
    }

    /// 打开 nii 文件. 数据按 `[w, h, z]` 存储, 读入后重排为 `[z, h, w]`.
    pub fn open_nifti<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let path = path.as_ref();
        let obj = ReaderOptions::new().read_file(path)?;

        // [W, H, z] -> [z, H, W].
        let data = obj
            .into_volume()
            .into_ndarray::<f32>()?
            .into_dimensionality::<Ix3>()?
            .permuted_axes([2, 1, 0]);
        let data = data.as_standard_layout().into_owned();
        Ok(Self::from_array(dir_name(path), data))
    }

    /// 体数据名 (目录名或文件名).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 切片图像目录的元信息. 其它来源为 `None`.
    #[inline]
    pub fn meta(&self) -> Option<&VolumeMeta> {
        self.meta.as_ref()
    }

    /// 形状 `(z, h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 整个数组的视图.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 第 `z` 张切片的视图. 越界时返回 `None`.
    #[inline]
    pub fn slice_at(&self, z: usize) -> Option<ArrayView2<'_, f32>> {
        (z < self.data.len_of(Axis(0))).then(|| self.data.index_axis(Axis(0), z))
    }
}

impl SliceSource for Volume {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    #[inline]
    fn slice_f32(&self, z: usize) -> SegResult<Array2<f32>> {
        self.data.slice_f32(z)
    }
}

/// 目录下按文件名排序的非隐藏 `.tif` / `.tiff` 文件.
fn list_tif_slices(dir: &Path) -> SegResult<Vec<PathBuf>> {
    let mut ans = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let is_tif = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"));
        if is_tif && !name.starts_with('.') && path.is_file() {
            ans.push(path);
        }
    }
    ans.sort();
    Ok(ans)
}

/// 以 16 位灰度解码一张切片图像, 并检查其形状.
fn decode_slice(path: &Path, expected: Idx2d) -> SegResult<Vec<f32>> {
    let img = image::open(path)?.into_luma16();
    let (w, h) = img.dimensions();
    let found = (h as usize, w as usize);
    if found != expected {
        return Err(SegError::ShapeMismatch { expected, found });
    }
    Ok(img.into_raw().into_iter().map(f32::from).collect())
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
