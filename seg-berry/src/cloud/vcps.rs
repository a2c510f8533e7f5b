//! 有序二进制点云 (`.vcps`).
//!
//! 文件由 ASCII 文件头和紧随其后的小端 `f64` 数据组成:
//!
//! ```text
//! width: <每切片点数>
//! height: <切片数>
//! dim: 3
//! ordered: true
//! type: double
//! version: 1
//! <>
//! <按 [切片][点][坐标] 行优先排列的 f64 数据>
//! ```

use super::DenseCloud;
use crate::consts::{VCPS_HEADER_END, VCPS_TYPE_DOUBLE, VCPS_VERSION};
use crate::{SegError, SegResult};
use ndarray::Array3;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// `.vcps` 文件头.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VcpsHeader {
    /// 每切片点数.
    pub width: usize,
    /// 切片数.
    pub height: usize,
    /// 每个点的维数.
    pub dim: usize,
    /// 是否为有序点云.
    pub ordered: bool,
    /// 格式版本.
    pub version: u32,
}

impl VcpsHeader {
    /// 描述给定点云的文件头.
    pub fn of(cloud: &DenseCloud) -> Self {
        let (height, width, dim) = cloud.shape();
        Self {
            width,
            height,
            dim,
            ordered: true,
            version: VCPS_VERSION,
        }
    }

    /// 数据部分的字节数. 超出 `usize` 范围时返回 `None`.
    #[inline]
    pub fn payload_len(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.dim)?
            .checked_mul(std::mem::size_of::<f64>())
    }

    /// 写出文件头 (含结束行 `<>`).
    pub fn write_to<W: Write>(&self, w: &mut W) -> SegResult<()> {
        writeln!(w, "width: {}", self.width)?;
        writeln!(w, "height: {}", self.height)?;
        writeln!(w, "dim: {}", self.dim)?;
        writeln!(w, "ordered: {}", self.ordered)?;
        writeln!(w, "type: {VCPS_TYPE_DOUBLE}")?;
        writeln!(w, "version: {}", self.version)?;
        w.write_all(VCPS_HEADER_END)?;
        Ok(())
    }

    /// 解析文件头文本 (不含结束行). 只接受 `dim: 3`, `ordered: true`, `type: double`
    /// 以及当前版本.
    pub fn parse(text: &str) -> SegResult<Self> {
        let fields: HashMap<&str, &str> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                l.split_once(':')
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .ok_or_else(|| SegError::BadHeader(format!("无法解析的行 `{l}`")))
            })
            .collect::<SegResult<_>>()?;

        let field = |key: &str| {
            fields
                .get(key)
                .copied()
                .ok_or_else(|| SegError::BadHeader(format!("缺少字段 `{key}`")))
        };
        let number = |key: &str| {
            let v = field(key)?;
            v.parse::<usize>()
                .map_err(|_| SegError::BadHeader(format!("字段 `{key}` 的值 `{v}` 不是整数")))
        };

        let header = Self {
            width: number("width")?,
            height: number("height")?,
            dim: number("dim")?,
            ordered: field("ordered")? == "true",
            version: number("version")? as u32,
        };
        let kind = field("type")?;
        if kind != VCPS_TYPE_DOUBLE {
            return Err(SegError::BadHeader(format!("不支持的元素类型 `{kind}`")));
        }
        if header.dim != 3 {
            return Err(SegError::BadHeader(format!("不支持的维数 {}", header.dim)));
        }
        if !header.ordered {
            return Err(SegError::BadHeader("只支持有序点云".to_string()));
        }
        if header.version != VCPS_VERSION {
            return Err(SegError::BadHeader(format!("不支持的版本 {}", header.version)));
        }
        Ok(header)
    }
}

/// 把稠密点云写入 `path`. 已存在的文件会被覆盖.
pub fn write_ordered_vcps<P: AsRef<Path>>(path: P, cloud: &DenseCloud) -> SegResult<()> {
    let path = path.as_ref();
    let mut w = BufWriter::new(File::create(path)?);
    VcpsHeader::of(cloud).write_to(&mut w)?;
    for v in cloud.data().iter() {
        w.write_all(&v.to_le_bytes())?;
    }
    w.flush()?;
    log::info!("wrote {:?} ({} slices) to {}", cloud.shape(), cloud.n_slices(), path.display());
    Ok(())
}

/// 从 `path` 读取稠密点云.
///
/// 第一行的 z 坐标决定起始切片, 之后每一行的 z 必须依次递增 1.
pub fn read_vcps<P: AsRef<Path>>(path: P) -> SegResult<DenseCloud> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_vcps(&bytes)
}

/// 从内存中的完整文件内容解析稠密点云.
pub fn parse_vcps(bytes: &[u8]) -> SegResult<DenseCloud> {
    let end = bytes
        .windows(VCPS_HEADER_END.len())
        .position(|w| w == VCPS_HEADER_END)
        .ok_or_else(|| SegError::BadHeader("缺少文件头结束行 `<>`".to_string()))?;
    let text = std::str::from_utf8(&bytes[..end])
        .map_err(|_| SegError::BadHeader("文件头不是合法的 ASCII".to_string()))?;
    let header = VcpsHeader::parse(text)?;
    let expected = header.payload_len().ok_or_else(|| {
        SegError::BadHeader(format!(
            "点云尺寸 {} x {} 超出范围",
            header.height, header.width
        ))
    })?;

    let payload = &bytes[end + VCPS_HEADER_END.len()..];
    if payload.len() != expected {
        return Err(SegError::BadCloud(format!(
            "数据长度为 {} 字节, 文件头声明 {expected} 字节",
            payload.len()
        )));
    }
    if header.width == 0 || header.height == 0 {
        return Err(SegError::BadCloud("点云为空".to_string()));
    }

    let values: Vec<f64> = payload
        .chunks_exact(std::mem::size_of::<f64>())
        .map(|c| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(c);
            f64::from_le_bytes(buf)
        })
        .collect();
    let data = Array3::from_shape_vec((header.height, header.width, header.dim), values)?;

    let z0 = data[[0, 0, 2]];
    if !z0.is_finite() || z0 < 0.0 || z0.fract() != 0.0 || z0 >= usize::MAX as f64 {
        return Err(SegError::BadCloud(format!("非法的起始切片 {z0}")));
    }
    let cloud = DenseCloud::new(z0 as usize, data)?;
    cloud.check_z()?;
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn sample() -> DenseCloud {
        let rows = (4..7)
            .map(|z| vec![Point::new(1.5, z as f64, z), Point::new(-2.25, 0.0, z)])
            .collect();
        DenseCloud::from_rows(4, rows).unwrap()
    }

    #[test]
    fn test_header_text() {
        let mut buf = Vec::new();
        VcpsHeader::of(&sample()).write_to(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "width: 2\nheight: 3\ndim: 3\nordered: true\ntype: double\nversion: 1\n<>\n"
        );
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pointset.vcps");
        let cloud = sample();
        write_ordered_vcps(&path, &cloud).unwrap();
        let back = read_vcps(&path).unwrap();
        assert_eq!(back, cloud);
        assert_eq!(back.first_slice(), 4);
    }

    #[test]
    fn test_payload_is_little_endian_row_major() {
        let mut buf = Vec::new();
        let cloud = sample();
        VcpsHeader::of(&cloud).write_to(&mut buf).unwrap();
        let header_len = buf.len();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.vcps");
        write_ordered_vcps(&path, &cloud).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), header_len + 3 * 2 * 3 * 8);
        let first = f64::from_le_bytes(bytes[header_len..header_len + 8].try_into().unwrap());
        assert_eq!(first, 1.5);
        let z = f64::from_le_bytes(bytes[header_len + 16..header_len + 24].try_into().unwrap());
        assert_eq!(z, 4.0);
    }

    #[test]
    fn test_bad_files() {
        assert!(matches!(parse_vcps(b"width: 1\n"), Err(SegError::BadHeader(_))));
        let header = "width: 1\nheight: 1\ndim: 3\nordered: true\ntype: float\nversion: 1\n<>\n";
        assert!(matches!(parse_vcps(header.as_bytes()), Err(SegError::BadHeader(_))));
        let header = "width: 1\nheight: 1\ndim: 2\nordered: true\ntype: double\nversion: 1\n<>\n";
        assert!(matches!(parse_vcps(header.as_bytes()), Err(SegError::BadHeader(_))));

        // 数据被截断.
        let mut bytes =
            b"width: 1\nheight: 1\ndim: 3\nordered: true\ntype: double\nversion: 1\n<>\n".to_vec();
        bytes.extend_from_slice(&1.0f64.to_le_bytes());
        assert!(matches!(parse_vcps(&bytes), Err(SegError::BadCloud(_))));

        // z 不连续.
        let mut bytes =
            b"width: 1\nheight: 2\ndim: 3\nordered: true\ntype: double\nversion: 1\n<>\n".to_vec();
        for v in [0.0, 0.0, 3.0, 0.0, 0.0, 5.0f64] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        assert!(matches!(parse_vcps(&bytes), Err(SegError::BadCloud(_))));

        assert!(read_vcps("/nonexistent/pointset.vcps").is_err());
    }

    /// 文件头: 每切片 `width` 个点, 共 `height` 张切片.
    fn header_bytes(width: &str, height: usize) -> Vec<u8> {
        let rest = "dim: 3\nordered: true\ntype: double\nversion: 1\n<>\n";
        format!("width: {width}\nheight: {height}\n{rest}").into_bytes()
    }

    #[test]
    fn test_oversized_header() {
        let bytes = header_bytes(&usize::MAX.to_string(), 2);
        assert!(matches!(parse_vcps(&bytes), Err(SegError::BadHeader(_))));
        let header = VcpsHeader {
            width: usize::MAX,
            height: 2,
            dim: 3,
            ordered: true,
            version: VCPS_VERSION,
        };
        assert_eq!(header.payload_len(), None);
    }

    #[test]
    fn test_start_slice_out_of_range() {
        let mut bytes = header_bytes("1", 2);
        for _ in 0..2 {
            for v in [0.0, 0.0, usize::MAX as f64] {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
        }
        assert!(matches!(parse_vcps(&bytes), Err(SegError::BadCloud(_))));
    }
}
