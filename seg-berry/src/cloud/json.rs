//! 关键切片 JSON (`pointset.json`).
//!
//! 格式为 `{ "<切片>": [[x, y, z], ...], ... }`. 读回时键被解析为整数切片索引.
//! 与稠密点云不同, 它完整保留了用户标注的关键切片, 因此加载时总是优先使用它.

use crate::{Curve, SegResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// 把曲线的关键切片写入 `path`.
pub fn write_curve_json<P: AsRef<Path>>(path: P, curve: &Curve) -> SegResult<()> {
    let mut w = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer(&mut w, curve)?;
    w.flush()?;
    Ok(())
}

/// 从 `path` 读取曲线. 键不是整数、点的 z 与键不一致或关键切片为空时返回 `Err`.
pub fn read_curve_json<P: AsRef<Path>>(path: P) -> SegResult<Curve> {
    let r = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(r)?)
}
