//! 通用常量.

/// 分割目录下的文件名.
pub mod files {
    /// 有序二进制点云.
    pub const POINTSET_VCPS: &str = "pointset.vcps";

    /// 关键切片 JSON.
    pub const POINTSET_JSON: &str = "pointset.json";

    /// 分割 / 体数据元信息.
    pub const META_JSON: &str = "meta.json";

    /// 外部插值器读取的镜像目录名. 该目录存在时, 保存分割会额外写一份.
    pub const FROM_INTERPOLATOR: &str = "fromInterpolator";

    /// 体数据包下存放体数据的子目录名.
    pub const VOLUMES_DIR: &str = "volumes";

    /// 体数据包下存放分割的子目录名.
    pub const PATHS_DIR: &str = "paths";
}

/// 点云文件头中的元素类型.
pub const VCPS_TYPE_DOUBLE: &str = "double";

/// 点云文件头版本.
pub const VCPS_VERSION: u32 = 1;

/// 点云文件头与数据之间的分隔行.
pub const VCPS_HEADER_END: &[u8] = b"<>\n";

/// 元信息中分割的类型标记.
pub const SEG_META_TYPE: &str = "seg";

/// 草稿 (尚未保存) 曲线的 id.
pub const DRAFT_ID: &str = "0";

/// 默认点击命中半径, 以像素为单位.
pub const HIT_RADIUS: f64 = 7.0;

/// 默认多步跳转切片数 (前后没有关键切片时使用).
pub const DEFAULT_JUMP: usize = 50;

/// 从稠密点云识别关键切片时, 位移向量比较保留的小数位数.
pub const KEY_DETECT_DECIMALS: i32 = 9;

/// 边缘算子默认参数.
pub mod edge {
    /// canny 低阈值.
    pub const LOW_THRESHOLD: f32 = 50.0;

    /// canny 高阈值.
    pub const HIGH_THRESHOLD: f32 = 150.0;

    /// 边缘强度判定门限. canny 输出只有 0 和 255.
    pub const CUTOFF: u8 = 255;

    /// 沿法线单方向最多搜索的步数.
    pub const SEARCH_LIMIT: u32 = 10;

    /// 每一步的长度, 以像素为单位.
    pub const SEARCH_STEP: f64 = 1.0;
}
