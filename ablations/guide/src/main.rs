//! 对比线性插值与边缘引导插值.
//!
//! 对体数据包中每一条已保存的分割, 分别运行两种插值, 统计耗时以及边缘引导插值
//! 相对线性位置的位移.

mod profile;
mod result;
mod runner;

fn main() {
    utils::init_logger();
    runner::run().analyze();
}
