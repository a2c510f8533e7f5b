//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use seg_berry::interp::{
    interpolate_full, EdgeGuideConfig, EdgeGuidedInterpolator, InterpolationMode,
};
use seg_berry::{Curve, Volume, VolumeCache};
use std::thread;
use utils::loader;

/// 实际运行.
pub fn run() -> AblationResult {
    let volpkg = loader::volpkg_dir_from_env_or_home();
    assert!(volpkg.is_dir(), "Volume package `{}` not found", volpkg.display());

    let mut cache = VolumeCache::new();
    let volume = loader::open_volume(&volpkg, &mut cache);
    let curves = loader::curves(&volpkg);
    let config = loader::guide_config_from_env();
    log::info!("{} segmentations, config: {config:?}", curves.len());

    println!("Running ablation studies...");
    thread::scope(|s| {
        let (vol, curves) = (volume.as_ref(), curves.as_slice());
        let h_linear = s.spawn(move || linear(curves));
        let h_guided = s.spawn(move || guided(vol, curves, config));

        AblationResult::from_iter([
            ("linear", h_linear.join().expect("Thread joining error")),
            ("edge-guided", h_guided.join().expect("Thread joining error")),
        ])
    })
}

/// 线性插值. 位移恒为 0, 只用于计时对照.
fn linear(curves: &[(String, Curve)]) -> Profile {
    let mut profile = Profile::new();
    for (id, curve) in curves {
        println!("Linear: segmentation {id}...");
        profile.interp_start();
        let cloud = interpolate_full(curve, &mut InterpolationMode::linear());
        profile.interp_elapsed();
        match cloud {
            Ok(cloud) => profile.compare(&cloud, &cloud, &curve.keys().collect::<Vec<_>>()),
            Err(e) => {
                log::warn!("segmentation `{id}`: {e}");
                profile.count_skipped();
            }
        }
    }
    profile.finish()
}

/// 边缘引导插值, 与线性插值的结果逐点对比.
fn guided(vol: &Volume, curves: &[(String, Curve)], config: EdgeGuideConfig) -> Profile {
    let mut profile = Profile::new();
    let mut mode = InterpolationMode::EdgeGuided(EdgeGuidedInterpolator::new(vol, config));
    for (id, curve) in curves {
        println!("Edge-guided: segmentation {id}...");
        let baseline = match interpolate_full(curve, &mut InterpolationMode::linear()) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("segmentation `{id}`: {e}");
                profile.count_skipped();
                continue;
            }
        };
        profile.interp_start();
        let cloud = interpolate_full(curve, &mut mode);
        profile.interp_elapsed();
        match cloud {
            Ok(cloud) => profile.compare(&cloud, &baseline, &curve.keys().collect::<Vec<_>>()),
            Err(e) => {
                log::warn!("segmentation `{id}`: {e}");
                profile.count_skipped();
            }
        }
    }
    profile.finish()
}
