#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scalefuse::{build_pyramid, ImageView, PyramidFuser, PyramidLevel};

fn random_pyramid(seed: u64) -> Vec<PyramidLevel> {
    let mut data = Vec::with_capacity(16 * 8 * 3);
    for i in 0..16 * 8 * 3 {
        data.push(((i * 13) % 251) as f32);
    }
    let view = ImageView::from_slice(&data, 16, 8).unwrap();
    let mut levels = build_pyramid(view, view, 9, 1, 3).unwrap();

    let mut rng = StdRng::seed_from_u64(seed);
    for level in &mut levels {
        for d in 1..level.max_disparity() {
            for value in level.cost_mut().grid_mut(d).unwrap() {
                *value = rng.random_range(0.0f32..100.0);
            }
        }
    }
    levels
}

#[test]
fn parallel_fusion_matches_sequential() {
    let mut sequential = random_pyramid(5);
    let mut parallel = random_pyramid(5);

    PyramidFuser::new(0.4).fuse_finest(&mut sequential).unwrap();
    let par_fuser = PyramidFuser {
        lambda: 0.4,
        parallel: true,
    };
    par_fuser.fuse_finest(&mut parallel).unwrap();

    assert_eq!(
        sequential[0].cost().as_slice(),
        parallel[0].cost().as_slice()
    );
}

#[test]
fn parallel_selection_matches_sequential() {
    let mut levels = random_pyramid(9);
    let level = &mut levels[0];

    level.select_disparity();
    let sequential: Vec<u16> = level.disparity().as_slice().to_vec();
    level.select_disparity_par();

    assert_eq!(level.disparity().as_slice(), sequential.as_slice());
}
