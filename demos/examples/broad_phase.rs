// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad phase between two sets of 3D boxes, as a Boolean operation would run it
//! between the faces of two solids.
//!
//! Both trees are built in parallel, then overlapping pairs are collected across the
//! two sets and within the first set.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p boxsift_demos --example broad_phase --release`

use boxsift::{Aabb3D, BoxPairSelector, BuildConfig, Builder, LinearBuilder, SahBuilder};

/// Faces of a tessellated sphere shell, as one small box per patch.
fn shell(center: [f64; 3], radius: f64, rings: usize, segments: usize) -> Vec<Aabb3D<f64>> {
    let mut out = Vec::with_capacity(rings * segments);
    let patch = radius * core::f64::consts::PI / rings as f64;
    for r in 0..rings {
        let theta = core::f64::consts::PI * (r as f64 + 0.5) / rings as f64;
        for s in 0..segments {
            let phi = 2.0 * core::f64::consts::PI * s as f64 / segments as f64;
            let p = [
                center[0] + radius * theta.sin() * phi.cos(),
                center[1] + radius * theta.sin() * phi.sin(),
                center[2] + radius * theta.cos(),
            ];
            out.push(Aabb3D::from_point(p).enlarged(patch * 0.5));
        }
    }
    out
}

fn main() {
    env_logger::init();

    let mut a = shell([0.0, 0.0, 0.0], 10.0, 200, 400);
    let mut b = shell([12.0, 0.0, 0.0], 6.0, 120, 240);
    println!("{} faces against {} faces", a.len(), b.len());

    let config = BuildConfig::new(8, 32).unwrap().with_parallel(true);
    let ta = LinearBuilder::new(config).build(&mut a).unwrap();
    let tb = SahBuilder::new(config).build(&mut b).unwrap();

    let mut across = BoxPairSelector::new(&a, &b);
    let n = across.select(&ta, &tb);
    println!("{} candidate face pairs between the shells", n);

    let mut within = BoxPairSelector::new_same(&a);
    let n = within.select_self(&ta);
    println!("{} candidate face pairs within the first shell", n);
    if let Some(&(i, j)) = within.pairs().first() {
        println!("  e.g. {:?} and {:?}", a[i], a[j]);
    }
}
