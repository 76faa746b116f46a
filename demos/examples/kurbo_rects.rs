// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index `kurbo::Rect`s and find the ones under a viewport.
//!
//! Run:
//! - `cargo run -p boxsift_demos --example kurbo_rects`

use boxsift::{Aabb2D, BoxList, Builder, SahBuilder};
use kurbo::Rect;

fn main() {
    env_logger::init();

    let mut list: BoxList<f64, 2, usize> = (0..32)
        .flat_map(|y| (0..32).map(move |x| (x, y)))
        .enumerate()
        .map(|(id, (x, y))| {
            let r = Rect::from_origin_size((x as f64 * 30.0, y as f64 * 30.0), (25.0, 25.0));
            (Aabb2D::from(r), id)
        })
        .collect();
    let tree = SahBuilder::default().build(&mut list).unwrap();

    let viewport = Rect::new(100.0, 100.0, 220.0, 160.0);
    let hits = tree.query_box(&list, &viewport.into());
    println!("{} rects intersect {:?}", hits.len(), viewport);
    for i in hits {
        let r: Rect = list.boxes()[i].into();
        println!("  id {:4} at {:?}", list.element(i), r);
    }
}
