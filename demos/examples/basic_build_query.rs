// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Boxsift: build a tree over a box list, then query by box and point.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p boxsift_demos --example basic_build_query`

use boxsift::{Aabb2D, BoxList, BoxSet, BuildConfig, Builder, LinearBuilder, PointSelector};

fn main() {
    env_logger::init();

    let mut list: BoxList<i64, 2, u32> = BoxList::new();
    list.push(Aabb2D::from_coords(0, 0, 10, 10), 1);
    list.push(Aabb2D::from_coords(5, 5, 15, 15), 2);
    list.push(Aabb2D::from_coords(20, 0, 30, 10), 3);
    list.push(Aabb2D::from_coords(40, 40, 50, 50), 4);

    let config = BuildConfig::new(1, 16).unwrap();
    let tree = LinearBuilder::new(config).build(&mut list).unwrap();
    println!(
        "tree: {} nodes, {} leaves, depth {}, root box {:?}",
        tree.len(),
        tree.leaf_count(),
        tree.max_depth(),
        tree.root_box()
    );

    // Indices refer to the list as the build reordered it.
    let hits = tree.query_box(&list, &Aabb2D::from_coords(8, 0, 22, 2));
    let ids: Vec<u32> = hits.iter().map(|&i| list.element(i)).collect();
    println!("boxes overlapping [8,0]-[22,2]: {:?}", ids);

    let mut at = PointSelector::new(&list, [6, 6]);
    at.select(&tree);
    let ids: Vec<u32> = at.indices().iter().map(|&i| list.element(i)).collect();
    println!("boxes containing (6,6): {:?}", ids);

    for i in 0..list.len() {
        println!("  slot {}: id {} {:?}", i, list.element(i), list.aabb(i));
    }
}
