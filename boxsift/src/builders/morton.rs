// Copyright 2025 the Boxsift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Morton (Z-order) keys and the radix sort used by [`LinearBuilder`](super::LinearBuilder).
//!
//! Each axis of a normalized centroid is quantized to [`bits_per_axis`] bits and the
//! axes are interleaved from the most significant bit down, axis 0 first within each
//! group. Sorting the keys as plain integers orders elements along the Z-order curve,
//! and every key bit is one binary split of space.

use alloc::vec;
use alloc::vec::Vec;

/// A Morton key paired with the index of the element it was computed from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EncodedLink {
    /// Interleaved quantized centroid.
    pub code: u64,
    /// Element index in the set before the build reordered it.
    pub index: usize,
}

/// Quantization bits per axis in `D` dimensions: `64 / D`, capped at 32.
#[allow(
    clippy::cast_possible_truncation,
    reason = "The value is at most 32 after the clamp."
)]
pub const fn bits_per_axis(d: usize) -> u32 {
    if d == 0 {
        return 0;
    }
    let b = 64 / d;
    if b > 32 { 32 } else { b as u32 }
}

/// Total significant bits of a key in `D` dimensions.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Keys are at most 64 bits wide, so `D` fits whenever the key is non-empty."
)]
pub const fn key_bits(d: usize) -> u32 {
    bits_per_axis(d) * d as u32
}

/// Quantize a coordinate in `[0, 1]` to `bits` bits. Out-of-range values are clamped,
/// NaN maps to zero.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The operand is clamped to [0, 2^bits - 1] before the cast."
)]
pub fn quantize(u: f64, bits: u32) -> u64 {
    if bits == 0 {
        return 0;
    }
    let scale = ((1_u64 << bits) - 1) as f64;
    (u.clamp(0.0, 1.0) * scale) as u64
}

/// Spread the low 32 bits of `x` to the even bit positions.
#[inline]
fn part1by1(x: u64) -> u64 {
    let mut x = x & 0xFFFF_FFFF;
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    (x | (x << 1)) & 0x5555_5555_5555_5555
}

/// Spread the low 21 bits of `x` to every third bit position.
#[inline]
fn part1by2(x: u64) -> u64 {
    let mut x = x & 0x1F_FFFF;
    x = (x | (x << 32)) & 0x001F_0000_0000_FFFF;
    x = (x | (x << 16)) & 0x001F_0000_FF00_00FF;
    x = (x | (x << 8)) & 0x100F_00F0_0F00_F00F;
    x = (x | (x << 4)) & 0x10C3_0C30_C30C_30C3;
    (x | (x << 2)) & 0x1249_2492_4924_9249
}

fn interleave_generic<const D: usize>(q: &[u64; D]) -> u64 {
    let bits = bits_per_axis(D);
    let mut code = 0_u64;
    for b in (0..bits).rev() {
        for v in q {
            code = (code << 1) | ((v >> b) & 1);
        }
    }
    code
}

/// Interleave quantized coordinates (each below `2^bits_per_axis(D)`) into a key.
#[inline]
pub fn interleave<const D: usize>(q: &[u64; D]) -> u64 {
    match D {
        2 => (part1by1(q[0]) << 1) | part1by1(q[1]),
        3 => (part1by2(q[0]) << 2) | (part1by2(q[1]) << 1) | part1by2(q[2]),
        _ => interleave_generic(q),
    }
}

/// Morton key of a centroid already normalized into `[0, 1]^D`.
pub fn morton_code<const D: usize>(u: &[f64; D]) -> u64 {
    let bits = bits_per_axis(D);
    let q: [u64; D] = core::array::from_fn(|a| quantize(u[a], bits));
    interleave(&q)
}

/// Stable LSD radix sort of links by the low `key_bits` bits of their codes.
///
/// Eight bits per pass; passes in which every key shares the same digit are skipped.
/// Equal keys keep their input order, so the result is deterministic.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Digits are masked to a single byte."
)]
pub fn radix_sort(links: &mut [EncodedLink], key_bits: u32) {
    let n = links.len();
    if n < 2 {
        return;
    }
    let mut scratch = vec![EncodedLink::default(); n];
    let mut in_scratch = false;
    let passes = key_bits.div_ceil(8);
    for pass in 0..passes {
        let shift = pass * 8;
        let (src, dst) = if in_scratch {
            (&scratch[..], &mut links[..])
        } else {
            (&links[..], &mut scratch[..])
        };
        let mut counts = [0_usize; 256];
        for l in src {
            counts[((l.code >> shift) & 0xFF) as usize] += 1;
        }
        if counts.contains(&n) {
            continue;
        }
        let mut offsets = [0_usize; 256];
        let mut sum = 0;
        for (o, c) in offsets.iter_mut().zip(counts) {
            *o = sum;
            sum += c;
        }
        for l in src {
            let digit = ((l.code >> shift) & 0xFF) as usize;
            dst[offsets[digit]] = *l;
            offsets[digit] += 1;
        }
        in_scratch = !in_scratch;
    }
    if in_scratch {
        links.copy_from_slice(&scratch);
    }
}

/// Fill `out` with the links of `centers`; `base` is the element index of `centers[0]`.
pub(crate) fn encode_into<const D: usize>(
    centers: &[[f64; D]],
    out: &mut [EncodedLink],
    base: usize,
) {
    for (i, (c, link)) in centers.iter().zip(out.iter_mut()).enumerate() {
        *link = EncodedLink {
            code: morton_code(c),
            index: base + i,
        };
    }
}

/// Links for every centroid, in element order.
pub(crate) fn encode<const D: usize>(centers: &[[f64; D]]) -> Vec<EncodedLink> {
    let mut links = vec![EncodedLink::default(); centers.len()];
    encode_into(centers, &mut links, 0);
    links
}
