//! Iso-line extraction (marching squares) over a [`ContourField`].
//!
//! Each grid cell with four defined corners is classified by which corners lie
//! at or above the level; crossings are placed on cell edges by linear
//! interpolation. Cells touching an undefined node are skipped, so lines stop
//! at the convex hull. Saddle cells are resolved with the cell-center average.

use crate::domain::{ContourField, IsoLevel, IsoLine};

type Pt = (f64, f64);

/// Extract one [`IsoLine`] per level. Empty fields produce lines without segments.
pub fn iso_lines(field: &ContourField, levels: &[IsoLevel]) -> Vec<IsoLine> {
    levels
        .iter()
        .map(|l| IsoLine {
            level: l.value,
            segments: march(field, l.value),
        })
        .collect()
}

fn march(field: &ContourField, level: f64) -> Vec<[Pt; 2]> {
    let rows = field.head_axis.len();
    let cols = field.flow_axis.len();
    if rows < 2 || cols < 2 || field.values.len() != rows {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let corners = (
                field.values[i].get(j).copied().flatten(),
                field.values[i].get(j + 1).copied().flatten(),
                field.values[i + 1].get(j + 1).copied().flatten(),
                field.values[i + 1].get(j).copied().flatten(),
            );
            // (i, j) is the low-flow/low-head corner.
            let (Some(ll), Some(lr), Some(ur), Some(ul)) = corners else {
                continue;
            };

            let (f0, f1) = (field.flow_axis[j], field.flow_axis[j + 1]);
            let (h0, h1) = (field.head_axis[i], field.head_axis[i + 1]);

            let mut case = 0u8;
            if ll >= level {
                case |= 1;
            }
            if lr >= level {
                case |= 2;
            }
            if ur >= level {
                case |= 4;
            }
            if ul >= level {
                case |= 8;
            }

            let low = || crossing((f0, h0), (f1, h0), ll, lr, level);
            let right = || crossing((f1, h0), (f1, h1), lr, ur, level);
            let high = || crossing((f0, h1), (f1, h1), ul, ur, level);
            let left = || crossing((f0, h0), (f0, h1), ll, ul, level);
            let center_above = (ll + lr + ur + ul) / 4.0 >= level;

            match case {
                0 | 15 => {}
                1 | 14 => segments.push([left(), low()]),
                2 | 13 => segments.push([low(), right()]),
                3 | 12 => segments.push([left(), right()]),
                4 | 11 => segments.push([right(), high()]),
                6 | 9 => segments.push([low(), high()]),
                7 | 8 => segments.push([left(), high()]),
                // ll and ur above.
                5 if center_above => {
                    segments.push([low(), right()]);
                    segments.push([left(), high()]);
                }
                5 => {
                    segments.push([left(), low()]);
                    segments.push([right(), high()]);
                }
                // lr and ul above.
                10 if center_above => {
                    segments.push([left(), low()]);
                    segments.push([right(), high()]);
                }
                10 => {
                    segments.push([low(), right()]);
                    segments.push([left(), high()]);
                }
                _ => {}
            }
        }
    }
    segments
}

/// Point on segment `a`–`b` where the linear blend of `va`, `vb` equals `level`.
fn crossing(a: Pt, b: Pt, va: f64, vb: f64, level: f64) -> Pt {
    let dv = vb - va;
    let t = if dv.abs() < f64::EPSILON {
        0.5
    } else {
        ((level - va) / dv).clamp(0.0, 1.0)
    };
    (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
}
