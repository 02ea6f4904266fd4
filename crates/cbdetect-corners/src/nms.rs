use cbdetect_core::ImageF32;

/// Block-based non-maximum suppression.
///
/// The map is tiled into `(n+1)²` blocks; each block's maximum survives if
/// no pixel within `n` of it is larger and its value reaches `threshold`.
/// Equal values are resolved in favour of the earlier pixel in row-major
/// order, so a flat plateau yields exactly one maximum. Pixels closer than
/// `margin` to the border are ignored.
///
/// Returns integer `(x, y)` locations in row-major block order.
pub fn non_maximum_suppression(
    map: &ImageF32,
    n: usize,
    margin: usize,
    threshold: f32,
) -> Vec<(usize, usize)> {
    let (w, h) = (map.w, map.h);
    let step = n + 1;
    let start = n + margin;
    let mut maxima = Vec::new();

    let order = |x: usize, y: usize| y * w + x;

    let mut by = start;
    while by + n + margin < h {
        let mut bx = start;
        while bx + n + margin < w {
            let (mut mx, mut my) = (bx, by);
            let mut best = map.at(bx, by);
            for y in by..=by + n {
                for x in bx..=bx + n {
                    let v = map.at(x, y);
                    if v > best {
                        best = v;
                        mx = x;
                        my = y;
                    }
                }
            }

            let x_hi = (mx + n).min(w - 1 - margin);
            let y_hi = (my + n).min(h - 1 - margin);
            let mut suppressed = false;
            'window: for y in my - n..=y_hi {
                for x in mx - n..=x_hi {
                    if x == mx && y == my {
                        continue;
                    }
                    let v = map.at(x, y);
                    if v > best || (v == best && order(x, y) < order(mx, my)) {
                        suppressed = true;
                        break 'window;
                    }
                }
            }

            if !suppressed && best >= threshold {
                maxima.push((mx, my));
            }
            bx += step;
        }
        by += step;
    }

    maxima
}
