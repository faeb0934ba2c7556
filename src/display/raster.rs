// Rasterizer - Line and circle drawing into the packed frame buffer
//
// Both algorithms work purely in integers. Lines only walk the part of their
// major axis that crosses the panel, and circles that cannot touch the panel
// are skipped, so the cost is bounded by the panel size rather than by the
// coordinates. Remaining off-panel points are clipped by
// `FrameBuffer::set_pixel`. Either way the buffer is marked dirty.

use super::framebuffer::FrameBuffer;

/// Light a pixel given wide coordinates, dropping anything beyond i32
#[inline]
fn plot(fb: &mut FrameBuffer, x: i64, y: i64) {
    if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
        fb.set_pixel(x, y, true);
    }
}

/// Draw a 1-pixel-wide line between two points, endpoints inclusive
///
/// Vertical lines are filled directly from the smaller to the larger y.
/// Otherwise the shallow case (|slope| <= 1) walks x and steps y by one
/// whenever the accumulated slope reaches the next half-pixel threshold;
/// the steep case swaps the roles of x and y. Endpoints are reordered so
/// the walked coordinate always increases. Only the stretch of the walked
/// axis that lies on the panel is visited.
///
/// # Arguments
/// * `fb` - Target frame buffer
/// * `x1`, `y1` - First endpoint
/// * `x2`, `y2` - Second endpoint
///
/// # Example
/// ```
/// use ssd1305::{draw_line, FrameBuffer};
/// let mut fb = FrameBuffer::default();
/// draw_line(&mut fb, 0, 0, 10, 0);
/// assert_eq!(fb.lit_pixels(), 11);
/// ```
pub fn draw_line(fb: &mut FrameBuffer, x1: i32, y1: i32, x2: i32, y2: i32) {
    let (x1, y1, x2, y2) = (x1 as i64, y1 as i64, x2 as i64, y2 as i64);
    let width = fb.geometry().width() as i64;
    let height = fb.geometry().height() as i64;
    let dx = x2 - x1;
    let dy = y2 - y1;

    if dx == 0 {
        let (top, bottom) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        for y in top.max(0)..=bottom.min(height - 1) {
            plot(fb, x1, y);
        }
    } else {
        // Direction of the dependent coordinate: sign of the slope, with a
        // flat line counted as positive.
        let step = if dy == 0 || (dy > 0) == (dx > 0) { 1 } else { -1 };

        if dy.abs() <= dx.abs() {
            let (start, end, y) = if x1 <= x2 { (x1, x2, y1) } else { (x2, x1, y2) };
            let walk = Walk {
                start,
                end,
                minor: y,
                rise: dy.abs(),
                run: dx.abs(),
                step,
            };
            walk.visit(width, |major, minor| plot(fb, major, minor));
        } else {
            let (start, end, x) = if y1 <= y2 { (y1, y2, x1) } else { (y2, y1, x2) };
            let walk = Walk {
                start,
                end,
                minor: x,
                rise: dx.abs(),
                run: dy.abs(),
                step,
            };
            walk.visit(height, |major, minor| plot(fb, minor, major));
        }
    }

    fb.mark_dirty();
}

/// A line walked along its major axis
///
/// Integer form of the fractional accumulator: adding `rise / run` per step
/// and comparing against thresholds 0.5, 1.5, 2.5, ... is the same as adding
/// `2 * rise` and comparing against `run`, subtracting `2 * run` per step.
/// The error term stays in `[-run, run)`.
struct Walk {
    start: i64,
    end: i64,

    /// Minor coordinate at `start`
    minor: i64,

    rise: i64,
    run: i64,

    /// +1 or -1
    step: i64,
}

impl Walk {
    /// Emit the points whose major coordinate lies in `0..extent`
    ///
    /// Steps before the panel are skipped in one go: after `k` steps the
    /// minor axis has moved `(2 * rise * k + run) / (2 * run)` times.
    fn visit(&self, extent: i64, mut emit: impl FnMut(i64, i64)) {
        let first = self.start.max(0);
        let last = self.end.min(extent - 1);
        if first > last {
            return;
        }

        let skipped = (first - self.start) as i128;
        let (rise, run) = (self.rise as i128, self.run as i128);
        let moved = (2 * rise * skipped + run) / (2 * run);

        let mut minor = self.minor + self.step * moved as i64;
        let mut error = (2 * rise * skipped - 2 * run * moved) as i64;

        emit(first, minor);
        for major in (first + 1)..=last {
            error += 2 * self.rise;
            if error >= self.run {
                minor += self.step;
                error -= 2 * self.run;
            }
            emit(major, minor);
        }
    }
}

/// Check whether any point of a circle outline can land on the panel
///
/// Outline points lie in the bounding square of the circle and, since the
/// loop keeps `x >= y` and lowers `x` at most once per step, at least
/// `radius / 2` away from the centre.
fn circle_touches_panel(fb: &FrameBuffer, cx: i64, cy: i64, radius: i64) -> bool {
    let width = fb.geometry().width() as i64;
    let height = fb.geometry().height() as i64;

    if cx + radius < 0 || cy + radius < 0 || cx - radius >= width || cy - radius >= height {
        return false;
    }

    // Farthest panel pixel from the centre is one of the corners
    let far_x = (cx as i128).abs().max((width - 1 - cx) as i128);
    let far_y = (cy as i128).abs().max((height - 1 - cy) as i128);
    let far_sq = far_x * far_x + far_y * far_y;

    4 * far_sq >= (radius as i128) * (radius as i128)
}

/// Draw the outline of a circle using the midpoint algorithm
///
/// Each iteration plots the eight octant reflections of `(x, y)` around the
/// centre. A negative radius draws nothing; a zero radius lights the centre.
/// Circles whose outline cannot reach the panel are skipped without walking.
///
/// # Arguments
/// * `fb` - Target frame buffer
/// * `cx`, `cy` - Centre
/// * `radius` - Radius in pixels
pub fn draw_circle(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32) {
    let (cx, cy) = (cx as i64, cy as i64);
    let mut x = radius as i64;
    let mut y = 0i64;
    let mut decision = 1 - x;

    if !circle_touches_panel(fb, cx, cy, x) {
        fb.mark_dirty();
        return;
    }

    while x >= y {
        plot(fb, cx + x, cy + y);
        plot(fb, cx + y, cy + x);
        plot(fb, cx - x, cy + y);
        plot(fb, cx - y, cy + x);
        plot(fb, cx - x, cy - y);
        plot(fb, cx - y, cy - x);
        plot(fb, cx + x, cy - y);
        plot(fb, cx + y, cy - x);

        y += 1;
        if decision < 0 {
            decision += 2 * y + 1;
        } else {
            x -= 1;
            decision += 2 * (y - x + 1);
        }
    }

    fb.mark_dirty();
}
