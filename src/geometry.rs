//! Integer rasterizers.
//!
//! Every walker here is a plain iterator over offsets or points so the
//! drawing code can stay a thin loop around the bus calls. None of them
//! allocate or use floating point.

use embedded_graphics_core::geometry::Point;

/// Integer Bresenham walk from `start` to `end`, both inclusive.
#[derive(Debug, Clone)]
pub struct Line {
    current: Point,
    step: Point,
    delta_x: i32,
    delta_y: i32,
    x_err: i32,
    y_err: i32,
    distance: i32,
    remaining: i32,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        let delta_x = end.x - start.x;
        let delta_y = end.y - start.y;
        let step = Point::new(delta_x.signum(), delta_y.signum());
        let (delta_x, delta_y) = (delta_x.abs(), delta_y.abs());
        let distance = delta_x.max(delta_y);

        Self {
            current: start,
            step,
            delta_x,
            delta_y,
            x_err: 0,
            y_err: 0,
            distance,
            remaining: distance + 1,
        }
    }

    /// Pure horizontal or vertical lines, which the driver fills as a rectangle.
    pub fn is_axis_aligned(&self) -> bool {
        self.step.x == 0 || self.step.y == 0
    }
}

impl Iterator for Line {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let point = self.current;

        self.x_err += self.delta_x;
        self.y_err += self.delta_y;
        if self.x_err >= self.distance {
            self.x_err -= self.distance;
            self.current.x += self.step.x;
        }
        if self.y_err >= self.distance {
            self.y_err -= self.distance;
            self.current.y += self.step.y;
        }
        Some(point)
    }
}

/// Midpoint circle walk over one octant.
///
/// Yields `(x, y)` offsets with `x < y` after each decision step; the four
/// axis points are not included.
#[derive(Debug, Clone)]
pub struct MidpointCircle {
    x: i32,
    y: i32,
    d: i32,
}

impl MidpointCircle {
    pub fn new(radius: i32) -> Self {
        Self {
            x: 0,
            y: radius,
            d: 3 - 2 * radius,
        }
    }
}

impl Iterator for MidpointCircle {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.x >= self.y {
            return None;
        }
        if self.d < 0 {
            self.d += 4 * self.x + 6;
        } else {
            self.d += 4 * (self.x - self.y) + 10;
            self.y -= 1;
        }
        self.x += 1;
        Some(Point::new(self.x, self.y))
    }
}

/// The eight reflections of an octant offset.
pub fn octants(p: Point) -> [Point; 8] {
    [
        Point::new(p.x, p.y),
        Point::new(-p.x, p.y),
        Point::new(p.x, -p.y),
        Point::new(-p.x, -p.y),
        Point::new(p.y, p.x),
        Point::new(-p.y, p.x),
        Point::new(p.y, -p.x),
        Point::new(-p.y, -p.x),
    ]
}

/// The four reflections of a quadrant offset.
pub fn quadrants(p: Point) -> [Point; 4] {
    [
        Point::new(p.x, p.y),
        Point::new(-p.x, p.y),
        Point::new(p.x, -p.y),
        Point::new(-p.x, -p.y),
    ]
}

/// Axis-aligned ellipse described by its extreme coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EllipseBounds {
    pub center: Point,
    pub radius_x: i32,
    pub radius_y: i32,
}

impl EllipseBounds {
    /// `None` when either axis has zero extent.
    pub fn from_extremes(x0: i32, x1: i32, y0: i32, y1: i32) -> Option<Self> {
        if x0 == x1 || y0 == y1 {
            return None;
        }
        Some(Self {
            center: Point::new((x0 + x1) >> 1, (y0 + y1) >> 1),
            radius_x: (x0 - x1).abs() >> 1,
            radius_y: (y0 - y1).abs() >> 1,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EllipseStep {
    /// First-quadrant offset from the center.
    pub offset: Point,
    /// Set when this step moved to a new row.
    pub new_row: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Shallow,
    Steep,
    Done,
}

/// Two-region midpoint ellipse walk over the first quadrant, starting after
/// the top point `(0, radius_y)` and ending on the x axis.
#[derive(Debug, Clone)]
pub struct MidpointEllipse {
    rxx: i64,
    ryy: i64,
    x: i64,
    y: i64,
    d: i64,
    region: Region,
}

impl MidpointEllipse {
    pub fn new(radius_x: i32, radius_y: i32) -> Self {
        let rxx = radius_x as i64 * radius_x as i64;
        let ryy = radius_y as i64 * radius_y as i64;
        Self {
            rxx,
            ryy,
            x: 0,
            y: radius_y as i64,
            d: 2 * ryy + rxx - 2 * rxx * radius_y as i64,
            region: Region::Shallow,
        }
    }

    fn step(&self, new_row: bool) -> EllipseStep {
        EllipseStep {
            offset: Point::new(self.x as i32, self.y as i32),
            new_row,
        }
    }
}

impl Iterator for MidpointEllipse {
    type Item = EllipseStep;

    fn next(&mut self) -> Option<EllipseStep> {
        let (rxx2, ryy2) = (2 * self.rxx, 2 * self.ryy);
        loop {
            match self.region {
                Region::Shallow => {
                    if self.ryy * self.x >= self.rxx * self.y {
                        let (x, y) = (self.x, self.y);
                        self.d = rxx2 * (y - 1) * (y - 1) + ryy2 * x * x + self.ryy + ryy2 * x
                            - rxx2 * self.ryy;
                        self.region = Region::Steep;
                        continue;
                    }
                    let new_row = self.d >= 0;
                    if new_row {
                        self.d += ryy2 * (2 * self.x + 3) + 4 * self.rxx - 4 * self.rxx * self.y;
                        self.y -= 1;
                    } else {
                        self.d += ryy2 * (2 * self.x + 3);
                    }
                    self.x += 1;
                    return Some(self.step(new_row));
                }
                Region::Steep => {
                    if self.y <= 0 {
                        self.region = Region::Done;
                        return None;
                    }
                    if self.d < 0 {
                        self.d += rxx2 * 3 + 4 * self.ryy * self.x + 4 * self.ryy
                            - 2 * rxx2 * self.y;
                        self.x += 1;
                    } else {
                        self.d += rxx2 * 3 - 2 * rxx2 * self.y;
                    }
                    self.y -= 1;
                    return Some(self.step(true));
                }
                Region::Done => return None,
            }
        }
    }
}

/// Raster points in one 45° octant of a circle of `radius`, counted with the
/// point-comparison walk.
pub fn points_per_octant(radius: i32) -> i32 {
    let rr2 = 2 * radius as i64 * radius as i64;
    let (mut a, mut b) = (radius as i64, 0i64);
    let mut count = 0;
    loop {
        count += 1;
        b += 1;
        if 2 * a * a + 2 * b * b - rr2 - 2 * a + 1 > 0 {
            a -= 1;
        }
        if b >= a {
            return count;
        }
    }
}

/// Walk index at which an angle is reached, counting from 0° downwards.
pub fn angle_to_index(angle: u16, per_octant: i32) -> i32 {
    let index = (360 - angle as i32) * per_octant / 45;
    index.max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArcPhase {
    TowardsDiagonal,
    TowardsAxis,
}

/// Point-comparison arc walk.
///
/// Angles grow clockwise on screen (y down): 0° right, 90° down, 180° left,
/// 270° up. The walk runs from 0° through 270°, 180° and 90°, and the arc
/// is the part between `start` and `end` in that direction.
#[derive(Debug, Clone)]
pub struct ArcWalk {
    rr2: i64,
    a: i32,
    b: i32,
    quadrant: u8,
    phase: ArcPhase,
    index: i32,
    start: i32,
    end: i32,
    draw_on: bool,
    radius: i32,
}

impl ArcWalk {
    /// `None` for a zero radius, equal angles or angles of 360° and more.
    pub fn new(radius: i32, start_angle: u16, end_angle: u16) -> Option<Self> {
        if radius <= 0 || start_angle == end_angle || start_angle >= 360 || end_angle >= 360 {
            return None;
        }
        let per_octant = points_per_octant(radius);
        Some(Self {
            rr2: 2 * radius as i64 * radius as i64,
            a: radius,
            b: 0,
            quadrant: 0,
            phase: ArcPhase::TowardsDiagonal,
            index: 0,
            start: angle_to_index(start_angle, per_octant),
            end: angle_to_index(end_angle, per_octant),
            draw_on: end_angle > start_angle,
            radius,
        })
    }

    fn offset(&self) -> Point {
        let (a, b) = (self.a, self.b);
        match self.quadrant {
            0 => Point::new(a, -b),
            1 => Point::new(-b, -a),
            2 => Point::new(-a, b),
            _ => Point::new(b, a),
        }
    }

    fn next_quadrant(&mut self) {
        self.quadrant += 1;
        self.a = self.radius;
        self.b = 0;
        self.phase = ArcPhase::TowardsDiagonal;
    }
}

impl Iterator for ArcWalk {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        while self.quadrant < 4 {
            let (a, b) = (self.a as i64, self.b as i64);
            let mut finished_quadrant = false;
            match self.phase {
                ArcPhase::TowardsDiagonal => {
                    self.b += 1;
                    let nb = b + 1;
                    if 2 * a * a + 2 * nb * nb - self.rr2 - 2 * a + 1 > 0 {
                        self.a -= 1;
                    }
                    if self.b >= self.a {
                        if self.a <= 0 {
                            finished_quadrant = true;
                        } else {
                            self.phase = ArcPhase::TowardsAxis;
                        }
                    }
                }
                ArcPhase::TowardsAxis => {
                    self.a -= 1;
                    let na = a - 1;
                    if 2 * na * na + 2 * b * b - self.rr2 + 2 * b + 1 <= 0 {
                        self.b += 1;
                    }
                    finished_quadrant = self.a <= 0;
                }
            }

            let offset = self.offset();
            self.index += 1;
            let was_on = self.draw_on;
            if self.index == self.start {
                self.draw_on = !self.draw_on;
            }
            if self.index == self.end {
                self.draw_on = !self.draw_on;
            }
            if finished_quadrant {
                self.next_quadrant();
            }
            if was_on || self.draw_on {
                return Some(offset);
            }
        }
        None
    }
}
