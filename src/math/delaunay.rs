//! Delaunay triangulation (Bowyer–Watson) and linear barycentric interpolation.
//!
//! Used to interpolate scattered samples onto a grid: a query point inside a
//! triangle gets the barycentric blend of the three vertex values; a point
//! outside every triangle (outside the convex hull) gets nothing.
//!
//! Callers should pass coordinates of comparable magnitude (e.g. rescaled to
//! the unit square) and without exact duplicates.

/// Barycentric weights below this are treated as zero (point on an edge).
const BARY_EPS: f64 = 1e-10;

/// Triangles with twice-area below this are dropped as degenerate.
const AREA_EPS: f64 = 1e-14;

/// How far (in bounding-box spans) the enclosing super-triangle reaches.
const SUPER_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy)]
struct Circle {
    cx: f64,
    cy: f64,
    r2: f64,
}

impl Circle {
    fn contains(&self, p: [f64; 2]) -> bool {
        let dx = p[0] - self.cx;
        let dy = p[1] - self.cy;
        dx * dx + dy * dy < self.r2
    }
}

#[derive(Debug, Clone, Copy)]
struct WorkTriangle {
    v: [usize; 3],
    circle: Circle,
}

/// A triangulation over a fixed vertex set.
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    /// Triangulate a point set.
    ///
    /// Fewer than three points, or points that are all collinear, produce a
    /// triangulation with no triangles.
    pub fn new(points: &[[f64; 2]]) -> Self {
        let n = points.len();
        let triangles = if n < 3 || points.iter().flatten().any(|v| !v.is_finite()) {
            Vec::new()
        } else {
            bowyer_watson(points)
        };
        Self {
            points: points.to_vec(),
            triangles,
        }
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Find a triangle containing `q` and the barycentric weights of its vertices.
    pub fn locate(&self, q: [f64; 2]) -> Option<([usize; 3], [f64; 3])> {
        self.triangles.iter().find_map(|&tri| {
            let w = barycentric(self.points[tri[0]], self.points[tri[1]], self.points[tri[2]], q)?;
            w.iter().all(|&wi| wi >= -BARY_EPS).then_some((tri, w))
        })
    }

    /// Linearly interpolate per-vertex `values` at `q`; `None` outside the hull.
    pub fn interpolate(&self, values: &[f64], q: [f64; 2]) -> Option<f64> {
        let (tri, w) = self.locate(q)?;
        Some(w[0] * values[tri[0]] + w[1] * values[tri[1]] + w[2] * values[tri[2]])
    }
}

fn bowyer_watson(points: &[[f64; 2]]) -> Vec<[usize; 3]> {
    let n = points.len();

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p[0]);
        max_x = max_x.max(p[0]);
        min_y = min_y.min(p[1]);
        max_y = max_y.max(p[1]);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);
    let mid_x = 0.5 * (min_x + max_x);
    let mid_y = 0.5 * (min_y + max_y);

    // Vertices n, n+1, n+2 form the super-triangle.
    let mut verts = points.to_vec();
    verts.push([mid_x - SUPER_SCALE * span, mid_y - SUPER_SCALE * span]);
    verts.push([mid_x + SUPER_SCALE * span, mid_y - SUPER_SCALE * span]);
    verts.push([mid_x, mid_y + SUPER_SCALE * span]);

    let mut tris = vec![make_triangle(&verts, [n, n + 1, n + 2])];

    for (pi, &p) in points.iter().enumerate() {
        let (bad, keep): (Vec<WorkTriangle>, Vec<WorkTriangle>) =
            tris.into_iter().partition(|t| t.circle.contains(p));
        tris = keep;

        // Cavity boundary: edges belonging to exactly one bad triangle.
        let mut edges: Vec<(usize, usize)> = Vec::with_capacity(bad.len() * 3);
        for t in &bad {
            for (a, b) in [(t.v[0], t.v[1]), (t.v[1], t.v[2]), (t.v[2], t.v[0])] {
                edges.push(if a < b { (a, b) } else { (b, a) });
            }
        }
        edges.sort_unstable();
        let mut i = 0;
        while i < edges.len() {
            if i + 1 < edges.len() && edges[i] == edges[i + 1] {
                let shared = edges[i];
                while i < edges.len() && edges[i] == shared {
                    i += 1;
                }
                continue;
            }
            let (a, b) = edges[i];
            tris.push(make_triangle(&verts, [a, b, pi]));
            i += 1;
        }
    }

    tris.into_iter()
        .map(|t| t.v)
        .filter(|v| v.iter().all(|&i| i < n))
        .filter(|v| twice_area(points[v[0]], points[v[1]], points[v[2]]).abs() > AREA_EPS)
        .collect()
}

fn make_triangle(verts: &[[f64; 2]], v: [usize; 3]) -> WorkTriangle {
    let (a, b, c) = (verts[v[0]], verts[v[1]], verts[v[2]]);
    let d = 2.0 * twice_area(a, b, c);
    let circle = if d.abs() <= AREA_EPS {
        // Degenerate sliver: make it "contain" everything so the next
        // insertion replaces it.
        Circle {
            cx: (a[0] + b[0] + c[0]) / 3.0,
            cy: (a[1] + b[1] + c[1]) / 3.0,
            r2: f64::INFINITY,
        }
    } else {
        let a2 = a[0] * a[0] + a[1] * a[1];
        let b2 = b[0] * b[0] + b[1] * b[1];
        let c2 = c[0] * c[0] + c[1] * c[1];
        let cx = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
        let cy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
        let r2 = (a[0] - cx).powi(2) + (a[1] - cy).powi(2);
        Circle { cx, cy, r2 }
    };
    WorkTriangle { v, circle }
}

/// Signed twice-area (positive for counter-clockwise `a, b, c`).
fn twice_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])
}

fn barycentric(a: [f64; 2], b: [f64; 2], c: [f64; 2], q: [f64; 2]) -> Option<[f64; 3]> {
    let denom = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
    if denom.abs() <= AREA_EPS {
        return None;
    }
    let w0 = ((b[1] - c[1]) * (q[0] - c[0]) + (c[0] - b[0]) * (q[1] - c[1])) / denom;
    let w1 = ((c[1] - a[1]) * (q[0] - c[0]) + (a[0] - c[0]) * (q[1] - c[1])) / denom;
    Some([w0, w1, 1.0 - w0 - w1])
}
