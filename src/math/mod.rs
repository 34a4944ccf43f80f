//! Numeric kernels: cubic spline, Delaunay/barycentric interpolation, grids.

pub mod delaunay;
pub mod grid;
pub mod spline;

pub use delaunay::*;
pub use grid::*;
pub use spline::*;
