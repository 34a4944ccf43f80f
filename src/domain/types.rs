//! Shared domain types.
//!
//! Raw rows are read once into a [`TestTable`] and never mutated. Everything
//! downstream borrows from that table: a [`NormalizedPoint`] holds a reference
//! to the row it was derived from, so characteristic points and exports can
//! always recover the original measured fields.

use std::cmp::Ordering;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a row in the loaded table (zero-based data row index).
pub type RowId = usize;

/// Number of samples in a resampled smooth curve.
pub const DEFAULT_SMOOTH_SAMPLES: usize = 200;

/// Minimum number of distinct x-values required to build a cubic spline.
pub const MIN_SPLINE_POINTS: usize = 4;

/// Nodes per axis of the contour grid.
pub const DEFAULT_GRID_SIZE: usize = 100;

/// Default number of efficiency iso-levels.
pub const DEFAULT_LEVEL_COUNT: usize = 8;

/// Allowed iso-level counts.
pub const LEVEL_COUNT_RANGE: std::ops::RangeInclusive<usize> = 6..=8;

/// Two impeller diameters closer than this are the same physical curve.
pub const DIAMETER_TOLERANCE: f64 = 1e-6;

/// Nominal motor speeds (RPM) offered as rated-speed presets.
pub const COMMON_SPEEDS: [f64; 6] = [1450.0, 1470.0, 2900.0, 2950.0, 3000.0, 3600.0];

/// One measured test-bench sample.
///
/// Numeric fields are `None` when the cell was empty or unparsable. Missing is
/// never the same as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPoint {
    pub row_id: RowId,
    pub pump: String,
    pub stages: Option<u32>,
    pub test_type: Option<String>,
    /// Measured speed (RPM).
    pub speed: Option<f64>,
    pub flow: Option<f64>,
    /// Measured total head.
    pub head: Option<f64>,
    /// Pump efficiency (%).
    pub efficiency: Option<f64>,
    /// Pump input power.
    pub power: Option<f64>,
    /// First-stage impeller diameter exactly as recorded, e.g. `"250"` or `"250/250"`.
    pub impeller_dia: Option<String>,
    /// Test-point number within the bench run.
    pub testpoint: Option<u32>,
    /// NPSH required (`hs` column), if recorded.
    pub npsh_required: Option<f64>,
}

impl TestPoint {
    /// Measured speed if it can be used for affinity scaling.
    pub fn valid_speed(&self) -> Option<f64> {
        self.speed.filter(|s| s.is_finite() && *s > 0.0)
    }
}

/// The loaded raw dataset.
///
/// Owned once per session and shared immutably by every pipeline run.
#[derive(Debug, Clone, Default)]
pub struct TestTable {
    points: Vec<TestPoint>,
}

impl TestTable {
    pub fn new(points: Vec<TestPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[TestPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Rows matching a pump/stage/test-type selection, in table order.
    pub fn select<'a>(&'a self, selection: &Selection) -> Vec<&'a TestPoint> {
        self.points.iter().filter(|p| selection.matches(p)).collect()
    }
}

/// Which rows a pipeline run operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// One or more pump identities.
    pub pumps: Vec<String>,
    pub stages: u32,
    pub test_type: String,
}

impl Selection {
    pub fn matches(&self, point: &TestPoint) -> bool {
        self.pumps.iter().any(|p| *p == point.pump)
            && point.stages == Some(self.stages)
            && point.test_type.as_deref() == Some(self.test_type.as_str())
    }

    pub fn describe(&self) -> String {
        format!(
            "pump(s) [{}], stages={}, test type={}",
            self.pumps.join(", "),
            self.stages,
            self.test_type
        )
    }
}

/// A test point rescaled to the rated speed.
///
/// Only built for rows with a positive measured speed and present flow/head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPoint<'a> {
    pub source: &'a TestPoint,
    /// Flow at rated speed.
    pub flow: f64,
    /// Head at rated speed.
    pub head: f64,
}

impl NormalizedPoint<'_> {
    pub fn row_id(&self) -> RowId {
        self.source.row_id
    }

    /// Efficiency if present and finite.
    pub fn efficiency(&self) -> Option<f64> {
        self.source.efficiency.filter(|e| e.is_finite())
    }

    /// Ascending flow, ties broken by row id.
    pub fn cmp_by_flow(&self, other: &Self) -> Ordering {
        self.flow
            .total_cmp(&other.flow)
            .then_with(|| self.row_id().cmp(&other.row_id()))
    }
}

/// Grouping key for impeller diameter.
///
/// Serialized as the diameter number, or the string `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "DiameterRepr", try_from = "DiameterRepr")]
pub enum DiameterKey {
    Known(f64),
    /// Missing or unparsable diameter. These points still form a group.
    Unknown,
}

impl DiameterKey {
    /// Build a key from the raw diameter cell (first numeric token wins).
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(parse_leading_number)
            .map(DiameterKey::Known)
            .unwrap_or(DiameterKey::Unknown)
    }

    /// Same physical diameter, within [`DIAMETER_TOLERANCE`].
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (DiameterKey::Known(a), DiameterKey::Known(b)) => (a - b).abs() <= DIAMETER_TOLERANCE,
            (DiameterKey::Unknown, DiameterKey::Unknown) => true,
            _ => false,
        }
    }

    /// Ascending diameter; `Unknown` sorts last.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (DiameterKey::Known(a), DiameterKey::Known(b)) => a.total_cmp(b),
            (DiameterKey::Known(_), DiameterKey::Unknown) => Ordering::Less,
            (DiameterKey::Unknown, DiameterKey::Known(_)) => Ordering::Greater,
            (DiameterKey::Unknown, DiameterKey::Unknown) => Ordering::Equal,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DiameterKey::Known(d) => format!("{d}"),
            DiameterKey::Unknown => UNKNOWN_DIAMETER.to_string(),
        }
    }
}

const UNKNOWN_DIAMETER: &str = "unknown";

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DiameterRepr {
    Known(f64),
    Label(String),
}

impl From<DiameterKey> for DiameterRepr {
    fn from(key: DiameterKey) -> Self {
        match key {
            DiameterKey::Known(d) => DiameterRepr::Known(d),
            DiameterKey::Unknown => DiameterRepr::Label(UNKNOWN_DIAMETER.to_string()),
        }
    }
}

impl TryFrom<DiameterRepr> for DiameterKey {
    type Error = String;

    fn try_from(repr: DiameterRepr) -> Result<Self, Self::Error> {
        match repr {
            DiameterRepr::Known(d) => Ok(DiameterKey::Known(d)),
            DiameterRepr::Label(s) if s == UNKNOWN_DIAMETER => Ok(DiameterKey::Unknown),
            DiameterRepr::Label(s) => Err(format!("invalid diameter key `{s}`")),
        }
    }
}

/// Parse the first numeric token of a string, e.g. `"250/250"` -> `250.0`.
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let bytes = raw.as_bytes();
    let starts_number = |i: usize| {
        bytes[i].is_ascii_digit()
            || (bytes[i] == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    };
    let start = (0..bytes.len()).find(|&i| starts_number(i))?;
    let end = bytes[start..]
        .iter()
        .position(|&b| !(b.is_ascii_digit() || b == b'.'))
        .map_or(bytes.len(), |off| start + off);
    raw[start..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Identity of one physical curve: pump and impeller diameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupKey {
    pub pump: String,
    pub diameter: DiameterKey,
}

impl GroupKey {
    /// The default key: pump identity plus parsed first-stage diameter.
    pub fn of(point: &NormalizedPoint<'_>) -> Self {
        Self {
            pump: point.source.pump.clone(),
            diameter: DiameterKey::parse(point.source.impeller_dia.as_deref()),
        }
    }

    pub fn matches(&self, other: &Self) -> bool {
        self.pump == other.pump && self.diameter.matches(&other.diameter)
    }

    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.pump
            .cmp(&other.pump)
            .then_with(|| self.diameter.sort_cmp(&other.diameter))
    }

    pub fn label(&self) -> String {
        format!("{} @ {}", self.pump, self.diameter.label())
    }
}

/// Points of one physical curve, always ordered by ascending normalized flow
/// (ties by row id).
#[derive(Debug, Clone, PartialEq)]
pub struct CurveGroup<'a> {
    key: GroupKey,
    members: Vec<NormalizedPoint<'a>>,
}

impl<'a> CurveGroup<'a> {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            members: Vec::new(),
        }
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn members(&self) -> &[NormalizedPoint<'a>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Insert a member at its ordered position.
    pub fn insert(&mut self, point: NormalizedPoint<'a>) {
        let at = self
            .members
            .partition_point(|m| m.cmp_by_flow(&point) == Ordering::Less);
        self.members.insert(at, point);
    }

    /// `(flow, head)` pairs in member order.
    pub fn head_pairs(&self) -> Vec<(f64, f64)> {
        self.members.iter().map(|m| (m.flow, m.head)).collect()
    }

    /// `(flow, efficiency)` pairs for members that carry an efficiency.
    pub fn efficiency_pairs(&self) -> Vec<(f64, f64)> {
        self.members
            .iter()
            .filter_map(|m| m.efficiency().map(|e| (m.flow, e)))
            .collect()
    }

    /// `(flow, NPSHr)` pairs for members that carry an NPSH-required value.
    pub fn npsh_pairs(&self) -> Vec<(f64, f64)> {
        self.members
            .iter()
            .filter_map(|m| {
                m.source
                    .npsh_required
                    .filter(|v| v.is_finite())
                    .map(|v| (m.flow, v))
            })
            .collect()
    }
}

/// Why the smoother returned the raw points instead of a spline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Fallback {
    /// Fewer than [`MIN_SPLINE_POINTS`] distinct x-values.
    TooFewPoints { distinct: usize },
    /// An x or y value is NaN or infinite.
    NonFinite,
    /// x-values are not in non-decreasing order.
    NotIncreasing,
    /// The spline system could not be solved.
    SolveFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SmoothKind {
    /// Dense resample of an interpolating cubic spline.
    Spline,
    /// The input points unchanged, to be drawn as straight segments.
    Passthrough { fallback: Fallback },
}

/// A render-only curve. Never fed back into the data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothCurve {
    pub kind: SmoothKind,
    pub points: Vec<(f64, f64)>,
}

impl SmoothCurve {
    pub fn is_spline(&self) -> bool {
        self.kind == SmoothKind::Spline
    }
}

/// Characteristic operating points of one group, borrowed from its members.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacteristicPoints<'g, 'a> {
    /// Member with the highest efficiency; `None` if no member has one.
    pub best_efficiency: Option<&'g NormalizedPoint<'a>>,
    /// Member with the lowest normalized flow.
    pub shutoff: &'g NormalizedPoint<'a>,
    /// Member with the highest normalized flow.
    pub runout: &'g NormalizedPoint<'a>,
}

/// Efficiency interpolated on a regular flow–head grid.
///
/// `values[i][j]` is the efficiency at `(flow_axis[j], head_axis[i])`, or
/// `None` outside the convex hull of the samples. An empty field (no axes)
/// means the input was degenerate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourField {
    pub flow_axis: Vec<f64>,
    pub head_axis: Vec<f64>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl ContourField {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().flatten().filter(|v| v.is_some()).count()
    }
}

/// One efficiency iso-level with its display label (e.g. `"72.5%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoLevel {
    pub value: f64,
    pub label: String,
}

/// Line segments (in flow/head coordinates) where the field crosses a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoLine {
    pub level: f64,
    pub segments: Vec<[(f64, f64); 2]>,
}

/// Contour output for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourSurface {
    pub field: ContourField,
    pub levels: Vec<IsoLevel>,
    pub isolines: Vec<IsoLine>,
}

/// Summary of the measured speeds available for a pump/stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub common: Vec<f64>,
}

/// A full run's configuration as understood by the pipeline.
///
/// Derived from CLI flags, environment and the loaded data (defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    pub selection: Selection,
    /// Explicit rated speed; `None` means the mean of valid measured speeds.
    pub rated_speed: Option<f64>,
    pub samples: usize,
    pub grid_size: usize,
    pub level_count: usize,
    pub export: Option<PathBuf>,
}

/// Where the rated speed of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatedSpeedSource {
    Explicit,
    /// Mean of valid measured speeds in the selection.
    Mean,
}

/// One exported point with its measured and normalized values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    pub row_id: RowId,
    pub testpoint: Option<u32>,
    pub flow: f64,
    pub head: f64,
    pub measured_flow: Option<f64>,
    pub measured_head: Option<f64>,
    pub speed: Option<f64>,
    pub efficiency: Option<f64>,
    pub power: Option<f64>,
    pub impeller_dia: Option<String>,
}

/// One exported curve group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFile {
    pub pump: String,
    pub diameter: DiameterKey,
    pub points: Vec<PointRecord>,
    pub head_curve: SmoothCurve,
    pub efficiency_curve: Option<SmoothCurve>,
    pub npsh_required: Vec<(f64, f64)>,
    pub best_efficiency_row: Option<RowId>,
    pub shutoff_row: Option<RowId>,
    pub runout_row: Option<RowId>,
}

/// A saved run file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub selection: Selection,
    pub rated_speed: f64,
    pub rated_speed_source: RatedSpeedSource,
    pub groups: Vec<GroupFile>,
    pub contour: ContourSurface,
}
