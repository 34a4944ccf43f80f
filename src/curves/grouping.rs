//! Partition normalized points into physical curves.
//!
//! The default key is (pump identity, first-stage impeller diameter). Diameter
//! cells such as `"250/250"` are keyed by their first numeric token; cells that
//! don't parse are grouped under `unknown` and are never dropped.

use tracing::debug;

use crate::domain::{CurveGroup, GroupKey, NormalizedPoint};

/// Group with the default key ([`GroupKey::of`]).
pub fn group<'a>(points: &[NormalizedPoint<'a>]) -> Vec<CurveGroup<'a>> {
    group_by(points, GroupKey::of)
}

/// Group with a caller-supplied key.
///
/// Every input point ends up in exactly one group. Groups are returned sorted
/// by key (pump, then ascending diameter, `unknown` last); members are sorted
/// by ascending normalized flow, ties by row id.
pub fn group_by<'a, F>(points: &[NormalizedPoint<'a>], key_fn: F) -> Vec<CurveGroup<'a>>
where
    F: Fn(&NormalizedPoint<'a>) -> GroupKey,
{
    let mut groups: Vec<CurveGroup<'a>> = Vec::new();

    for p in points {
        let key = key_fn(p);
        match groups.iter().position(|g| g.key().matches(&key)) {
            Some(idx) => groups[idx].insert(*p),
            None => {
                let mut g = CurveGroup::new(key);
                g.insert(*p);
                groups.push(g);
            }
        }
    }

    groups.sort_by(|a, b| a.key().sort_cmp(b.key()));
    debug!(points = points.len(), groups = groups.len(), "grouped curves");
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiameterKey, RowId, TestPoint};

    fn row(row_id: RowId, pump: &str, dia: Option<&str>) -> TestPoint {
        TestPoint {
            row_id,
            pump: pump.to_string(),
            stages: Some(1),
            test_type: Some("SP".to_string()),
            speed: Some(1450.0),
            flow: Some(0.0),
            head: Some(0.0),
            efficiency: None,
            power: None,
            impeller_dia: dia.map(str::to_string),
            testpoint: None,
            npsh_required: None,
        }
    }

    fn np(source: &TestPoint, flow: f64) -> NormalizedPoint<'_> {
        NormalizedPoint { source, flow, head: 10.0 }
    }

    #[test]
    fn compound_diameters_share_a_group_and_unparsable_are_kept() {
        let rows = [
            row(0, "P1", Some("250/250")),
            row(1, "P1", Some("250")),
            row(2, "P1", Some("??")),
            row(3, "P1", None),
            row(4, "P1", Some("200")),
        ];
        let pts: Vec<_> = rows.iter().enumerate().map(|(i, r)| np(r, 10.0 - i as f64)).collect();
        let groups = group(&pts);

        let keys: Vec<DiameterKey> = groups.iter().map(|g| g.key().diameter).collect();
        assert_eq!(
            keys,
            vec![DiameterKey::Known(200.0), DiameterKey::Known(250.0), DiameterKey::Unknown]
        );
        assert_eq!(groups[1].len(), 2);
        assert_eq!(groups[2].len(), 2);
    }

    #[test]
    fn grouping_is_a_partition() {
        let rows: Vec<TestPoint> = (0..20)
            .map(|i| {
                let pump = if i % 3 == 0 { "A" } else { "B" };
                let dia = ["180", "200/190", "x", "200"][i % 4];
                row(i, pump, Some(dia))
            })
            .collect();
        let pts: Vec<_> = rows.iter().map(|r| np(r, (r.row_id * 7 % 5) as f64)).collect();
        let groups = group(&pts);

        let mut seen: Vec<RowId> = groups
            .iter()
            .flat_map(|g| g.members().iter().map(|m| m.row_id()))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());

        for g in &groups {
            assert!(g.members().iter().all(|m| m.source.pump == g.key().pump));
            assert!(g.members().windows(2).all(|w| w[0].cmp_by_flow(&w[1]).is_lt()));
        }
    }

    #[test]
    fn ties_in_flow_are_ordered_by_row_id() {
        let rows = [row(5, "P1", Some("200")), row(2, "P1", Some("200")), row(9, "P1", Some("200"))];
        let pts = vec![np(&rows[0], 1.0), np(&rows[1], 1.0), np(&rows[2], 0.5)];
        let groups = group(&pts);
        let ids: Vec<RowId> = groups[0].members().iter().map(|m| m.row_id()).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }

    #[test]
    fn custom_key_fn_is_respected() {
        let rows = [row(0, "P1", Some("200")), row(1, "P1", Some("250"))];
        let pts = vec![np(&rows[0], 1.0), np(&rows[1], 2.0)];
        let groups = group_by(&pts, |p| GroupKey {
            pump: p.source.pump.clone(),
            diameter: DiameterKey::Unknown,
        });
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }
}
