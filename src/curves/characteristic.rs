//! Characteristic operating points of a curve group.
//!
//! These are lookups over existing members (no interpolation):
//!
//! - best-efficiency point (BEP): highest efficiency, if any member has one
//! - shutoff: lowest normalized flow
//! - runout: highest normalized flow
//!
//! Ties go to the lowest row id.

use std::cmp::Ordering;

use crate::domain::{CharacteristicPoints, CurveGroup, NormalizedPoint};

/// Locate BEP / shutoff / runout. `None` only for an empty group.
pub fn characteristic_points<'g, 'a>(group: &'g CurveGroup<'a>) -> Option<CharacteristicPoints<'g, 'a>> {
    let members = group.members();

    let shutoff = extremum(members.iter(), |p| p.flow, Ordering::Less)?;
    let runout = extremum(members.iter(), |p| p.flow, Ordering::Greater)?;
    let best_efficiency = extremum(
        members.iter().filter(|p| p.efficiency().is_some()),
        |p| p.efficiency().unwrap_or(f64::NEG_INFINITY),
        Ordering::Greater,
    );

    Some(CharacteristicPoints {
        best_efficiency,
        shutoff,
        runout,
    })
}

/// The member whose `value` compares as `want` against all others; ties by lowest row id.
fn extremum<'g, 'a, I, F>(members: I, value: F, want: Ordering) -> Option<&'g NormalizedPoint<'a>>
where
    I: Iterator<Item = &'g NormalizedPoint<'a>>,
    F: Fn(&NormalizedPoint<'a>) -> f64,
    'a: 'g,
{
    members.fold(None, |best, p| match best {
        None => Some(p),
        Some(b) => {
            let better = match value(p).total_cmp(&value(b)) {
                Ordering::Equal => p.row_id() < b.row_id(),
                ord => ord == want,
            };
            Some(if better { p } else { b })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::group;
    use crate::domain::{RowId, TestPoint};

    fn row(row_id: RowId, eff: Option<f64>) -> TestPoint {
        TestPoint {
            row_id,
            pump: "P1".to_string(),
            stages: Some(1),
            test_type: Some("SP".to_string()),
            speed: Some(1450.0),
            flow: None,
            head: None,
            efficiency: eff,
            power: None,
            impeller_dia: Some("200".to_string()),
            testpoint: None,
            npsh_required: None,
        }
    }

    fn np(source: &TestPoint, flow: f64) -> NormalizedPoint<'_> {
        NormalizedPoint { source, flow, head: 100.0 - flow }
    }

    #[test]
    fn bep_shutoff_runout() {
        let rows = [row(0, Some(70.0)), row(1, Some(80.0)), row(2, Some(65.0))];
        let pts = vec![np(&rows[2], 200.0), np(&rows[0], 100.0), np(&rows[1], 150.0)];
        let groups = group(&pts);
        let cp = characteristic_points(&groups[0]).unwrap();

        assert_eq!(cp.best_efficiency.map(|p| p.flow), Some(150.0));
        assert_eq!(cp.shutoff.flow, 100.0);
        assert_eq!(cp.runout.flow, 200.0);
        // References into the group, carrying the original row.
        assert!(std::ptr::eq(cp.shutoff, &groups[0].members()[0]));
        assert_eq!(cp.runout.source.row_id, 2);
    }

    #[test]
    fn no_efficiency_means_no_bep() {
        let rows = [row(0, None), row(1, Some(f64::NAN)), row(2, None)];
        let pts: Vec<_> = rows.iter().enumerate().map(|(i, r)| np(r, i as f64)).collect();
        let groups = group(&pts);
        let cp = characteristic_points(&groups[0]).unwrap();
        assert!(cp.best_efficiency.is_none());
    }

    #[test]
    fn ties_pick_lowest_row_id() {
        let rows = [row(7, Some(80.0)), row(3, Some(80.0)), row(5, Some(60.0)), row(4, Some(10.0))];
        let pts = vec![np(&rows[0], 50.0), np(&rows[1], 60.0), np(&rows[2], 10.0), np(&rows[3], 60.0)];
        let groups = group(&pts);
        let cp = characteristic_points(&groups[0]).unwrap();

        assert_eq!(cp.best_efficiency.map(|p| p.row_id()), Some(3));
        assert_eq!(cp.shutoff.row_id(), 5);
        assert_eq!(cp.runout.row_id(), 3);
    }

    #[test]
    fn shutoff_and_runout_bound_every_member() {
        let rows: Vec<TestPoint> = (0..15).map(|i| row(i, Some(i as f64))).collect();
        let pts: Vec<_> = rows
            .iter()
            .map(|r| np(r, ((r.row_id * 37) % 11) as f64 * 3.5))
            .collect();
        for g in group(&pts) {
            let cp = characteristic_points(&g).unwrap();
            assert!(g.members().iter().all(|m| cp.shutoff.flow <= m.flow));
            assert!(g.members().iter().all(|m| cp.runout.flow >= m.flow));
        }
    }
}
