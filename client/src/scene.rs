//! Pure frame planning: one snapshot plus the current canvas dimensions in,
//! one ordered draw list out. Painting the list is `canvas`'s job; keeping
//! the planning side pure lets the draw-order contract be tested natively.

use hexfront_shared::{Snapshot, SnapshotError, Terrain};

use crate::colors;
use crate::layout::HexLayout;

pub const BASE_RADIUS_FACTOR: f64 = 0.6;
pub const UNIT_RADIUS_FACTOR: f64 = 0.35;
/// Units never shrink below a visible dot, however small the hexes get.
pub const UNIT_RADIUS_MIN: f64 = 3.0;

/// Canvas pixel dimensions for one frame. The derived hex size is recomputed
/// from this on every build, never carried across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// One canvas operation. Plan order is the draw order, and the draw order is
/// the occlusion contract: terrain first, then bases, then units in snapshot
/// order, with later entries painting over earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        width: f64,
        height: f64,
    },
    /// Terrain fill plus the dashed thin outline stroked over it.
    TerrainHex {
        cx: f64,
        cy: f64,
        fill: &'static str,
    },
    BaseDisc {
        cx: f64,
        cy: f64,
        radius: f64,
        fill: &'static str,
    },
    UnitDisc {
        cx: f64,
        cy: f64,
        radius: f64,
        fill: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub layout: HexLayout,
    pub ops: Vec<DrawOp>,
}

/// Validate the snapshot and lay out the full frame. Same snapshot and
/// viewport always produce an identical plan, which is what makes repeated
/// rendering pixel-identical.
pub fn build(snapshot: &Snapshot, viewport: Viewport) -> Result<FramePlan, SnapshotError> {
    snapshot.validate()?;

    let map = &snapshot.map;
    let layout = HexLayout::fit(viewport.width, viewport.height, map.width, map.height);

    let mut ops = Vec::with_capacity(3 + map.grid.len() * map.width as usize + snapshot.units.len());
    ops.push(DrawOp::Clear {
        width: viewport.width,
        height: viewport.height,
    });

    for (y, row) in map.grid.iter().enumerate() {
        for (x, &code) in row.iter().enumerate() {
            let (cx, cy) = layout.center(x as f64, y as f64);
            ops.push(DrawOp::TerrainHex {
                cx,
                cy,
                fill: colors::terrain_fill(Terrain::from_code(code)),
            });
        }
    }

    let base_radius = layout.size * BASE_RADIUS_FACTOR;
    for (index, base) in snapshot.bases.iter().enumerate() {
        let (cx, cy) = layout.center(base.x as f64, base.y as f64);
        let fill = if index == 0 {
            colors::BASE_A
        } else {
            colors::BASE_B
        };
        ops.push(DrawOp::BaseDisc {
            cx,
            cy,
            radius: base_radius,
            fill,
        });
    }

    let unit_radius = (layout.size * UNIT_RADIUS_FACTOR).max(UNIT_RADIUS_MIN);
    for unit in &snapshot.units {
        let (cx, cy) = layout.center(unit.x, unit.y);
        ops.push(DrawOp::UnitDisc {
            cx,
            cy,
            radius: unit_radius,
            fill: colors::unit_fill(unit.team),
        });
    }

    Ok(FramePlan { layout, ops })
}

#[cfg(test)]
mod tests {
    use super::{BASE_RADIUS_FACTOR, DrawOp, UNIT_RADIUS_MIN, Viewport, build};
    use crate::colors;
    use hexfront_shared::{Base, MapGrid, Snapshot, SnapshotError, Team, Unit};

    fn snapshot(width: u32, height: u32, rows: Vec<Vec<char>>) -> Snapshot {
        Snapshot {
            tick: 5,
            map: MapGrid {
                width,
                height,
                grid: rows,
            },
            bases: [Base { x: 0, y: 0, hp: 10 }, Base { x: 1, y: 0, hp: 8 }],
            units: Vec::new(),
        }
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 400.0,
            height: 300.0,
        }
    }

    fn terrain_centers(plan: &super::FramePlan) -> Vec<(f64, f64)> {
        plan.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::TerrainHex { cx, cy, .. } => Some((*cx, *cy)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plans_one_terrain_hex_per_cell_in_row_major_order() {
        let snap = snapshot(
            3,
            2,
            vec![vec!['.', '.', '.'], vec!['~', '#', '.']],
        );
        let plan = build(&snap, viewport()).unwrap();
        let centers = terrain_centers(&plan);
        assert_eq!(centers.len(), 6);
        let expected: Vec<(f64, f64)> = (0..2)
            .flat_map(|y| (0..3).map(move |x| (x, y)))
            .map(|(x, y)| plan.layout.center(x as f64, y as f64))
            .collect();
        assert_eq!(centers, expected);
    }

    #[test]
    fn two_cell_map_draws_terrain_then_bases_and_no_units() {
        // 2x1 map on a 400x300 canvas: two terrain hexes, both base discs at
        // their hex centers, zero unit discs.
        let snap = snapshot(2, 1, vec![vec!['.', '#']]);
        let plan = build(&snap, viewport()).unwrap();

        assert_eq!(
            plan.ops[0],
            DrawOp::Clear {
                width: 400.0,
                height: 300.0
            }
        );
        let (cx0, cy0) = plan.layout.center(0.0, 0.0);
        let (cx1, cy1) = plan.layout.center(1.0, 0.0);
        assert_eq!(
            plan.ops[1],
            DrawOp::TerrainHex {
                cx: cx0,
                cy: cy0,
                fill: colors::TERRAIN_OPEN
            }
        );
        assert_eq!(
            plan.ops[2],
            DrawOp::TerrainHex {
                cx: cx1,
                cy: cy1,
                fill: colors::TERRAIN_WALL
            }
        );
        assert_eq!(
            plan.ops[3],
            DrawOp::BaseDisc {
                cx: cx0,
                cy: cy0,
                radius: plan.layout.size * BASE_RADIUS_FACTOR,
                fill: colors::BASE_A
            }
        );
        assert_eq!(
            plan.ops[4],
            DrawOp::BaseDisc {
                cx: cx1,
                cy: cy1,
                radius: plan.layout.size * BASE_RADIUS_FACTOR,
                fill: colors::BASE_B
            }
        );
        assert_eq!(plan.ops.len(), 5);
    }

    #[test]
    fn co_located_units_keep_snapshot_order() {
        let mut snap = snapshot(2, 1, vec![vec!['.', '.']]);
        snap.units = vec![
            Unit {
                x: 0.5,
                y: 0.0,
                team: Team::A,
            },
            Unit {
                x: 0.5,
                y: 0.0,
                team: Team::B,
            },
        ];
        let plan = build(&snap, viewport()).unwrap();
        let fills: Vec<&str> = plan
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::UnitDisc { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        // The B unit comes later in the plan, so it paints over the A unit.
        assert_eq!(fills, vec![colors::UNIT_A, colors::UNIT_B]);
    }

    #[test]
    fn unit_radius_never_drops_below_minimum() {
        let mut snap = snapshot(50, 1, vec![vec!['.'; 50]]);
        snap.units = vec![Unit {
            x: 0.0,
            y: 0.0,
            team: Team::A,
        }];
        let plan = build(
            &snap,
            Viewport {
                width: 60.0,
                height: 60.0,
            },
        )
        .unwrap();
        let radius = plan
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::UnitDisc { radius, .. } => Some(*radius),
                _ => None,
            })
            .unwrap();
        assert_eq!(radius, UNIT_RADIUS_MIN);
    }

    #[test]
    fn unknown_terrain_plans_background_fill_not_an_error() {
        let snap = snapshot(2, 1, vec![vec!['X', '.']]);
        let plan = build(&snap, viewport()).unwrap();
        assert_eq!(
            plan.ops[1],
            DrawOp::TerrainHex {
                cx: plan.layout.center(0.0, 0.0).0,
                cy: plan.layout.center(0.0, 0.0).1,
                fill: colors::BACKGROUND
            }
        );
    }

    #[test]
    fn identical_inputs_build_identical_plans() {
        let mut snap = snapshot(4, 3, vec![vec!['.'; 4], vec!['#'; 4], vec!['~'; 4]]);
        snap.units = vec![Unit {
            x: 1.25,
            y: 2.0,
            team: Team::B,
        }];
        assert_eq!(
            build(&snap, viewport()).unwrap(),
            build(&snap, viewport()).unwrap()
        );
    }

    #[test]
    fn malformed_grid_fails_the_frame() {
        let snap = snapshot(2, 1, vec![vec!['.']]);
        assert_eq!(
            build(&snap, viewport()),
            Err(SnapshotError::RowWidth {
                row: 0,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn degenerate_viewport_still_plans() {
        let snap = snapshot(2, 1, vec![vec!['.', '#']]);
        let plan = build(
            &snap,
            Viewport {
                width: 1.0,
                height: 1.0,
            },
        )
        .unwrap();
        assert!(plan.layout.size.is_finite());
        assert_eq!(terrain_centers(&plan).len(), 2);
    }
}
