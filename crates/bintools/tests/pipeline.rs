use approx::assert_relative_eq;
use bintools::core::{Label, LogConfig, LogLevel, Shape, Stage};
use bintools::io::{run_to_report, BinarizeConfig, BinarizeReport};
use bintools::label::{label, LabelError, Labeler};
use bintools::threshold::{Direction, ThresholdMethod};
use bintools::{
    BinarizeError, BinarizeParams, Binarizer, CancelFlag, Connectivity, GridView, LabelField, Mask,
    ThresholdSpec,
};
use std::collections::VecDeque;

fn fixed(value: f64) -> BinarizeParams {
    BinarizeParams {
        threshold: ThresholdSpec::Fixed { value },
        ..BinarizeParams::default()
    }
}

fn run_row(rows: &[&str], params: BinarizeParams) -> bintools::BinarizeResult {
    let cols = rows[0].len();
    let data: Vec<u8> = rows
        .iter()
        .flat_map(|r| r.bytes().map(|b| u8::from(b == b'#')))
        .collect();
    let grid = GridView::from_slice(&[rows.len(), cols], &data).expect("grid");
    Binarizer::new(params).run(&grid).expect("run")
}

/// Linear congruential bit source; deterministic across platforms.
struct Lcg(u64);

impl Lcg {
    fn next_bool(&mut self, density: f64) -> bool {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 11) as f64 / (1u64 << 53) as f64) < density
    }
}

fn random_mask(extents: &[usize], seed: u64, density: f64) -> Mask {
    let shape = Shape::new(extents).expect("shape");
    let mut rng = Lcg(seed);
    let data = (0..shape.len()).map(|_| rng.next_bool(density)).collect();
    Mask::new(shape, data).expect("mask")
}

/// Breadth-first flood fill, numbering components by their first cell in
/// raster order.
fn reference_labels(mask: &Mask, connectivity: Connectivity) -> Vec<Label> {
    let dims = mask.shape().volume_dims();
    let max_axes = match connectivity.neighbors() {
        4 | 6 => 1,
        8 | 18 => 2,
        _ => 3,
    };
    let at = |o: usize| [o / (dims[1] * dims[2]), (o / dims[2]) % dims[1], o % dims[2]];
    let fg = mask.as_slice();
    let mut out = vec![0 as Label; fg.len()];
    let mut next = 0;
    for start in 0..fg.len() {
        if !fg[start] || out[start] != 0 {
            continue;
        }
        next += 1;
        out[start] = next;
        let mut queue = VecDeque::from([start]);
        while let Some(o) = queue.pop_front() {
            let c = at(o);
            for dz in -1isize..=1 {
                for dy in -1isize..=1 {
                    for dx in -1isize..=1 {
                        let d = [dz, dy, dx];
                        let moved = d.iter().filter(|&&v| v != 0).count();
                        if moved == 0 || moved > max_axes {
                            continue;
                        }
                        let mut n = [0usize; 3];
                        let mut inside = true;
                        for a in 0..3 {
                            match c[a].checked_add_signed(d[a]) {
                                Some(v) if v < dims[a] => n[a] = v,
                                _ => inside = false,
                            }
                        }
                        if !inside {
                            continue;
                        }
                        let no = (n[0] * dims[1] + n[1]) * dims[2] + n[2];
                        if fg[no] && out[no] == 0 {
                            out[no] = next;
                            queue.push_back(no);
                        }
                    }
                }
            }
        }
    }
    out
}

#[test]
fn horizontal_run_in_five_by_five() {
    let res = run_row(
        &[".....", ".....", ".###.", ".....", "....."],
        BinarizeParams::default(),
    );
    assert!(!res.degenerate);
    assert!(res.threshold > 0.0 && res.threshold <= 1.0);
    assert_eq!(res.components.len(), 1);
    let rec = &res.components[0];
    assert_eq!(rec.label, 1);
    assert_eq!(rec.count, 3);
    assert_eq!(rec.bbox.min, vec![2, 1]);
    assert_eq!(rec.bbox.max, vec![2, 3]);
    assert_relative_eq!(rec.centroid[0], 2.0);
    assert_relative_eq!(rec.centroid[1], 2.0);
}

#[test]
fn min_component_size_four_clears_the_run() {
    let params = BinarizeParams {
        min_component_size: 4,
        ..fixed(1.0)
    };
    let res = run_row(&[".....", ".....", ".###.", ".....", "....."], params);
    assert!(res.labels.as_slice().iter().all(|&l| l == 0));
    assert!(res.components.is_empty());
}

#[test]
fn diagonal_line_depends_on_connectivity() {
    let rows = ["#..", ".#.", "..#"];
    let four = run_row(
        &rows,
        BinarizeParams {
            connectivity: Some(Connectivity::Four),
            ..fixed(1.0)
        },
    );
    assert_eq!(four.components.len(), 3);
    let eight = run_row(
        &rows,
        BinarizeParams {
            connectivity: Some(Connectivity::Eight),
            ..fixed(1.0)
        },
    );
    assert_eq!(eight.components.len(), 1);
    assert_eq!(eight.components[0].count, 3);
}

#[test]
fn repeated_runs_are_identical() {
    let mask = random_mask(&[40, 40], 7, 0.45);
    let data: Vec<f32> = mask.as_slice().iter().map(|&b| f32::from(u8::from(b))).collect();
    let grid = GridView::from_slice(&[40, 40], &data).expect("grid");
    let binarizer = Binarizer::default();
    let a = binarizer.run(&grid).expect("first");
    let b = binarizer.run(&grid).expect("second");
    assert_eq!(a, b);
}

#[test]
fn foreground_and_labels_cover_each_other() {
    let mask = random_mask(&[6, 20, 20], 11, 0.3);
    let data: Vec<u16> = mask
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, &b)| if b { 1000 + (i % 50) as u16 } else { (i % 40) as u16 })
        .collect();
    let grid = GridView::from_slice(&[6, 20, 20], &data).expect("grid");
    let res = Binarizer::new(fixed(500.0)).run(&grid).expect("run");
    for (&fg, &l) in mask.as_slice().iter().zip(res.labels.as_slice()) {
        assert_eq!(fg, l != 0);
    }
    let total: usize = res.components.iter().map(|c| c.count).sum();
    assert_eq!(total, mask.count());
}

#[test]
fn labeling_matches_flood_fill_reference() {
    let cases = [
        (vec![31, 29], Connectivity::Four),
        (vec![31, 29], Connectivity::Eight),
        (vec![7, 13, 11], Connectivity::Six),
        (vec![7, 13, 11], Connectivity::Eighteen),
        (vec![7, 13, 11], Connectivity::TwentySix),
    ];
    for (seed, (extents, conn)) in cases.into_iter().enumerate() {
        for density in [0.2, 0.5, 0.7] {
            let mask = random_mask(&extents, seed as u64 * 31 + 5, density);
            let got = label(&mask, conn).expect("label");
            assert_eq!(
                got.as_slice(),
                reference_labels(&mask, conn).as_slice(),
                "{conn:?} on {extents:?} at density {density}"
            );
        }
    }
}

#[test]
fn tiled_labeling_equals_single_pass() {
    for (extents, conn) in [
        (vec![53, 37], Connectivity::Eight),
        (vec![17, 9, 12], Connectivity::TwentySix),
        (vec![17, 9, 12], Connectivity::Six),
    ] {
        let mask = random_mask(&extents, 99, 0.55);
        let single = Labeler::new(conn).label(&mask).expect("single");
        for tiles in [2, 3, 7, 64] {
            let tiled = Labeler::new(conn)
                .with_tiles(tiles)
                .label(&mask)
                .expect("tiled");
            assert_eq!(tiled, single, "{tiles} tiles on {extents:?}");
        }
    }
}

#[test]
fn zero_min_size_keeps_every_component() {
    let mask = random_mask(&[25, 25], 3, 0.4);
    let data: Vec<u8> = mask.as_slice().iter().map(|&b| u8::from(b)).collect();
    let grid = GridView::from_slice(&[25, 25], &data).expect("grid");
    let plain = label(&mask, Connectivity::Four).expect("label");
    for min in [0, 1] {
        let params = BinarizeParams {
            min_component_size: min,
            ..fixed(1.0)
        };
        assert_eq!(Binarizer::new(params).run(&grid).expect("run").labels, plain);
    }
}

#[test]
fn background_only_grid_has_empty_summary() {
    let data = [0i32; 12];
    let grid = GridView::from_slice(&[3, 4], &data).expect("grid");
    let res = Binarizer::new(fixed(1.0)).run(&grid).expect("run");
    assert!(res.components.is_empty());
    assert_eq!(res.labels, LabelField::zeros(grid.shape()));
}

#[test]
fn constant_grid_falls_back_to_single_phase() {
    let _ = env_logger::builder().is_test(true).try_init();
    let data = [5.0f64; 12];
    let grid = GridView::from_slice(&[2, 2, 3], &data).expect("grid");
    let res = Binarizer::default().run(&grid).expect("run");
    assert!(res.degenerate);
    assert_relative_eq!(res.threshold, 5.0);
    assert_eq!(res.components.len(), 1);
    assert_eq!(res.components[0].count, 12);
}

#[test]
fn cancelled_run_returns_no_labels() {
    let data = [1u8; 64];
    let grid = GridView::from_slice(&[8, 8], &data).expect("grid");
    let flag = CancelFlag::new();
    flag.cancel();
    let res = Binarizer::new(fixed(1.0))
        .with_cancel(flag)
        .run(&grid);
    assert_eq!(res, Err(BinarizeError::Label(LabelError::Cancelled)));
}

#[test]
fn less_equal_direction_selects_dark_cells() {
    let data = [10u8, 200, 200, 10, 10, 200];
    let grid = GridView::from_slice(&[2, 3], &data).expect("grid");
    let params = BinarizeParams {
        direction: Direction::LessEqual,
        threshold: ThresholdSpec::Auto {
            method: ThresholdMethod::Otsu { bins: 64 },
        },
        ..BinarizeParams::default()
    };
    let res = Binarizer::new(params).run(&grid).expect("run");
    assert_eq!(res.labels.as_slice(), &[1, 0, 0, 1, 1, 0]);
    assert_eq!(res.components[0].count, 3);
}

#[test]
fn cleanup_fills_ring_and_relabels() {
    let params = BinarizeParams {
        min_component_size: 2,
        fill_holes: true,
        relabel: true,
        intensity_stats: true,
        ..fixed(1.0)
    };
    let res = run_row(&["#......", "..###..", "..#.#..", "..###.."], params);
    assert_eq!(res.components.len(), 1);
    let ring = &res.components[0];
    assert_eq!(ring.label, 1);
    assert_eq!(ring.count, 9);
    assert_relative_eq!(ring.centroid[0], 2.0);
    assert_relative_eq!(ring.centroid[1], 3.0);
    let stats = res.intensity.expect("intensity");
    assert_eq!(stats.len(), 1);
    assert_relative_eq!(stats[0].min, 0.0);
    assert_relative_eq!(stats[0].max, 1.0);
    assert_relative_eq!(stats[0].mean, 8.0 / 9.0);
}

#[test]
fn config_and_report_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = BinarizeConfig {
        params: BinarizeParams {
            connectivity: Some(Connectivity::Eight),
            min_component_size: 2,
            tiles: 4,
            intensity_stats: true,
            ..BinarizeParams::default()
        },
        output_path: Some(dir.path().join("report.json").display().to_string()),
        log: LogConfig::new(LogLevel::Warn).with_stage(Stage::Morph, LogLevel::Debug),
    };
    let config_path = dir.path().join("config.json");
    config.write_json(&config_path).expect("write config");
    let loaded = BinarizeConfig::load_json(&config_path).expect("load config");
    assert_eq!(loaded, config);

    let data = [9u8, 9, 0, 0, 0, 0, 0, 9, 9];
    let grid = GridView::from_slice(&[3, 3], &data).expect("grid");
    let report = run_to_report(&loaded, &grid);
    assert!(report.error.is_none());
    assert_eq!(report.num_components, 2);
    report.write_json(loaded.output_path()).expect("write report");
    let back = BinarizeReport::load_json(loaded.output_path()).expect("load report");
    assert_eq!(back, report);
}

#[test]
fn failed_run_is_recorded_in_report() {
    let data: [f32; 4] = [f32::NAN; 4];
    let grid = GridView::from_slice(&[2, 2], &data).expect("grid");
    let report = run_to_report(&BinarizeConfig::default(), &grid);
    assert!(report.threshold.is_none());
    assert!(report.error.is_some());
}

#[test]
fn log_levels_come_from_the_config() {
    let config: BinarizeConfig = serde_json::from_str(
        r#"{"log": {"level": "warn", "stages": {"label": "trace", "report": "off"}}}"#,
    )
    .expect("config");
    assert_eq!(config.params, BinarizeParams::default());
    assert_eq!(config.log.level_for("bintools_label::labeler"), LogLevel::Trace);
    assert_eq!(config.log.level_for("bintools_report::summary"), LogLevel::Off);
    assert_eq!(config.log.level_for("bintools::pipeline"), LogLevel::Warn);
    assert_eq!(
        config.log.directives(),
        "warn,bintools_label=trace,bintools_report=off"
    );

    let bare: BinarizeConfig = serde_json::from_str("{}").expect("bare");
    assert_eq!(bare.log, LogConfig::default());
}
