//! Segment a synthetic volume of spheres and write a JSON report.
//!
//! Usage: `cargo run --example segment_blobs [config.json]`

use bintools::core::{GridView, LogLevel, Stage};
use bintools::io::{run_to_report, BinarizeConfig};
use std::env;
use std::error::Error;

const EXTENTS: [usize; 3] = [32, 48, 48];

/// Bright spheres on a dim ramp background.
fn synthetic_volume() -> Vec<f32> {
    let centers = [([8.0, 12.0, 12.0], 5.0), ([20.0, 30.0, 28.0], 7.5), ([10.0, 36.0, 8.0], 2.5)];
    let [d, h, w] = EXTENTS;
    let mut data = Vec::with_capacity(d * h * w);
    for z in 0..d {
        for y in 0..h {
            for x in 0..w {
                let p = [z as f32, y as f32, x as f32];
                let inside = centers.iter().any(|(c, r)| {
                    let d2: f32 = p.iter().zip(c).map(|(a, b)| (a - b) * (a - b)).sum();
                    d2 <= r * r
                });
                let ramp = 0.1 * x as f32 / w as f32;
                data.push(if inside { 0.8 + ramp } else { ramp });
            }
        }
    }
    data
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = match env::args().nth(1) {
        Some(path) => BinarizeConfig::load_json(path)?,
        None => {
            let mut config = BinarizeConfig::default();
            config.log = config.log.with_stage(Stage::Label, LogLevel::Debug);
            config
        }
    };

    #[cfg(feature = "tracing")]
    bintools::core::init_tracing(&config.log, false);
    #[cfg(not(feature = "tracing"))]
    bintools::core::init_logging(&config.log)?;

    let data = synthetic_volume();
    let grid = GridView::from_slice(&EXTENTS, &data)?;
    let report = run_to_report(&config, &grid);
    for c in &report.components {
        println!(
            "label {:>3}: {:>5} voxels, centroid {:?}",
            c.label, c.count, c.centroid
        );
    }

    let output_path = config.output_path();
    report.write_json(&output_path)?;
    println!("wrote report to {}", output_path.display());
    Ok(())
}
