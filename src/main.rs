#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod accelerators;
mod core;
mod mesh;
mod radiosity;
mod scenes;

use crate::accelerators::Bvh;
use crate::core::app::{options, Options};
use crate::core::color::Color;
use crate::core::common::clamp;
use crate::radiosity::HierarchicalRadiosity;
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() {
    env_logger::init();

    if let Err(e) = run(options()) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(opts: &Options) -> Result<(), String> {
    let tree = Bvh::new(scenes::cornell_box());

    let mut solver = HierarchicalRadiosity::new(
        &tree,
        opts.f_eps,
        opts.a_eps,
        opts.bf_eps,
        opts.max_iterations,
    );
    solver.compute();

    if !opts.quiet {
        println!(
            "solved {} root triangles in {} passes: {} leaves, {} links, {} mesh faces",
            tree.num_triangles(),
            solver.passes(),
            solver.num_leaves(),
            solver.num_links(),
            solver.mesh().num_faces()
        );
    }

    if let Some(path) = &opts.outfile {
        write_ply(path, &solver).map_err(|e| format!("cannot write '{path}': {e}"))?;
        if !opts.quiet {
            println!("wrote {path}");
        }
    }

    Ok(())
}

/// Writes the refined leaf mesh as an ASCII PLY file with per-vertex
/// radiosity colors.
///
/// * `path`   - Output file path.
/// * `solver` - The solved system.
fn write_ply(path: &str, solver: &HierarchicalRadiosity) -> std::io::Result<()> {
    let rad: Vec<Color> = solver.radiosity().collect();
    let colors = solver.radiosity_at_vertices(&rad);
    let triangles: Vec<_> = solver.triangles().collect();

    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "element vertex {}", triangles.len() * 3)?;
    writeln!(out, "property float x")?;
    writeln!(out, "property float y")?;
    writeln!(out, "property float z")?;
    writeln!(out, "property uchar red")?;
    writeln!(out, "property uchar green")?;
    writeln!(out, "property uchar blue")?;
    writeln!(out, "element face {}", triangles.len())?;
    writeln!(out, "property list uchar int vertex_indices")?;
    writeln!(out, "end_header")?;

    let to_byte = |v: f32| (clamp(v, 0.0, 1.0) * 255.0).round() as u8;
    for (tri, color) in triangles.iter().zip(colors.chunks(3)) {
        for (p, c) in [tri.p0, tri.p1, tri.p2].into_iter().zip(color) {
            writeln!(
                out,
                "{} {} {} {} {} {}",
                p.x,
                p.y,
                p.z,
                to_byte(c.r),
                to_byte(c.g),
                to_byte(c.b)
            )?;
        }
    }
    for i in 0..triangles.len() {
        writeln!(out, "3 {} {} {}", 3 * i, 3 * i + 1, 3 * i + 2)?;
    }

    out.flush()
}
