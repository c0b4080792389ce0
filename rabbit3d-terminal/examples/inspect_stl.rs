/// Example: Report what the viewer would make of an STL file, without a terminal
///
/// Usage: cargo run --example inspect_stl -- path/to/file.stl [W H D]

use anyhow::{bail, Context};
use rabbit3d_core::{stl, Scene};
use rabbit3d_terminal::fitted_extent;
use std::env;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("Usage: {} <stl-file> [W H D]", args[0]);
    }

    let document = stl::read_stl_document(&args[1])?;
    println!("Solid:      '{}'", document.name);
    println!("Facets:     {}", document.facets.len());
    println!("Discarded:  {}", document.discarded);

    let mesh = document.into_mesh();
    println!(
        "Buffers:    {} B positions, {} B normals, {} B indices",
        mesh.positions_size_bytes(),
        mesh.normals_size_bytes(),
        mesh.indices_size_bytes()
    );

    match mesh.bounding_box() {
        Some(bounds) => {
            let size = bounds.size();
            let center = bounds.center();
            println!("Size:       {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
            println!("Center:     ({:.3}, {:.3}, {:.3})", center.x, center.y, center.z);
        }
        None => println!("Size:       (empty mesh)"),
    }

    let extent = match &args[2..] {
        [w, h, d] => (
            w.parse::<f32>().context("invalid width")?,
            h.parse::<f32>().context("invalid height")?,
            d.parse::<f32>().context("invalid depth")?,
        ),
        [] => fitted_extent(&mesh),
        _ => bail!("expected three extent values"),
    };
    let scene = Scene::with_extent(extent.0, extent.1, extent.2);
    println!(
        "Scale:      {} for a {} x {} x {} world",
        scene.scale_factor(),
        extent.0,
        extent.1,
        extent.2
    );
    if let Some(bounds) = mesh.bounding_box() {
        println!(
            "On screen:  largest side {:.3} world units",
            bounds.largest_dimension() * scene.scale_factor()
        );
    }

    Ok(())
}
