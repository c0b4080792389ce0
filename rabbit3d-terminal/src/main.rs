/// Rabbit3D Terminal Viewer - STL model in a free-flying camera
///
/// Controls:
///   - W/S: Forward / back
///   - A/D: Strafe
///   - Space / C or Shift: Up / down
///   - Mouse: Look around
///   - Q/ESC: Quit

use anyhow::Context;
use log::info;
use rabbit3d_core::{stl, Mesh};
use rabbit3d_terminal::{build_scene, config::USAGE, Config, TerminalApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if Config::wants_help(&args) {
        println!("{USAGE}");
        return Ok(());
    }
    let config = Config::from_args(args).context("invalid command line")?;

    let mesh = match &config.stl_path {
        Some(path) => stl::load_stl(path),
        None => Mesh::cube(2.0),
    };
    info!("showing {} facets", mesh.facet_count());

    let scene = build_scene(&config, mesh);

    let mut app = TerminalApp::new(scene, config.frame_time())
        .context("failed to query the terminal")?;
    app.run().context("terminal renderer failed")?;

    Ok(())
}
