use std::{env, path::PathBuf, process};

use dae2buf::collada::{DocumentSummary, ParseOptions, parse_file};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let json = args.iter().any(|arg| arg == "--json");
    let inputs: Vec<&String> = args.iter().filter(|arg| *arg != "--json").collect();
    if inputs.len() != 1 {
        eprintln!("Usage: dae2buf <input.dae> [--json]");
        process::exit(2);
    }

    let input = PathBuf::from(inputs[0]);
    let document = parse_file(&input, ParseOptions::default())?;
    let summary = document.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &DocumentSummary) {
    println!("COLLADA {}", summary.version);
    for geometry in &summary.geometries {
        let status = if geometry.truncated { " (truncated)" } else { "" };
        println!(
            "Geometry {}: {} triangles, {} floats of {} at width {}{}",
            geometry.id,
            geometry.triangle_count,
            geometry.float_count,
            geometry.expected_float_count,
            geometry
                .vertex_width
                .map_or_else(|| "-".to_string(), |width| width.to_string()),
            status
        );
    }
    for skin in &summary.skins {
        let status = if skin.truncated { " (truncated)" } else { "" };
        println!(
            "Skin {} -> {}: {} joints, {} vertices, up to {} influences{}",
            skin.id,
            skin.source_geometry,
            skin.joint_count,
            skin.vertex_count,
            skin.max_joint_influences,
            status
        );
    }
    println!(
        "Materials: {}, Animations: {}, Root nodes: {}, Joints: {}",
        summary.material_count, summary.animation_count, summary.root_node_count, summary.joint_count
    );
}
