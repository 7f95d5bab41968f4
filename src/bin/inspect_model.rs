use anyhow::Result;
use coord_eval::config::EvalConfig;
use coord_eval::engine::Engine;
use coord_eval::inference::open_engine;
use coord_eval::types::Backend;
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let model_path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or(EvalConfig::MODEL_PATH);
    println!("Inspecting model: {}", model_path);

    let engine = open_engine(Path::new(model_path), Backend::Auto)?;
    let signature = engine.signature();
    println!("Backend: {}", engine.name());
    println!("Tensors: {}", signature.tensors);

    println!("\n--- Inputs ---");
    for (i, input) in signature.inputs.iter().enumerate() {
        println!("#{}: Name: {} (index {})", i, input.name, input.index);
        println!("    Shape: {:?} ({} values)", input.shape, input.volume());
    }

    println!("\n--- Outputs ---");
    for (i, output) in signature.outputs.iter().enumerate() {
        println!("#{}: Name: {} (index {})", i, output.name, output.index);
        println!("    Shape: {:?} ({} values)", output.shape, output.volume());
    }

    Ok(())
}
