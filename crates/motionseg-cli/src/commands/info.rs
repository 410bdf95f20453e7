use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use motionseg_core::io::open_source;

#[derive(Args)]
pub struct InfoArgs {
    /// Video file, SER file, or directory of images
    pub path: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = open_source(&args.path)?;
    let info = source.info();

    println!("Path:        {}", info.path.display());
    println!("Kind:        {}", info.kind);
    println!("Dimensions:  {}x{}", info.width, info.height);
    match info.frame_count {
        Some(n) => println!("Frames:      {n}"),
        None => println!("Frames:      unknown"),
    }
    match info.fps {
        Some(fps) => println!("Frame rate:  {fps:.3} fps"),
        None => println!("Frame rate:  unknown"),
    }
    if let (Some(n), Some(fps)) = (info.frame_count, info.fps) {
        if fps > 0.0 {
            println!("Duration:    {:.2} s", n as f64 / fps);
        }
    }

    Ok(())
}
