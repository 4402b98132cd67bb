use std::process::Command;

use rallycut_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WorkerConfig::from_env()?;

    println!(
        "worker-selfcheck: starting with samples_per_second={} randomness={:?}",
        config.segmentation.samples_per_second, config.segmentation.randomness
    );
    ensure_tool("ffmpeg")?;
    ensure_tool("ffprobe")?;

    // Optionally confirm a sample video can be read
    if let Some(video) = std::env::args().nth(1) {
        let info = rallycut_media::probe_video(&video).await?;
        println!(
            "worker-selfcheck: read {} ({}x{}, {:.2} fps, {} frames, {:.1}s)",
            video, info.width, info.height, info.fps, info.frame_count, info.duration
        );
    }

    println!("worker-selfcheck: ok");
    Ok(())
}

fn ensure_tool(name: &str) -> anyhow::Result<()> {
    let output = Command::new(name)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} not available: {}", name, e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "{} -version failed: {:?}",
            name,
            output.status
        ));
    }
    Ok(())
}
