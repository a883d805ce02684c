use vlens_media::{check_ffmpeg, check_ffprobe};
use vlens_ml_client::MlClient;
use vlens_pipeline::PipelineConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = PipelineConfig::from_env();

    println!(
        "vlens-selfcheck: starting with base_dir={}",
        config.base_dir.display()
    );
    ensure_layout(&config).await?;
    ensure_tools()?;
    ensure_sidecar().await?;

    println!("vlens-selfcheck: ok");
    Ok(())
}

async fn ensure_layout(config: &PipelineConfig) -> anyhow::Result<()> {
    config
        .layout()
        .prepare()
        .await
        .map_err(|e| anyhow::anyhow!("cannot create output layout: {}", e))
}

fn ensure_tools() -> anyhow::Result<()> {
    let ffmpeg = check_ffmpeg().map_err(|e| anyhow::anyhow!("ffmpeg not available: {}", e))?;
    let ffprobe = check_ffprobe().map_err(|e| anyhow::anyhow!("ffprobe not available: {}", e))?;
    println!(
        "vlens-selfcheck: ffmpeg={} ffprobe={}",
        ffmpeg.display(),
        ffprobe.display()
    );
    Ok(())
}

async fn ensure_sidecar() -> anyhow::Result<()> {
    let client = MlClient::from_env()?;
    if !client.health_check().await? {
        return Err(anyhow::anyhow!(
            "inference sidecar at {} is not healthy",
            client.base_url()
        ));
    }
    Ok(())
}
