//! Headless demo client: connects to the realtime endpoint and traces
//! every drawing operation instead of rendering.

use clap::Parser;
use tracing::info;

use floorview::{DrawSurface, Floorview, LabelHandle, RecordId, VizConfig, VizError};

#[derive(Debug, Parser)]
#[command(name = "floorview", version, about = "Realtime tracking visualization client")]
struct Args {
    /// Authentication token for the realtime endpoint
    #[arg(long)]
    token: String,

    /// Location id to subscribe to (repeatable)
    #[arg(long = "location", required = true)]
    locations: Vec<i64>,

    /// Stream endpoint URL
    #[arg(long, default_value = floorview::config::DEFAULT_URL)]
    url: String,

    /// Minimum coordinate extent in centimeters
    #[arg(long, default_value_t = -4500.0)]
    domain_min: f64,

    /// Maximum coordinate extent in centimeters
    #[arg(long, default_value_t = 4500.0)]
    domain_max: f64,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 500.0)]
    width: f64,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 500.0)]
    height: f64,
}

/// Surface that logs draw calls, standing in for a real canvas.
struct TraceSurface;

impl DrawSurface for TraceSurface {
    fn upsert_marker(&mut self, id: RecordId, x: f64, y: f64, radius: f64, color: &str) {
        info!(%id, x, y, radius, color, "marker");
    }

    fn remove_marker(&mut self, id: RecordId) {
        info!(%id, "marker removed");
    }

    fn upsert_label(&mut self, id: LabelHandle, x: f64, y: f64, text: &str) {
        info!(%id, x, y, text, "label");
    }

    fn remove_label(&mut self, id: LabelHandle) {
        info!(%id, "label removed");
    }

    fn grid_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        info!(x1, y1, x2, y2, "grid line");
    }
}

#[tokio::main]
async fn main() -> Result<(), VizError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = VizConfig::builder()
        .url(args.url)
        .token(args.token)
        .locations(args.locations)
        .domain(args.domain_min, args.domain_max)
        .canvas(args.width, args.height)
        .build();

    let (session, rx) = floorview::transport::connect(&config).await?;
    let mut viz = Floorview::new(&config, TraceSurface);
    viz.run(rx).await;
    session.shutdown();
    Ok(())
}
