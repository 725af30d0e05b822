//! One-shot collection fetch command.

use std::time::Instant;

use clap::Args;
use tracing::info;
use url::Url;

use ogcfeat::{
    CollectingStore, Extent, FeatureSource, GeoJsonDecoder, LoadOutcome, ReqwestClient,
    SourceConfig, StrategyOverride,
};

use crate::error::CliError;

/// Arguments for `ogcfeat fetch`.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Landing-page URL of the OGC API Features service
    pub url: Url,

    /// Collection identifier
    pub collection: String,

    /// Bounding box as min-x,min-y,max-x,max-y (default: the whole world in CRS84)
    #[arg(long, default_value = "-180,-90,180,90")]
    pub bbox: String,

    /// Map CRS the bbox is expressed in
    #[arg(long, default_value = "EPSG:4326")]
    pub crs: String,

    /// Request CRS override, bypassing negotiation
    #[arg(long)]
    pub crs_override: Option<String>,

    /// Features per page request
    #[arg(long, default_value_t = ogcfeat::config::DEFAULT_PAGE_SIZE)]
    pub page_size: u64,

    /// Maximum simultaneous page requests (offset strategy)
    #[arg(long, default_value_t = ogcfeat::config::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Pagination strategy: auto, next or offset
    #[arg(long, default_value = "auto")]
    pub strategy: StrategyOverride,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

/// Parse a `min-x,min-y,max-x,max-y` bbox argument.
fn parse_bbox(raw: &str) -> Result<Extent, CliError> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse())
        .collect::<Result<_, _>>()
        .map_err(|_| CliError::InvalidArgument(format!("bbox '{}' is not numeric", raw)))?;

    if parts.len() != 4 {
        return Err(CliError::InvalidArgument(format!(
            "bbox '{}' must have exactly 4 coordinates",
            raw
        )));
    }
    Ok(Extent::new(parts[0], parts[1], parts[2], parts[3]))
}

/// Run the fetch command.
pub async fn run(args: FetchArgs) -> Result<(), CliError> {
    let extent = parse_bbox(&args.bbox)?;

    let mut config = SourceConfig::new(args.url, args.collection.clone());
    config.crs_override = args.crs_override;
    config.page_size = args.page_size;
    config.concurrency = args.concurrency;
    config.strategy = args.strategy;

    let client = ReqwestClient::with_timeout(args.timeout)?;
    let source = FeatureSource::new(config, client, GeoJsonDecoder)?;

    info!(collection = %args.collection, strategy = %args.strategy, "starting fetch");
    let started = Instant::now();

    let store = CollectingStore::new();
    let outcome = source.load(extent, &args.crs, &store).await;
    let elapsed = started.elapsed();

    match outcome {
        LoadOutcome::Succeeded => {
            let metadata = source.collection_metadata().await?;
            println!("Collection: {}", metadata.id);
            if let Some(attribution) = &metadata.attribution {
                println!("Attribution: {}", attribution);
            }
            println!("Features: {}", store.feature_count());
            println!("Elapsed: {:.2?}", elapsed);
            Ok(())
        }
        LoadOutcome::Failed => Err(CliError::Incomplete("load failed, see log".to_string())),
        LoadOutcome::Cancelled => Err(CliError::Incomplete("load was cancelled".to_string())),
    }
}
