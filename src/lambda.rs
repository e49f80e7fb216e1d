use image_scaler::config;
use image_scaler::fetch::HttpFetcher;
use image_scaler::imaging::RustBackend;
use image_scaler::logging;
use image_scaler::service::Scaler;
use image_scaler::shell::lambda::{LambdaRequest, LambdaResponse, handle_event};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};

type LambdaScaler = Scaler<HttpFetcher, RustBackend>;

async fn function_handler(
    scaler: &LambdaScaler,
    event: LambdaEvent<LambdaRequest>,
) -> Result<LambdaResponse, Error> {
    Ok(handle_event(scaler, event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Environment only; there is no config file in the function package.
    let config = config::load_config(None)?;
    logging::init_lambda_logger(config.verbose);

    let fetcher = HttpFetcher::new(&config)?;
    let scaler = LambdaScaler::new(config, fetcher, RustBackend::new());
    let scaler = &scaler;

    tracing::info!("Image scaler Lambda starting");
    run(service_fn(move |event: LambdaEvent<LambdaRequest>| async move {
        function_handler(scaler, event).await
    }))
    .await
}
