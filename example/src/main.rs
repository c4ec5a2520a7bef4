use cloudwatch_handler_metrics::{Action, Builder, EmfClient, HandlerRequest, MetricsLayer};
use serde::{Deserialize, Serialize};
use tower::{Layer, Service, ServiceExt};
use tracing::info;

type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Deserialize)]
struct Request {
    action: Action,
    #[serde(default)]
    fail: bool,
}

impl HandlerRequest for Request {
    fn action(&self) -> Action {
        self.action
    }
}

#[derive(Serialize)]
struct Response {
    status: &'static str,
}

async fn function_handler(request: Request) -> Result<Response, std::io::Error> {
    info!(action = %request.action, "handling request");

    if request.fail {
        return Err(std::io::Error::other("handler failed"));
    }
    Ok(Response { status: "SUCCESS" })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let metrics = Builder::new()
        .resource_type(std::env::var("RESOURCE_TYPE").unwrap_or_else(|_| "Example::Demo::Widget".into()))
        .client(EmfClient::stdout())
        .build()?;

    let payload = std::env::args()
        .nth(1)
        .unwrap_or_else(|| r#"{"action":"CREATE"}"#.into());
    let request: Request = serde_json::from_str(&payload)?;

    let mut service = MetricsLayer::new(metrics).layer(tower::service_fn(function_handler));
    match service.ready().await?.call(request).await {
        Ok(response) => info!("response {}", serde_json::to_string(&response)?),
        Err(err) => info!("handler returned {err}"),
    }

    Ok(())
}
