use apigw_event::{LambdaContext, ProxyRequestEvent};
use apigw_shim::{BoxError, EventBody, Fallback, HeaderShape, ResponseBody, Shim, drain, make_handler};
use http::{Request, Response, StatusCode, header};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

async fn hello(req: Request<EventBody>, fallback: Fallback) -> Result<Response<ResponseBody>, BoxError> {
    match req.uri().path() {
        "/hello" => {
            let body = "Hello World!\r\n";
            let response = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/plain")
                .body(ResponseBody::from(body))
                .unwrap();
            Ok(response)
        }
        "/echo" => {
            let bytes = drain(req.into_body()).await?;
            Ok(Response::new(ResponseBody::once(bytes)))
        }
        _ => Ok(fallback.respond().await),
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let shim = Shim::builder()
        .handler(make_handler(hello))
        .header_shape(HeaderShape::MultiValue)
        .build()
        .expect("handler is set");

    // Stands in for one platform invocation; a deployed function would
    // receive this payload from the runtime instead.
    let event: ProxyRequestEvent = serde_json::from_str(
        r#"{
            "httpMethod": "POST",
            "path": "/echo",
            "body": "aGVsbG8=",
            "isBase64Encoded": true,
            "requestContext": {"identity": {"sourceIp": "127.0.0.1"}}
        }"#,
    )
    .expect("valid event");

    let result = shim.invoke(event, LambdaContext::default()).await;
    info!(status = result.status_code, body = %result.body, "invocation finished");
}
