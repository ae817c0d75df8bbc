use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};

use stock_graph::{Config, Error, PolygonAgent};

const SAMPLE: &str = r#"{"ticker":"AAPL","queryCount":2,"resultsCount":2,"adjusted":true,"status":"OK",
    "results":[{"o":150.0,"c":151.2,"t":1700000000000},{"o":151.2,"c":149.9,"t":1700086400000}]}"#;

/// Serve `body` with `status` for every request, recording each request uri.
fn serve(status: StatusCode, body: &'static str) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(vec![]));
    let recorded = seen.clone();

    let make_svc = make_service_fn(move |_conn| {
        let seen = seen.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(req.uri().to_string());
                    let resp = Response::builder()
                        .status(status)
                        .body(Body::from(body))
                        .unwrap();
                    Ok::<_, Infallible>(resp)
                }
            }))
        }
    });

    let server = Server::bind(&([127, 0, 0, 1], 0).into()).serve(make_svc);
    let addr = server.local_addr();
    tokio::spawn(server);
    (addr, recorded)
}

fn agent(addr: SocketAddr) -> PolygonAgent {
    let config = Config {
        api_key: "k3y".into(),
        base_url: format!("http://{}", addr),
        log_file: "unused.log".into(),
        tickers: vec![],
    };
    PolygonAgent::new(&config)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 19).unwrap()
}

#[tokio::test]
async fn fetches_and_decodes_series() {
    let (addr, seen) = serve(StatusCode::OK, SAMPLE);

    let series = agent(addr).fetch_on("AAPL", today()).await.unwrap();
    assert_eq!(series.ticker, "AAPL");
    assert_eq!(series.points.len(), 2);
    assert_eq!(series.points[1].close, 149.9);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        "/v2/aggs/ticker/AAPL/range/1/day/2024-03-19/2024-06-19?adjusted=true&sort=asc&limit=120&apiKey=k3y"
    );
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (addr, _) = serve(StatusCode::UNAUTHORIZED, r#"{"status":"ERROR","error":"Unknown API Key"}"#);

    let err = agent(addr).fetch_on("AAPL", today()).await.unwrap_err();
    assert!(matches!(err, Error::Status(StatusCode::UNAUTHORIZED)));
}

#[tokio::test]
async fn unexpected_body_is_a_decode_error() {
    let (addr, _) = serve(StatusCode::OK, r#"{"ticker":"AAPL","resultsCount":0,"status":"OK"}"#);

    let err = agent(addr).fetch_on("AAPL", today()).await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn bad_ticker_fails_before_any_request() {
    let (addr, seen) = serve(StatusCode::OK, SAMPLE);

    let err = agent(addr).fetch_on("NOT A TICKER", today()).await.unwrap_err();
    assert!(matches!(err, Error::Url(_)));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_host_is_an_http_error() {
    // bind then drop to get a port nothing listens on
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

    let err = agent(addr).fetch_on("AAPL", today()).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
