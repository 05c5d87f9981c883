use http::Method;
use std::sync::Arc;
use triemux::{
    CorsConfigError, CorsHandler, CorsHandlerBuilder, Handler, HandlerFn, HandlerRequest,
    HandlerResponse, TrieServeMux,
};

fn items() -> HandlerFn<impl Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync> {
    HandlerFn::new(|_req: &HandlerRequest, res: &mut HandlerResponse| {
        res.set_header("X-Total-Count", "2".to_string());
        res.write_json(200, &["apple", "pear"]);
    })
}

fn mux_with(cors: CorsHandler) -> TrieServeMux {
    let mut mux = TrieServeMux::new();
    let shared: Arc<dyn Handler> = Arc::new(cors);
    mux.handle_shared(Method::GET, "/items", Arc::clone(&shared)).unwrap();
    mux.handle_shared(Method::PUT, "/items", shared).unwrap();
    mux
}

fn request(method: Method, origin: &str) -> HandlerRequest {
    HandlerRequest::new(method, "/items")
        .with_header("Host", "api.example.com")
        .with_header("Origin", origin)
}

#[test]
fn test_actual_request_through_mux() {
    let cors = CorsHandlerBuilder::new()
        .allowed_origins(&["https://app.example.com"])
        .allow_credentials(true)
        .expose_headers(&["X-Total-Count"])
        .build(items())
        .unwrap();
    let mux = mux_with(cors);

    let mut req = request(Method::GET, "https://app.example.com");
    let mut res = HandlerResponse::new();
    mux.serve(&mut req, &mut res);
    assert_eq!(res.status, 200);
    assert_eq!(res.body_text(), r#"["apple","pear"]"#);
    assert_eq!(
        res.get_header("Access-Control-Allow-Origin"),
        Some("https://app.example.com")
    );
    assert_eq!(res.get_header("Access-Control-Allow-Credentials"), Some("true"));
    assert_eq!(res.get_header("Access-Control-Expose-Headers"), Some("X-Total-Count"));
    assert_eq!(res.get_header("Vary"), Some("Origin"));
}

#[test]
fn test_rejected_origin_never_reaches_inner_handler() {
    let cors = CorsHandlerBuilder::new()
        .allowed_origins(&["https://app.example.com"])
        .build(items())
        .unwrap();
    let mux = mux_with(cors);

    let mut req = request(Method::PUT, "https://attacker.example");
    let mut res = HandlerResponse::new();
    mux.serve(&mut req, &mut res);
    assert_eq!(res.status, 403);
    assert!(res.get_header("X-Total-Count").is_none());
}

#[test]
fn test_preflight_and_actual_agree() {
    let cors = CorsHandlerBuilder::new()
        .allowed_origin_patterns(&[r"^https://([a-z]+\.)?example\.com$"])
        .allowed_headers(&["Content-Type"])
        .build(items())
        .unwrap();
    let mux = mux_with(cors);

    let mut preflight = request(Method::OPTIONS, "https://admin.example.com")
        .with_header("Access-Control-Request-Method", "PUT")
        .with_header("Access-Control-Request-Headers", "content-type");
    let mut res = HandlerResponse::new();
    mux.serve(&mut preflight, &mut res);
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("Allow"), Some("GET, HEAD, OPTIONS, PUT"));
    assert_eq!(
        res.get_header("Access-Control-Allow-Origin"),
        Some("https://admin.example.com")
    );
    assert_eq!(res.get_header("Access-Control-Allow-Headers"), Some("Content-Type"));

    let mut actual = request(Method::PUT, "https://admin.example.com");
    let mut res = HandlerResponse::new();
    mux.serve(&mut actual, &mut res);
    assert_eq!(res.status, 200);
    assert_eq!(
        res.get_header("Access-Control-Allow-Origin"),
        Some("https://admin.example.com")
    );
}

#[test]
fn test_permissive_answers_star() {
    let mux = mux_with(CorsHandler::permissive(items()));

    let mut preflight = request(Method::OPTIONS, "https://anyone.test")
        .with_header("Access-Control-Request-Method", "GET");
    let mut res = HandlerResponse::new();
    mux.serve(&mut preflight, &mut res);
    assert_eq!(res.get_header("Access-Control-Allow-Origin"), Some("*"));

    let mut actual = request(Method::GET, "https://anyone.test");
    let mut res = HandlerResponse::new();
    mux.serve(&mut actual, &mut res);
    assert_eq!(res.get_header("Access-Control-Allow-Origin"), Some("*"));
    assert!(res.get_header("Access-Control-Allow-Credentials").is_none());
}

#[test]
fn test_config_errors_display() {
    let err = CorsHandlerBuilder::new()
        .allowed_origins(&["https://ok.example", "ftp//broken"])
        .build(items())
        .unwrap_err();
    assert_eq!(
        err,
        CorsConfigError::InvalidOriginFormat {
            origin: "ftp//broken".to_string()
        }
    );
    assert!(err.to_string().contains("ftp//broken"));
    assert!(CorsConfigError::WildcardWithCredentials
        .to_string()
        .contains("wildcard"));
}
