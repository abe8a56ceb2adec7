//! Cross-origin allow-list middleware.
//!
//! Cross-origin requests are permitted only for a configured list of
//! origins. Allowed origins receive `Access-Control-Allow-Origin` (and a
//! `Vary: Origin` marker); disallowed origins receive no permissive headers
//! at all. Preflight `OPTIONS` requests are answered at this layer.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::http::Method;
use actix_web::{Error, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::warn;
use url::Url;

/// Configured origin allow-list.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<Url>);

impl AllowedOrigins {
    /// Build an allow-list from already-parsed origins.
    pub fn new(origins: Vec<Url>) -> Self {
        Self(origins)
    }

    /// Returns true when the `Origin` header names a configured origin.
    ///
    /// Origins compare by scheme, host, and effective port; unparsable
    /// headers never match.
    pub fn permits(&self, origin_header: &HeaderValue) -> bool {
        let Ok(value) = origin_header.to_str() else {
            return false;
        };
        let Ok(origin) = Url::parse(value) else {
            return false;
        };
        self.0.iter().any(|allowed| {
            allowed.scheme() == origin.scheme()
                && allowed.host_str() == origin.host_str()
                && allowed.port_or_known_default() == origin.port_or_known_default()
        })
    }
}

/// CORS middleware enforcing the configured allow-list.
#[derive(Clone)]
pub struct Cors {
    allowed: Arc<AllowedOrigins>,
}

impl Cors {
    /// Create the middleware from an allow-list.
    pub fn new(allowed: AllowedOrigins) -> Self {
        Self {
            allowed: Arc::new(allowed),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddleware {
            service,
            allowed: self.allowed.clone(),
        }))
    }
}

/// Service wrapper produced by [`Cors`].
pub struct CorsMiddleware<S> {
    service: S,
    allowed: Arc<AllowedOrigins>,
}

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "content-type";

impl<S, B> Service<ServiceRequest> for CorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let origin = req.headers().get(header::ORIGIN).cloned();
        let origin_allowed = origin
            .as_ref()
            .map(|value| self.allowed.permits(value))
            .unwrap_or(false);
        if let (Some(value), false) = (&origin, origin_allowed) {
            warn!(origin = ?value, "cross-origin request from unlisted origin");
        }

        let is_preflight = req.method() == Method::OPTIONS
            && req
                .headers()
                .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);
        if is_preflight {
            let mut builder = HttpResponse::NoContent();
            if origin_allowed {
                if let Some(value) = origin {
                    builder
                        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, value))
                        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
                        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS))
                        .append_header((header::VARY, "Origin"));
                }
            }
            let res = req.into_response(builder.finish()).map_into_right_body();
            return Box::pin(ready(Ok(res)));
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            if origin_allowed {
                if let Some(value) = origin {
                    let headers = res.response_mut().headers_mut();
                    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
                    // Append so cache-negotiation values set by inner
                    // handlers survive.
                    headers.append(header::VARY, HeaderValue::from_static("Origin"));
                }
            }
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, web, App};
    use rstest::rstest;

    fn allow_list() -> AllowedOrigins {
        AllowedOrigins::new(vec![
            Url::parse("http://localhost:3000").expect("valid origin"),
            Url::parse("https://app.treeline.example").expect("valid origin"),
        ])
    }

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).expect("valid header value")
    }

    #[rstest]
    #[case("http://localhost:3000", true)]
    #[case("https://app.treeline.example", true)]
    #[case("https://app.treeline.example:443", true)]
    #[case("http://localhost:4000", false)]
    #[case("https://evil.example", false)]
    #[case("http://app.treeline.example", false)]
    #[case("not a url", false)]
    fn evaluates_allow_list(#[case] origin: &str, #[case] expected: bool) {
        assert_eq!(allow_list().permits(&header(origin)), expected);
    }

    fn app_under_test(
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<EitherBody<actix_web::body::BoxBody>>,
            Error = Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(Cors::new(allow_list()))
            .route("/", web::get().to(HttpResponse::Ok))
    }

    #[actix_web::test]
    async fn allowed_origin_receives_permissive_headers() {
        let app = actix_test::init_service(app_under_test()).await;
        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:3000"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
    }

    #[actix_web::test]
    async fn disallowed_origin_receives_no_permissive_headers() {
        let app = actix_test::init_service(app_under_test()).await;
        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://evil.example"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert!(res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[actix_web::test]
    async fn vary_values_from_inner_handlers_survive() {
        let app = actix_test::init_service(
            App::new().wrap(Cors::new(allow_list())).route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .insert_header((header::VARY, "Accept-Encoding"))
                        .finish()
                }),
            ),
        )
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:3000"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        let vary = res
            .headers()
            .get_all(header::VARY)
            .map(|value| value.to_str().expect("header is ascii"))
            .collect::<Vec<_>>();
        assert!(vary.contains(&"Accept-Encoding"));
        assert!(vary.contains(&"Origin"));
    }

    #[actix_web::test]
    async fn preflight_is_answered_for_allowed_origins() {
        let app = actix_test::init_service(app_under_test()).await;
        let req = actix_test::TestRequest::with_uri("/")
            .method(Method::OPTIONS)
            .insert_header((header::ORIGIN, "http://localhost:3000"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::NO_CONTENT);
        assert!(res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .is_some());
    }

    #[actix_web::test]
    async fn preflight_from_unlisted_origin_is_bare() {
        let app = actix_test::init_service(app_under_test()).await;
        let req = actix_test::TestRequest::with_uri("/")
            .method(Method::OPTIONS)
            .insert_header((header::ORIGIN, "https://evil.example"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert!(res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
        assert!(res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .is_none());
    }
}
