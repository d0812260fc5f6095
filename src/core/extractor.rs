use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{
        rejection::JsonRejection, ConnectInfo, FromRequest, FromRequestParts,
        OptionalFromRequestParts, Request,
    },
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// `Option<AuthenticatedUser>` on routes behind the optional auth middleware
impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthenticatedUser>().cloned())
    }
}

/// Client address recorded in the action log.
///
/// Taken from `X-Forwarded-For` (first hop), then `X-Real-IP`, then the socket peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let forwarded = header("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
            .filter(|ip| !ip.is_empty());

        let ip = forwarded
            .or_else(|| header("x-real-ip").map(|v| v.trim().to_string()))
            .filter(|ip| !ip.is_empty())
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            });

        Ok(ClientIp(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    async fn client_ip(request: HttpRequest<()>) -> ClientIp {
        let (mut parts, _) = request.into_parts();
        <ClientIp as FromRequestParts<()>>::from_request_parts(&mut parts, &())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_client_ip_prefers_first_forwarded_hop() {
        let request = HttpRequest::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(())
            .unwrap();
        assert_eq!(client_ip(request).await, ClientIp(Some("203.0.113.7".into())));
    }

    #[tokio::test]
    async fn test_client_ip_falls_back_to_real_ip_then_socket() {
        let request = HttpRequest::builder()
            .header("x-real-ip", "10.0.0.2")
            .body(())
            .unwrap();
        assert_eq!(client_ip(request).await, ClientIp(Some("10.0.0.2".into())));

        let mut request = HttpRequest::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        assert_eq!(client_ip(request).await, ClientIp(Some("127.0.0.1".into())));
    }

    #[tokio::test]
    async fn test_client_ip_absent() {
        let request = HttpRequest::builder().body(()).unwrap();
        assert_eq!(client_ip(request).await, ClientIp(None));
    }
}
