//! Operator identity extraction.
//!
//! Authentication is an external collaborator; by the time a request
//! reaches this control plane the auth layer has resolved who is calling
//! and forwards an opaque identity in `x-operator-id`. It is recorded in
//! revision metadata for the audit trail and nothing else.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub const OPERATOR_HEADER: &str = "x-operator-id";
const ANONYMOUS: &str = "anonymous";

/// The opaque operator identity attached to a request.
#[derive(Debug, Clone)]
pub struct Operator(pub String);

impl<S> FromRequestParts<S> for Operator
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(OPERATOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(ANONYMOUS);
        Ok(Operator(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Operator {
        let (mut parts, _) = request.into_parts();
        Operator::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_header_present() {
        let request =
            Request::builder().header(OPERATOR_HEADER, "alice").body(()).unwrap();
        assert_eq!(extract(request).await.0, "alice");
    }

    #[tokio::test]
    async fn test_header_absent_or_blank() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await.0, "anonymous");

        let request = Request::builder().header(OPERATOR_HEADER, "   ").body(()).unwrap();
        assert_eq!(extract(request).await.0, "anonymous");
    }
}
