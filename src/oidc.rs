//! GitHub Actions OIDC token exchange, used instead of an upload token when
//! the workflow grants `id-token: write`.

use serde::Deserialize;

use crate::envs::Envs;
use crate::error::{BundleError, Result};
use crate::http::{HttpRequest, Method, Transport};

#[derive(Deserialize)]
struct IdTokenResponse {
    value: String,
}

/// Request an ID token for `audience` from the Actions runtime.
pub fn github_id_token(transport: &dyn Transport, envs: &Envs, audience: &str) -> Result<String> {
    let request_url = envs.get("ACTIONS_ID_TOKEN_REQUEST_URL").ok_or_else(|| {
        BundleError::Oidc(
            "ACTIONS_ID_TOKEN_REQUEST_URL is not set, is `id-token: write` granted?".to_string(),
        )
    })?;
    let request_token = envs.get("ACTIONS_ID_TOKEN_REQUEST_TOKEN").ok_or_else(|| {
        BundleError::Oidc("ACTIONS_ID_TOKEN_REQUEST_TOKEN is not set".to_string())
    })?;

    let mut url = url::Url::parse(request_url)
        .map_err(|e| BundleError::Oidc(format!("invalid token request URL: {e}")))?;
    url.query_pairs_mut().append_pair("audience", audience);
    let url = url.to_string();

    let request = HttpRequest::new(Method::Get, &url)
        .header("Authorization", format!("Bearer {request_token}"))
        .header("Accept", "application/json; api-version=2.0");

    let resp = transport
        .send(&request)
        .map_err(|e| BundleError::Oidc(e.to_string()))?;
    if !resp.ok() {
        return Err(BundleError::Oidc(format!(
            "token request failed with status {}",
            resp.status
        )));
    }

    let parsed: IdTokenResponse = serde_json::from_str(&resp.body)
        .map_err(|e| BundleError::Oidc(format!("unexpected token response: {e}")))?;
    Ok(parsed.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, TransportError};
    use std::cell::RefCell;

    struct Recorder {
        urls: RefCell<Vec<String>>,
        reply: HttpResponse,
    }

    impl Transport for Recorder {
        fn send(
            &self,
            request: &HttpRequest<'_>,
        ) -> std::result::Result<HttpResponse, TransportError> {
            self.urls.borrow_mut().push(request.url.to_string());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_requests_token_with_audience() {
        let envs: Envs = [
            ("ACTIONS_ID_TOKEN_REQUEST_URL", "https://token.actions/id?api=1"),
            ("ACTIONS_ID_TOKEN_REQUEST_TOKEN", "runtime"),
        ]
        .into_iter()
        .collect();
        let t = Recorder {
            urls: RefCell::new(vec![]),
            reply: HttpResponse {
                status: 200,
                body: r#"{"value":"jwt"}"#.to_string(),
            },
        };
        let token = github_id_token(&t, &envs, "https://codecov.io").unwrap();
        assert_eq!(token, "jwt");
        assert!(t.urls.borrow()[0].contains("audience=https%3A%2F%2Fcodecov.io"));
    }

    #[test]
    fn test_missing_runtime_vars() {
        let t = Recorder {
            urls: RefCell::new(vec![]),
            reply: HttpResponse {
                status: 200,
                body: String::new(),
            },
        };
        let err = github_id_token(&t, &Envs::default(), "aud").unwrap_err();
        assert!(matches!(err, BundleError::Oidc(_)));
        assert!(t.urls.borrow().is_empty());
    }
}
