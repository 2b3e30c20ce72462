//! OAuth2 token-endpoint plumbing shared by the provider crates.
//!
//! Token requests are built by the `oauth2` crate and executed with
//! [`http_client`], so transport failures surface as [`reqwest::Error`].

use oauth2::basic::BasicErrorResponse;
use oauth2::{HttpRequest, HttpResponse, RequestTokenError};

/// Error returned by a token request executed with [`http_client`].
pub type TokenRequestError = RequestTokenError<reqwest::Error, BasicErrorResponse>;

/// Execute an OAuth2 token request.
///
/// Redirects are never followed.
pub async fn http_client(request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let method = request.method().clone();
    let url = request.uri().to_string();
    let headers = request.headers().clone();
    let body = request.into_body();

    let response = client
        .request(method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    let mut out = HttpResponse::new(body);
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    Ok(out)
}

/// Render a token endpoint's error body as `error: description`.
pub fn describe_error(response: &BasicErrorResponse) -> String {
    match response.error_description() {
        Some(description) => format!("{}: {description}", response.error()),
        None => response.error().to_string(),
    }
}
