//! Remote bibliographic lookups.
//!
//! [`Client`] is the seam between the lookup protocol in [`open_library`] and the HTTP transport.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{Error, ErrorKind};

pub mod open_library;

/// A blocking HTTP client able to fetch and decode JSON resources.
///
/// Implementations must classify failures with the [`ErrorKind`] of the returned [`Error`]:
/// - [`ErrorKind::NotFound`] for a 404 response,
/// - [`ErrorKind::Upstream`] for any other non-success status,
/// - [`ErrorKind::Network`] when the server cannot be reached or the `timeout` elapses,
/// - [`ErrorKind::Parse`] when the body is not the expected JSON.
pub trait Client
where
    Self: Default + Sync,
{
    /// Sends a single `GET` request to `url`, following redirects, and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// See the trait documentation for how failures are classified.
    fn get_json<T>(&self, url: &str, timeout: Duration) -> Result<T, Error>
    where
        T: DeserializeOwned;
}

impl Client for reqwest::blocking::Client {
    fn get_json<T>(&self, url: &str, timeout: Duration) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let resp = self
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(classify_request_error)?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("No resource found at '{url}'"),
            ));
        }
        if !status.is_success() {
            return Err(Error::new(
                ErrorKind::Upstream(status.as_u16()),
                format!("Unexpected status from '{url}'"),
            ));
        }

        resp.json().map_err(|e| {
            if e.is_decode() {
                Error::wrap_with(ErrorKind::Parse, e, "Response is not the expected JSON")
            } else {
                classify_request_error(e)
            }
        })
    }
}

fn classify_request_error(e: reqwest::Error) -> Error {
    if e.is_builder() {
        Error::wrap_with(ErrorKind::Unknown, e, "Request could not be built")
    } else if e.is_timeout() {
        Error::wrap_with(ErrorKind::Network, e, "Request timed out")
    } else {
        Error::wrap(ErrorKind::Network, e)
    }
}

#[cfg(test)]
pub(crate) use test::{assert_requested, impl_json_producer, MockClient, Producer};


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{json, Value};
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::Client;
    use crate::{Error, ErrorKind};

    const TIMEOUT: Duration = Duration::from_secs(5);

    // The blocking client runs its own runtime so it must stay off the async worker threads.
    async fn get(url: String, timeout: Duration) -> Result<Value, Error> {
        tokio::task::spawn_blocking(move || {
            reqwest::blocking::Client::new().get_json::<Value>(&url, timeout)
        })
        .await
        .unwrap()
    }

    async fn serve(route: &str, response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn success_decodes_json() {
        let server = serve(
            "/isbn/1.json",
            ResponseTemplate::new(200).set_body_json(json!({"title": "Dune"})),
        )
        .await;

        let body = get(format!("{}/isbn/1.json", server.uri()), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(json!({"title": "Dune"}), body);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn status_404_is_not_found() {
        let server = serve("/isbn/000.json", ResponseTemplate::new(404)).await;

        let err = get(format!("{}/isbn/000.json", server.uri()), TIMEOUT)
            .await
            .unwrap_err();

        assert_eq!(ErrorKind::NotFound, err.kind());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn other_status_is_upstream_with_code() {
        let server = serve("/isbn/1.json", ResponseTemplate::new(503)).await;

        let err = get(format!("{}/isbn/1.json", server.uri()), TIMEOUT)
            .await
            .unwrap_err();

        assert_eq!(ErrorKind::Upstream(503), err.kind());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn body_that_is_not_json_is_parse_error() {
        let server = serve(
            "/isbn/1.json",
            ResponseTemplate::new(200).set_body_string("<html>Moved</html>"),
        )
        .await;

        let err = get(format!("{}/isbn/1.json", server.uri()), TIMEOUT)
            .await
            .unwrap_err();

        assert_eq!(ErrorKind::Parse, err.kind());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn slow_response_is_network_error() {
        let server = serve(
            "/isbn/1.json",
            ResponseTemplate::new(200)
                .set_body_json(json!({"title": "Dune"}))
                .set_delay(Duration::from_secs(3)),
        )
        .await;

        let err = get(
            format!("{}/isbn/1.json", server.uri()),
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();

        assert_eq!(ErrorKind::Network, err.kind());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn redirect_is_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/isbn/1.json"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/books/OL1M.json", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/books/OL1M.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Dune"})))
            .mount(&server)
            .await;

        let body = get(format!("{}/isbn/1.json", server.uri()), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(json!({"title": "Dune"}), body);
    }

    #[test]
    fn invalid_url_is_unknown() {
        let err = reqwest::blocking::Client::new()
            .get_json::<Value>("not a url", TIMEOUT)
            .unwrap_err();

        assert_eq!(ErrorKind::Unknown, err.kind());
    }
}
