//! Platform-abstracted HTTP client with Send-safe futures.
//!
//! On wasm32 `reqwest::Response` is not `Send` because it wraps JS types, so
//! commands could not return `Pin<Box<dyn Future + Send>>` if they awaited it
//! directly. On native the request runs on reqwest as-is; on wasm32 it runs
//! via `wasm_bindgen_futures::spawn_local` and the result comes back over a
//! `flume` channel, which is Send-safe on both sides.

use std::collections::HashMap;

/// Response reduced to Send-safe data. Headers are not carried; nothing in
/// the console reads them.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP error: {}", self.message)
    }
}

impl std::error::Error for HttpError {}

pub type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: reqwest::Method,
    url: String,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl RequestBuilder {
    fn new(method: reqwest::Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Serialize `value` as the JSON body and set the content type.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        self.headers
            .insert("content-type".to_owned(), "application/json".to_owned());
        Ok(self)
    }

    pub async fn send(self) -> HttpResult<Response> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::execute(self.method, self.url, self.headers, self.body).await
        }

        #[cfg(target_arch = "wasm32")]
        {
            self.send_wasm().await
        }
    }

    #[cfg(target_arch = "wasm32")]
    async fn send_wasm(self) -> HttpResult<Response> {
        // The request future holds JS types and is not Send; run it on the JS
        // thread and hand the Send-safe result back over a channel.
        let (tx, rx) = flume::bounded::<HttpResult<Response>>(1);
        let Self {
            method,
            url,
            headers,
            body,
        } = self;

        wasm_bindgen_futures::spawn_local(async move {
            let result = Self::execute(method, url, headers, body).await;
            let _ = tx.send_async(result).await;
        });

        rx.recv_async()
            .await
            .map_err(|_| HttpError::new("request cancelled"))?
    }

    async fn execute(
        method: reqwest::Method,
        url: String,
        headers: HashMap<String, String>,
        body: Option<Vec<u8>>,
    ) -> HttpResult<Response> {
        let client = reqwest::Client::new();

        let mut request = client.request(method, &url);
        for (name, value) in &headers {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?
            .to_vec();

        Ok(Response { status, body })
    }
}

/// Entry point for building requests.
pub struct Client;

impl Client {
    pub fn get(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(reqwest::Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(reqwest::Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(reqwest::Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(reqwest::Method::DELETE, url)
    }
}
