//! Integration tests for the Pasarku storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pasarku-integration-tests
//! ```
//!
//! Each test spawns an in-process mock of the Pasarku REST backend and a
//! storefront wired to it, both on ephemeral ports. Nothing leaves the
//! machine.
//!
//! # Test Categories
//!
//! - `cart` - Cart totals and quantity validation
//! - `checkout` - Payment form blocking, proof upload and cart cleanup after ordering
//! - `dashboard` - Merchant dashboard ownership guard and item/stock table
//! - `navigation` - Navbar links per login state and role
//! - `owner` - Owner page access and the payment confirmation restriction
//! - `products` - Ordering and adding to cart from the product page

pub mod mock;

use std::net::SocketAddr;

use pasarku_storefront::config::{PasarkuApiConfig, StorefrontConfig};
use pasarku_storefront::state::AppState;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode, header};
use tokio::net::TcpListener;

pub use mock::{MockBackend, MockUser};

/// Password shared by every seeded mock account.
pub const PASSWORD: &str = "rahasia123";

/// Errors starting the test servers or talking to them.
pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// A running storefront backed by a [`MockBackend`].
pub struct TestApp {
    pub url: String,
    pub backend: MockBackend,
}

impl TestApp {
    /// Start the mock backend and a storefront pointed at it.
    ///
    /// # Errors
    ///
    /// Returns an error if either server cannot bind or the state fails to build.
    pub async fn spawn(backend: MockBackend) -> TestResult<Self> {
        let backend_url = backend.url().clone();
        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            api: PasarkuApiConfig::new(backend_url.clone()),
            quality_check_url: backend_url.join("predict")?,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = pasarku_storefront::app(state);
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        Ok(Self {
            url: format!("http://{addr}"),
            backend,
        })
    }

    /// A fresh browser: own cookie jar, redirects not followed.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn browser(&self) -> TestResult<Browser> {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Browser {
            client,
            base: self.url.clone(),
        })
    }

    /// A browser already logged in as `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the login request fails or is not redirected home.
    pub async fn login_as(&self, user: &MockUser) -> TestResult<Browser> {
        let browser = self.browser()?;
        let response = browser
            .post_form("/auth/login", &[("email", user.email.as_str()), ("password", PASSWORD)])
            .await?;
        if response.status() != StatusCode::SEE_OTHER {
            return Err(format!("login as {} returned {}", user.email, response.status()).into());
        }
        Ok(browser)
    }
}

/// Cookie-keeping HTTP client for one simulated visitor.
pub struct Browser {
    client: Client,
    base: String,
}

impl Browser {
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get(&self, path: &str) -> TestResult<Response> {
        Ok(self.client.get(format!("{}{path}", self.base)).send().await?)
    }

    /// GET a page and return its body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is not 200.
    pub async fn page(&self, path: &str) -> TestResult<String> {
        let response = self.get(path).await?;
        if response.status() != StatusCode::OK {
            return Err(format!("GET {path} returned {}", response.status()).into());
        }
        Ok(response.text().await?)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> TestResult<Response> {
        Ok(self
            .client
            .post(format!("{}{path}", self.base))
            .form(form)
            .send()
            .await?)
    }

    /// POST a form the way HTMX does, with `HX-Request: true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn htmx_post_form(&self, path: &str, form: &[(&str, &str)]) -> TestResult<Response> {
        Ok(self
            .client
            .post(format!("{}{path}", self.base))
            .header("hx-request", "true")
            .form(form)
            .send()
            .await?)
    }

    /// POST a multipart form made of text fields only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn post_multipart(&self, path: &str, fields: &[(&str, &str)]) -> TestResult<Response> {
        self.send_multipart(path, text_form(fields)).await
    }

    /// POST a multipart form with text fields plus one uploaded file.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or `file.mime` is not a valid type.
    pub async fn post_multipart_file(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        file: &UploadFile<'_>,
    ) -> TestResult<Response> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.to_string())
            .mime_str(file.mime)?;
        let form = text_form(fields).part(file.field.to_string(), part);
        self.send_multipart(path, form).await
    }

    async fn send_multipart(&self, path: &str, form: Form) -> TestResult<Response> {
        Ok(self
            .client
            .post(format!("{}{path}", self.base))
            .multipart(form)
            .send()
            .await?)
    }
}

/// A file attached to a multipart POST.
pub struct UploadFile<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub mime: &'a str,
    pub bytes: &'a [u8],
}

impl<'a> UploadFile<'a> {
    /// A tiny PNG under `field`.
    #[must_use]
    pub const fn png(field: &'a str) -> Self {
        Self {
            field,
            file_name: "bukti.png",
            mime: "image/png",
            bytes: b"\x89PNG\r\n\x1a\n",
        }
    }
}

fn text_form(fields: &[(&str, &str)]) -> Form {
    fields.iter().fold(Form::new(), |form, (name, value)| {
        form.text((*name).to_string(), (*value).to_string())
    })
}

/// The `Location` header of a redirect response.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
