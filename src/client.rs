// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Blocking HTTP client for the ergonomics endpoint.

use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, ImageFormat};
use reqwest::blocking::{Client, multipart};

use crate::api::ErgonomicsResponse;
use crate::error::{ErgonomicsError, Result};

/// Default endpoint of a locally running server.
pub const DEFAULT_URL: &str = "http://localhost:5000/check_ergonomics";

/// Uploads frames to `POST /check_ergonomics`.
#[derive(Debug, Clone)]
pub struct ErgonomicsClient {
    http: Client,
    url: String,
}

impl ErgonomicsClient {
    /// Create a client for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client can't be built.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one frame and parse the verdict.
    ///
    /// # Errors
    ///
    /// Returns [`ErgonomicsError::RequestError`] on transport failures and on
    /// any non-200 status (`Request failed with status code N`).
    pub fn check(&self, frame: &DynamicImage) -> Result<ErgonomicsResponse> {
        let jpeg = encode_jpeg(frame)?;
        let part = multipart::Part::bytes(jpeg)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("image", part);

        let response = self.http.post(&self.url).multipart(form).send()?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ErgonomicsError::RequestError(format!(
                "Request failed with status code {}",
                status.as_u16()
            )));
        }

        Ok(response.json()?)
    }
}

/// Encode a frame as JPEG for upload.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_jpeg(frame: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(frame.to_rgb8()).write_to(&mut buf, ImageFormat::Jpeg)?;
    Ok(buf.into_inner())
}
