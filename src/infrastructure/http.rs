use crate::domain::{
    device::{HistoryExtent, SystemInfo},
    errors::{InfrastructureError, NetworkError},
    logging::{LogComponent, get_logger},
    telemetry::{HistoryFragment, HistorySource, Timestamp},
};
use gloo_net::http::Request;
use serde::de::DeserializeOwned;

/// HTTP client for the device REST API
#[derive(Debug, Clone, Default)]
pub struct DeviceHttpClient {
    base_uri: String,
}

impl DeviceHttpClient {
    /// `base_uri` is the device origin, e.g. `http://192.168.1.20`; empty
    /// means the page's own origin.
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self { base_uri: HttpUtils::normalize_base_uri(&base_uri.into()) }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn system_info_url(&self, start: Timestamp) -> String {
        HttpUtils::build_url_with_params(&format!("{}/api/system/info", self.base_uri), &[("ts", start.value().to_string())])
    }

    pub fn history_len_url(&self) -> String {
        format!("{}/api/history/len", self.base_uri)
    }

    pub fn history_data_url(&self, start: Timestamp) -> String {
        HttpUtils::build_url_with_params(&format!("{}/api/history/data", self.base_uri), &[("ts", start.value().to_string())])
    }

    /// `GET /api/system/info?ts=<start>`
    pub async fn get_system_info(&self, start: Timestamp) -> Result<SystemInfo, InfrastructureError> {
        self.get_json(&self.system_info_url(start)).await
    }

    /// `GET /api/history/len`
    pub async fn get_history_extent(&self) -> Result<HistoryExtent, InfrastructureError> {
        self.get_json(&self.history_len_url()).await
    }

    /// `GET /api/history/data?ts=<start>`: history only, without the info payload
    pub async fn get_history_data(&self, start: Timestamp) -> Result<HistoryFragment, InfrastructureError> {
        self.get_json(&self.history_data_url(start)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, InfrastructureError> {
        get_logger().debug(LogComponent::Infrastructure("DeviceHttpClient"), &format!("🌐 GET {}", url));

        let response = Request::get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| NetworkError::HttpRequestFailed(format!("Failed to send request: {:?}", e)))?;

        if !HttpUtils::is_success_status(response.status()) {
            let error = NetworkError::HttpStatus { status: response.status(), text: response.status_text() };
            get_logger().warn(LogComponent::Infrastructure("DeviceHttpClient"), &format!("❌ {}", error));
            return Err(error.into());
        }

        let data = response
            .json::<T>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(format!("Failed to parse JSON: {:?}", e)))?;

        Ok(data)
    }
}

impl HistorySource for DeviceHttpClient {
    async fn fetch_info(&self, start: Timestamp) -> Result<SystemInfo, InfrastructureError> {
        self.get_system_info(start).await
    }
}

/// Helpers for building request URLs
pub struct HttpUtils;

impl HttpUtils {
    pub fn is_success_status(status: u16) -> bool {
        (200..300).contains(&status)
    }

    /// Device origin without trailing slashes, so API paths can be appended
    pub fn normalize_base_uri(base_uri: &str) -> String {
        base_uri.trim().trim_end_matches('/').to_string()
    }

    /// Append query parameters in the given order
    pub fn build_url_with_params(base_url: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            return base_url.to_string();
        }

        let query_string = params
            .iter()
            .map(|(key, value)| format!("{}={}", Self::url_encode(key), Self::url_encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", base_url, query_string)
    }

    /// Escape the characters that would break a query component
    pub fn url_encode(input: &str) -> String {
        input
            .replace('%', "%25")
            .replace(' ', "%20")
            .replace('&', "%26")
            .replace('=', "%3D")
            .replace('?', "%3F")
            .replace('#', "%23")
    }
}
