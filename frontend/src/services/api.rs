use gloo::net::http::{Request, Response};
use serde::de::DeserializeOwned;
use shared::{
    Card, CreateCardRequest, CreateCardResponse, ErrorResponse, HealthResponse, SuccessResponse, UpdateChoiceRequest,
    UploadResponse,
};
use web_sys::{File, FormData};

/// API client for communicating with the card server
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Client for the server that served this page
    pub fn new() -> Self {
        Self { base_url: String::new() }
    }

    /// Create a new API client with a custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url }
    }

    pub async fn health_check(&self) -> Result<HealthResponse, String> {
        let response = Request::get(&self.url("/api/health"))
            .send()
            .await
            .map_err(|e| format!("Connection failed: {}", e))?;
        parse_response(response).await
    }

    /// Fetch a card; stored images come back as signed URLs
    pub async fn get_card(&self, card_id: &str) -> Result<Card, String> {
        let response = Request::get(&self.url(&format!("/api/cards/{}", card_id)))
            .send()
            .await
            .map_err(|e| format!("Failed to fetch card: {}", e))?;
        parse_response(response).await
    }

    pub async fn create_card(&self, request: CreateCardRequest) -> Result<CreateCardResponse, String> {
        let response = Request::post(&self.url("/api/cards"))
            .json(&request)
            .map_err(|e| format!("Failed to serialize request: {}", e))?
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;
        parse_response(response).await
    }

    pub async fn update_choice(&self, card_id: &str, gift_id: &str) -> Result<SuccessResponse, String> {
        let request = UpdateChoiceRequest { receiver_choice: gift_id.to_string() };
        let response = Request::put(&self.url(&format!("/api/cards/{}/choice", card_id)))
            .json(&request)
            .map_err(|e| format!("Failed to serialize request: {}", e))?
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;
        parse_response(response).await
    }

    /// Upload an image and return its `storage/...` reference
    pub async fn upload_image(&self, file: &File) -> Result<String, String> {
        let form = FormData::new().map_err(|e| format!("Failed to build form: {:?}", e))?;
        form.append_with_blob_and_filename("file", file, &file.name())
            .map_err(|e| format!("Failed to attach file: {:?}", e))?;

        let response = Request::post(&self.url("/api/upload"))
            .body(form)
            .map_err(|e| format!("Failed to build request: {}", e))?
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;
        let upload: UploadResponse = parse_response(response).await?;
        Ok(upload.path)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Decode a success body, or turn an `ErrorResponse` into its message
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    if response.ok() {
        return response
            .json::<T>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e));
    }

    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(error) => Err(error.error),
        Err(_) => Err(format!("HTTP error {}: {}", status, response.status_text())),
    }
}
