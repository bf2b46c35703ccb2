use serde::de::DeserializeOwned;

use crate::{AccessToken, Client, ClientError, ClientResult};

/// Making requests to the Web API.
impl Client {
    /// Make an authenticated GET request to `{api_base_url}/{endpoint}` and
    /// deserialize the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body is not valid.
    pub async fn request<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        endpoint: &str,
        parameters: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = format!("{}/{endpoint}", self.api_base_url);
        let bytes = self
            .request_raw(&url, token.bearer().as_bytes(), parameters)
            .await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Forward a playlist lookup upstream using the caller's `Authorization`
    /// header bytes verbatim, returning the body untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ApiError`] carrying the upstream status if the
    /// lookup was rejected, or a transport error if the server was unreachable.
    pub async fn forward_playlist(
        &self,
        authorization: &[u8],
        playlist_id: &str,
    ) -> ClientResult<Vec<u8>> {
        let url = format!(
            "{}/playlists/{}",
            self.api_base_url,
            urlencoding::encode(playlist_id)
        );
        self.request_raw(&url, authorization, &[]).await
    }

    /// Download an unauthenticated resource, such as a preview clip or a cover image.
    pub async fn download(&self, url: &str) -> ClientResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        Self::read_body(response).await
    }

    pub(crate) async fn request_raw(
        &self,
        url: &str,
        authorization: &[u8],
        parameters: &[(&str, String)],
    ) -> ClientResult<Vec<u8>> {
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .query(parameters)
            .send()
            .await?;
        Self::read_body(response).await
    }

    async fn read_body(response: reqwest::Response) -> ClientResult<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok();
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.into())
    }
}
