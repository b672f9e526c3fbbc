use reqwest::blocking;
use serde::de::DeserializeOwned;

/// Blocking HTTP client carrying the GitLab `Private-Token` header.
pub struct Client {
    client: blocking::Client,
    token: String,
}

impl Client {
    pub fn new(token: String) -> Client {
        Client {
            client: blocking::Client::new(),
            token,
        }
    }

    fn request(&self, url: &str) -> blocking::RequestBuilder {
        self.client.get(url).header("Private-Token", self.token.as_str())
    }

    /// GET `url` and decode the JSON response body.
    ///
    /// Non-2xx responses and malformed bodies are errors; there are no
    /// retries and no timeout beyond the reqwest default.
    pub fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, reqwest::Error> {
        self.request(url).send()?.error_for_status()?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_private_token_header() {
        let client = Client::new("aaabbb".to_string());

        let request = client.request("http://example.com/").build().unwrap();

        assert_eq!(request.method().as_str(), "GET");
        assert_eq!(request.headers().get("Private-Token").unwrap(), "aaabbb");
    }
}
