use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use claimsync_core::{CustomClaims, UserUid};
use claimsync_sync::{IdentityError, IdentityProvider};

use super::error_body;
use crate::config::{ConfigError, SyncConfig};
use crate::identity::encode_claims;

/// Identity Toolkit (`accounts:update`) client setting custom user claims.
#[derive(Debug, Clone)]
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    access_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAccountRequest<'a> {
    local_id: &'a str,
    /// Claims as a JSON-encoded string, not a nested object.
    custom_attributes: String,
}

impl IdentityToolkitClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            access_token: None,
        }
    }

    pub fn from_config(http: reqwest::Client, config: &SyncConfig) -> Result<Self, ConfigError> {
        let client = Self::new(http, config.identity_toolkit_url.clone(), config.require_project_id()?);
        Ok(match &config.access_token {
            Some(token) => client.with_access_token(token.clone()),
            None => client,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn update_url(&self) -> String {
        format!("{}/v1/projects/{}/accounts:update", self.base_url, self.project_id)
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn set_custom_claims(&self, uid: &UserUid, claims: &CustomClaims) -> Result<(), IdentityError> {
        let body = UpdateAccountRequest {
            local_id: uid.as_str(),
            custom_attributes: encode_claims(claims)?,
        };

        let mut request = self.http.post(self.update_url()).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(%uid, "identity toolkit accepted custom claims");
            return Ok(());
        }

        let body = error_body(response).await;
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => IdentityError::PermissionDenied(body),
            StatusCode::BAD_REQUEST if body.contains("USER_NOT_FOUND") => {
                IdentityError::UserNotFound(uid.to_string())
            }
            StatusCode::SERVICE_UNAVAILABLE => IdentityError::Unavailable(body),
            _ => IdentityError::Rejected {
                status: status.as_u16(),
                body,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use claimsync_core::{Role, derive_claims};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const UPDATE_PATH: &str = "/v1/projects/demo/accounts:update";

    fn uid() -> UserUid {
        UserUid::new("u-1").unwrap()
    }

    #[tokio::test]
    async fn posts_claims_as_encoded_custom_attributes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPDATE_PATH))
            .and(header("authorization", "Bearer t0ken"))
            .and(body_json(json!({
                "localId": "u-1",
                "customAttributes": r#"{"roles":["cliente","operador"],"admin":false,"operador":true,"cliente":true}"#
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "localId": "u-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = IdentityToolkitClient::new(reqwest::Client::new(), server.uri(), "demo")
            .with_access_token("t0ken");

        client
            .set_custom_claims(&uid(), &derive_claims(&[Role::CLIENTE, Role::OPERADOR]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn maps_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(UPDATE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("caller lacks permission"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(UPDATE_PATH))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": { "code": 400, "message": "USER_NOT_FOUND" } })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(UPDATE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = IdentityToolkitClient::new(reqwest::Client::new(), server.uri(), "demo");
        let claims = derive_claims(&[Role::ADMIN]);

        assert!(matches!(
            client.set_custom_claims(&uid(), &claims).await,
            Err(IdentityError::PermissionDenied(body)) if body == "caller lacks permission"
        ));
        assert_eq!(
            client.set_custom_claims(&uid(), &claims).await,
            Err(IdentityError::UserNotFound("u-1".into()))
        );
        assert_eq!(
            client.set_custom_claims(&uid(), &claims).await,
            Err(IdentityError::Rejected { status: 500, body: "boom".into() })
        );
    }

    #[tokio::test]
    async fn oversized_claims_never_leave_the_process() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = IdentityToolkitClient::new(reqwest::Client::new(), server.uri(), "demo");
        let roles: Vec<Role> = (0..200).map(|i| Role::new(format!("r{i:04}"))).collect();

        let err = client
            .set_custom_claims(&uid(), &derive_claims(&roles))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::PayloadTooLarge { .. }));
    }

    #[test]
    fn from_config_requires_project() {
        let config = SyncConfig::default();
        assert!(IdentityToolkitClient::from_config(reqwest::Client::new(), &config).is_err());

        let config = SyncConfig {
            project_id: Some("demo".into()),
            ..SyncConfig::default()
        };
        let client = IdentityToolkitClient::from_config(reqwest::Client::new(), &config).unwrap();
        assert_eq!(
            client.update_url(),
            "https://identitytoolkit.googleapis.com/v1/projects/demo/accounts:update"
        );
    }
}
