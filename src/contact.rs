//! Verified contact-channel resolution for OTP delivery.
//!
//! The identity backend stores person attributes; the two that matter here
//! are the verified email address and phone number. Both must be present
//! before a code can be issued, and nothing is cached: every issuance
//! attempt re-resolves so a freshly-voided attribute is never delivered to.

use crate::config::FlowConfig;
use crate::credentials::Credentials;
use crate::error::{Channel, Error};
use crate::transport::Transport;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Person attribute type holding the verified email address.
pub const EMAIL_ATTRIBUTE_TYPE: &str = "b8d0b331-1d2d-4a9a-b741-1816f498bdb6";

/// Person attribute type holding the verified phone number.
pub const PHONE_ATTRIBUTE_TYPE: &str = "72a759a8-1359-478a-88db-850c8ee2c115";

/// The delivery channels resolved for one issuance attempt. Resolution
/// fails closed, so both fields are always populated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
struct Person {
    #[serde(default)]
    attributes: Vec<PersonAttribute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonAttribute {
    attribute_type: AttributeType,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    voided: bool,
}

#[derive(Debug, Deserialize)]
struct AttributeType {
    uuid: String,
}

#[derive(Clone, Debug)]
pub struct ContactResolver {
    transport: Transport,
    config: FlowConfig,
}

impl ContactResolver {
    #[must_use]
    pub fn new(transport: Transport, config: FlowConfig) -> Self {
        Self { transport, config }
    }

    /// Resolve the verified email and phone for the given person.
    ///
    /// # Errors
    /// - `Error::MissingIdentity` when no person UUID is available yet;
    ///   returned before any request is made and treated by callers as a
    ///   silent short-circuit.
    /// - `Error::ContactNotConfigured` when either channel is absent,
    ///   distinctly per channel.
    /// - `Error::Backend` for non-2xx or malformed responses.
    #[instrument(skip(self, credentials))]
    pub async fn resolve(
        &self,
        person_uuid: &str,
        credentials: &Credentials,
    ) -> Result<ContactInfo, Error> {
        if person_uuid.trim().is_empty() {
            return Err(Error::MissingIdentity);
        }

        let base = self.config.require_sub_domain()?;
        let url = format!("{base}/person/{person_uuid}?v=custom:attributes");

        let response = self
            .transport
            .request_json(Method::GET, &url, Some(credentials), None)
            .await?
            .into_success()?;

        let status = response.status;
        let person: Person = serde_json::from_value(response.body).map_err(|_| Error::Backend {
            status,
            message: None,
        })?;

        // Backend order is authoritative; take the first live attribute of
        // each type.
        let email = first_attribute(&person.attributes, EMAIL_ATTRIBUTE_TYPE)
            .ok_or(Error::ContactNotConfigured(Channel::Email))?;
        let phone = first_attribute(&person.attributes, PHONE_ATTRIBUTE_TYPE)
            .ok_or(Error::ContactNotConfigured(Channel::Phone))?;

        debug!("resolved contact channels for person {}", person_uuid);

        Ok(ContactInfo { email, phone })
    }
}

fn first_attribute(attributes: &[PersonAttribute], type_uuid: &str) -> Option<String> {
    attributes
        .iter()
        .filter(|attribute| !attribute.voided)
        .find(|attribute| attribute.attribute_type.uuid == type_uuid)
        .and_then(|attribute| attribute.value.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{ContactInfo, ContactResolver, EMAIL_ATTRIBUTE_TYPE, PHONE_ATTRIBUTE_TYPE};
    use crate::config::FlowConfig;
    use crate::credentials::Credentials;
    use crate::error::{Channel, Error};
    use crate::transport::Transport;
    use anyhow::Result;
    use secrecy::SecretString;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{basic_auth, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PERSON_UUID: &str = "5c9d032b-6f27-40a8-b764-4dbd43c50eb2";

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn credentials() -> Credentials {
        Credentials::new("jdoe", SecretString::from("s3cr3t".to_string()))
    }

    fn resolver(base: &str) -> ContactResolver {
        let transport = Transport::new("test").unwrap();
        let config = FlowConfig::new().with_sub_domain(base);
        ContactResolver::new(transport, config)
    }

    fn attribute(type_uuid: &str, value: &str, voided: bool) -> serde_json::Value {
        json!({
            "attributeType": { "uuid": type_uuid },
            "value": value,
            "voided": voided
        })
    }

    #[tokio::test]
    async fn resolves_both_channels() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/person/{PERSON_UUID}")))
            .and(query_param("v", "custom:attributes"))
            .and(basic_auth("jdoe", "s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "attributes": [
                    attribute(EMAIL_ATTRIBUTE_TYPE, "jdoe@example.org", false),
                    attribute(PHONE_ATTRIBUTE_TYPE, "0700123456", false)
                ]
            })))
            .mount(&server)
            .await;

        let contact = resolver(&server.uri())
            .resolve(PERSON_UUID, &credentials())
            .await?;
        assert_eq!(
            contact,
            ContactInfo {
                email: "jdoe@example.org".to_string(),
                phone: "0700123456".to_string(),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn voided_attributes_are_skipped() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/person/{PERSON_UUID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "attributes": [
                    attribute(EMAIL_ATTRIBUTE_TYPE, "old@example.org", true),
                    attribute(EMAIL_ATTRIBUTE_TYPE, "new@example.org", false),
                    attribute(PHONE_ATTRIBUTE_TYPE, "0700123456", false)
                ]
            })))
            .mount(&server)
            .await;

        let contact = resolver(&server.uri())
            .resolve(PERSON_UUID, &credentials())
            .await?;
        assert_eq!(contact.email, "new@example.org");
        Ok(())
    }

    #[tokio::test]
    async fn missing_email_is_distinct_from_missing_phone() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/person/{PERSON_UUID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "attributes": [
                    attribute(PHONE_ATTRIBUTE_TYPE, "0700123456", false)
                ]
            })))
            .mount(&server)
            .await;

        let result = resolver(&server.uri())
            .resolve(PERSON_UUID, &credentials())
            .await;
        assert!(matches!(
            result,
            Err(Error::ContactNotConfigured(Channel::Email))
        ));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/person/{PERSON_UUID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "attributes": [
                    attribute(EMAIL_ATTRIBUTE_TYPE, "jdoe@example.org", false)
                ]
            })))
            .mount(&server)
            .await;

        let result = resolver(&server.uri())
            .resolve(PERSON_UUID, &credentials())
            .await;
        assert!(matches!(
            result,
            Err(Error::ContactNotConfigured(Channel::Phone))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn empty_identity_short_circuits_without_a_request() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        let result = resolver(&server.uri()).resolve("  ", &credentials()).await;
        assert!(matches!(result, Err(Error::MissingIdentity)));

        let requests = server.received_requests().await.unwrap();
        assert!(requests.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn backend_error_carries_message() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/person/{PERSON_UUID}")))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Privileges required" }
            })))
            .mount(&server)
            .await;

        let result = resolver(&server.uri())
            .resolve(PERSON_UUID, &credentials())
            .await;
        match result {
            Err(Error::Backend { status, message }) => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(message.as_deref(), Some("Privileges required"));
            }
            other => panic!("expected backend error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn resolution_is_pure_given_identical_inputs() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/person/{PERSON_UUID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "attributes": [
                    attribute(EMAIL_ATTRIBUTE_TYPE, "jdoe@example.org", false),
                    attribute(PHONE_ATTRIBUTE_TYPE, "0700123456", false)
                ]
            })))
            .mount(&server)
            .await;

        let resolver = resolver(&server.uri());
        let first = resolver.resolve(PERSON_UUID, &credentials()).await?;
        let second = resolver.resolve(PERSON_UUID, &credentials()).await?;
        assert_eq!(first, second);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        Ok(())
    }
}
