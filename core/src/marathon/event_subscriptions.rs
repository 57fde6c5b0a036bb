//! Marathon event subscriptions.
//!
//! Registration only records the callback URL; delivery happens server side.

use crate::dispatch::{prepare, Dispatcher};
use crate::error::ApiError;
use crate::http::{HttpMethod, Transport};
use crate::marathon::types::CallbackUrl;
use crate::request::OperationRequest;
use crate::response::Unwrap;
use crate::validate::Rule;

const URL_RULES: &[Rule] = &[Rule::Required("url")];

/// Webhook registrations. Marathon POSTs every scheduler event to each
/// registered callback URL.
#[derive(Debug)]
pub struct EventSubscriptions<'a, T> {
    dispatcher: &'a Dispatcher<T>,
}

impl<'a, T: Transport> EventSubscriptions<'a, T> {
    pub(crate) fn new(dispatcher: &'a Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    pub fn register(&self, url: impl Into<CallbackUrl>) -> Result<(), ApiError> {
        self.send("eventSubscriptions.register", HttpMethod::Post, url.into())
    }

    /// Registered callback URLs.
    pub fn list(&self) -> Result<Vec<String>, ApiError> {
        self.dispatcher.call(
            OperationRequest::new("eventSubscriptions.list", HttpMethod::Get, "/eventSubscriptions"),
            Unwrap::BodyItem("callbackUrls"),
        )
    }

    pub fn unregister(&self, url: impl Into<CallbackUrl>) -> Result<(), ApiError> {
        self.send("eventSubscriptions.unregister", HttpMethod::Delete, url.into())
    }

    fn send(&self, operation: &'static str, method: HttpMethod, url: CallbackUrl) -> Result<(), ApiError> {
        let options = prepare(operation, URL_RULES, &url)?;
        self.dispatcher.call_empty(
            OperationRequest::new(operation, method, "/eventSubscriptions").query_from("callbackUrl", &options, "url"),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::error::ValidationError;
    use crate::marathon::Marathon;
    use crate::testing::RecordingTransport;

    use super::*;

    const CALLBACK: &str = "http://10.141.141.1:8088/callback";
    const ENCODED: &str = "http%3A%2F%2F10.141.141.1%3A8088%2Fcallback";

    fn marathon() -> Marathon<RecordingTransport> {
        Marathon::with_transport(ClientConfig::marathon(), RecordingTransport::new()).unwrap()
    }

    #[test]
    fn register_and_unregister_use_callback_url_query() {
        let m = marathon();
        m.event_subscriptions().register(CALLBACK).unwrap();
        m.event_subscriptions().unregister(CallbackUrl::from(CALLBACK)).unwrap();

        let sent = m.transport().requests();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(
            sent[0].url,
            format!("http://127.0.0.1:8080/v2/eventSubscriptions?callbackUrl={ENCODED}")
        );
        assert!(sent[0].body.is_none());
        assert_eq!(sent[1].method, HttpMethod::Delete);
        assert_eq!(sent[1].url, sent[0].url);
    }

    #[test]
    fn string_and_record_produce_identical_requests() {
        let m = marathon();
        let record = || CallbackUrl { url: Some(CALLBACK.into()) };
        m.event_subscriptions().register(CALLBACK).unwrap();
        m.event_subscriptions().register(record()).unwrap();
        m.event_subscriptions().unregister(CALLBACK).unwrap();
        m.event_subscriptions().unregister(record()).unwrap();

        let sent = m.transport().requests();
        assert_eq!(sent[0], sent[1]);
        assert_eq!(sent[2], sent[3]);
    }

    #[test]
    fn list_unwraps_callback_urls() {
        let m = marathon();
        m.transport().respond(200, &format!(r#"{{"callbackUrls":["{CALLBACK}"]}}"#));
        assert_eq!(m.event_subscriptions().list().unwrap(), vec![CALLBACK.to_string()]);
        assert_eq!(
            m.transport().last_request().unwrap().url,
            "http://127.0.0.1:8080/v2/eventSubscriptions"
        );
    }

    #[test]
    fn register_requires_url() {
        let m = marathon();
        let err = m.event_subscriptions().register(CallbackUrl::default()).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::Missing {
                operation: "eventSubscriptions.register",
                field: "url"
            })
        ));
        assert!(m.transport().requests().is_empty());
    }
}
