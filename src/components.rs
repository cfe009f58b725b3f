//! Prebuilt tracking setups composed from façade calls.
//!
//! Every setup creates its entities one after another in the container's
//! default workspace and records each `[label, outcome]` pair. A failed step
//! is recorded and the remaining steps still run; the setup itself always
//! reports success unless the client was never authenticated.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::api::{GtmClient, Outcome};
use crate::error::ServiceError;

pub const DEFAULT_FORM_EVENT: &str = "form_submit";

/// Site profile for [`generate_workflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    Ecommerce,
    LeadGeneration,
    ContentSite,
}

impl WorkflowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowType::Ecommerce => "ecommerce",
            WorkflowType::LeadGeneration => "lead_generation",
            WorkflowType::ContentSite => "content_site",
        }
    }
}

/// Ordered `[label, outcome]` log of one setup.
#[derive(Debug, Default)]
struct Steps(Vec<Value>);

impl Steps {
    fn record(&mut self, label: impl Into<String>, outcome: &Outcome) {
        let label = label.into();
        if !outcome.is_success() {
            info!("Setup step '{}' failed", label);
        }
        self.0.push(json!([label, outcome.to_json()]));
    }

    fn finish(self, setup: Outcome) -> Outcome {
        setup.with("results", Value::Array(self.0))
    }
}

fn tag_params(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
        .collect()
}

/// GA4 event tag parameters: measurement id and event name first, then extras.
fn ga4_event_params(measurement_id: &str, event_name: &str, extra: &[(&str, &str)]) -> Map<String, Value> {
    let mut params = tag_params(&[("measurementIdOverride", measurement_id), ("eventName", event_name)]);
    params.extend(tag_params(extra));
    params
}

/// GA4 configuration tag, an all-pages trigger and three common event tags.
pub async fn create_ga4_setup(
    client: &GtmClient,
    account_id: &str,
    container_id: &str,
    measurement_id: &str,
) -> Result<Outcome, ServiceError> {
    let mut steps = Steps::default();

    let config_params = tag_params(&[("tagId", measurement_id), ("measurementIdOverride", measurement_id)]);
    let config = client
        .create_tag(account_id, container_id, "GA4 Configuration - MCP", "gaawc", &config_params)
        .await?;
    steps.record("GA4 Configuration Tag", &config);

    let trigger = client
        .create_trigger(account_id, container_id, "All Pages - MCP", "pageview", Vec::new())
        .await?;
    steps.record("Page View Trigger", &trigger);

    let events: [(&str, &str, (&str, &str)); 3] = [
        ("Scroll Depth", "scroll", ("scrollThreshold", "90")),
        ("Outbound Click", "click", ("clickType", "link")),
        ("File Download", "file_download", ("fileExtension", "pdf,doc,docx,xls,xlsx")),
    ];
    for (label, event_name, extra) in events {
        let params = ga4_event_params(measurement_id, event_name, &[extra]);
        let tag_name = format!("GA4 Event - {} - MCP", label);
        let outcome = client
            .create_tag(account_id, container_id, &tag_name, "gaawe", &params)
            .await?;
        steps.record(format!("GA4 Event - {}", label), &outcome);
    }

    Ok(steps.finish(
        Outcome::done()
            .with("setup", json!("GA4 Complete Setup"))
            .with("measurement_id", json!(measurement_id)),
    ))
}

/// Facebook Pixel image tag and an all-pages trigger.
pub async fn create_facebook_pixel_setup(
    client: &GtmClient,
    account_id: &str,
    container_id: &str,
    pixel_id: &str,
) -> Result<Outcome, ServiceError> {
    let mut steps = Steps::default();

    let pixel_url = format!("https://www.facebook.com/tr?id={}&ev=PageView&noscript=1", pixel_id);
    let tag = client
        .create_tag(account_id, container_id, "Facebook Pixel", "img", &tag_params(&[("url", pixel_url.as_str())]))
        .await?;
    steps.record("Facebook Pixel Base", &tag);

    let trigger = client
        .create_trigger(account_id, container_id, "All Pages - Facebook", "pageview", Vec::new())
        .await?;
    steps.record("Page View Trigger", &trigger);

    Ok(steps.finish(
        Outcome::done()
            .with("setup", json!("Facebook Pixel Setup"))
            .with("pixel_id", json!(pixel_id)),
    ))
}

/// Form submission trigger matching `form_selector` plus a GA4 event tag.
pub async fn create_form_tracking(
    client: &GtmClient,
    account_id: &str,
    container_id: &str,
    form_selector: &str,
    event_name: &str,
) -> Result<Outcome, ServiceError> {
    let mut steps = Steps::default();

    let condition = json!({
        "type": "equals",
        "parameter": [
            { "key": "arg0", "value": "{{Form Element}}", "type": "template" },
            { "key": "arg1", "value": form_selector, "type": "template" },
        ],
    });
    let trigger = client
        .create_trigger(
            account_id,
            container_id,
            &format!("Form Submit - {}", form_selector),
            "formSubmission",
            vec![condition],
        )
        .await?;
    steps.record("Form Submit Trigger", &trigger);

    let params = tag_params(&[("eventName", event_name), ("formSelector", form_selector)]);
    let tag = client
        .create_tag(
            account_id,
            container_id,
            &format!("Form Submit Event - {}", form_selector),
            "gaawe",
            &params,
        )
        .await?;
    steps.record("Form Submit Event", &tag);

    Ok(steps.finish(
        Outcome::done()
            .with("setup", json!("Form Tracking"))
            .with("form_selector", json!(form_selector))
            .with("event_name", json!(event_name)),
    ))
}

const ECOMMERCE_EVENTS: &[(&str, &[(&str, &str)])] = &[
    ("purchase", &[("transactionId", "{{Transaction ID}}"), ("value", "{{Revenue}}")]),
    ("add_to_cart", &[("itemId", "{{Item ID}}"), ("value", "{{Item Value}}")]),
    ("remove_from_cart", &[("itemId", "{{Item ID}}")]),
    ("begin_checkout", &[]),
];

const CONTENT_EVENTS: &[(&str, &[(&str, &str)])] = &[
    ("newsletter_signup", &[]),
    ("social_share", &[("sharePlatform", "{{Share Platform}}")]),
    ("video_play", &[("videoTitle", "{{Video Title}}")]),
    ("article_read", &[("articleTitle", "{{Article Title}}")]),
];

/// Full tracking plan for a site profile: optional GA4 base setup, the
/// profile's event tags, then an optional Facebook Pixel.
pub async fn generate_workflow(
    client: &GtmClient,
    account_id: &str,
    container_id: &str,
    workflow: WorkflowType,
    ga4_measurement_id: Option<&str>,
    facebook_pixel_id: Option<&str>,
) -> Result<Outcome, ServiceError> {
    let mut steps = Steps::default();
    let ga4_measurement_id = ga4_measurement_id.filter(|id| !id.is_empty());
    let measurement_override = ga4_measurement_id.unwrap_or("");

    if let Some(measurement_id) = ga4_measurement_id {
        let ga4 = create_ga4_setup(client, account_id, container_id, measurement_id).await?;
        steps.record("GA4 Setup", &ga4);
    }

    match workflow {
        WorkflowType::Ecommerce => {
            for (event_name, extra) in ECOMMERCE_EVENTS {
                let params = ga4_event_params(measurement_override, event_name, extra);
                let outcome = client
                    .create_tag(account_id, container_id, &format!("GA4 Event - {}", event_name), "gaawe", &params)
                    .await?;
                steps.record(format!("Ecommerce Event - {}", event_name), &outcome);
            }
        }
        WorkflowType::LeadGeneration => {
            let form = create_form_tracking(client, account_id, container_id, "#contact-form", DEFAULT_FORM_EVENT)
                .await?;
            steps.record("Form Tracking", &form);

            let params = ga4_event_params(
                measurement_override,
                "cta_click",
                &[("clickElement", "{{Click Element}}")],
            );
            let cta = client
                .create_tag(account_id, container_id, "CTA Click Event", "gaawe", &params)
                .await?;
            steps.record("CTA Tracking", &cta);
        }
        WorkflowType::ContentSite => {
            for (event_name, extra) in CONTENT_EVENTS {
                let params = ga4_event_params(measurement_override, event_name, extra);
                let label = format!("Content Event - {}", event_name);
                let outcome = client
                    .create_tag(account_id, container_id, &label, "gaawe", &params)
                    .await?;
                steps.record(label, &outcome);
            }
        }
    }

    if let Some(pixel_id) = facebook_pixel_id.filter(|id| !id.is_empty()) {
        let facebook = create_facebook_pixel_setup(client, account_id, container_id, pixel_id).await?;
        steps.record("Facebook Pixel", &facebook);
    }

    Ok(steps.finish(Outcome::done().with("workflow_type", json!(workflow.as_str()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::api::testing::{client_with, unauthenticated_client};
    use reqwest::Method;
    use std::sync::Arc;

    const WORKSPACES: &str = "accounts/1/containers/2/workspaces";
    const TAGS: &str = "accounts/1/containers/2/workspaces/3/tags";
    const TRIGGERS: &str = "accounts/1/containers/2/workspaces/3/triggers";

    /// Mock that resolves the default workspace `times` times.
    fn mock_with_workspace(times: usize) -> Arc<MockApi> {
        let mock = MockApi::new();
        for _ in 0..times {
            mock.respond(Method::GET, WORKSPACES, json!({"workspace": [{"workspaceId": "3"}]}));
        }
        mock
    }

    fn posted_bodies(mock: &MockApi, path: &str) -> Vec<Value> {
        mock.requests()
            .into_iter()
            .filter(|r| r.method == Method::POST && r.path == path)
            .filter_map(|r| r.body)
            .collect()
    }

    fn labels(outcome: &Outcome) -> Vec<String> {
        outcome.to_json()["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|pair| pair[0].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_ga4_setup_creates_config_trigger_and_events() {
        let mock = mock_with_workspace(5);
        for i in 0..4 {
            mock.respond(Method::POST, TAGS, json!({"tagId": i.to_string()}));
        }
        mock.respond(Method::POST, TRIGGERS, json!({"triggerId": "9"}));
        let client = client_with(&mock);

        let outcome = create_ga4_setup(&client, "1", "2", "G-TEST").await.unwrap();
        let json = outcome.to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["setup"], "GA4 Complete Setup");
        assert_eq!(json["measurement_id"], "G-TEST");
        assert_eq!(
            labels(&outcome),
            vec![
                "GA4 Configuration Tag",
                "Page View Trigger",
                "GA4 Event - Scroll Depth",
                "GA4 Event - Outbound Click",
                "GA4 Event - File Download",
            ]
        );

        let tags = posted_bodies(&mock, TAGS);
        assert_eq!(tags.len(), 4);
        assert_eq!(tags[0]["name"], "GA4 Configuration - MCP");
        assert_eq!(tags[0]["type"], "gaawc");
        assert_eq!(tags[3]["name"], "GA4 Event - File Download - MCP");
        assert!(tags[3]["parameter"]
            .as_array()
            .unwrap()
            .contains(&json!({"key": "fileExtension", "value": "pdf,doc,docx,xls,xlsx", "type": "template"})));
    }

    #[tokio::test]
    async fn test_failed_step_does_not_stop_setup() {
        let mock = mock_with_workspace(2);
        mock.fail(Method::POST, TAGS, "Permission denied");
        mock.respond(Method::POST, TRIGGERS, json!({"triggerId": "9"}));
        let client = client_with(&mock);

        let outcome = create_facebook_pixel_setup(&client, "1", "2", "12345").await.unwrap();
        let json = outcome.to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["pixel_id"], "12345");
        assert_eq!(
            json["results"][0],
            json!(["Facebook Pixel Base", {"success": false, "error": "Permission denied"}])
        );
        assert_eq!(json["results"][1][1]["success"], true);

        let pixel = &mock.requests()[1];
        assert_eq!(
            pixel.body.as_ref().unwrap()["parameter"][0]["value"],
            "https://www.facebook.com/tr?id=12345&ev=PageView&noscript=1"
        );
    }

    #[tokio::test]
    async fn test_form_tracking_condition() {
        let mock = mock_with_workspace(2);
        mock.respond(Method::POST, TRIGGERS, json!({"triggerId": "1"}));
        mock.respond(Method::POST, TAGS, json!({"tagId": "2"}));
        let client = client_with(&mock);

        let outcome = create_form_tracking(&client, "1", "2", "#signup", DEFAULT_FORM_EVENT)
            .await
            .unwrap();
        assert_eq!(outcome.to_json()["event_name"], "form_submit");

        let triggers = posted_bodies(&mock, TRIGGERS);
        let trigger = &triggers[0];
        assert_eq!(trigger["name"], "Form Submit - #signup");
        assert_eq!(trigger["type"], "formSubmission");
        assert_eq!(trigger["customEventFilter"][0]["parameter"][1]["value"], "#signup");
    }

    #[tokio::test]
    async fn test_content_workflow_without_ga4_or_pixel() {
        let mock = mock_with_workspace(4);
        for _ in 0..4 {
            mock.respond(Method::POST, TAGS, json!({"tagId": "1"}));
        }
        let client = client_with(&mock);

        let outcome = generate_workflow(&client, "1", "2", WorkflowType::ContentSite, None, Some(""))
            .await
            .unwrap();
        assert_eq!(outcome.to_json()["workflow_type"], "content_site");
        assert_eq!(
            labels(&outcome),
            vec![
                "Content Event - newsletter_signup",
                "Content Event - social_share",
                "Content Event - video_play",
                "Content Event - article_read",
            ]
        );
        let tags = posted_bodies(&mock, TAGS);
        let first = &tags[0];
        assert!(first["parameter"]
            .as_array()
            .unwrap()
            .contains(&json!({"key": "measurementIdOverride", "value": "", "type": "template"})));
    }

    #[tokio::test]
    async fn test_lead_generation_nests_form_tracking() {
        let mock = mock_with_workspace(3);
        mock.respond(Method::POST, TRIGGERS, json!({"triggerId": "1"}));
        mock.respond(Method::POST, TAGS, json!({"tagId": "2"}));
        mock.respond(Method::POST, TAGS, json!({"tagId": "3"}));
        let client = client_with(&mock);

        let outcome = generate_workflow(&client, "1", "2", WorkflowType::LeadGeneration, None, None)
            .await
            .unwrap();
        assert_eq!(labels(&outcome), vec!["Form Tracking", "CTA Tracking"]);
        assert_eq!(
            outcome.to_json()["results"][0][1]["form_selector"],
            "#contact-form"
        );
    }

    #[tokio::test]
    async fn test_setup_requires_authentication() {
        let client = unauthenticated_client();
        let err = create_ga4_setup(&client, "1", "2", "G-1").await.unwrap_err();
        assert_eq!(err, ServiceError::NotInitialized);
    }

    #[test]
    fn test_workflow_type_names() {
        let parsed: WorkflowType = serde_json::from_value(json!("lead_generation")).unwrap();
        assert_eq!(parsed, WorkflowType::LeadGeneration);
        assert_eq!(WorkflowType::Ecommerce.as_str(), "ecommerce");
    }
}
