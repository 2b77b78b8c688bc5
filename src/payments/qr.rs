//! QR image URL extraction from QRIS charge responses.
//!
//! Midtrans has renamed the QR action across API versions, so the URL is
//! located by trying an ordered list of strategies instead of a fixed name.

use crate::payments::types::GatewayAction;
use serde_json::Value as JsonValue;

/// Action name used by current API versions.
pub const QR_ACTION_V2: &str = "generate-qr-code-v2";
/// Action name used by older API versions.
pub const QR_ACTION_V1: &str = "generate-qr-code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMatch {
    /// Name equals the given identifier, ignoring case.
    ExactName(&'static str),
    /// Name contains the given substring, ignoring case.
    NameContains(&'static str),
    /// Any action carrying a URL.
    AnyUrl,
}

pub const QR_STRATEGIES: [ActionMatch; 4] = [
    ActionMatch::ExactName(QR_ACTION_V2),
    ActionMatch::ExactName(QR_ACTION_V1),
    ActionMatch::NameContains("qr"),
    ActionMatch::AnyUrl,
];

impl ActionMatch {
    fn matches(&self, action: &GatewayAction) -> bool {
        let name = action.name.as_deref().unwrap_or("").to_lowercase();
        match self {
            ActionMatch::ExactName(expected) => name == *expected,
            ActionMatch::NameContains(needle) => name.contains(needle),
            ActionMatch::AnyUrl => true,
        }
    }
}

fn usable_url(action: &GatewayAction) -> Option<&str> {
    action
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
}

/// Returns the URL of the first action matched by [`QR_STRATEGIES`].
pub fn extract_qr_url(actions: &[GatewayAction]) -> Option<String> {
    QR_STRATEGIES.iter().find_map(|strategy| {
        actions
            .iter()
            .filter(|action| strategy.matches(action))
            .find_map(usable_url)
            .map(str::to_string)
    })
}

/// Reads the `actions` array of a raw charge response. Entries that do not
/// look like actions are skipped.
pub fn actions_from_response(raw: &JsonValue) -> Vec<GatewayAction> {
    raw.get("actions")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<GatewayAction>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
