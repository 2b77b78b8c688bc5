//! Checkout page fragments
//!
//! View models for the four screens of the checkout UI. The frontend renders
//! them; this module only decides what each screen needs to know.

use crate::database::order_store::Order;
use crate::error::{CheckoutError, CheckoutResult};
use crate::payments::types::{PaymentArtifact, PaymentFlow, TransactionStatus};
use crate::services::transaction_orchestrator::DEFAULT_ITEM_NAME;
use serde::Serialize;
use std::str::FromStr;

/// How often the pay screen polls the status endpoint.
pub const POLL_INTERVAL_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Checkout,
    Pay,
    Success,
    Failed,
}

impl FromStr for ViewKind {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkout" => Ok(ViewKind::Checkout),
            "pay" => Ok(ViewKind::Pay),
            "success" => Ok(ViewKind::Success),
            "failed" => Ok(ViewKind::Failed),
            other => Err(CheckoutError::UnknownView {
                view: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewContext {
    pub min_amount: i64,
    pub client_key: Option<String>,
    pub snap_js_url: String,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: String,
    pub flow: PaymentFlow,
    pub item_name: String,
    pub quantity: u32,
    pub gross_amount: i64,
    pub status: TransactionStatus,
    pub is_final: bool,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            flow: order.flow,
            item_name: order.item_name.clone(),
            quantity: order.quantity,
            gross_amount: order.gross_amount,
            status: order.status,
            is_final: order.is_final(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapClient {
    pub client_key: Option<String>,
    pub script_url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "view", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ViewFragment {
    Checkout {
        min_amount: i64,
        default_item_name: String,
        flows: Vec<PaymentFlow>,
    },
    Pay {
        order: OrderSummary,
        artifact: PaymentArtifact,
        status_url: String,
        poll_interval_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        snap: Option<SnapClient>,
    },
    Success {
        order: OrderSummary,
    },
    Failed {
        order: OrderSummary,
    },
}

/// Builds the view model for `view`.
///
/// Every view except `checkout` needs an order; a missing one is reported as
/// `OrderRequired`, which the route answers with 404.
pub fn render_fragment(
    view: &str,
    order: Option<&Order>,
    ctx: &ViewContext,
) -> CheckoutResult<ViewFragment> {
    match ViewKind::from_str(view)? {
        ViewKind::Checkout => Ok(ViewFragment::Checkout {
            min_amount: ctx.min_amount,
            default_item_name: DEFAULT_ITEM_NAME.to_string(),
            flows: vec![PaymentFlow::Qris, PaymentFlow::Snap],
        }),
        ViewKind::Pay => pay_fragment(require_order(view, order)?, ctx),
        ViewKind::Success => Ok(ViewFragment::Success {
            order: require_order(view, order)?.into(),
        }),
        ViewKind::Failed => Ok(ViewFragment::Failed {
            order: require_order(view, order)?.into(),
        }),
    }
}

fn require_order<'a>(view: &str, order: Option<&'a Order>) -> CheckoutResult<&'a Order> {
    order.ok_or_else(|| CheckoutError::OrderRequired {
        view: view.to_string(),
    })
}

fn pay_fragment(order: &Order, ctx: &ViewContext) -> CheckoutResult<ViewFragment> {
    // Placeholder orders have nothing to pay with.
    let artifact = order
        .payment_artifact
        .clone()
        .ok_or_else(|| CheckoutError::NotFound {
            order_id: order.order_id.clone(),
        })?;
    let snap = (order.flow == PaymentFlow::Snap).then(|| SnapClient {
        client_key: ctx.client_key.clone(),
        script_url: ctx.snap_js_url.clone(),
    });

    Ok(ViewFragment::Pay {
        status_url: format!("/api/{}/status/{}", order.flow, order.order_id),
        order: OrderSummary::from(order),
        artifact,
        poll_interval_ms: ctx.poll_interval_ms,
        snap,
    })
}
