//! Stripe webhook event model.
//!
//! Only two event kinds carry state this service acts on; everything else
//! falls through to [`StripeEvent::Ignored`], which mutates nothing but is
//! still acknowledged with a 200 so Stripe stops redelivering. Modeling the
//! fallthrough explicitly means a future event kind can never panic the
//! handler.

use serde_json::Value;
use uuid::Uuid;

/// A verified inbound payment-provider event, reduced to the fields the
/// reconciler needs.
#[derive(Debug, Clone, PartialEq)]
pub enum StripeEvent {
    /// `checkout.session.completed` — a user finished the hosted checkout.
    ///
    /// Carries the user identity we stamped into the session metadata and the
    /// customer reference Stripe assigned.
    CheckoutSessionCompleted {
        user_id: Option<Uuid>,
        customer: Option<String>,
    },

    /// `invoice.payment_succeeded` — a recurring payment renewed.
    ///
    /// Renewal events omit our metadata, so the profile is resolved by the
    /// stored customer reference instead.
    InvoicePaymentSucceeded { customer: Option<String> },

    /// Any other event kind. Acknowledged, never acted on.
    Ignored(String),
}

impl StripeEvent {
    /// Parse a verified webhook payload into an event.
    ///
    /// Returns `None` only when the payload is not JSON or lacks a `type`
    /// discriminator. Missing inner fields (metadata, customer) do not fail
    /// the parse; the reconciler treats them as no-ops.
    pub fn parse(payload: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(payload).ok()?;
        let event_type = value.get("type")?.as_str()?.to_string();
        let object = value.pointer("/data/object");

        let event = match event_type.as_str() {
            "checkout.session.completed" => {
                let user_id = object
                    .and_then(|o| o.pointer("/metadata/user_id"))
                    .and_then(Value::as_str)
                    .and_then(|s| Uuid::parse_str(s).ok());
                let customer = object
                    .and_then(|o| o.get("customer"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Self::CheckoutSessionCompleted { user_id, customer }
            }
            "invoice.payment_succeeded" => {
                let customer = object
                    .and_then(|o| o.get("customer"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Self::InvoicePaymentSucceeded { customer }
            }
            _ => Self::Ignored(event_type),
        };

        Some(event)
    }
}
