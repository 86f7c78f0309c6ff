//! Checkout flow state machine.

use crate::checkout::{Address, ShippingMethod};
use crate::clock::current_timestamp;
use crate::ids::{CheckoutId, UserId};
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    /// Cart review.
    Cart,
    /// Shipping address.
    Address,
    /// Shipping method.
    Shipping,
    /// Payment method.
    Payment,
    /// Order review before submission.
    Review,
    /// Handed off to the payment gateway.
    Complete,
}

impl CheckoutStep {
    /// The default configured sequence, without `Complete`.
    pub const DEFAULT_SEQUENCE: [CheckoutStep; 5] = [
        CheckoutStep::Cart,
        CheckoutStep::Address,
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Cart => "cart",
            CheckoutStep::Address => "address",
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Review => "review",
            CheckoutStep::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cart" => Some(CheckoutStep::Cart),
            "address" => Some(CheckoutStep::Address),
            "shipping" => Some(CheckoutStep::Shipping),
            "payment" => Some(CheckoutStep::Payment),
            "review" => Some(CheckoutStep::Review),
            "complete" => Some(CheckoutStep::Complete),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Cart => "Cart",
            CheckoutStep::Address => "Address",
            CheckoutStep::Shipping => "Shipping",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Review => "Review",
            CheckoutStep::Complete => "Complete",
        }
    }
}

/// The signed-in customer checking out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub preferred_language: Option<String>,
}

impl Customer {
    pub fn new(user_id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            preferred_language: None,
        }
    }

    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.preferred_language = Some(lang.into());
        self
    }
}

/// Reject empty and guest user ids.
pub(crate) fn require_user(user_id: &UserId) -> Result<(), CommerceError> {
    let id = user_id.as_str().trim();
    if id.is_empty() || id == "guest" {
        return Err(CommerceError::Unauthenticated(
            "checkout requires a signed-in user".to_string(),
        ));
    }
    Ok(())
}

/// Checkout flow state.
///
/// Entering a step requires the data gathered by every step before it:
/// a shipping address after `address`, a shipping method after `shipping`
/// and a payment method after `payment`. Steps left out of the sequence
/// impose nothing. `complete` always comes last and is only reached by
/// handing the flow to the checkout orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFlow {
    pub id: CheckoutId,
    steps: Vec<CheckoutStep>,
    step: CheckoutStep,
    completed_steps: Vec<CheckoutStep>,
    pub customer: Customer,
    pub shipping_address: Option<Address>,
    pub shipping_method: Option<ShippingMethod>,
    /// Payment method identifier, e.g. "card".
    pub payment_method: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CheckoutFlow {
    /// Start a checkout over the default step sequence.
    pub fn new(customer: Customer) -> Result<Self, CommerceError> {
        Self::with_steps(customer, CheckoutStep::DEFAULT_SEQUENCE)
    }

    /// Start a checkout over a configured step sequence.
    ///
    /// Duplicates and any configured `complete` are dropped; `complete` is
    /// appended at the end.
    pub fn with_steps(
        customer: Customer,
        steps: impl IntoIterator<Item = CheckoutStep>,
    ) -> Result<Self, CommerceError> {
        require_user(&customer.user_id)?;

        let mut sequence = Vec::new();
        for step in steps {
            if step != CheckoutStep::Complete && !sequence.contains(&step) {
                sequence.push(step);
            }
        }
        if sequence.is_empty() {
            return Err(CommerceError::Config(
                "checkout needs at least one step".to_string(),
            ));
        }
        sequence.push(CheckoutStep::Complete);

        let now = current_timestamp();
        Ok(Self {
            id: CheckoutId::generate(),
            step: sequence[0],
            steps: sequence,
            completed_steps: Vec::new(),
            customer,
            shipping_address: None,
            shipping_method: None,
            payment_method: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Current step.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Every step including the trailing `Complete`.
    pub fn steps(&self) -> &[CheckoutStep] {
        &self.steps
    }

    pub fn completed_steps(&self) -> &[CheckoutStep] {
        &self.completed_steps
    }

    fn index_of(&self, step: CheckoutStep) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    fn current_index(&self) -> usize {
        self.index_of(self.step).unwrap_or(0)
    }

    /// Last step before `Complete`.
    pub fn final_step(&self) -> CheckoutStep {
        self.steps[self.steps.len().saturating_sub(2)]
    }

    /// Check if checkout can advance to a step.
    pub fn can_advance_to(&self, step: CheckoutStep) -> bool {
        self.index_of(step).is_some() && self.missing_for_step(step).is_empty()
    }

    /// Data missing to enter `step`.
    pub fn missing_for_step(&self, step: CheckoutStep) -> Vec<&'static str> {
        let Some(target) = self.index_of(step) else {
            return Vec::new();
        };

        let mut missing = Vec::new();
        for earlier in &self.steps[..target] {
            match earlier {
                CheckoutStep::Address => {
                    if !self.shipping_address.as_ref().is_some_and(|a| a.is_complete()) {
                        missing.push("shipping address");
                    }
                }
                CheckoutStep::Shipping => {
                    if self.shipping_method.is_none() {
                        missing.push("shipping method");
                    }
                }
                CheckoutStep::Payment => {
                    if self.payment_method.is_none() {
                        missing.push("payment method");
                    }
                }
                _ => {}
            }
        }
        missing
    }

    /// Advance to the next step.
    pub fn advance(&mut self) -> Result<CheckoutStep, CommerceError> {
        let next = self.steps.get(self.current_index() + 1).copied();
        let next = match next {
            Some(step) if step != CheckoutStep::Complete => step,
            _ => {
                return Err(CommerceError::InvalidCheckoutTransition {
                    from: self.step.as_str().to_string(),
                    to: CheckoutStep::Complete.as_str().to_string(),
                })
            }
        };

        let missing = self.missing_for_step(next);
        if !missing.is_empty() {
            return Err(CommerceError::CheckoutIncomplete(missing.join(", ")));
        }

        self.enter(next);
        Ok(next)
    }

    fn enter(&mut self, next: CheckoutStep) {
        if !self.completed_steps.contains(&self.step) {
            self.completed_steps.push(self.step);
        }
        self.step = next;
        self.updated_at = current_timestamp();
    }

    /// Go back to the previous step.
    pub fn go_back(&mut self) -> Result<CheckoutStep, CommerceError> {
        let index = self.current_index();
        if index == 0 || self.is_complete() {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: "none".to_string(),
            });
        }

        let prev = self.steps[index - 1];
        self.step = prev;
        self.updated_at = current_timestamp();
        Ok(prev)
    }

    /// Go to a completed step or the next one.
    pub fn go_to(&mut self, step: CheckoutStep) -> Result<(), CommerceError> {
        if self.is_complete() {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.step.as_str().to_string(),
                to: step.as_str().to_string(),
            });
        }
        if step == self.step || self.completed_steps.contains(&step) {
            self.step = step;
            self.updated_at = current_timestamp();
            return Ok(());
        }
        if self.index_of(step) == Some(self.current_index() + 1) {
            self.advance()?;
            return Ok(());
        }
        Err(CommerceError::InvalidCheckoutTransition {
            from: self.step.as_str().to_string(),
            to: step.as_str().to_string(),
        })
    }

    /// At the final step with everything `Complete` needs.
    pub fn is_ready(&self) -> bool {
        self.step == self.final_step() && self.missing_for_step(CheckoutStep::Complete).is_empty()
    }

    pub(crate) fn mark_complete(&mut self) {
        self.enter(CheckoutStep::Complete);
    }

    pub fn set_shipping_address(&mut self, address: Address) {
        self.shipping_address = Some(address);
        self.updated_at = current_timestamp();
    }

    pub fn set_shipping_method(&mut self, method: ShippingMethod) {
        self.shipping_method = Some(method);
        self.updated_at = current_timestamp();
    }

    pub fn set_payment_method(&mut self, method: impl Into<String>) {
        self.payment_method = Some(method.into());
        self.updated_at = current_timestamp();
    }

    /// Check if checkout is complete.
    pub fn is_complete(&self) -> bool {
        self.step == CheckoutStep::Complete
    }

    /// Get progress percentage.
    pub fn progress_percent(&self) -> u8 {
        let done = self.current_index() + 1;
        ((done as f64 / self.steps.len() as f64) * 100.0) as u8
    }
}
