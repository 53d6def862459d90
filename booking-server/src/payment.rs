//! Payment gateway port and the development gateway.
//!
//! Real payment processing happens elsewhere; the booking flow only needs
//! to charge a card and learn whether the charge stuck. [`MockGateway`]
//! stands in for the processor in development and tests.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::Money;

/// Errors surfaced by a payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    /// The processor refused the charge. Not a fault; the booking flow
    /// compensates and reports it to the customer.
    #[error("payment declined: {reason}")]
    Declined { reason: String },

    /// The processor could not be reached.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Error returned when card details fail local validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid card details: {reason}")]
pub struct InvalidCard {
    reason: &'static str,
}

/// Card details captured at checkout.
///
/// Only shape validation happens here (the processor decides whether the
/// card is real). The number never appears in `Debug` output or logs; only
/// the last four digits do.
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    number: String,
    holder: String,
}

impl CardDetails {
    /// Parse card details.
    ///
    /// The number may contain spaces or hyphens as separators and must
    /// leave 12 to 19 digits; the holder name must be non-empty.
    pub fn parse(number: &str, holder: &str) -> Result<Self, InvalidCard> {
        let digits: String = number
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidCard {
                reason: "number must contain only digits and separators",
            });
        }

        if digits.len() < 12 || digits.len() > 19 {
            return Err(InvalidCard {
                reason: "number must have 12 to 19 digits",
            });
        }

        let holder = holder.trim();
        if holder.is_empty() {
            return Err(InvalidCard {
                reason: "holder name must not be empty",
            });
        }

        Ok(CardDetails {
            number: digits,
            holder: holder.to_owned(),
        })
    }

    /// Last four digits of the card number, safe to show and log.
    pub fn last4(&self) -> &str {
        &self.number[self.number.len() - 4..]
    }

    /// The holder name as entered.
    pub fn holder(&self) -> &str {
        &self.holder
    }

    fn number(&self) -> &str {
        &self.number
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardDetails(****{}, {})", self.last4(), self.holder)
    }
}

/// Proof that a charge went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Processor-side identifier for the charge.
    pub payment_id: Uuid,
    /// The amount actually charged.
    pub amount: Money,
}

/// Charge cards for bookings.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` to the card. A successful return means the money
    /// moved; any error means it did not.
    async fn charge(
        &self,
        card: &CardDetails,
        amount: Money,
    ) -> Result<PaymentReceipt, PaymentError>;
}

/// Card numbers ending in these digits are declined by [`MockGateway`],
/// so decline handling can be exercised end to end.
const DECLINE_SUFFIX: &str = "0002";

/// In-process gateway for development and tests.
///
/// Approves every charge except cards whose number ends in `0002`, and
/// records the receipts it issued so tests can assert on what was charged.
/// Cheap to clone; clones share the receipt log.
#[derive(Clone, Default)]
pub struct MockGateway {
    receipts: Arc<Mutex<Vec<PaymentReceipt>>>,
}

impl MockGateway {
    /// Create a gateway with an empty receipt log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Receipts issued so far, oldest first.
    pub async fn receipts(&self) -> Vec<PaymentReceipt> {
        self.receipts.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn charge(
        &self,
        card: &CardDetails,
        amount: Money,
    ) -> Result<PaymentReceipt, PaymentError> {
        if card.number().ends_with(DECLINE_SUFFIX) {
            return Err(PaymentError::Declined {
                reason: "card declined by issuer".to_owned(),
            });
        }

        let receipt = PaymentReceipt {
            payment_id: Uuid::new_v4(),
            amount,
        };

        self.receipts.lock().await.push(receipt.clone());
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_separators() {
        let card = CardDetails::parse("4242 4242-4242 4242", "Alice Advani").unwrap();
        assert_eq!(card.last4(), "4242");
        assert_eq!(card.holder(), "Alice Advani");
    }

    #[test]
    fn parse_rejects_bad_numbers() {
        assert!(CardDetails::parse("", "Alice").is_err());
        assert!(CardDetails::parse("4242", "Alice").is_err());
        assert!(CardDetails::parse("4242424242424242424242", "Alice").is_err());
        assert!(CardDetails::parse("4242-4242-abcd-4242", "Alice").is_err());
    }

    #[test]
    fn parse_rejects_empty_holder() {
        assert!(CardDetails::parse("4242424242424242", "  ").is_err());
    }

    #[test]
    fn debug_redacts_the_number() {
        let card = CardDetails::parse("4242424242424242", "Alice Advani").unwrap();
        let rendered = format!("{card:?}");
        assert!(rendered.contains("****4242"));
        assert!(!rendered.contains("4242424242424242"));
    }

    #[tokio::test]
    async fn mock_gateway_approves_and_records() {
        let gateway = MockGateway::new();
        let card = CardDetails::parse("4242424242424242", "Alice Advani").unwrap();

        let receipt = gateway.charge(&card, Money::from_cents(9000)).await.unwrap();
        assert_eq!(receipt.amount, Money::from_cents(9000));

        let receipts = gateway.receipts().await;
        assert_eq!(receipts, vec![receipt]);
    }

    #[tokio::test]
    async fn mock_gateway_declines_the_test_suffix() {
        let gateway = MockGateway::new();
        let card = CardDetails::parse("4000000000000002", "Alice Advani").unwrap();

        let err = gateway.charge(&card, Money::from_cents(100)).await.unwrap_err();
        assert!(matches!(err, PaymentError::Declined { .. }));
        assert!(gateway.receipts().await.is_empty());
    }
}
