use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CodecError, CodecResult};
use crate::types::common::PAYMENT_REF_MAX;

/// Identifier attached to a payment so the recipient can match it up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentRef(pub u64);

impl PaymentRef {
    pub fn new(value: u64) -> CodecResult<Self> {
        let payment_ref = Self(value);
        payment_ref.validate()?;
        Ok(payment_ref)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn validate(&self) -> CodecResult<()> {
        if self.0 > PAYMENT_REF_MAX {
            return Err(CodecError::validation(format!(
                "payment reference {} above {}",
                self.0, PAYMENT_REF_MAX
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.0 <= PAYMENT_REF_MAX
    }

    /// Uniformly chosen reference from the thread-local generator
    pub fn random() -> Self {
        Self::random_with(&mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..=PAYMENT_REF_MAX))
    }
}

impl fmt::Display for PaymentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<PaymentRef> for u64 {
    fn from(payment_ref: PaymentRef) -> Self {
        payment_ref.0
    }
}
