//! Read-modify-write arithmetic on numeric entries.
//!
//! There is no compare-and-swap: two clients adjusting one entry at the same
//! time can lose an update.

use crate::cache::client::WriteKind;
use crate::cache::{CacheClient, CacheError, CacheValue, Number, Timeout};

#[derive(Debug, Clone, Copy)]
pub(super) enum Adjustment {
    Add(Number),
    Mul(Number),
}

impl Adjustment {
    fn apply(self, base: Number) -> Number {
        match self {
            Adjustment::Add(amount) => base.add(amount),
            Adjustment::Mul(amount) => base.mul(amount),
        }
    }

    pub(super) fn is_identity(self) -> bool {
        match self {
            Adjustment::Add(amount) => amount.is_zero(),
            Adjustment::Mul(amount) => amount.is_one(),
        }
    }
}

impl CacheClient {
    /// Add `amount` to the number stored under `name`.
    ///
    /// Nothing happens when the entry is missing or expired.
    pub async fn inc(
        &mut self,
        name: &str,
        amount: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        self.inc_many(&[name], amount, timeout).await
    }

    /// Add `amount` to every name, or to none if any of them is missing.
    pub async fn inc_many<S: AsRef<str>>(
        &mut self,
        names: &[S],
        amount: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        self.adjust(names, Adjustment::Add(amount.into()), timeout).await?;
        Ok(self)
    }

    pub async fn dec(
        &mut self,
        name: &str,
        amount: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        self.dec_many(&[name], amount, timeout).await
    }

    pub async fn dec_many<S: AsRef<str>>(
        &mut self,
        names: &[S],
        amount: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        let amount = amount.into().negate();
        self.adjust(names, Adjustment::Add(amount), timeout).await?;
        Ok(self)
    }

    pub async fn mult(
        &mut self,
        name: &str,
        factor: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        self.mult_many(&[name], factor, timeout).await
    }

    pub async fn mult_many<S: AsRef<str>>(
        &mut self,
        names: &[S],
        factor: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        self.adjust(names, Adjustment::Mul(factor.into()), timeout).await?;
        Ok(self)
    }

    /// Divide the number stored under `name`. The result is always a float.
    pub async fn div(
        &mut self,
        name: &str,
        divisor: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        self.div_many(&[name], divisor, timeout).await
    }

    pub async fn div_many<S: AsRef<str>>(
        &mut self,
        names: &[S],
        divisor: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        let divisor = divisor.into();
        if divisor.is_zero() {
            self.report(CacheError::DivisionByZero)?;
            return Ok(self);
        }
        self.adjust(names, Adjustment::Mul(divisor.reciprocal()), timeout)
            .await?;
        Ok(self)
    }

    pub(super) async fn adjust<S: AsRef<str>>(
        &mut self,
        names: &[S],
        adjustment: Adjustment,
        timeout: Timeout,
    ) -> Result<(), CacheError> {
        if names.is_empty() || adjustment.is_identity() {
            return Ok(());
        }

        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let current = self.read_batch(&names, false).await?;

        let mut updates = Vec::with_capacity(current.len());
        for (name, value) in current {
            let Some(value) = value else {
                tracing::debug!(name = %name, "Skipping arithmetic on missing entry");
                return Ok(());
            };
            let Some(base) = value.as_number() else {
                return self.report(CacheError::NotNumeric { name });
            };
            updates.push((name, adjustment.apply(base)));
        }

        for (name, result) in updates {
            let value = CacheValue::from(result);
            self.write_entry(&name, &value, timeout, WriteKind::Set)
                .await?;
        }
        Ok(())
    }
}
