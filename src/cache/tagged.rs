//! Operations applied to every member of the active tag.

use crate::cache::arithmetic::Adjustment;
use crate::cache::client::{Fetched, WriteKind};
use crate::cache::{CacheClient, CacheError, CacheValue, Number, Timeout};

impl CacheClient {
    /// Logical names recorded under the active tags.
    pub async fn tag_members(&mut self) -> Result<Vec<String>, CacheError> {
        Ok(self.resolve_members("list").await?.unwrap_or_default())
    }

    /// Overwrite every member with `value`.
    pub async fn set_by_tag(
        &mut self,
        value: impl Into<CacheValue>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        let value = value.into();
        if let Some(members) = self.resolve_members("set").await? {
            for name in members {
                self.write_entry(&name, &value, timeout, WriteKind::Set)
                    .await?;
            }
        }
        Ok(self)
    }

    /// Add `value` under every member. Members that still exist are reported
    /// as write failures.
    pub async fn add_by_tag(
        &mut self,
        value: impl Into<CacheValue>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        let value = value.into();
        if let Some(members) = self.resolve_members("add").await? {
            for name in members {
                self.write_entry(&name, &value, timeout, WriteKind::Add)
                    .await?;
            }
        }
        Ok(self)
    }

    pub async fn get_by_tag(&mut self) -> Result<Fetched, CacheError> {
        match self.resolve_members("get").await? {
            Some(members) => self.get_many(members.as_slice()).await,
            None => Ok(Fetched::new()),
        }
    }

    /// Delete every member and the index entries of the active tags.
    pub async fn delete_by_tag(&mut self) -> Result<&mut Self, CacheError> {
        let Some(members) = self.resolve_members("delete").await? else {
            return Ok(self);
        };
        let mut keys: Vec<String> = members
            .iter()
            .map(|name| self.namespace().key(name))
            .collect();
        keys.extend(self.tag_index().index_keys(self.namespace()));
        tracing::debug!(members = members.len(), "Deleting tagged entries");
        self.delete_keys(keys).await?;
        Ok(self)
    }

    pub async fn inc_by_tag(
        &mut self,
        amount: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        self.adjust_by_tag("inc", Adjustment::Add(amount.into()), timeout)
            .await
    }

    pub async fn dec_by_tag(
        &mut self,
        amount: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        let amount = amount.into().negate();
        self.adjust_by_tag("dec", Adjustment::Add(amount), timeout)
            .await
    }

    pub async fn mult_by_tag(
        &mut self,
        factor: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        self.adjust_by_tag("mult", Adjustment::Mul(factor.into()), timeout)
            .await
    }

    pub async fn div_by_tag(
        &mut self,
        divisor: impl Into<Number>,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        let divisor = divisor.into();
        if divisor.is_zero() {
            self.report(CacheError::DivisionByZero)?;
            return Ok(self);
        }
        self.adjust_by_tag("div", Adjustment::Mul(divisor.reciprocal()), timeout)
            .await
    }

    /// Each member is adjusted on its own, so missing members are skipped
    /// without stopping the others.
    async fn adjust_by_tag(
        &mut self,
        operation: &'static str,
        adjustment: Adjustment,
        timeout: Timeout,
    ) -> Result<&mut Self, CacheError> {
        if adjustment.is_identity() {
            return Ok(self);
        }
        if let Some(members) = self.resolve_members(operation).await? {
            for name in members {
                self.adjust(&[name], adjustment, timeout).await?;
            }
        }
        Ok(self)
    }

    /// `None` when no tag is active; index read failures count as empty.
    async fn resolve_members(
        &mut self,
        operation: &'static str,
    ) -> Result<Option<Vec<String>>, CacheError> {
        if self.active_tag().is_none() {
            self.report(CacheError::unset_tag(operation))?;
            return Ok(None);
        }
        let result = {
            let ctx = self.index_context();
            self.tag_index().members(&ctx).await
        };
        match result {
            Ok(members) => Ok(Some(members)),
            Err(e) => {
                self.report(e)?;
                Ok(Some(Vec::new()))
            }
        }
    }
}
