use rust_decimal::Decimal;
use serde::Serialize;

use crate::withdrawal::{WithdrawalRequest, WithdrawalStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub count: usize,
    pub amount: Decimal,
}

impl Bucket {
    fn add(&mut self, amount: Decimal) {
        self.count += 1;
        // Saturates at `Decimal::MAX`.
        self.amount = self.amount.checked_add(amount).unwrap_or(Decimal::MAX);
    }
}

/// Per-status counts and sums over a loaded list. A pure projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pending: Bucket,
    pub approved: Bucket,
    pub rejected: Bucket,
    pub total: Bucket,
}

impl StatusSummary {
    pub fn from_requests<'a, I>(requests: I) -> Self
    where
        I: IntoIterator<Item = &'a WithdrawalRequest>,
    {
        let mut summary = StatusSummary::default();
        for request in requests {
            summary.bucket_mut(request.status).add(request.amount);
            summary.total.add(request.amount);
        }
        summary
    }

    pub fn bucket(&self, status: WithdrawalStatus) -> &Bucket {
        match status {
            WithdrawalStatus::Pending => &self.pending,
            WithdrawalStatus::Approved => &self.approved,
            WithdrawalStatus::Rejected => &self.rejected,
        }
    }

    fn bucket_mut(&mut self, status: WithdrawalStatus) -> &mut Bucket {
        match status {
            WithdrawalStatus::Pending => &mut self.pending,
            WithdrawalStatus::Approved => &mut self.approved,
            WithdrawalStatus::Rejected => &mut self.rejected,
        }
    }
}
