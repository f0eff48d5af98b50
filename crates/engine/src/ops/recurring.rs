use chrono::NaiveDate;

use crate::{
    EngineError, Expense, NewRecurringPayment, RecurringPayment, ResultEngine, Snapshot,
    util::{new_id, normalize_currency, normalize_display, validate_amount},
};

use super::position_by_id;

/// Outcome of [`Snapshot::run_due_payments`].
#[derive(Clone, Debug, PartialEq)]
pub struct DueRun {
    pub snapshot: Snapshot,
    /// Ids of the expenses created, in payment order.
    pub created: Vec<String>,
}

impl Snapshot {
    pub fn add_recurring_payment(
        &self,
        cmd: NewRecurringPayment,
    ) -> ResultEngine<(Snapshot, String)> {
        let name = normalize_display(&cmd.name, "payment name")?;
        validate_amount(cmd.amount, "payment")?;
        let category_id = cmd.category_id.trim().to_string();
        if category_id.is_empty() {
            return Err(EngineError::Validation(
                "payment category id must not be empty".to_string(),
            ));
        }
        if cmd.max_executions == Some(0) {
            return Err(EngineError::Validation(
                "max executions must be at least 1".to_string(),
            ));
        }
        let currency = match cmd.currency {
            Some(code) => normalize_currency(&code)?,
            None => self.settings.default_currency.clone(),
        };

        let payment = RecurringPayment {
            id: new_id(),
            name,
            amount: cmd.amount,
            currency,
            category_id,
            frequency: cmd.frequency,
            next_due: cmd.start,
            active: true,
            times_executed: 0,
            max_executions: cmd.max_executions,
        };
        let id = payment.id.clone();

        let mut next = self.clone();
        next.recurring_payments.push(payment);
        Ok((next, id))
    }

    /// Pauses or resumes a payment.
    pub fn set_payment_active(&self, id: &str, active: bool) -> ResultEngine<Snapshot> {
        let index = position_by_id(&self.recurring_payments, id, "payment", |p| p.id.as_str())?;
        let mut next = self.clone();
        next.recurring_payments[index].active = active;
        Ok(next)
    }

    pub fn delete_recurring_payment(&self, id: &str) -> ResultEngine<Snapshot> {
        let index = position_by_id(&self.recurring_payments, id, "payment", |p| p.id.as_str())?;
        let mut next = self.clone();
        next.recurring_payments.remove(index);
        Ok(next)
    }

    /// Executes every active payment due on or before `today`.
    ///
    /// Each due payment becomes one expense dated `today` (midnight UTC) and
    /// is advanced once, so a payment that is several periods late catches
    /// up one period per call.
    pub fn run_due_payments(&self, today: NaiveDate) -> DueRun {
        let mut next = self.clone();
        let mut created = Vec::new();
        let date = today
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_default();

        for payment in next.recurring_payments.iter_mut() {
            if !payment.is_due(today) {
                continue;
            }
            let expense = Expense {
                id: new_id(),
                category_id: payment.category_id.clone(),
                amount: payment.amount,
                currency: payment.currency.clone(),
                date,
                description: Some(format!("Auto: {}", payment.name)),
            };
            created.push(expense.id.clone());
            next.expenses.push(expense);
            payment.record_execution();
            tracing::info!("executed automatic payment {}", payment.name);
        }

        DueRun {
            snapshot: next,
            created,
        }
    }
}
