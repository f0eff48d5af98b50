use crate::{
    Income, IncomePatch, NewIncome, ResultEngine, Snapshot,
    util::{new_id, normalize_currency, normalize_optional_text, validate_amount},
};

use super::position_by_id;

impl Snapshot {
    /// Appends a new income record. Returns the new snapshot and the id.
    pub fn add_income(&self, cmd: NewIncome) -> ResultEngine<(Snapshot, String)> {
        validate_amount(cmd.amount, "income")?;
        let income = Income {
            id: new_id(),
            amount: cmd.amount,
            currency: normalize_currency(&cmd.currency)?,
            date: cmd.date,
            description: normalize_optional_text(cmd.description.as_deref()),
        };
        let id = income.id.clone();

        let mut next = self.clone();
        next.income.push(income);
        tracing::debug!("income {id} added");
        Ok((next, id))
    }

    pub fn update_income(&self, id: &str, patch: IncomePatch) -> ResultEngine<Snapshot> {
        let index = position_by_id(&self.income, id, "income", |i| i.id.as_str())?;
        let mut updated = self.income[index].clone();
        if let Some(amount) = patch.amount {
            validate_amount(amount, "income")?;
            updated.amount = amount;
        }
        if let Some(currency) = patch.currency {
            updated.currency = normalize_currency(&currency)?;
        }
        if let Some(date) = patch.date {
            updated.date = date;
        }
        if let Some(description) = patch.description {
            updated.description = normalize_optional_text(description.as_deref());
        }

        let mut next = self.clone();
        next.income[index] = updated;
        Ok(next)
    }

    pub fn delete_income(&self, id: &str) -> ResultEngine<Snapshot> {
        let index = position_by_id(&self.income, id, "income", |i| i.id.as_str())?;
        let mut next = self.clone();
        next.income.remove(index);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::EngineError;

    use super::*;

    fn june() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn add_income_keeps_input_untouched() {
        let snapshot = Snapshot::bootstrap();
        let (next, id) = snapshot
            .add_income(NewIncome::new(2000.0, "eur", june()).description(" Salary "))
            .unwrap();

        assert!(snapshot.income.is_empty());
        assert_eq!(next.income.len(), 1);
        let income = &next.income[0];
        assert_eq!(income.id, id);
        assert_eq!(income.currency, "EUR");
        assert_eq!(income.description.as_deref(), Some("Salary"));
    }

    #[test]
    fn add_income_rejects_non_positive() {
        let snapshot = Snapshot::bootstrap();
        let err = snapshot
            .add_income(NewIncome::new(0.0, "EUR", june()))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("income amount must be > 0, got 0".to_string())
        );
    }

    #[test]
    fn update_merges_fields() {
        let (snapshot, id) = Snapshot::bootstrap()
            .add_income(NewIncome::new(100.0, "EUR", june()).description("Gift"))
            .unwrap();
        let next = snapshot
            .update_income(&id, IncomePatch::default().amount(150.0))
            .unwrap();
        assert_eq!(next.income[0].amount, 150.0);
        assert_eq!(next.income[0].description.as_deref(), Some("Gift"));

        assert!(snapshot
            .update_income(&id, IncomePatch::default().amount(-1.0))
            .is_err());
    }

    #[test]
    fn delete_unknown_is_key_not_found() {
        let snapshot = Snapshot::bootstrap();
        assert_eq!(
            snapshot.delete_income("missing"),
            Err(EngineError::KeyNotFound("income missing".to_string()))
        );
    }
}
