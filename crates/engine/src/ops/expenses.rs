use crate::{
    EngineError, Expense, ExpensePatch, NewExpense, ResultEngine, Snapshot,
    util::{new_id, normalize_currency, normalize_optional_text, validate_amount},
};

use super::position_by_id;

fn validate_category_id(category_id: &str) -> ResultEngine<String> {
    let trimmed = category_id.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(
            "expense category id must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl Snapshot {
    /// Appends a new expense record. Returns the new snapshot and the id.
    ///
    /// The category id is not checked against the registry: an expense may
    /// outlive its category and is then reported under "Other".
    pub fn add_expense(&self, cmd: NewExpense) -> ResultEngine<(Snapshot, String)> {
        validate_amount(cmd.amount, "expense")?;
        let category_id = validate_category_id(&cmd.category_id)?;
        if self.category(&category_id).is_none() {
            tracing::debug!("expense references unknown category {category_id}");
        }
        let expense = Expense {
            id: new_id(),
            category_id,
            amount: cmd.amount,
            currency: normalize_currency(&cmd.currency)?,
            date: cmd.date,
            description: normalize_optional_text(cmd.description.as_deref()),
        };
        let id = expense.id.clone();

        let mut next = self.clone();
        next.expenses.push(expense);
        Ok((next, id))
    }

    pub fn update_expense(&self, id: &str, patch: ExpensePatch) -> ResultEngine<Snapshot> {
        let index = position_by_id(&self.expenses, id, "expense", |e| e.id.as_str())?;
        let mut updated = self.expenses[index].clone();
        if let Some(category_id) = patch.category_id {
            updated.category_id = validate_category_id(&category_id)?;
        }
        if let Some(amount) = patch.amount {
            validate_amount(amount, "expense")?;
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
        next.expenses[index] = updated;
        Ok(next)
    }

    pub fn delete_expense(&self, id: &str) -> ResultEngine<Snapshot> {
        let index = position_by_id(&self.expenses, id, "expense", |e| e.id.as_str())?;
        let mut next = self.clone();
        next.expenses.remove(index);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
    }

    #[test]
    fn add_expense_accepts_dangling_category() {
        let snapshot = Snapshot::bootstrap();
        let (next, _) = snapshot
            .add_expense(NewExpense::new("deleted-category", 10.0, "EUR", at()))
            .unwrap();
        assert_eq!(next.expenses.len(), 1);
        assert_eq!(next.category_label("deleted-category"), "Other");
    }

    #[test]
    fn add_expense_requires_category_id() {
        let snapshot = Snapshot::bootstrap();
        let err = snapshot
            .add_expense(NewExpense::new("  ", 10.0, "EUR", at()))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation("expense category id must not be empty".to_string())
        );
    }

    #[test]
    fn update_and_delete() {
        let (snapshot, id) = Snapshot::bootstrap()
            .add_expense(NewExpense::new("1", 25.0, "USD", at()))
            .unwrap();
        let next = snapshot
            .update_expense(
                &id,
                ExpensePatch::default()
                    .category_id("2")
                    .description(Some("Bus".into())),
            )
            .unwrap();
        assert_eq!(next.expenses[0].category_id, "2");
        assert_eq!(next.expenses[0].currency, "USD");
        assert_eq!(next.expenses[0].description.as_deref(), Some("Bus"));

        let next = next.delete_expense(&id).unwrap();
        assert!(next.expenses.is_empty());
    }
}
