use std::collections::HashSet;

use crate::{
    Category, CategoryPatch, EngineError, MonthKey, NewCategory, RateTable, ResultEngine,
    Snapshot, allocator,
    categories::OTHER_LABEL,
    presets::preset_group,
    util::{new_id, normalize_currency, normalize_display, normalize_key, validate_limit},
};

use super::position_by_id;

impl Snapshot {
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Display name for a category id; deleted categories read as "Other".
    pub fn category_label(&self, id: &str) -> &str {
        self.category(id)
            .map_or(OTHER_LABEL, |category| category.name.as_str())
    }

    /// Finds a category by id or by name (case, accents and punctuation
    /// ignored). When nothing matches, the error names the closest existing
    /// category if one is near enough to be a typo.
    pub fn resolve_category(&self, input: &str) -> ResultEngine<&Category> {
        let input = input.trim();
        if let Some(category) = self.category(input) {
            return Ok(category);
        }

        let key = normalize_key(input);
        if let Some(category) = self
            .categories
            .iter()
            .find(|category| normalize_key(&category.name) == key)
        {
            return Ok(category);
        }

        let threshold = similarity_threshold(&key);
        let suggestion = self
            .categories
            .iter()
            .map(|category| (levenshtein(&key, &normalize_key(&category.name)), category))
            .filter(|(distance, _)| *distance <= threshold)
            .min_by_key(|(distance, _)| *distance);

        match suggestion {
            Some((_, category)) => Err(EngineError::KeyNotFound(format!(
                "category '{input}' (did you mean '{}'?)",
                category.name
            ))),
            None => Err(EngineError::KeyNotFound(format!("category '{input}'"))),
        }
    }

    /// Adds a category. Names must be unique once normalized.
    pub fn add_category(&self, cmd: NewCategory) -> ResultEngine<(Snapshot, String)> {
        let name = normalize_display(&cmd.name, "category name")?;
        validate_limit(cmd.limit)?;
        self.ensure_unique_name(&name, None)?;
        let currency = match cmd.currency {
            Some(code) => normalize_currency(&code)?,
            None => self.settings.default_currency.clone(),
        };

        let category = Category {
            id: new_id(),
            name,
            icon: cmd.icon,
            color: cmd.color,
            limit: cmd.limit,
            currency,
            allocation_bucket: cmd.bucket,
        };
        let id = category.id.clone();

        let mut next = self.clone();
        next.categories.push(category);
        Ok((next, id))
    }

    pub fn update_category(&self, id: &str, patch: CategoryPatch) -> ResultEngine<Snapshot> {
        let index = position_by_id(&self.categories, id, "category", |c| c.id.as_str())?;
        let mut updated = self.categories[index].clone();
        if let Some(name) = patch.name {
            let name = normalize_display(&name, "category name")?;
            self.ensure_unique_name(&name, Some(id))?;
            updated.name = name;
        }
        if let Some(icon) = patch.icon {
            updated.icon = icon;
        }
        if let Some(color) = patch.color {
            updated.color = color;
        }
        if let Some(limit) = patch.limit {
            validate_limit(limit)?;
            updated.limit = limit;
        }
        if let Some(currency) = patch.currency {
            updated.currency = normalize_currency(&currency)?;
        }
        if let Some(bucket) = patch.bucket {
            updated.allocation_bucket = bucket;
        }

        let mut next = self.clone();
        next.categories[index] = updated;
        Ok(next)
    }

    /// Removes a category. Expenses pointing at it are kept as they are.
    pub fn delete_category(&self, id: &str) -> ResultEngine<Snapshot> {
        let index = position_by_id(&self.categories, id, "category", |c| c.id.as_str())?;
        let mut next = self.clone();
        let removed = next.categories.remove(index);
        let orphaned = next
            .expenses
            .iter()
            .filter(|expense| expense.category_id == removed.id)
            .count();
        if orphaned > 0 {
            tracing::debug!(
                "category {} deleted, {orphaned} expenses now reported as {OTHER_LABEL}",
                removed.id
            );
        }
        Ok(next)
    }

    /// Adds the subcategories of a preset group with income-scaled limits.
    ///
    /// Names that already exist are skipped. When `only` is not empty just
    /// those subcategories are considered. Returns the new snapshot and how
    /// many categories were added (possibly zero).
    pub fn add_preset_categories(
        &self,
        group_name: &str,
        only: &[String],
        basis_month: Option<MonthKey>,
        rates: &RateTable,
    ) -> ResultEngine<(Snapshot, usize)> {
        let group = preset_group(group_name)
            .ok_or_else(|| EngineError::KeyNotFound(format!("preset '{group_name}'")))?;

        let month = allocator::resolve_basis_month(&self.settings, basis_month);
        let income = allocator::basis_income(self, month, rates);
        let suggestions =
            allocator::suggest_preset_limits(group, income, &self.settings.budget_allocation);

        let selected: HashSet<String> = only.iter().map(|name| normalize_key(name)).collect();
        let mut existing: HashSet<String> = self
            .categories
            .iter()
            .map(|category| normalize_key(&category.name))
            .collect();

        let mut next = self.clone();
        let mut added = 0;
        for (item, limit) in group.items.iter().zip(suggestions) {
            let key = normalize_key(item.name);
            if existing.contains(&key) || (!selected.is_empty() && !selected.contains(&key)) {
                continue;
            }
            next.categories.push(Category {
                id: new_id(),
                name: item.name.to_string(),
                icon: group.icon.to_string(),
                color: group.color.to_string(),
                limit,
                currency: self.settings.default_currency.clone(),
                allocation_bucket: group.bucket,
            });
            existing.insert(key);
            added += 1;
        }

        tracing::info!("added {added} categories from preset '{}'", group.name);
        Ok((next, added))
    }

    fn ensure_unique_name(&self, name: &str, except_id: Option<&str>) -> ResultEngine<()> {
        let key = normalize_key(name);
        let clash = self
            .categories
            .iter()
            .filter(|category| Some(category.id.as_str()) != except_id)
            .any(|category| normalize_key(&category.name) == key);
        if clash {
            return Err(EngineError::Validation(format!(
                "category '{name}' already present"
            )));
        }
        Ok(())
    }
}

fn similarity_threshold(input: &str) -> usize {
    let len = input.chars().count();
    if len <= 6 { 1 } else { 2 }
}

fn levenshtein(left: &str, right: &str) -> usize {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();

    if left.is_empty() {
        return right.len();
    }
    if right.is_empty() {
        return left.len();
    }

    let mut costs: Vec<usize> = (0..=right.len()).collect();

    for (i, left_char) in left.iter().enumerate() {
        let mut last_cost = i;
        costs[0] = i + 1;
        for (j, right_char) in right.iter().enumerate() {
            let next_cost = costs[j + 1];
            let mut cost = if left_char == right_char {
                last_cost
            } else {
                last_cost + 1
            };
            cost = cost.min(costs[j] + 1).min(next_cost + 1);
            costs[j + 1] = cost;
            last_cost = next_cost;
        }
    }

    costs[right.len()]
}
