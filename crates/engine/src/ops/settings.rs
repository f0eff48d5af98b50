use crate::{
    BudgetAllocation, ResultEngine, SettingsPatch, Snapshot, settings::validate_allocation,
};

impl Snapshot {
    pub fn update_settings(&self, patch: SettingsPatch) -> ResultEngine<Snapshot> {
        let settings = self.settings.merged(patch)?;
        let mut next = self.clone();
        next.settings = settings;
        Ok(next)
    }

    /// Stores a custom allocation. The percentages must sum to 100.
    pub fn set_allocation(&self, allocation: BudgetAllocation) -> ResultEngine<Snapshot> {
        validate_allocation(&allocation)?;
        let mut next = self.clone();
        next.settings.budget_allocation = allocation;
        next.settings.custom_allocation = true;
        Ok(next)
    }

    /// Restores the 50/20/30 allocation and clears the custom flag.
    pub fn reset_allocation(&self) -> Snapshot {
        let mut next = self.clone();
        next.settings.budget_allocation = BudgetAllocation::default();
        next.settings.custom_allocation = false;
        next
    }
}
