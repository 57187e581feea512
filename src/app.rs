//! `FinanzApp`: configuration, on-device storage and the month repository
//! wired together for the presentation layer.

use std::path::PathBuf;

use finanz_config::{Config, ConfigManager};
use finanz_core::{
    BudgetRepository, CategoryDraft, CategoryService, CoreError,
    CreatePolicy, CurrencyService, EntryDraft, EntryPlacement, EntryService, EstimateDraft,
    EstimateService, MonthBalance, NewMonth, RateService, SummaryService, YearTrend,
};
use finanz_domain::{
    BudgetMonth, Currency, EntryId, EntryRemoval, EstimateItem, Flow, MonthKey,
    TransactionCategory,
};
use finanz_storage_json::JsonFileStore;
use tracing::{info, warn};

use crate::AppError;

pub struct FinanzApp {
    config: Config,
    config_manager: ConfigManager,
    repo: BudgetRepository<JsonFileStore>,
}

impl FinanzApp {
    /// Opens the app rooted at `base`: config lives in `base/config`, data in
    /// the configured data root (`base` itself unless the config says otherwise).
    pub fn open(base: PathBuf) -> Result<Self, AppError> {
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let mut config = config_manager.load()?;
        if config.data_root.is_none() {
            config.data_root = Some(base);
        }
        Self::with_config(config, config_manager)
    }

    /// Opens the app in the platform data directory.
    pub fn open_default() -> Result<Self, AppError> {
        Self::open(Config::default().resolve_data_root())
    }

    fn with_config(config: Config, config_manager: ConfigManager) -> Result<Self, AppError> {
        let store =
            JsonFileStore::with_retention(config.resolve_data_root(), config.backup_retention)?;
        let policy = if config.overwrite_on_create {
            CreatePolicy::Overwrite
        } else {
            CreatePolicy::Reject
        };
        let repo = BudgetRepository::with_key(store, config.effective_storage_key())
            .with_create_policy(policy);

        let warnings = repo.load_warnings()?;
        for warning in &warnings {
            warn!(%warning, "stored document anomaly");
        }
        info!(
            root = %config.resolve_data_root().display(),
            anomalies = warnings.len(),
            "finance data opened"
        );

        Ok(Self {
            config,
            config_manager,
            repo,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repository(&self) -> &BudgetRepository<JsonFileStore> {
        &self.repo
    }

    /// Persists `config` and reopens storage with it.
    pub fn reconfigure(self, config: Config) -> Result<Self, AppError> {
        self.config_manager.save(&config)?;
        Self::with_config(config, self.config_manager)
    }

    // Months

    pub fn years(&self) -> Result<Vec<i32>, AppError> {
        Ok(self.repo.years()?)
    }

    pub fn months(&self, year: i32) -> Result<Vec<u32>, AppError> {
        Ok(self.repo.months(year)?)
    }

    /// Month shown on the home screen: the newest one recorded.
    pub fn latest_month(&self) -> Result<Option<(MonthKey, BudgetMonth)>, AppError> {
        let Some(key) = self.repo.latest_month()? else {
            return Ok(None);
        };
        Ok(self.repo.get_month(key)?.map(|month| (key, month)))
    }

    pub fn month(&self, year: i32, month: u32) -> Result<Option<BudgetMonth>, AppError> {
        Ok(self.repo.get_month(MonthKey::new(year, month)?)?)
    }

    pub fn create_month(
        &self,
        year: i32,
        month: u32,
        input: NewMonth,
    ) -> Result<BudgetMonth, AppError> {
        Ok(self.repo.create_month(MonthKey::new(year, month)?, input)?)
    }

    pub fn delete_month(&self, year: i32, month: u32) -> Result<bool, AppError> {
        Ok(self.repo.delete_month(MonthKey::new(year, month)?)?)
    }

    pub fn apply_rate(&self, year: i32, month: u32, rate: f64) -> Result<(), AppError> {
        self.update(year, month, |data| RateService::apply(data, rate).map(|_| ()))
    }

    pub fn set_income_estimate(&self, year: i32, month: u32, amount: f64) -> Result<(), AppError> {
        self.update(year, month, |data| {
            if !amount.is_finite() {
                return Err(CoreError::Validation("amount must be a number".into()));
            }
            data.income_est = amount;
            Ok(())
        })
    }

    // Categories and entries

    pub fn add_category(
        &self,
        year: i32,
        month: u32,
        flow: Flow,
        draft: CategoryDraft,
    ) -> Result<EntryId, AppError> {
        self.update(year, month, |data| CategoryService::add_simple(data, flow, draft))
    }

    pub fn save_category(
        &self,
        year: i32,
        month: u32,
        flow: Flow,
        category: TransactionCategory,
    ) -> Result<(), AppError> {
        self.update(year, month, |data| {
            CategoryService::upsert(data, flow, category);
            Ok(())
        })
    }

    /// Form edit of a simple category; USD follows the month rate.
    pub fn update_category(
        &self,
        year: i32,
        month: u32,
        flow: Flow,
        id: &EntryId,
        draft: CategoryDraft,
    ) -> Result<(), AppError> {
        self.update(year, month, |data| {
            CategoryService::update_simple(data, flow, id, draft)
        })
    }

    /// Adds `addition` to a simple category and returns the new local total.
    pub fn add_to_category(
        &self,
        year: i32,
        month: u32,
        flow: Flow,
        id: &EntryId,
        addition: f64,
    ) -> Result<f64, AppError> {
        self.update(year, month, |data| {
            CategoryService::add_to_simple(data, flow, id, addition)
        })
    }

    pub fn rename_category(
        &self,
        year: i32,
        month: u32,
        flow: Flow,
        id: &EntryId,
        description: &str,
    ) -> Result<(), AppError> {
        self.update(year, month, |data| {
            CategoryService::rename(data, flow, id, description)
        })
    }

    pub fn remove_category(
        &self,
        year: i32,
        month: u32,
        flow: Flow,
        id: &EntryId,
    ) -> Result<TransactionCategory, AppError> {
        self.update(year, month, |data| CategoryService::remove(data, flow, id))
    }

    pub fn add_entry(
        &self,
        year: i32,
        month: u32,
        flow: Flow,
        category: Option<&EntryId>,
        draft: EntryDraft,
    ) -> Result<EntryPlacement, AppError> {
        self.update(year, month, |data| {
            EntryService::add(data, flow, category, draft)
        })
    }

    pub fn update_entry(
        &self,
        year: i32,
        month: u32,
        flow: Flow,
        category: &EntryId,
        entry: &EntryId,
        draft: EntryDraft,
    ) -> Result<(), AppError> {
        self.update(year, month, |data| {
            EntryService::update(data, flow, category, entry, draft)
        })
    }

    pub fn remove_entry(
        &self,
        year: i32,
        month: u32,
        flow: Flow,
        category: &EntryId,
        entry: &EntryId,
    ) -> Result<EntryRemoval, AppError> {
        self.update(year, month, |data| {
            EntryService::remove(data, flow, category, entry)
        })
    }

    // Estimates

    /// Replaces the itemized estimate with the submitted form rows.
    pub fn submit_estimate(
        &self,
        year: i32,
        month: u32,
        drafts: &[EstimateDraft],
    ) -> Result<Vec<EstimateItem>, AppError> {
        self.update(year, month, |data| {
            EstimateService::apply(data, drafts);
            Ok(data.estimate_items().to_vec())
        })
    }

    pub fn set_expense_estimate(&self, year: i32, month: u32, amount: &str) -> Result<(), AppError> {
        self.update(year, month, |data| EstimateService::set_total(data, amount))
    }

    // Read models

    pub fn month_balance(&self, year: i32, month: u32) -> Result<MonthBalance, AppError> {
        let data = self.repo.require_month(MonthKey::new(year, month)?)?;
        Ok(SummaryService::month_balance(&data))
    }

    pub fn year_trend(&self, year: i32) -> Result<YearTrend, AppError> {
        Ok(SummaryService::year_trend(&self.repo.get_all()?, year))
    }

    /// Currency picker lookup, falling back to fuzzy suggestions.
    pub fn find_currencies(&self, query: &str) -> Vec<&'static Currency> {
        let matches = CurrencyService::search(query);
        if matches.is_empty() {
            CurrencyService::suggest(query)
        } else {
            matches
        }
    }

    fn update<T>(
        &self,
        year: i32,
        month: u32,
        mutate: impl FnOnce(&mut BudgetMonth) -> Result<T, CoreError>,
    ) -> Result<T, AppError> {
        Ok(self.repo.update_month(MonthKey::new(year, month)?, mutate)?)
    }
}
