//! Economy facade: the single-writer owner of wallet mutations.
//!
//! One wallet exists per child and every mutation is a read-modify-write,
//! so all operations are serialized behind one mutex. The facade loads the
//! wallet (creating it on first use), runs the daily rollover, performs the
//! operation, and hands the committed state to the persistence collaborator.
//! Earn events and goal progress for the same minute share one critical
//! section, so either both commit or neither is observed.
//!
//! Every operation has an `_at` variant taking explicit `today`/`now`
//! values; the plain variants use the local calendar day and the current
//! time. Schedulers and tests drive the `_at` variants directly, which is
//! what makes time advancement deterministic.

use chrono::{DateTime, Local, NaiveDate, Utc};
use log::info;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::app_registry_service::AppRegistryService;
use crate::domain::commands::goals::{CancelGoalCommand, CreateGoalCommand};
use crate::domain::commands::ledger::{
    AdjustBalanceCommand, AdjustBalanceResult, PurchaseRewardTimeCommand,
    PurchaseRewardTimeResult, RecordLearningTimeCommand, RecordLearningTimeResult,
    ResetBalanceCommand,
};
use crate::domain::commands::sessions::TickResult;
use crate::domain::commands::transactions::{TransactionListQuery, TransactionListResult};
use crate::domain::errors::EconomyError;
use crate::domain::goal_service::GoalService;
use crate::domain::ledger_service::LedgerService;
use crate::domain::models::app_config::{AppCategory, AppConfig};
use crate::domain::models::goal::Goal;
use crate::domain::models::transaction::AdjustmentKind;
use crate::domain::models::wallet::Wallet;
use crate::domain::purchase_gate;
use crate::domain::rollover::rollover_if_needed;
use crate::domain::session::LearningSession;
use crate::storage::{Connection, WalletStorage};

#[derive(Clone)]
pub struct EconomyService<C: Connection> {
    ledger: LedgerService<C>,
    registry: AppRegistryService<C>,
    goals: GoalService<C>,
    wallet_repository: C::WalletRepository,
    wallets: Arc<Mutex<HashMap<String, Wallet>>>,
    sessions: Arc<Mutex<HashMap<String, LearningSession>>>,
}

impl<C: Connection> EconomyService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            ledger: LedgerService::new(connection.clone()),
            registry: AppRegistryService::new(connection.clone()),
            goals: GoalService::new(connection.clone()),
            wallet_repository: connection.create_wallet_repository(),
            wallets: Arc::new(Mutex::new(HashMap::new())),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Run `operation` against the child's wallet inside the critical
    /// section: load or create the wallet, roll it over for `today`, then
    /// operate. In-memory state is authoritative; repository reads happen
    /// only on first access.
    fn with_wallet<T>(
        &self,
        child_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
        operation: impl FnOnce(&mut Wallet) -> Result<T, EconomyError>,
    ) -> Result<T, EconomyError> {
        let mut wallets = self.wallets.lock().unwrap();

        let wallet = match wallets.entry(child_id.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let wallet = match self.wallet_repository.get_wallet(child_id)? {
                    Some(wallet) => wallet,
                    None => {
                        info!("Creating wallet for new child profile {}", child_id);
                        let wallet = Wallet::new(child_id, today, now);
                        self.wallet_repository.store_wallet(&wallet)?;
                        wallet
                    }
                };
                entry.insert(wallet)
            }
        };

        if rollover_if_needed(wallet, today) {
            wallet.last_modified = now;
            self.wallet_repository.store_wallet(wallet)?;
        }

        operation(wallet)
    }

    /// Record "N minutes spent in learning app X", credit the earnings,
    /// advance goal progress, and issue bonuses for any goals completed by
    /// this event — all in one critical section.
    pub fn record_learning_time_at(
        &self,
        command: RecordLearningTimeCommand,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<RecordLearningTimeResult, EconomyError> {
        if command.minutes == 0 {
            return Err(EconomyError::InvalidAmount(
                "learning time must cover at least one minute".to_string(),
            ));
        }

        let config = self.registry.resolve_enabled(&command.app_id)?;
        if config.category != AppCategory::Learning {
            return Err(EconomyError::AppNotConfigured {
                app_id: config.app_id.clone(),
                reason: "not a learning app".to_string(),
            });
        }

        let amount = config.coinz_rate * i64::from(command.minutes);
        self.with_wallet(&command.child_id, today, now, |wallet| {
            let transaction = self
                .ledger
                .earn(wallet, &config, command.minutes, amount, now)?;

            let completed_goals =
                self.goals
                    .record_earning(&command.child_id, &config.app_id, amount, today, now)?;

            let mut bonus_transactions = Vec::new();
            for goal in &completed_goals {
                if goal.bonus_coinz > 0 {
                    bonus_transactions.push(self.ledger.adjust_balance(
                        wallet,
                        goal.bonus_coinz,
                        AdjustmentKind::Bonus,
                        &format!("Goal completed: {}", goal.title),
                        now,
                    )?);
                }
            }

            Ok(RecordLearningTimeResult {
                transaction,
                completed_goals,
                bonus_transactions,
                wallet: wallet.clone(),
            })
        })
    }

    pub fn record_learning_time(
        &self,
        command: RecordLearningTimeCommand,
    ) -> Result<RecordLearningTimeResult, EconomyError> {
        self.record_learning_time_at(command, Local::now().date_naive(), Utc::now())
    }

    /// Evaluate the three-tier purchase gate without committing anything.
    pub fn check_purchase_at(
        &self,
        child_id: &str,
        app_id: &str,
        minutes: u32,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), EconomyError> {
        let config = self.registry.resolve_enabled(app_id)?;
        self.with_wallet(child_id, today, now, |wallet| {
            purchase_gate::can_purchase(wallet, &config, minutes)
        })
    }

    pub fn check_purchase(
        &self,
        child_id: &str,
        app_id: &str,
        minutes: u32,
    ) -> Result<(), EconomyError> {
        self.check_purchase_at(child_id, app_id, minutes, Local::now().date_naive(), Utc::now())
    }

    /// Largest number of reward minutes that would pass the gate right now.
    pub fn affordable_minutes_at(
        &self,
        child_id: &str,
        app_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<u32, EconomyError> {
        let config = self.registry.resolve_enabled(app_id)?;
        self.with_wallet(child_id, today, now, |wallet| {
            Ok(purchase_gate::affordable_minutes(wallet, &config))
        })
    }

    pub fn affordable_minutes(&self, child_id: &str, app_id: &str) -> Result<u32, EconomyError> {
        self.affordable_minutes_at(child_id, app_id, Local::now().date_naive(), Utc::now())
    }

    /// Purchase reward time: gate first, then spend. A gate pass guarantees
    /// the spend cannot fail with `InsufficientBalance`.
    pub fn purchase_reward_time_at(
        &self,
        command: PurchaseRewardTimeCommand,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<PurchaseRewardTimeResult, EconomyError> {
        let config = self.registry.resolve_enabled(&command.app_id)?;
        self.with_wallet(&command.child_id, today, now, |wallet| {
            purchase_gate::can_purchase(wallet, &config, command.minutes)?;
            let transaction = self.ledger.spend(wallet, &config, command.minutes, now)?;
            Ok(PurchaseRewardTimeResult {
                transaction,
                wallet: wallet.clone(),
            })
        })
    }

    pub fn purchase_reward_time(
        &self,
        command: PurchaseRewardTimeCommand,
    ) -> Result<PurchaseRewardTimeResult, EconomyError> {
        self.purchase_reward_time_at(command, Local::now().date_naive(), Utc::now())
    }

    /// Apply a parent bonus, penalty, or correction.
    pub fn apply_adjustment_at(
        &self,
        command: AdjustBalanceCommand,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<AdjustBalanceResult, EconomyError> {
        self.with_wallet(&command.child_id, today, now, |wallet| {
            let transaction = self.ledger.adjust_balance(
                wallet,
                command.delta,
                command.kind,
                &command.reason,
                now,
            )?;
            Ok(AdjustBalanceResult {
                transaction,
                wallet: wallet.clone(),
            })
        })
    }

    pub fn apply_adjustment(
        &self,
        command: AdjustBalanceCommand,
    ) -> Result<AdjustBalanceResult, EconomyError> {
        self.apply_adjustment_at(command, Local::now().date_naive(), Utc::now())
    }

    /// Parent-initiated full reset to a chosen (non-negative) balance.
    pub fn reset_balance_at(
        &self,
        command: ResetBalanceCommand,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<AdjustBalanceResult, EconomyError> {
        self.with_wallet(&command.child_id, today, now, |wallet| {
            let transaction = self.ledger.reset_wallet(wallet, command.target, now)?;
            Ok(AdjustBalanceResult {
                transaction,
                wallet: wallet.clone(),
            })
        })
    }

    pub fn reset_balance(
        &self,
        command: ResetBalanceCommand,
    ) -> Result<AdjustBalanceResult, EconomyError> {
        self.reset_balance_at(command, Local::now().date_naive(), Utc::now())
    }

    /// Update the parent-configured learning-gate threshold.
    pub fn set_minimum_learning_minutes_at(
        &self,
        child_id: &str,
        minutes: u32,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Wallet, EconomyError> {
        self.with_wallet(child_id, today, now, |wallet| {
            wallet.minimum_daily_learning_minutes = minutes;
            wallet.last_modified = now;
            self.wallet_repository.store_wallet(wallet)?;
            Ok(wallet.clone())
        })
    }

    pub fn set_minimum_learning_minutes(
        &self,
        child_id: &str,
        minutes: u32,
    ) -> Result<Wallet, EconomyError> {
        self.set_minimum_learning_minutes_at(child_id, minutes, Local::now().date_naive(), Utc::now())
    }

    /// Current wallet state after rollover; creates the wallet on first use.
    pub fn wallet_at(
        &self,
        child_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Wallet, EconomyError> {
        self.with_wallet(child_id, today, now, |wallet| Ok(wallet.clone()))
    }

    pub fn wallet(&self, child_id: &str) -> Result<Wallet, EconomyError> {
        self.wallet_at(child_id, Local::now().date_naive(), Utc::now())
    }

    /// A page of transaction history, most recent first.
    pub fn transaction_history(
        &self,
        query: &TransactionListQuery,
    ) -> Result<TransactionListResult, EconomyError> {
        self.ledger.list_history(query)
    }

    /// Diagnostic: signed sum of all valid transactions for a wallet.
    pub fn ledger_sum(&self, child_id: &str) -> Result<i64, EconomyError> {
        self.ledger.ledger_sum(child_id)
    }

    /// Start a learning session for the child in the given app. Any session
    /// already running for the child is replaced.
    pub fn begin_learning_session_at(
        &self,
        child_id: &str,
        app_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LearningSession, EconomyError> {
        let config = self.registry.resolve_enabled(app_id)?;
        if config.category != AppCategory::Learning {
            return Err(EconomyError::AppNotConfigured {
                app_id: config.app_id.clone(),
                reason: "not a learning app".to_string(),
            });
        }

        let session = LearningSession::new(child_id, app_id, now);
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(previous) = sessions.insert(child_id.to_string(), session.clone()) {
            info!(
                "Replacing active session in {} for {} ({} minutes committed)",
                previous.app_id, child_id, previous.minutes_recorded
            );
        }
        Ok(session)
    }

    pub fn begin_learning_session(
        &self,
        child_id: &str,
        app_id: &str,
    ) -> Result<LearningSession, EconomyError> {
        self.begin_learning_session_at(child_id, app_id, Utc::now())
    }

    /// One elapsed learning minute: commits the earn (and any goal effects)
    /// for the child's active session. Fails if no session is active.
    pub fn tick_learning_minute_at(
        &self,
        child_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<TickResult, EconomyError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(child_id)
            .ok_or_else(|| EconomyError::NoActiveSession(child_id.to_string()))?;

        let earn = self.record_learning_time_at(
            RecordLearningTimeCommand {
                child_id: child_id.to_string(),
                app_id: session.app_id.clone(),
                minutes: 1,
            },
            today,
            now,
        )?;

        session.record_tick(earn.transaction.amount);
        Ok(TickResult {
            earn,
            session: session.clone(),
        })
    }

    pub fn tick_learning_minute(&self, child_id: &str) -> Result<TickResult, EconomyError> {
        self.tick_learning_minute_at(child_id, Local::now().date_naive(), Utc::now())
    }

    /// End the child's learning session, if any. Idempotent; minutes already
    /// committed by ticks stay committed.
    pub fn end_learning_session(&self, child_id: &str) -> Option<LearningSession> {
        let ended = self.sessions.lock().unwrap().remove(child_id);
        if let Some(ref session) = ended {
            info!(
                "Ended learning session in {} for {} ({} minutes, {} Coinz)",
                session.app_id, child_id, session.minutes_recorded, session.coinz_earned
            );
        }
        ended
    }

    pub fn active_session(&self, child_id: &str) -> Option<LearningSession> {
        self.sessions.lock().unwrap().get(child_id).cloned()
    }

    // Registry passthroughs for the parent configuration flow.

    pub fn upsert_app_config(&self, config: AppConfig) -> Result<AppConfig, EconomyError> {
        self.registry.upsert_config(config)
    }

    pub fn get_app_config(&self, app_id: &str) -> Result<Option<AppConfig>, EconomyError> {
        self.registry.get_config(app_id)
    }

    pub fn list_app_configs(&self) -> Result<Vec<AppConfig>, EconomyError> {
        self.registry.list_configs()
    }

    pub fn remove_app_config(&self, app_id: &str) -> Result<bool, EconomyError> {
        self.registry.remove_config(app_id)
    }

    pub fn seed_default_configs(&self, defaults: &[AppConfig]) -> Result<u32, EconomyError> {
        self.registry.seed_defaults(defaults)
    }

    // Goal passthroughs for the parent goal flow.

    pub fn create_goal_at(
        &self,
        command: CreateGoalCommand,
        now: DateTime<Utc>,
    ) -> Result<Goal, EconomyError> {
        Ok(self.goals.create_goal(command, now)?)
    }

    pub fn create_goal(&self, command: CreateGoalCommand) -> Result<Goal, EconomyError> {
        self.create_goal_at(command, Utc::now())
    }

    pub fn cancel_goal_at(
        &self,
        command: CancelGoalCommand,
        now: DateTime<Utc>,
    ) -> Result<Goal, EconomyError> {
        Ok(self.goals.cancel_goal(command, now)?)
    }

    pub fn cancel_goal(&self, command: CancelGoalCommand) -> Result<Goal, EconomyError> {
        self.cancel_goal_at(command, Utc::now())
    }

    pub fn list_goals(&self, child_id: &str) -> Result<Vec<Goal>, EconomyError> {
        Ok(self.goals.list_goals(child_id)?)
    }
}
