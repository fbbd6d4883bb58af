//! The books: registry, journal and store behind a single writer.
//!
//! Commits serialize on a write lock and persist their record before the
//! in-memory state changes. Reads work on a [`Snapshot`], an O(1) clone of
//! the current registry and journal. Writers copy on write, so a snapshot
//! always sees a fully committed prefix and never blocks a commit.
//!
//! Copy on write has a cost: a commit made while any snapshot is still alive
//! first clones the journal and its indexes, which is O(n) in the number of
//! committed transactions (the transactions themselves are shared, not
//! copied). With no outstanding snapshot a commit appends in place. Callers
//! should drop snapshots once a read is done rather than hold them across
//! many commits.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use khata_shared::AppConfig;
use khata_shared::types::{
    AccountId, Currency, Money, PageRequest, PageResponse, TransactionId,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::accounts::{Account, AccountRegistry, AccountType};
use crate::ledger::{
    AccountTotals, BookRecord, DateRange, Journal, JournalStore, JsonLinesStore, LedgerError,
    LedgerLine, LedgerProjector, MemoryStore, NewTransaction, Posting, ReversalService,
    Transaction,
};
use crate::reports::{
    BalanceSheetReport, IncomeStatementReport, ReportError, ReportService, TrialBalanceReport,
};

#[derive(Debug, Clone, Default)]
struct BookState {
    registry: Arc<AccountRegistry>,
    journal: Arc<Journal>,
}

/// The bookkeeping service.
///
/// One instance owns the chart of accounts and the journal. It is `Send +
/// Sync` and meant to be shared (for example behind an `Arc`).
pub struct Books {
    currency: Currency,
    state: RwLock<BookState>,
    store: Box<dyn JournalStore>,
}

impl std::fmt::Debug for Books {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Books")
            .field("currency", &self.currency)
            .field("accounts", &state.registry.len())
            .field("transactions", &state.journal.len())
            .finish_non_exhaustive()
    }
}

impl Books {
    /// Empty books kept only in memory.
    #[must_use]
    pub fn in_memory(currency: Currency) -> Self {
        Self {
            currency,
            state: RwLock::new(BookState::default()),
            store: Box::new(MemoryStore::new()),
        }
    }

    /// Opens books backed by `store`, replaying every stored record.
    ///
    /// Replay uses the same validation as a fresh commit.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store cannot be read and `CorruptJournal` if
    /// any record fails validation.
    pub fn open(currency: Currency, store: Box<dyn JournalStore>) -> Result<Self, LedgerError> {
        let records = store.load().inspect_err(|e| {
            error!(error = %e, "Failed to load journal");
        })?;
        let record_count = records.len();
        let state = Self::replay(records, currency).inspect_err(|e| {
            error!(error = %e, code = e.error_code(), "Journal replay failed");
        })?;

        info!(
            currency = %currency,
            records = record_count,
            accounts = state.registry.len(),
            transactions = state.journal.len(),
            "Books opened"
        );

        Ok(Self {
            currency,
            state: RwLock::new(state),
            store,
        })
    }

    /// Opens the books described by the configuration.
    ///
    /// Uses a JSON-lines journal when `journal.path` is set and an in-memory
    /// store otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`Books::open`].
    pub fn from_config(config: &AppConfig) -> Result<Self, LedgerError> {
        let currency = config.books.currency;
        match &config.journal.path {
            Some(path) => {
                let store = JsonLinesStore::open(path)?;
                info!(path = %store.path().display(), "Using JSON-lines journal");
                Self::open(currency, Box::new(store))
            }
            None => Ok(Self::in_memory(currency)),
        }
    }

    /// Books currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// A consistent read-only view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        Snapshot {
            currency: self.currency,
            registry: Arc::clone(&state.registry),
            journal: Arc::clone(&state.journal),
        }
    }

    /// Number of committed transactions.
    #[must_use]
    pub fn journal_len(&self) -> usize {
        self.state.read().journal.len()
    }

    // ========== Accounts ==========

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns `EmptyAccountName`, `DuplicateAccount` or `Storage`.
    pub fn register_account(
        &self,
        name: &str,
        account_type: AccountType,
    ) -> Result<AccountId, LedgerError> {
        let mut state = self.state.write();
        let account = state.registry.prepare(name, account_type).inspect_err(|e| {
            warn!(account_name = name, error = %e, "Account registration rejected");
        })?;

        self.persist(&BookRecord::AccountOpened(account.clone()))?;

        let id = account.id;
        info!(
            account_id = %id,
            account_name = %account.name,
            account_type = %account.account_type,
            "Account registered"
        );
        Arc::make_mut(&mut state.registry).insert(account);
        Ok(id)
    }

    /// Deactivates an account. Deactivating an inactive account is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `AccountInUse` if the account still carries
    /// a balance, or `Storage`.
    pub fn deactivate_account(&self, id: AccountId) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        let account = state.registry.get(id)?;
        if !account.is_active {
            return Ok(());
        }

        let balance = LedgerProjector::new(&state.registry, &state.journal, self.currency)
            .incremental_balance(id)?;
        if !balance.is_zero() {
            warn!(account_id = %id, balance = %balance, "Deactivation rejected");
            return Err(LedgerError::AccountInUse { id, balance });
        }

        self.persist(&BookRecord::AccountDeactivated {
            account_id: id,
            at: Utc::now(),
        })?;
        Arc::make_mut(&mut state.registry).deactivate(id)?;
        info!(account_id = %id, "Account deactivated");
        Ok(())
    }

    /// Looks up an account, active or not.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.state.read().registry.get(id).cloned()
    }

    // ========== Transactions ==========

    /// Validates and commits a transaction, returning its id.
    ///
    /// # Errors
    ///
    /// Returns the first violated posting rule or `Storage`. Nothing is
    /// written when an error is returned.
    pub fn post_transaction(
        &self,
        date: NaiveDate,
        description: &str,
        postings: Vec<Posting>,
    ) -> Result<TransactionId, LedgerError> {
        let input = NewTransaction {
            date,
            description: description.to_string(),
            postings,
            reverses: None,
        };
        self.post(input).map(|tx| tx.id)
    }

    /// Commits a transaction, waiting for any commit in progress.
    ///
    /// # Errors
    ///
    /// Same as [`Books::post_transaction`].
    pub fn post(&self, input: NewTransaction) -> Result<Arc<Transaction>, LedgerError> {
        let mut state = self.state.write();
        self.commit(&mut state, input)
    }

    /// Commits a transaction only if no other commit is in progress.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentModification` instead of waiting for the lock.
    pub fn try_post_transaction(
        &self,
        input: NewTransaction,
    ) -> Result<Arc<Transaction>, LedgerError> {
        let Some(mut state) = self.state.try_write() else {
            warn!("Commit skipped: books are busy");
            return Err(LedgerError::ConcurrentModification);
        };
        self.commit(&mut state, input)
    }

    /// Commits a transaction only if the journal still has `expected_len`
    /// entries, i.e. nothing was committed since the caller last looked.
    ///
    /// # Errors
    ///
    /// Returns `JournalLengthMismatch` if the journal grew.
    pub fn post_transaction_expecting(
        &self,
        expected_len: usize,
        input: NewTransaction,
    ) -> Result<Arc<Transaction>, LedgerError> {
        let mut state = self.state.write();
        let actual = state.journal.len();
        if actual != expected_len {
            warn!(expected = expected_len, actual, "Stale commit rejected");
            return Err(LedgerError::JournalLengthMismatch {
                expected: expected_len,
                actual,
            });
        }
        self.commit(&mut state, input)
    }

    /// Commits the reversal of an earlier transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `AlreadyReversed`, or any posting rule
    /// violation (for example when a touched account was deactivated).
    pub fn reverse_transaction(
        &self,
        id: TransactionId,
        date: NaiveDate,
        reason: &str,
    ) -> Result<Arc<Transaction>, LedgerError> {
        let mut state = self.state.write();
        let input = {
            let original = state.journal.get(id)?;
            ReversalService::reversing_transaction(original, date, reason)
        };
        self.commit(&mut state, input)
    }

    // ========== Reads ==========

    /// Balance of an account, optionally as of a date.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn account_balance(
        &self,
        id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<Money, LedgerError> {
        self.snapshot().account_balance(id, as_of)
    }

    /// Ledger lines of an account with running balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn ledger_lines(&self, id: AccountId) -> Result<Vec<LedgerLine>, LedgerError> {
        self.snapshot().ledger_lines(id)
    }

    /// Trial balance as of a date.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance` if the ledger is inconsistent.
    pub fn trial_balance(&self, as_of: Option<NaiveDate>) -> Result<TrialBalanceReport, ReportError> {
        self.snapshot().trial_balance(as_of)
    }

    /// Balance sheet as of a date.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance` if the ledger is inconsistent.
    pub fn balance_sheet(&self, as_of: Option<NaiveDate>) -> Result<BalanceSheetReport, ReportError> {
        self.snapshot().balance_sheet(as_of)
    }

    /// Income statement for a period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `InvalidTaxRate`.
    pub fn income_statement(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        tax_rate: Decimal,
    ) -> Result<IncomeStatementReport, ReportError> {
        self.snapshot().income_statement(from, to, tax_rate)
    }

    fn commit(
        &self,
        state: &mut BookState,
        input: NewTransaction,
    ) -> Result<Arc<Transaction>, LedgerError> {
        let prepared = state
            .journal
            .prepare(input, &state.registry, self.currency, Utc::now())
            .inspect_err(|e| {
                warn!(error = %e, code = e.error_code(), "Transaction rejected");
            })?;

        self.persist(&BookRecord::TransactionPosted(
            prepared.transaction().clone(),
        ))?;

        let tx = Arc::make_mut(&mut state.journal).append(prepared);
        info!(
            transaction_id = %tx.id,
            sequence = tx.sequence,
            date = %tx.date,
            postings = tx.postings.len(),
            reverses = ?tx.reverses,
            "Transaction committed"
        );
        Ok(tx)
    }

    fn persist(&self, record: &BookRecord) -> Result<(), LedgerError> {
        self.store.append(record).map_err(|e| {
            error!(error = %e, "Failed to append to journal store");
            LedgerError::from(e)
        })
    }

    fn replay(records: Vec<BookRecord>, currency: Currency) -> Result<BookState, LedgerError> {
        let mut registry = AccountRegistry::new();
        let mut journal = Journal::new();

        for (index, record) in records.into_iter().enumerate() {
            let corrupt = |reason: String| LedgerError::CorruptJournal {
                record: index,
                reason,
            };
            match record {
                BookRecord::AccountOpened(account) => {
                    registry
                        .restore(account)
                        .map_err(|e| corrupt(e.to_string()))?;
                }
                BookRecord::AccountDeactivated { account_id, .. } => {
                    let balance = LedgerProjector::new(&registry, &journal, currency)
                        .incremental_balance(account_id)
                        .map_err(|e| corrupt(e.to_string()))?;
                    if !balance.is_zero() {
                        return Err(corrupt(format!(
                            "account {account_id} deactivated with balance {balance}"
                        )));
                    }
                    registry
                        .deactivate(account_id)
                        .map_err(|e| corrupt(e.to_string()))?;
                }
                BookRecord::TransactionPosted(transaction) => {
                    let prepared =
                        journal.prepare_replay(transaction, &registry, currency, index)?;
                    journal.append(prepared);
                }
            }
        }

        Ok(BookState {
            registry: Arc::new(registry),
            journal: Arc::new(journal),
        })
    }
}

/// A consistent, immutable view of the books.
///
/// Cloning is O(1). Every read on one snapshot observes the same committed
/// journal prefix.
#[derive(Debug, Clone)]
pub struct Snapshot {
    currency: Currency,
    registry: Arc<AccountRegistry>,
    journal: Arc<Journal>,
}

impl Snapshot {
    /// Books currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// The chart of accounts.
    #[must_use]
    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    /// The journal.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Projector over this snapshot.
    #[must_use]
    pub fn projector(&self) -> LedgerProjector<'_> {
        LedgerProjector::new(&self.registry, &self.journal, self.currency)
    }

    /// Number of committed transactions.
    #[must_use]
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn get_account(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.registry.get(id)
    }

    /// Looks up a transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` for unknown ids.
    pub fn get_transaction(&self, id: TransactionId) -> Result<&Transaction, LedgerError> {
        self.journal.get(id)
    }

    /// Transactions within `range` in `(date, sequence)` order.
    pub fn list_transactions(
        &self,
        range: DateRange,
    ) -> impl DoubleEndedIterator<Item = &Transaction> + Clone + '_ {
        self.journal.transactions(range)
    }

    /// Transactions whose particulars or memos contain `term`.
    pub fn search_transactions<'a>(
        &'a self,
        term: &str,
    ) -> impl Iterator<Item = &'a Transaction> + use<'a> {
        self.journal.search(term)
    }

    /// Accounts whose name contains `term`.
    pub fn search_accounts<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Account> + use<'a> {
        self.registry.search(term)
    }

    /// One page of the journal in `(date, sequence)` order.
    #[must_use]
    pub fn journal_page(&self, request: PageRequest) -> PageResponse<Transaction> {
        PageResponse::paginate(
            self.journal.transactions(DateRange::all()).cloned(),
            request,
        )
    }

    /// Balance of an account, optionally as of a date.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn account_balance(
        &self,
        id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<Money, LedgerError> {
        self.projector().account_balance(id, as_of)
    }

    /// Debit and credit turnover of an account within a period.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn account_activity(
        &self,
        id: AccountId,
        range: DateRange,
    ) -> Result<AccountTotals, LedgerError> {
        self.projector().account_activity(id, range)
    }

    /// Ledger lines of an account with running balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn ledger_lines(&self, id: AccountId) -> Result<Vec<LedgerLine>, LedgerError> {
        self.projector().ledger_lines(id)
    }

    /// Trial balance as of a date.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance` if the ledger is inconsistent.
    pub fn trial_balance(&self, as_of: Option<NaiveDate>) -> Result<TrialBalanceReport, ReportError> {
        let balances = self.projector().balances(DateRange::up_to(as_of))?;
        ReportService::trial_balance(&balances, self.currency, as_of)
    }

    /// Balance sheet as of a date.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance` if the ledger is inconsistent.
    pub fn balance_sheet(&self, as_of: Option<NaiveDate>) -> Result<BalanceSheetReport, ReportError> {
        let balances = self.projector().balances(DateRange::up_to(as_of))?;
        ReportService::balance_sheet(&balances, self.currency, as_of)
    }

    /// Income statement for a period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `InvalidTaxRate`.
    pub fn income_statement(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        tax_rate: Decimal,
    ) -> Result<IncomeStatementReport, ReportError> {
        let period = ReportService::period(from, to)?;
        let activity = self.projector().balances(period)?;
        ReportService::income_statement(&activity, self.currency, period, tax_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::Usd)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, day).unwrap()
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_commits() {
        let books = Books::in_memory(Currency::Usd);
        let cash = books.register_account("Cash Account", AccountType::Asset).unwrap();
        let equity = books
            .register_account("Owner's Equity", AccountType::Equity)
            .unwrap();

        let before = books.snapshot();
        books
            .post_transaction(
                date(15),
                "Owner Investment",
                vec![
                    Posting::debit(cash, usd(1_000_000)),
                    Posting::credit(equity, usd(1_000_000)),
                ],
            )
            .unwrap();

        assert_eq!(before.journal_len(), 0);
        assert!(before.account_balance(cash, None).unwrap().is_zero());
        assert_eq!(books.snapshot().journal_len(), 1);
        assert_eq!(books.account_balance(cash, None).unwrap(), usd(1_000_000));
    }

    #[test]
    fn test_deactivate_requires_zero_balance() {
        let books = Books::in_memory(Currency::Usd);
        let cash = books.register_account("Cash Account", AccountType::Asset).unwrap();
        let equity = books
            .register_account("Owner's Equity", AccountType::Equity)
            .unwrap();
        let tx = books
            .post_transaction(
                date(15),
                "Owner Investment",
                vec![Posting::debit(cash, usd(500)), Posting::credit(equity, usd(500))],
            )
            .unwrap();

        assert!(matches!(
            books.deactivate_account(cash),
            Err(LedgerError::AccountInUse { balance, .. }) if balance == usd(500)
        ));

        books.reverse_transaction(tx, date(16), "Entered twice").unwrap();
        books.deactivate_account(cash).unwrap();
        books.deactivate_account(cash).unwrap();
        assert!(!books.get_account(cash).unwrap().is_active);
    }

    #[test]
    fn test_reverse_twice_rejected() {
        let books = Books::in_memory(Currency::Usd);
        let cash = books.register_account("Cash Account", AccountType::Asset).unwrap();
        let sales = books
            .register_account("Sales Revenue", AccountType::Revenue)
            .unwrap();
        let tx = books
            .post_transaction(
                date(15),
                "Cash sale",
                vec![Posting::debit(cash, usd(2_500)), Posting::credit(sales, usd(2_500))],
            )
            .unwrap();

        let reversal = books.reverse_transaction(tx, date(16), "Refund").unwrap();
        assert_eq!(reversal.reverses, Some(tx));
        assert!(books.account_balance(cash, None).unwrap().is_zero());
        assert!(matches!(
            books.reverse_transaction(tx, date(17), "Again"),
            Err(LedgerError::AlreadyReversed { original, reversal: r })
                if original == tx && r == reversal.id
        ));
        assert!(
            books
                .reverse_transaction(TransactionId::new(), date(17), "Unknown")
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_stale_expected_length_rejected() {
        let books = Books::in_memory(Currency::Usd);
        let cash = books.register_account("Cash Account", AccountType::Asset).unwrap();
        let sales = books
            .register_account("Sales Revenue", AccountType::Revenue)
            .unwrap();
        let sale = || {
            NewTransaction::new(date(15), "Cash sale")
                .debit(cash, usd(100))
                .credit(sales, usd(100))
        };

        books.post_transaction_expecting(0, sale()).unwrap();
        let err = books.post_transaction_expecting(0, sale()).unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            err,
            LedgerError::JournalLengthMismatch {
                expected: 0,
                actual: 1
            }
        ));
        assert_eq!(books.journal_len(), 1);
    }

    #[test]
    fn test_try_post_while_writer_holds_lock() {
        let books = Books::in_memory(Currency::Usd);
        let cash = books.register_account("Cash Account", AccountType::Asset).unwrap();
        let sales = books
            .register_account("Sales Revenue", AccountType::Revenue)
            .unwrap();
        let sale = NewTransaction::new(date(15), "Cash sale")
            .debit(cash, usd(100))
            .credit(sales, usd(100));

        let guard = books.state.write();
        assert!(matches!(
            books.try_post_transaction(sale.clone()),
            Err(LedgerError::ConcurrentModification)
        ));
        drop(guard);

        books.try_post_transaction(sale).unwrap();
        assert_eq!(books.journal_len(), 1);
    }

    #[test]
    fn test_journal_page() {
        let books = Books::in_memory(Currency::Usd);
        let cash = books.register_account("Cash Account", AccountType::Asset).unwrap();
        let sales = books
            .register_account("Sales Revenue", AccountType::Revenue)
            .unwrap();
        for day in 1..=12 {
            books
                .post(
                    NewTransaction::new(date(day), format!("Sale {day}"))
                        .debit(cash, usd(100))
                        .credit(sales, usd(100)),
                )
                .unwrap();
        }

        let page = books.snapshot().journal_page(PageRequest::new(2, 5));
        let particulars: Vec<_> = page.data.iter().map(|tx| tx.description.as_str()).collect();
        assert_eq!(particulars, vec!["Sale 6", "Sale 7", "Sale 8", "Sale 9", "Sale 10"]);
        assert_eq!(page.meta.total, 12);
        assert_eq!(page.meta.total_pages, 3);
    }

    #[test]
    fn test_commit_copies_journal_only_while_snapshot_alive() {
        let books = Books::in_memory(Currency::Usd);
        let cash = books.register_account("Cash Account", AccountType::Asset).unwrap();
        let sales = books
            .register_account("Sales Revenue", AccountType::Revenue)
            .unwrap();
        let sale = || {
            NewTransaction::new(date(15), "Cash sale")
                .debit(cash, usd(100))
                .credit(sales, usd(100))
        };
        let journal_ptr = |books: &Books| Arc::as_ptr(&books.state.read().journal);

        let in_place = journal_ptr(&books);
        books.post(sale()).unwrap();
        assert_eq!(journal_ptr(&books), in_place);

        let held = books.snapshot();
        books.post(sale()).unwrap();
        assert_ne!(journal_ptr(&books), Arc::as_ptr(&held.journal));
        assert_eq!(held.journal_len(), 1);
        assert_eq!(books.journal_len(), 2);
    }
}
