//! Transaction workflow - composing sends and browsing history

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{SendTransaction, Transaction, Wallet};
use crate::ports::TransactionBackend;
use crate::services::fence::RequestFence;

/// The editable fields of a send
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDraft {
    pub to_address: String,
    /// `None` until the amount text parses as a decimal
    pub amount: Option<Decimal>,
    pub memo: String,
}

/// Composes and submits a send from one wallet.
///
/// The balance check here is advisory: the server has the final word, and a
/// rejection of a draft that passed locally is an ordinary failure.
pub struct TransactionComposer {
    backend: Arc<dyn TransactionBackend>,
    wallet: Wallet,
    draft: TransactionDraft,
    error: Option<String>,
    last_sent: Option<Transaction>,
}

impl std::fmt::Debug for TransactionComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionComposer")
            .field("wallet", &self.wallet)
            .field("draft", &self.draft)
            .field("error", &self.error)
            .field("last_sent", &self.last_sent)
            .finish_non_exhaustive()
    }
}

impl TransactionComposer {
    pub fn new(backend: Arc<dyn TransactionBackend>, wallet: Wallet) -> Result<Self> {
        if !wallet.active {
            return Err(Error::validation("Inactive wallets cannot send funds"));
        }
        Ok(Self {
            backend,
            wallet,
            draft: TransactionDraft::default(),
            error: None,
            last_sent: None,
        })
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn draft(&self) -> &TransactionDraft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_sent(&self) -> Option<&Transaction> {
        self.last_sent.as_ref()
    }

    /// Message shown after a successful send
    pub fn confirmation(&self) -> Option<String> {
        self.last_sent
            .as_ref()
            .map(|tx| format!("Transaction sent successfully! Hash: {}", tx.hash))
    }

    pub fn set_recipient(&mut self, address: impl Into<String>) {
        self.draft.to_address = address.into();
    }

    /// Parse user input as an exact decimal; garbage leaves the amount unset
    pub fn set_amount_text(&mut self, text: &str) {
        self.draft.amount = Decimal::from_str(text.trim()).ok();
    }

    pub fn set_amount(&mut self, amount: Decimal) {
        self.draft.amount = Some(amount);
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) {
        self.draft.memo = memo.into();
    }

    /// Whether the submit control should be enabled
    pub fn can_submit(&self) -> bool {
        self.check().is_ok()
    }

    /// Build the request body, or explain why the draft is not sendable
    pub fn check(&self) -> Result<SendTransaction> {
        let to_address = self.draft.to_address.trim();
        if to_address.is_empty() {
            return Err(Error::validation("Recipient address is required"));
        }
        let amount = self
            .draft
            .amount
            .ok_or_else(|| Error::validation("Amount must be a number"))?;
        if amount <= Decimal::ZERO {
            return Err(Error::validation("Amount must be greater than zero"));
        }
        if amount > self.wallet.balance {
            return Err(Error::validation(format!(
                "Amount exceeds available balance of {}",
                self.wallet.formatted_balance()
            )));
        }
        let memo = self.draft.memo.trim();
        Ok(SendTransaction {
            wallet_id: self.wallet.id,
            to_address: to_address.to_string(),
            amount,
            memo: (!memo.is_empty()).then(|| memo.to_string()),
        })
    }

    /// Send the draft; on success the draft is cleared
    pub async fn submit(&mut self) -> Result<Transaction> {
        let request = self.check()?;
        match self.backend.send_transaction(&request).await {
            Ok(tx) => {
                info!(wallet_id = self.wallet.id, hash = %tx.hash, "transaction sent");
                self.draft = TransactionDraft::default();
                self.error = None;
                self.last_sent = Some(tx.clone());
                Ok(tx)
            }
            Err(e) => {
                warn!(wallet_id = self.wallet.id, error = %e, "send rejected");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

/// Whose transactions to list; exactly one of the two
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryScope {
    Wallet(i64),
    /// Union of all the user's wallets
    User(i64),
}

pub struct TransactionHistory {
    backend: Arc<dyn TransactionBackend>,
    scope: HistoryScope,
    transactions: Vec<Transaction>,
    error: Option<String>,
    fence: RequestFence,
}

impl TransactionHistory {
    pub fn new(backend: Arc<dyn TransactionBackend>, scope: HistoryScope) -> Self {
        Self {
            backend,
            scope,
            transactions: Vec::new(),
            error: None,
            fence: RequestFence::new(),
        }
    }

    pub fn scope(&self) -> HistoryScope {
        self.scope
    }

    /// Change scope; the old list is dropped until the next load
    pub fn set_scope(&mut self, scope: HistoryScope) {
        if scope != self.scope {
            self.scope = scope;
            self.transactions.clear();
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Newest first
    pub async fn load(&mut self) -> Result<&[Transaction]> {
        let ticket = self.fence.issue();
        let result = match self.scope {
            HistoryScope::Wallet(id) => self.backend.wallet_transactions(id).await,
            HistoryScope::User(id) => self.backend.user_transactions(id).await,
        };
        if !self.fence.is_current(ticket) {
            debug!(scope = ?self.scope, "discarding stale history");
            return Ok(&self.transactions);
        }
        match result {
            Ok(mut transactions) => {
                transactions.sort_by(|a, b| {
                    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
                });
                self.transactions = transactions;
                self.error = None;
                Ok(&self.transactions)
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
