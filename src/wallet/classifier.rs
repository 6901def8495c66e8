//! Heuristic wallet-vs-program classification.
//!
//! This is a heuristic, not a guarantee: sources differ in which ownership
//! fields they expose, and a misclassification is possible. Downstream
//! consumers (currently the diagnostic CLI) must treat the label as a hint.

use std::fmt;

use solana_sdk::system_program;

use super::types::WalletAccount;

/// Classification outcome for a resolved account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Wallet,
    Program,
    /// No account data was available to inspect (e.g. resolution failed).
    Unknown,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Wallet => "wallet",
            AccountKind::Program => "program",
            AccountKind::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Classify an account as a plain wallet or a program.
///
/// An exposed owning program decides first: only system-program ownership
/// means a wallet. Without one, the executable flag decides.
pub fn classify(account: &WalletAccount) -> AccountKind {
    if let Some(owner) = &account.owner_program {
        return if *owner == system_program::id().to_string() {
            AccountKind::Wallet
        } else {
            AccountKind::Program
        };
    }

    if account.executable {
        AccountKind::Program
    } else {
        AccountKind::Wallet
    }
}
