//! Derived wallet metrics and report rendering.
//!
//! All temporal derivations use only transaction records with a present
//! block time; records without one are ignored for temporal math but still
//! count toward the transaction total. Rendering is pure text composition
//! and never mutates its inputs.

use std::cmp::Ordering;
use std::fmt;

use chrono::Utc;
use solana_sdk::native_token::lamports_to_sol;

use super::types::{ResolvedWallet, TokenHolding, TransactionRecord, SIGNATURE_FETCH_LIMIT};

/// How many holdings are rendered individually; the rest are summarized.
pub const TOP_HOLDINGS_RENDERED: usize = 8;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * 60;
const SECONDS_PER_DAY: i64 = 60 * 60 * 24;
const RECENT_WINDOW_DAYS: i64 = 30;

/// Coarse categorical label for transaction volume and recency.
///
/// Ordered so the recency adjustment can only upgrade the base tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActivityLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityLevel::VeryLow => "Very Low",
            ActivityLevel::Low => "Low",
            ActivityLevel::Medium => "Medium",
            ActivityLevel::High => "High",
            ActivityLevel::VeryHigh => "Very High",
        };
        write!(f, "{label}")
    }
}

/// Activity level from the total observed count and the recent-30-day count.
/// The recency tier can upgrade the base tier but never downgrade it.
pub fn activity_level(transaction_count: usize, recent_count: usize) -> ActivityLevel {
    let base = match transaction_count {
        n if n > 1000 => ActivityLevel::VeryHigh,
        n if n > 500 => ActivityLevel::High,
        n if n > 100 => ActivityLevel::Medium,
        n if n > 10 => ActivityLevel::Low,
        _ => ActivityLevel::VeryLow,
    };
    let recency = match recent_count {
        n if n > 50 => ActivityLevel::VeryHigh,
        n if n > 20 => ActivityLevel::High,
        n if n > 5 => ActivityLevel::Medium,
        _ => ActivityLevel::VeryLow,
    };
    base.max(recency)
}

/// Elapsed time since the earliest timestamped transaction, bucketed to the
/// coarsest non-zero unit. "Unknown" when no timestamp exists.
pub fn describe_wallet_age(first_block_time: Option<i64>, now: i64) -> String {
    let Some(first) = first_block_time else {
        return "Unknown".to_string();
    };

    let days = (now - first).max(0) / SECONDS_PER_DAY;
    let months = days / 30;
    let years = days / 365;

    if years > 0 {
        format!("{years} year{} old", plural(years))
    } else if months > 0 {
        format!("{months} month{} old", plural(months))
    } else if days > 0 {
        format!("{days} day{} old", plural(days))
    } else {
        "Less than a day old".to_string()
    }
}

/// Elapsed time since the latest timestamped transaction, bucketed to
/// minutes, hours, days or months. "Unknown" when no timestamp exists.
pub fn describe_last_activity(last_block_time: Option<i64>, now: i64) -> String {
    let Some(last) = last_block_time else {
        return "Unknown".to_string();
    };

    let elapsed = (now - last).max(0);
    let minutes = elapsed / SECONDS_PER_MINUTE;
    let hours = elapsed / SECONDS_PER_HOUR;
    let days = elapsed / SECONDS_PER_DAY;

    if minutes < 60 {
        format!("{minutes} minute{} ago", plural(minutes))
    } else if hours < 24 {
        format!("{hours} hour{} ago", plural(hours))
    } else if days < 30 {
        format!("{days} day{} ago", plural(days))
    } else {
        let months = days / 30;
        format!("{months} month{} ago", plural(months))
    }
}

/// Count of transactions with a block time inside the recent window.
pub fn count_recent_transactions(transactions: &[TransactionRecord], now: i64) -> usize {
    let cutoff = now - RECENT_WINDOW_DAYS * SECONDS_PER_DAY;
    transactions
        .iter()
        .filter(|tx| tx.block_time.map_or(false, |t| t >= cutoff))
        .count()
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn timestamp_bounds(transactions: &[TransactionRecord]) -> (Option<i64>, Option<i64>) {
    let mut first = None;
    let mut last = None;
    for tx in transactions {
        let Some(t) = tx.block_time else { continue };
        first = Some(first.map_or(t, |f: i64| f.min(t)));
        last = Some(last.map_or(t, |l: i64| l.max(t)));
    }
    (first, last)
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out
}

/// Format a token display amount with thousands grouping and up to three
/// fractional digits, trailing zeros trimmed.
pub fn format_token_amount(amount: f64) -> String {
    if !amount.is_finite() || amount <= 0.0 {
        return "0".to_string();
    }

    let scaled = (amount * 1000.0).round() / 1000.0;
    let whole = scaled.trunc() as u128;
    let millis = ((scaled - scaled.trunc()) * 1000.0).round() as u32;

    let mut out = group_thousands(whole);
    if millis > 0 {
        let frac = format!("{millis:03}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

fn render_holdings(holdings: &[TokenHolding]) -> (String, f64) {
    if holdings.is_empty() {
        return ("No tokens found".to_string(), 0.0);
    }

    let mut sorted: Vec<&TokenHolding> = holdings.iter().collect();
    sorted.sort_by(|a, b| {
        b.display_amount
            .partial_cmp(&a.display_amount)
            .unwrap_or(Ordering::Equal)
    });

    let mut total_value = 0.0;
    let mut lines = Vec::with_capacity(sorted.len().min(TOP_HOLDINGS_RENDERED) + 1);

    for holding in sorted.iter().take(TOP_HOLDINGS_RENDERED) {
        let symbol = holding.symbol.as_deref().unwrap_or("Unknown");
        let amount = format_token_amount(holding.display_amount);
        match holding.unit_price_usd {
            Some(price) => {
                let value = holding.display_amount * price;
                total_value += value;
                lines.push(format!("• {symbol}: {amount} (${value:.2})"));
            }
            None => lines.push(format!("• {symbol}: {amount}")),
        }
    }

    if sorted.len() > TOP_HOLDINGS_RENDERED {
        lines.push(format!(
            "... and {} more tokens",
            sorted.len() - TOP_HOLDINGS_RENDERED
        ));
    }

    (lines.join("\n"), total_value)
}

/// Render the full report for a resolved wallet as of now.
pub fn render_report(wallet: &ResolvedWallet, address: &str) -> String {
    render_report_at(wallet, address, Utc::now().timestamp())
}

/// Render the full report relative to an explicit reference time. Split out
/// from [`render_report`] so derivations stay deterministic under test.
pub fn render_report_at(wallet: &ResolvedWallet, address: &str, now: i64) -> String {
    let account = &wallet.account;
    let (first, last) = timestamp_bounds(&wallet.transactions);

    let wallet_age = describe_wallet_age(first, now);
    let last_activity = describe_last_activity(last, now);
    let recent = count_recent_transactions(&wallet.transactions, now);
    let activity = activity_level(account.transaction_count, recent);

    let sol_balance = format!("{:.6}", lamports_to_sol(account.lamports));
    let (holdings_text, total_value) = render_holdings(&account.holdings);

    let tx_count = group_thousands(account.transaction_count as u128);
    let tx_qualifier = if account.transaction_count >= SIGNATURE_FETCH_LIMIT {
        " (showing recent 1000)"
    } else {
        ""
    };

    let total_value_line = if total_value > 0.0 {
        format!("💎 *Total Token Value:* ${total_value:.2}\n")
    } else {
        String::new()
    };

    let account_type = if account.executable {
        "Executable"
    } else {
        "Non-executable"
    };

    format!(
        "🔍 *Wallet Analysis Report*\n\
         \n\
         📍 *Address:* `{address}`\n\
         \n\
         💰 *SOL Balance:* {sol_balance} SOL\n\
         \n\
         🪙 *Token Holdings:* {holding_count} tokens\n\
         {holdings_text}\n\
         \n\
         {total_value_line}📊 *Transaction Count:* {tx_count}{tx_qualifier}\n\
         📈 *Activity Level:* {activity}\n\
         ⏰ *Wallet Age:* {wallet_age}\n\
         🕐 *Last Activity:* {last_activity}\n\
         \n\
         🔗 *Account Type:* {account_type}\n\
         \n\
         📡 *Data Source:* {source}",
        holding_count = account.holdings.len(),
        source = account.source.display_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = SECONDS_PER_DAY;

    #[test]
    fn wallet_age_buckets() {
        let now = 2_000_000_000;
        assert_eq!(describe_wallet_age(None, now), "Unknown");
        assert_eq!(describe_wallet_age(Some(now - 400 * DAY), now), "1 year old");
        assert_eq!(
            describe_wallet_age(Some(now - 800 * DAY), now),
            "2 years old"
        );
        assert_eq!(
            describe_wallet_age(Some(now - 45 * DAY), now),
            "1 month old"
        );
        assert_eq!(describe_wallet_age(Some(now - 3 * DAY), now), "3 days old");
        assert_eq!(
            describe_wallet_age(Some(now - 3600), now),
            "Less than a day old"
        );
    }

    #[test]
    fn last_activity_buckets() {
        let now = 2_000_000_000;
        assert_eq!(describe_last_activity(None, now), "Unknown");
        assert_eq!(
            describe_last_activity(Some(now - 5 * 60), now),
            "5 minutes ago"
        );
        assert_eq!(describe_last_activity(Some(now - 60), now), "1 minute ago");
        assert_eq!(
            describe_last_activity(Some(now - 3 * 3600), now),
            "3 hours ago"
        );
        assert_eq!(
            describe_last_activity(Some(now - 10 * DAY), now),
            "10 days ago"
        );
        assert_eq!(
            describe_last_activity(Some(now - 90 * DAY), now),
            "3 months ago"
        );
    }

    #[test]
    fn activity_level_base_tiers() {
        assert_eq!(activity_level(1200, 0), ActivityLevel::VeryHigh);
        assert_eq!(activity_level(600, 0), ActivityLevel::High);
        assert_eq!(activity_level(150, 0), ActivityLevel::Medium);
        assert_eq!(activity_level(50, 0), ActivityLevel::Low);
        assert_eq!(activity_level(3, 0), ActivityLevel::VeryLow);
    }

    #[test]
    fn activity_level_recency_upgrades_but_never_downgrades() {
        // Upgrade: low base, busy month.
        assert_eq!(activity_level(50, 25), ActivityLevel::High);
        assert_eq!(activity_level(3, 60), ActivityLevel::VeryHigh);
        assert_eq!(activity_level(50, 6), ActivityLevel::Medium);
        // No downgrade: very-high base with a quiet month stays very high.
        assert_eq!(activity_level(1200, 6), ActivityLevel::VeryHigh);
        assert_eq!(activity_level(600, 0), ActivityLevel::High);
    }

    #[test]
    fn token_amount_formatting() {
        assert_eq!(format_token_amount(0.0), "0");
        assert_eq!(format_token_amount(1234567.0), "1,234,567");
        assert_eq!(format_token_amount(2.5), "2.5");
        assert_eq!(format_token_amount(0.125), "0.125");
        assert_eq!(format_token_amount(f64::NAN), "0");
    }

    fn wallet_with(
        transactions: Vec<TransactionRecord>,
        holdings: Vec<TokenHolding>,
        transaction_count: usize,
    ) -> ResolvedWallet {
        use crate::wallet::types::{DataSource, WalletAccount};
        ResolvedWallet {
            account: WalletAccount {
                lamports: 1_500_000_000,
                executable: false,
                owner_program: None,
                holdings,
                transaction_count,
                source: DataSource::Rpc,
            },
            transactions,
        }
    }

    #[test]
    fn report_with_no_timestamps_renders_unknown() {
        let wallet = wallet_with(
            vec![TransactionRecord {
                signature: "sig1".to_string(),
                block_time: None,
            }],
            Vec::new(),
            1,
        );
        let report = render_report_at(&wallet, "SomeAddress", 2_000_000_000);
        assert!(report.contains("*Wallet Age:* Unknown"));
        assert!(report.contains("*Last Activity:* Unknown"));
        assert!(report.contains("1.500000 SOL"));
        assert!(report.contains("No tokens found"));
    }

    #[test]
    fn report_buckets_age_and_activity_from_timestamps() {
        let now = 2_000_000_000;
        let wallet = wallet_with(
            vec![
                TransactionRecord {
                    signature: "old".to_string(),
                    block_time: Some(now - 400 * DAY),
                },
                TransactionRecord {
                    signature: "recent".to_string(),
                    block_time: Some(now - 10 * DAY),
                },
            ],
            Vec::new(),
            2,
        );
        let report = render_report_at(&wallet, "SomeAddress", now);
        assert!(report.contains("*Wallet Age:* 1 year old"));
        assert!(report.contains("*Last Activity:* 10 days ago"));
        assert!(report.contains("*Data Source:* Solana RPC"));
    }

    #[test]
    fn report_caps_rendered_holdings_and_summarizes_rest() {
        let holdings: Vec<TokenHolding> = (0..10)
            .map(|i| TokenHolding {
                mint: format!("Mint{i}"),
                raw_amount: "1".to_string(),
                display_amount: (10 - i) as f64,
                symbol: Some(format!("TK{i}")),
                name: Some(format!("Token {i}")),
                unit_price_usd: None,
            })
            .collect();
        let wallet = wallet_with(Vec::new(), holdings, 0);

        let report = render_report_at(&wallet, "SomeAddress", 2_000_000_000);
        assert!(report.contains("• TK0: 10"));
        assert!(report.contains("• TK7: 3"));
        assert!(!report.contains("• TK8: 2"));
        assert!(report.contains("... and 2 more tokens"));
        // USD values are omitted entirely without prices, never zeroed.
        assert!(!report.contains("Total Token Value"));
        assert!(!report.contains("$0.00"));
    }

    #[test]
    fn report_includes_usd_values_when_priced() {
        let holdings = vec![TokenHolding {
            mint: "MintA".to_string(),
            raw_amount: "2000000".to_string(),
            display_amount: 2.0,
            symbol: Some("USDC".to_string()),
            name: Some("USD Coin".to_string()),
            unit_price_usd: Some(1.0),
        }];
        let wallet = wallet_with(Vec::new(), holdings, 0);

        let report = render_report_at(&wallet, "SomeAddress", 2_000_000_000);
        assert!(report.contains("• USDC: 2 ($2.00)"));
        assert!(report.contains("*Total Token Value:* $2.00"));
    }

    #[test]
    fn report_qualifies_capped_transaction_counts() {
        let wallet = wallet_with(Vec::new(), Vec::new(), 1000);
        let report = render_report_at(&wallet, "SomeAddress", 2_000_000_000);
        assert!(report.contains("*Transaction Count:* 1,000 (showing recent 1000)"));

        let wallet = wallet_with(Vec::new(), Vec::new(), 42);
        let report = render_report_at(&wallet, "SomeAddress", 2_000_000_000);
        assert!(report.contains("*Transaction Count:* 42\n"));
    }

    #[test]
    fn rendering_does_not_mutate_input() {
        let holdings = vec![
            TokenHolding {
                mint: "MintA".to_string(),
                raw_amount: "1".to_string(),
                display_amount: 1.0,
                symbol: Some("A".to_string()),
                name: None,
                unit_price_usd: None,
            },
            TokenHolding {
                mint: "MintB".to_string(),
                raw_amount: "2".to_string(),
                display_amount: 2.0,
                symbol: Some("B".to_string()),
                name: None,
                unit_price_usd: None,
            },
        ];
        let wallet = wallet_with(Vec::new(), holdings, 0);
        let _ = render_report_at(&wallet, "SomeAddress", 2_000_000_000);
        // Holdings keep their source order even though rendering sorts.
        assert_eq!(wallet.account.holdings[0].mint, "MintA");
        assert_eq!(wallet.account.holdings[1].mint, "MintB");
    }
}
