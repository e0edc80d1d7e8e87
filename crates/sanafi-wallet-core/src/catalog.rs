//! Static demo data shown by the home, activity and transfer screens.

use rand::Rng;
use sanafi_api_types::TokenSymbol;
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;

/// How often the home screen refreshes its price board.
pub const PRICE_TICK: Duration = Duration::from_secs(5);

/// Rows shown in the home screen's recent activity card.
pub const RECENT_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub symbol: TokenSymbol,
    pub name: String,
    pub balance: f64,
    pub price: f64,
    pub change_24h: f64,
}

impl Token {
    pub fn new(symbol: &str, name: &str, balance: f64, price: f64, change_24h: f64) -> Self {
        Self {
            symbol: TokenSymbol::new(symbol),
            name: name.to_owned(),
            balance,
            price,
            change_24h,
        }
    }

    pub fn value(&self) -> f64 {
        self.balance * self.price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Sent,
    Received,
    Exchange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Completed,
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TxKind,
    pub amount: f64,
    pub token: TokenSymbol,
    /// Recipient for sent transactions, sender for received ones.
    pub counterparty: Option<String>,
    pub status: TxStatus,
    pub minutes_ago: u64,
    pub fee: Option<f64>,
    pub hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub symbol: TokenSymbol,
    pub name: String,
    pub price: f64,
    pub change_24h: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub address: String,
    pub last_used_minutes_ago: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxFilter {
    #[default]
    All,
    Sent,
    Received,
    Exchange,
}

impl TxFilter {
    pub const ALL: [TxFilter; 4] = [Self::All, Self::Sent, Self::Received, Self::Exchange];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::All => "All Transactions",
            Self::Sent => "Sent",
            Self::Received => "Received",
            Self::Exchange => "Exchanges",
        }
    }

    pub fn matches(self, tx: &Transaction) -> bool {
        match self {
            Self::All => true,
            Self::Sent => tx.kind == TxKind::Sent,
            Self::Received => tx.kind == TxKind::Received,
            Self::Exchange => tx.kind == TxKind::Exchange,
        }
    }
}

impl FromStr for TxFilter {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "sent" => Ok(Self::Sent),
            "received" => Ok(Self::Received),
            "exchange" | "exchanges" => Ok(Self::Exchange),
            other => Err(format!("unknown activity filter '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethod {
    pub name: &'static str,
    pub details: &'static str,
    pub processing_time: &'static str,
    pub fee: f64,
    pub is_default: bool,
}

pub static PAYMENT_METHODS: [PaymentMethod; 4] = [
    PaymentMethod {
        name: "Emirates NBD Bank Transfer",
        details: "Current Account ****1234",
        processing_time: "1-2 business days",
        fee: 0.0,
        is_default: true,
    },
    PaymentMethod {
        name: "Visa Debit Card",
        details: "**** **** **** 5678",
        processing_time: "Instant",
        fee: 2.5,
        is_default: false,
    },
    PaymentMethod {
        name: "Apple Pay",
        details: "iPhone Wallet",
        processing_time: "Instant",
        fee: 1.5,
        is_default: false,
    },
    PaymentMethod {
        name: "Cash Deposit",
        details: "At Sanafi Partner Locations",
        processing_time: "Instant",
        fee: 5.0,
        is_default: false,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankAccount {
    pub name: &'static str,
    pub account_number: &'static str,
    pub bank_name: &'static str,
    pub is_default: bool,
}

pub static BANK_ACCOUNTS: [BankAccount; 3] = [
    BankAccount {
        name: "Emirates NBD Current Account",
        account_number: "****1234",
        bank_name: "Emirates NBD",
        is_default: true,
    },
    BankAccount {
        name: "ADCB Savings Account",
        account_number: "****5678",
        bank_name: "Abu Dhabi Commercial Bank",
        is_default: false,
    },
    BankAccount {
        name: "FAB Business Account",
        account_number: "****9012",
        bank_name: "First Abu Dhabi Bank",
        is_default: false,
    },
];

pub fn default_payment_method() -> &'static PaymentMethod {
    PAYMENT_METHODS
        .iter()
        .find(|method| method.is_default)
        .unwrap_or(&PAYMENT_METHODS[0])
}

pub fn payment_method(name: &str) -> Option<&'static PaymentMethod> {
    PAYMENT_METHODS.iter().find(|method| method.name == name)
}

pub fn default_bank_account() -> &'static BankAccount {
    BANK_ACCOUNTS
        .iter()
        .find(|account| account.is_default)
        .unwrap_or(&BANK_ACCOUNTS[0])
}

pub fn tokens() -> Vec<Token> {
    vec![
        Token::new("AEDS", "AED Sanafi", 15420.50, 3.67, 0.02),
        Token::new("IDRS", "IDR Sanafi", 45_680_000.00, 0.000067, 0.15),
        Token::new("USDC", "USD Coin", 2840.00, 1.00, -0.01),
        Token::new("USDT", "Tether USD", 1250.75, 0.999, 0.05),
        Token::new("SANA", "Sanafi Token", 5680.25, 0.45, 2.34),
        Token::new("SanaSOL", "Sanafi Solana LST", 892.15, 12.75, -1.28),
    ]
}

pub fn prices() -> Vec<PriceRow> {
    tokens()
        .into_iter()
        .map(|token| PriceRow {
            symbol: token.symbol,
            name: token.name,
            price: token.price,
            change_24h: token.change_24h,
        })
        .collect()
}

/// Simulated market move: each price drifts by at most half a percent and the
/// 24h change is redrawn within +/-2%.
pub fn tick_prices<R: Rng + ?Sized>(rows: &mut [PriceRow], rng: &mut R) {
    for row in rows {
        row.price *= rng.gen_range(0.995..1.005);
        row.change_24h = rng.gen_range(-2.0..2.0);
    }
}

fn tx(
    id: &str,
    kind: TxKind,
    amount: f64,
    token: &str,
    counterparty: Option<&str>,
    status: TxStatus,
    minutes_ago: u64,
    fee: Option<f64>,
    hash: Option<&str>,
) -> Transaction {
    Transaction {
        id: id.to_owned(),
        kind,
        amount,
        token: TokenSymbol::new(token),
        counterparty: counterparty.map(str::to_owned),
        status,
        minutes_ago,
        fee,
        hash: hash.map(str::to_owned),
    }
}

pub fn transactions() -> Vec<Transaction> {
    use TxKind::*;
    use TxStatus::*;

    const HOUR: u64 = 60;
    const DAY: u64 = 24 * HOUR;

    vec![
        tx("1", Received, 500.00, "AEDS", Some("Fatima Al-Zahra"), Completed, 2 * HOUR, None, Some("5KJp9...4mN2x")),
        tx("2", Sent, 150.00, "USDC", Some("Omar Hassan"), Completed, 6 * HOUR, Some(0.25), Some("8Tr5w...9pK4j")),
        tx("3", Exchange, 1000.00, "AEDS", None, Completed, DAY, Some(2.50), Some("2Nq8v...7xR9m")),
        tx("4", Sent, 75.50, "USDT", Some("Aisha Mohammed"), Pending, 30, Some(0.15), None),
        tx("5", Received, 2500.00, "AEDS", Some("Emirates NBD"), Completed, 2 * DAY, None, Some("9Hm3k...5tY8p")),
        tx("6", Received, 250.00, "SANA", Some("Khalid Al-Mansouri"), Completed, 4 * HOUR, None, Some("7Kp2m...3nR8x")),
        tx("7", Sent, 45.75, "SanaSOL", Some("Mariam Al-Zaabi"), Completed, 8 * HOUR, Some(0.05), Some("4Nm9w...6tY2p")),
        tx("8", Received, 15_000_000.00, "IDRS", Some("Bank Indonesia"), Completed, 12 * HOUR, None, Some("6Lm8k...2wQ9r")),
        tx("9", Sent, 5_000_000.00, "IDRS", Some("Sari Dewi"), Completed, 18 * HOUR, Some(50_000.00), Some("3Pk7n...9xT4m")),
    ]
}

pub fn contacts() -> Vec<Contact> {
    [
        ("1", "Fatima Al-Zahra", "8K7Qt...9mPx2", 2 * 60),
        ("2", "Omar Hassan", "5Np9w...4kR7j", 6 * 60),
        ("3", "Aisha Mohammed", "2Tr5m...8pN4x", 24 * 60),
        ("4", "Emirates NBD", "9Hm3k...5tY8p", 3 * 24 * 60),
        ("5", "Khalid Al-Mansouri", "7Kp2m...3nR8x", 4 * 60),
        ("6", "Mariam Al-Zaabi", "4Nm9w...6tY2p", 8 * 60),
        ("7", "Bank Indonesia", "6Lm8k...2wQ9r", 12 * 60),
        ("8", "Sari Dewi", "3Pk7n...9xT4m", 18 * 60),
    ]
    .into_iter()
    .map(|(id, name, address, minutes)| Contact {
        id: id.to_owned(),
        name: name.to_owned(),
        address: address.to_owned(),
        last_used_minutes_ago: minutes,
    })
    .collect()
}

/// Fiat value of all holdings: `sum(balance * price)`.
pub fn portfolio_value(tokens: &[Token]) -> f64 {
    tokens.iter().map(Token::value).sum()
}

pub fn filter_transactions(transactions: &[Transaction], filter: TxFilter) -> Vec<&Transaction> {
    transactions.iter().filter(|tx| filter.matches(tx)).collect()
}

/// The newest `count` entries; the list is kept newest first.
pub fn recent_transactions(transactions: &[Transaction], count: usize) -> &[Transaction] {
    &transactions[..count.min(transactions.len())]
}

pub fn transactions_for<'a>(transactions: &'a [Transaction], symbol: &str) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.token.as_str() == symbol)
        .collect()
}

pub fn find_token<'a>(tokens: &'a [Token], symbol: &str) -> Option<&'a Token> {
    tokens.iter().find(|token| token.symbol.as_str() == symbol)
}
