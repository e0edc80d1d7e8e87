use sanafi_api_types::Route;
use sanafi_services::ViewScope;
use sanafi_wallet_core::transfer::success_message;
use sanafi_wallet_core::{
    AuthMode, ChatSession, FieldError, FlowError, Form, Progress, Transaction, TransferTab,
    TxFilter, WalletCore,
};
use std::fmt::Write as _;

pub const HELP: &str = "\
commands:
  status                          session flags, KYC status and current screen
  login <email> <password>        sign in
  signup <email> <password> <confirm>
  onboard                         walk the onboarding slides
  kyc <field>=<value>; ...         fill in and submit identity verification
  kyc-skip                        defer identity verification
  portfolio                       token balances, total value and recent activity
  prices                          advance the live price board by one tick
  token <symbol>                  holding and transactions of one token
  activity [all|sent|received|exchange]
  add-funds <token> <amount> [payment method]
  cash-out <token> <amount> [bank account]
  send <token> <amount> <recipient>
  ask <question>                  talk to the assistant
  logout
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Login { email: String, password: String },
    Signup { email: String, password: String, confirm: String },
    Onboard,
    Kyc(Vec<(String, String)>),
    KycSkip,
    Portfolio,
    Prices,
    TokenDetail(String),
    Activity(TxFilter),
    AddFunds { token: String, amount: String, method: Option<String> },
    CashOut { token: String, amount: String, account: Option<String> },
    Send { token: String, amount: String, recipient: String },
    Ask(String),
    Logout,
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match (verb, args.as_slice()) {
        ("", _) => return Ok(None),
        ("status", []) => Command::Status,
        ("login", [email, password]) => Command::Login {
            email: (*email).to_owned(),
            password: (*password).to_owned(),
        },
        ("signup", [email, password, confirm]) => Command::Signup {
            email: (*email).to_owned(),
            password: (*password).to_owned(),
            confirm: (*confirm).to_owned(),
        },
        ("onboard", []) => Command::Onboard,
        ("kyc", _) if !rest.trim().is_empty() => Command::Kyc(parse_pairs(rest)?),
        ("kyc-skip", []) => Command::KycSkip,
        ("portfolio", []) => Command::Portfolio,
        ("prices", []) => Command::Prices,
        ("token", [symbol]) => Command::TokenDetail((*symbol).to_owned()),
        ("activity", []) => Command::Activity(TxFilter::All),
        ("activity", [filter]) => Command::Activity(filter.parse()?),
        ("add-funds", [token, amount, method @ ..]) => Command::AddFunds {
            token: (*token).to_owned(),
            amount: (*amount).to_owned(),
            method: (!method.is_empty()).then(|| method.join(" ")),
        },
        ("cash-out", [token, amount, account @ ..]) => Command::CashOut {
            token: (*token).to_owned(),
            amount: (*amount).to_owned(),
            account: (!account.is_empty()).then(|| account.join(" ")),
        },
        ("send", [token, amount, recipient]) => Command::Send {
            token: (*token).to_owned(),
            amount: (*amount).to_owned(),
            recipient: (*recipient).to_owned(),
        },
        ("ask", _) if !rest.trim().is_empty() => Command::Ask(rest.trim().to_owned()),
        ("logout", []) => Command::Logout,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => return Err(format!("unrecognised command '{line}', try 'help'")),
    };
    Ok(Some(command))
}

/// `first_name=Layla; address=Marina Walk 12` into ordered pairs.
fn parse_pairs(raw: &str) -> Result<Vec<(String, String)>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_owned(), value.trim().to_owned()))
            }
            _ => Err(format!("expected <field>=<value>, got '{pair}'")),
        })
        .collect()
}

/// Stand-in for the app screens: runs one command against the wallet and renders text.
pub struct Console {
    wallet: WalletCore,
    chat: ChatSession,
}

impl Console {
    pub fn new(wallet: WalletCore) -> Self {
        let chat = wallet.chat();
        Self { wallet, chat }
    }

    pub fn greeting(&self) -> String {
        self.chat
            .messages()
            .first()
            .map(|message| message.text.clone())
            .unwrap_or_default()
    }

    pub async fn run(&mut self, command: Command, scope: &ViewScope) -> String {
        match self.execute(command, scope).await {
            Ok(output) => output,
            Err(err) => err
                .user_message()
                .unwrap_or_else(|| "cancelled".to_owned()),
        }
    }

    async fn execute(&mut self, command: Command, scope: &ViewScope) -> Result<String, FlowError> {
        match command {
            Command::Status => self.status().await,
            Command::Login { email, password } => {
                let mut auth = self.wallet.auth(AuthMode::SignIn)?;
                auth.set("email", &email)?;
                auth.set("password", &password)?;
                let progress = auth.submit(scope).await?;
                Ok(describe_auth(progress))
            }
            Command::Signup {
                email,
                password,
                confirm,
            } => {
                let mut auth = self.wallet.auth(AuthMode::SignUp)?;
                auth.set("email", &email)?;
                auth.set("password", &password)?;
                auth.set("confirm_password", &confirm)?;
                let progress = auth.submit(scope).await?;
                Ok(describe_auth(progress))
            }
            Command::Onboard => {
                let mut onboarding = self.wallet.onboarding()?;
                let mut output = String::new();
                loop {
                    let slide = onboarding.slide();
                    let _ = writeln!(output, "{} - {}", slide.title, slide.subtitle);
                    let _ = writeln!(output, "  {}", slide.description);
                    if let Progress::Finished(route) = onboarding.next().await? {
                        let _ = write!(output, "onboarding complete, next: {}", route_name(route));
                        return Ok(output);
                    }
                }
            }
            Command::Kyc(pairs) => {
                let mut kyc = self.wallet.kyc()?;
                for (name, value) in &pairs {
                    kyc.set(name, value)?;
                }
                // The console has no OTP channel; both contacts count as verified.
                kyc.verify_phone()?;
                kyc.verify_email()?;
                loop {
                    match kyc.next(scope).await? {
                        Progress::Moved { .. } => continue,
                        Progress::Blocked(failing) => return Ok(describe_blocked(&failing)),
                        Progress::Finished(outcome) => {
                            return Ok(format!(
                                "verification {:?}, next: {}",
                                outcome.status,
                                route_name(outcome.route)
                            ));
                        }
                    }
                }
            }
            Command::KycSkip => {
                let outcome = self.wallet.kyc()?.skip().await?;
                Ok(format!(
                    "verification deferred, some features may be limited. next: {}",
                    route_name(outcome.route)
                ))
            }
            Command::Portfolio => {
                let mut output = String::new();
                for token in self.wallet.tokens() {
                    let _ = writeln!(
                        output,
                        "{:<8} {:>16.2}  @ {:<10} = AED {:>12.2}  ({:+.2}%)",
                        token.symbol.as_str(),
                        token.balance,
                        token.price,
                        token.value(),
                        token.change_24h
                    );
                }
                let _ = write!(output, "total: AED {:.2}", self.wallet.portfolio_value());
                output.push_str("\nrecent:");
                for tx in self.wallet.recent_activity() {
                    output.push_str(&describe_tx(tx));
                }
                Ok(output)
            }
            Command::Prices => {
                let mut output = String::from("live prices:");
                for row in self.wallet.tick_prices() {
                    let _ = write!(
                        output,
                        "\n  {:<8} AED {:<12.6} ({:+.2}%)",
                        row.symbol.as_str(),
                        row.price,
                        row.change_24h
                    );
                }
                Ok(output)
            }
            Command::TokenDetail(symbol) => {
                let Some((token, transactions)) = self.wallet.token_detail(&symbol) else {
                    return Ok(format!("no token '{symbol}' in this wallet"));
                };
                let mut output = format!(
                    "{} ({}): {:.2} = AED {:.2}",
                    token.name,
                    token.symbol.as_str(),
                    token.balance,
                    token.value()
                );
                if transactions.is_empty() {
                    let _ = write!(output, "\nYour {} transactions will appear here", token.symbol.as_str());
                }
                for tx in transactions {
                    output.push_str(&describe_tx(tx));
                }
                Ok(output)
            }
            Command::Activity(filter) => {
                let transactions = self.wallet.activity(filter);
                let mut output = format!(
                    "Showing {} ({})",
                    filter.display_name(),
                    transactions.len()
                );
                for tx in transactions {
                    output.push_str(&describe_tx(tx));
                }
                Ok(output)
            }
            Command::AddFunds {
                token,
                amount,
                method,
            } => {
                let mut flow = self.wallet.add_funds()?;
                flow.select_token(&token)?;
                flow.set_amount(&amount)?;
                if let Some(method) = &method {
                    flow.select_method(method)?;
                }
                let quote = flow.quote();
                loop {
                    match flow.next(scope).await? {
                        Progress::Moved { .. } => continue,
                        Progress::Blocked(failing) => return Ok(describe_blocked(&failing)),
                        Progress::Finished(receipt) => {
                            let mut output = format!("requested via {} ({})", receipt.counterparty, receipt.reference);
                            if let Some(quote) = quote {
                                let _ = write!(
                                    output,
                                    "\ncharged AED {:.2}, receiving {:.4} {}",
                                    quote.total_charged,
                                    quote.tokens_to_receive,
                                    quote.token.as_str()
                                );
                            }
                            return Ok(output);
                        }
                    }
                }
            }
            Command::CashOut {
                token,
                amount,
                account,
            } => {
                let mut flow = self.wallet.cash_out()?;
                flow.select_token(&token)?;
                flow.set_amount(&amount)?;
                if let Some(account) = &account {
                    flow.select_account(account)?;
                }
                let quote = flow.quote();
                loop {
                    match flow.next(scope).await? {
                        Progress::Moved { .. } => continue,
                        Progress::Blocked(failing) => return Ok(describe_blocked(&failing)),
                        Progress::Finished(receipt) => {
                            let mut output = format!("withdrawal to {} ({})", receipt.counterparty, receipt.reference);
                            if let Some(quote) = quote {
                                let _ = write!(output, "\nyou receive AED {:.2} after fees", quote.net_amount);
                            }
                            return Ok(output);
                        }
                    }
                }
            }
            Command::Send {
                token,
                amount,
                recipient,
            } => {
                let mut flow = self.wallet.transfer(TransferTab::Send)?;
                flow.select_token(&token)?;
                flow.set_amount(&amount)?;
                flow.set_recipient(&recipient)?;
                match flow.send(scope).await? {
                    Progress::Finished(receipt) => Ok(success_message(&receipt)),
                    Progress::Blocked(failing) => Ok(describe_blocked(&failing)),
                    Progress::Moved { .. } => Ok(String::new()),
                }
            }
            Command::Ask(prompt) => Ok(self
                .chat
                .ask(scope, &prompt)
                .await?
                .unwrap_or_default()),
            Command::Logout => {
                self.wallet.logout().await?;
                self.chat = self.wallet.chat();
                Ok("signed out".to_owned())
            }
            Command::Help => Ok(HELP.to_owned()),
            Command::Quit => Ok(String::new()),
        }
    }

    async fn status(&self) -> Result<String, FlowError> {
        let flags = self.wallet.flags().await;
        Ok(format!(
            "signed in: {}\nonboarded: {}\nkyc completed: {} ({:?})\nscreen: {}",
            flags.is_authenticated,
            flags.has_completed_onboarding,
            flags.has_completed_kyc,
            self.wallet.kyc_status().await,
            route_name(flags.route())
        ))
    }
}

fn describe_auth(progress: Progress<Route>) -> String {
    match progress {
        Progress::Finished(route) => format!("signed in, next: {}", route_name(route)),
        Progress::Blocked(failing) => describe_blocked(&failing),
        Progress::Moved { .. } => String::new(),
    }
}

fn describe_blocked(failing: &[FieldError]) -> String {
    failing
        .iter()
        .map(|error| format!("{}: {}", error.field, error.result.message))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_tx(tx: &Transaction) -> String {
    format!(
        "\n  #{} {:?} {:.2} {} {} [{:?}]",
        tx.id,
        tx.kind,
        tx.amount,
        tx.token,
        tx.counterparty.as_deref().unwrap_or("-"),
        tx.status
    )
}

pub fn route_name(route: Route) -> &'static str {
    match route {
        Route::Auth => "sign in",
        Route::Onboarding => "onboarding",
        Route::Kyc => "identity verification",
        Route::Home => "home",
    }
}
