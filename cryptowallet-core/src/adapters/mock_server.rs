//! Mock wallet service for testing
//!
//! A small HTTP/1.1 server that simulates the wallet service's REST API on
//! top of an in-memory database, so the HTTP client and the workflows can be
//! exercised end to end without a running backend.
//!
//! Seeded state:
//! - users `alice` (password123), `bob` (password456), `carol` (password789)
//! - admin `root` (adminpass1, SUPER_ADMIN)
//! - alice owns a BTC wallet (0.5) and a USDT wallet (250.00), bob a BTC
//!   wallet (0.25), carol an inactive USDT wallet
//! - six transactions, one of them failed and one pending
//!
//! Routes can be forced to fail with [`MockWalletServer::fail`], and every
//! request is recorded for assertions.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::{
    Admin, AdminProfileUpdate, AdminRegistration, AdminRole, AuthResponse, ChangePassword,
    Credentials, CryptoCurrency, SendTransaction, SystemStats, Transaction, TransactionStatus,
    TransactionType, User, UserRegistration, Wallet, WalletCreation,
};

/// Mock wallet server for testing
pub struct MockWalletServer {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<MockState>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Configuration for the mock server
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Populate the seed users, wallets and transactions
    pub seed: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            seed: true,
            delay_ms: 0,
        }
    }
}

/// A request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct FailureRule {
    method: String,
    path: String,
    status: u16,
    message: String,
}

struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl Reply {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()),
        }
    }

    fn raw_json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }

    fn empty(status: u16) -> Self {
        Self::text(status, "")
    }

    fn message(status: u16, message: &str) -> Self {
        Self::json(status, &json!({ "message": message }))
    }

    fn not_found() -> Self {
        Self::message(404, "Endpoint not found")
    }
}

#[derive(Default)]
struct MockState {
    next_id: i64,
    users: Vec<(User, String)>,
    admins: Vec<(Admin, String)>,
    /// (owner user id, wallet)
    wallets: Vec<(i64, Wallet)>,
    /// (wallet id, transaction)
    transactions: Vec<(i64, Transaction)>,
    failures: Vec<FailureRule>,
    requests: Vec<RecordedRequest>,
}

impl MockWalletServer {
    /// Serve the seeded service on an ephemeral loopback port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let accepting = running.clone();

        let state = Arc::new(Mutex::new(MockState::new(config.seed)));
        let state_clone = state.clone();

        // Non-blocking so the loop can observe shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while accepting.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let state = state_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &state);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    /// API root, including the `/api` prefix
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    /// Make every `method path` request fail with `status` until cleared
    pub fn fail(&self, method: &str, path: &str, status: u16, message: &str) {
        self.state.lock().unwrap().failures.push(FailureRule {
            method: method.to_string(),
            path: path.to_string(),
            status,
            message: message.to_string(),
        });
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }

    /// Number of recorded requests for `method path`
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn user_id(&self, username: &str) -> i64 {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(u, _)| u.id)
            .unwrap_or_else(|| panic!("no mock user {}", username))
    }

    pub fn admin_id(&self, username: &str) -> i64 {
        let state = self.state.lock().unwrap();
        state
            .admins
            .iter()
            .find(|(a, _)| a.username == username)
            .map(|(a, _)| a.id)
            .unwrap_or_else(|| panic!("no mock admin {}", username))
    }

    pub fn user(&self, username: &str) -> User {
        let id = self.user_id(username);
        let state = self.state.lock().unwrap();
        state.users.iter().find(|(u, _)| u.id == id).unwrap().0.clone()
    }

    pub fn admin(&self, username: &str) -> Admin {
        let id = self.admin_id(username);
        let state = self.state.lock().unwrap();
        state.admins.iter().find(|(a, _)| a.id == id).unwrap().0.clone()
    }

    pub fn wallets_of(&self, username: &str) -> Vec<Wallet> {
        let id = self.user_id(username);
        self.state.lock().unwrap().wallets_of(id)
    }

    pub fn set_balance(&self, wallet_id: i64, balance: Decimal) {
        let mut state = self.state.lock().unwrap();
        if let Some(wallet) = state.wallet_mut(wallet_id) {
            wallet.balance = balance;
        }
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockWalletServer {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Connection handling
// =============================================================================

fn handle_connection(mut stream: TcpStream, config: &MockConfig, state: &Mutex<MockState>) {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(5)));

    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, &Reply::message(400, "Invalid request"));
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let reply = {
        let mut state = state.lock().unwrap();
        state.requests.push(request.clone());
        let forced = state
            .failures
            .iter()
            .find(|f| f.method == request.method && f.path == request.path)
            .cloned();
        match forced {
            Some(rule) if rule.message.is_empty() => Reply::empty(rule.status),
            Some(rule) => Reply::message(rule.status, &rule.message),
            None => state.route(&request),
        }
    };
    send_response(&mut stream, &reply);
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }
    let body_end = data.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&data[header_end..body_end]).to_string();

    let mut parts = head.lines().next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let query = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    Some(RecordedRequest {
        method,
        path: path.to_string(),
        query,
        body,
    })
}

fn send_response(stream: &mut TcpStream, reply: &Reply) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        status_text(reply.status),
        reply.content_type,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

// =============================================================================
// In-memory service
// =============================================================================

fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

fn fake_address(currency: CryptoCurrency, id: i64) -> String {
    match currency {
        CryptoCurrency::Bitcoin => format!("bc1q{:038x}", id),
        CryptoCurrency::UsdtTrc20 => format!("T{:033X}", id),
    }
}

fn fake_hash(id: i64) -> String {
    let mixed = (id as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    format!("{:016x}{:048x}", mixed, id)
}

fn auth_failure(status: u16, message: &str) -> Reply {
    Reply::json(
        status,
        &AuthResponse {
            message: message.to_string(),
            user: None,
            admin: None,
            success: false,
        },
    )
}

impl MockState {
    fn new(seed: bool) -> Self {
        let mut state = MockState {
            next_id: 1,
            ..Default::default()
        };
        state.insert_admin(
            AdminRegistration {
                username: "root".to_string(),
                email: "root@wallet.local".to_string(),
                password: "adminpass1".to_string(),
                first_name: "Root".to_string(),
                last_name: "Operator".to_string(),
                role: AdminRole::SuperAdmin,
            },
            now() - Duration::days(30),
        );
        if seed {
            state.seed();
        }
        state
    }

    fn seed(&mut self) {
        let base = now();
        let people = [
            ("alice", "password123", "Alice", "Liddell", 20),
            ("bob", "password456", "Bob", "Builder", 15),
            ("carol", "password789", "Carol", "Danvers", 10),
        ];
        for (username, password, first, last, days_ago) in people {
            self.insert_user(
                UserRegistration {
                    username: username.to_string(),
                    email: format!("{}@example.com", username),
                    password: password.to_string(),
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                },
                base - Duration::days(days_ago),
            );
        }

        let alice = self.find_user("alice").map(|u| u.id).unwrap_or_default();
        let bob = self.find_user("bob").map(|u| u.id).unwrap_or_default();
        let carol = self.find_user("carol").map(|u| u.id).unwrap_or_default();

        let alice_btc = self.insert_wallet(alice, CryptoCurrency::Bitcoin, Decimal::new(5, 1), base - Duration::days(19));
        let alice_usdt = self.insert_wallet(alice, CryptoCurrency::UsdtTrc20, Decimal::new(25000, 2), base - Duration::days(18));
        let bob_btc = self.insert_wallet(bob, CryptoCurrency::Bitcoin, Decimal::new(25, 2), base - Duration::days(14));
        let carol_usdt = self.insert_wallet(carol, CryptoCurrency::UsdtTrc20, Decimal::ZERO, base - Duration::days(9));
        if let Some(wallet) = self.wallet_mut(carol_usdt) {
            wallet.active = false;
        }

        let entries = [
            (alice_btc, TransactionType::Receive, Decimal::ONE, TransactionStatus::Confirmed, 12),
            (alice_btc, TransactionType::Send, Decimal::new(4, 1), TransactionStatus::Confirmed, 8),
            (alice_btc, TransactionType::Send, Decimal::new(1, 1), TransactionStatus::Pending, 1),
            (alice_usdt, TransactionType::Receive, Decimal::new(26000, 2), TransactionStatus::Confirmed, 11),
            (alice_usdt, TransactionType::Send, Decimal::new(1000, 2), TransactionStatus::Failed, 4),
            (bob_btc, TransactionType::Receive, Decimal::new(25, 2), TransactionStatus::Confirmed, 6),
        ];
        for (wallet_id, direction, amount, status, days_ago) in entries {
            let counterparty = format!("external-{}", days_ago);
            self.insert_transaction(
                wallet_id,
                direction,
                &counterparty,
                amount,
                status,
                None,
                base - Duration::days(days_ago),
            );
        }
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_user(&mut self, reg: UserRegistration, created_at: NaiveDateTime) -> User {
        let user = User {
            id: self.allocate_id(),
            username: reg.username,
            email: reg.email,
            first_name: reg.first_name,
            last_name: reg.last_name,
            active: true,
            wallets: None,
            created_at,
            updated_at: created_at,
        };
        self.users.push((user.clone(), reg.password));
        user
    }

    fn insert_admin(&mut self, reg: AdminRegistration, created_at: NaiveDateTime) -> Admin {
        let admin = Admin {
            id: self.allocate_id(),
            username: reg.username,
            email: reg.email,
            first_name: reg.first_name,
            last_name: reg.last_name,
            role: reg.role,
            active: true,
            last_login: None,
            created_at,
            updated_at: created_at,
        };
        self.admins.push((admin.clone(), reg.password));
        admin
    }

    fn insert_wallet(
        &mut self,
        owner: i64,
        currency: CryptoCurrency,
        balance: Decimal,
        created_at: NaiveDateTime,
    ) -> i64 {
        let id = self.allocate_id();
        self.wallets.push((
            owner,
            Wallet {
                id,
                address: fake_address(currency, id),
                currency,
                balance,
                active: true,
                created_at,
                updated_at: created_at,
            },
        ));
        id
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_transaction(
        &mut self,
        wallet_id: i64,
        direction: TransactionType,
        counterparty: &str,
        amount: Decimal,
        status: TransactionStatus,
        memo: Option<String>,
        created_at: NaiveDateTime,
    ) -> Option<Transaction> {
        let address = self.wallet(wallet_id)?.address.clone();
        let id = self.allocate_id();
        let (from, to) = match direction {
            TransactionType::Send => (address, counterparty.to_string()),
            TransactionType::Receive => (counterparty.to_string(), address),
        };
        let confirmed = status == TransactionStatus::Confirmed;
        let tx = Transaction {
            id,
            hash: fake_hash(id),
            from_address: from,
            to_address: to,
            amount,
            fee: Some(Decimal::new(1, 4)),
            direction,
            status,
            block_number: confirmed.then_some(800_000 + id),
            confirmations: confirmed.then_some(6),
            memo,
            created_at,
        };
        self.transactions.push((wallet_id, tx.clone()));
        Some(tx)
    }

    fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().map(|(u, _)| u).find(|u| u.username == username)
    }

    fn wallet(&self, id: i64) -> Option<&Wallet> {
        self.wallets.iter().map(|(_, w)| w).find(|w| w.id == id)
    }

    fn wallet_mut(&mut self, id: i64) -> Option<&mut Wallet> {
        self.wallets.iter_mut().map(|(_, w)| w).find(|w| w.id == id)
    }

    fn wallets_of(&self, owner: i64) -> Vec<Wallet> {
        self.wallets
            .iter()
            .filter(|(o, _)| *o == owner)
            .map(|(_, w)| w.clone())
            .collect()
    }

    fn newest_first(mut txs: Vec<Transaction>) -> Vec<Transaction> {
        txs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        txs
    }

    fn stats(&self) -> SystemStats {
        let today = now().date();
        let count_status = |s: TransactionStatus| {
            self.transactions.iter().filter(|(_, t)| t.status == s).count() as u64
        };
        let count_currency = |c: CryptoCurrency| {
            self.wallets.iter().filter(|(_, w)| w.currency == c).count() as u64
        };
        SystemStats {
            total_users: self.users.len() as u64,
            active_users: self.users.iter().filter(|(u, _)| u.active).count() as u64,
            total_wallets: self.wallets.len() as u64,
            bitcoin_wallets: count_currency(CryptoCurrency::Bitcoin),
            usdt_wallets: count_currency(CryptoCurrency::UsdtTrc20),
            total_transactions: self.transactions.len() as u64,
            pending_transactions: count_status(TransactionStatus::Pending),
            confirmed_transactions: count_status(TransactionStatus::Confirmed),
            failed_transactions: count_status(TransactionStatus::Failed),
            total_bitcoin_volume: self.volume(CryptoCurrency::Bitcoin, None),
            total_usdt_volume: self.volume(CryptoCurrency::UsdtTrc20, None),
            users_registered_today: self
                .users
                .iter()
                .filter(|(u, _)| u.created_at.date() == today)
                .count() as u64,
            transactions_today: self
                .transactions
                .iter()
                .filter(|(_, t)| t.created_at.date() == today)
                .count() as u64,
            last_updated: Some(now()),
        }
    }

    fn volume(&self, currency: CryptoCurrency, range: Option<(NaiveDateTime, NaiveDateTime)>) -> Decimal {
        self.transactions
            .iter()
            .filter(|(wallet_id, _)| self.wallet(*wallet_id).map(|w| w.currency) == Some(currency))
            .filter(|(_, t)| range.map_or(true, |(s, e)| t.created_at >= s && t.created_at <= e))
            .map(|(_, t)| t.amount)
            .sum()
    }

    // -------------------------------------------------------------------------
    // Routing
    // -------------------------------------------------------------------------

    fn route(&mut self, req: &RecordedRequest) -> Reply {
        let path = req.path.strip_prefix("/api").unwrap_or(&req.path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (req.method.as_str(), segments.as_slice()) {
            ("POST", ["users", "login"]) => self.user_login(&req.body),
            ("POST", ["users", "register"]) => self.user_register(&req.body),
            ("POST", ["admin", "login"]) => self.admin_login(&req.body),
            ("POST", ["admin", "register"]) => self.admin_register(&req.body),

            ("GET", ["admin", "dashboard", "stats"]) => Reply::json(200, &self.stats()),
            ("GET", ["admin", "dashboard", "analytics", metric]) => self.analytics(metric, req),
            ("GET", ["admin", "dashboard", resource]) => self.list_resource(resource, None, req),
            ("GET", ["admin", "dashboard", resource, "search"]) => {
                let query = req.param("query").unwrap_or_default().to_string();
                self.list_resource(resource, Some(query), req)
            }
            ("PUT", ["admin", "dashboard", resource, id, "toggle-status"]) => {
                self.toggle_status(resource, id)
            }
            ("POST", ["admin", "dashboard", "wallets", id, "refresh-balance"]) => {
                match id.parse().ok().and_then(|id| self.wallet(id)) {
                    Some(_) => Reply::empty(200),
                    None => Reply::empty(400),
                }
            }
            ("PUT", ["admin", id]) => self.update_admin(id, &req.body),
            ("POST", ["admin", id, "change-password"]) => self.change_password(id, &req.body),

            ("POST", ["wallets", "user", id]) => self.create_wallet(id, &req.body),
            ("GET", ["wallets", "user", id]) => match id.parse() {
                Ok(owner) => Reply::json(200, &self.wallets_of(owner)),
                Err(_) => Reply::message(400, "Invalid user id"),
            },
            ("POST", ["wallets", id, "refresh-balance"]) => {
                match id.parse().ok().and_then(|id| self.wallet(id)) {
                    Some(_) => Reply::empty(200),
                    None => Reply::message(404, "Wallet not found"),
                }
            }
            ("DELETE", ["wallets", id]) => {
                match id.parse().ok().and_then(|id| self.wallet_mut(id)) {
                    Some(wallet) => {
                        wallet.active = false;
                        wallet.updated_at = now();
                        Reply::empty(200)
                    }
                    None => Reply::message(404, "Wallet not found"),
                }
            }

            ("POST", ["transactions", "send"]) => self.send_transaction(&req.body),
            ("GET", ["transactions", "wallet", id]) => {
                let id: i64 = id.parse().unwrap_or_default();
                let txs = self
                    .transactions
                    .iter()
                    .filter(|(w, _)| *w == id)
                    .map(|(_, t)| t.clone())
                    .collect();
                Reply::json(200, &Self::newest_first(txs))
            }
            ("GET", ["transactions", "user", id]) => {
                let owner: i64 = id.parse().unwrap_or_default();
                let wallet_ids: Vec<i64> = self.wallets_of(owner).iter().map(|w| w.id).collect();
                let txs = self
                    .transactions
                    .iter()
                    .filter(|(w, _)| wallet_ids.contains(w))
                    .map(|(_, t)| t.clone())
                    .collect();
                Reply::json(200, &Self::newest_first(txs))
            }

            _ => Reply::not_found(),
        }
    }

    fn user_login(&mut self, body: &str) -> Reply {
        let Ok(creds) = serde_json::from_str::<Credentials>(body) else {
            return auth_failure(400, "Malformed login request");
        };
        match self
            .users
            .iter()
            .find(|(u, p)| u.username == creds.username && *p == creds.password)
        {
            Some((user, _)) if !user.active => auth_failure(401, "Account is disabled"),
            Some((user, _)) => Reply::json(
                200,
                &AuthResponse {
                    message: "Login successful".to_string(),
                    user: Some(user.clone()),
                    admin: None,
                    success: true,
                },
            ),
            None => auth_failure(401, "Invalid username or password"),
        }
    }

    fn user_register(&mut self, body: &str) -> Reply {
        let Ok(reg) = serde_json::from_str::<UserRegistration>(body) else {
            return auth_failure(400, "Malformed registration request");
        };
        if self.users.iter().any(|(u, _)| u.username == reg.username) {
            return auth_failure(400, "Username already exists");
        }
        if self.users.iter().any(|(u, _)| u.email == reg.email) {
            return auth_failure(400, "Email already exists");
        }
        let user = self.insert_user(reg, now());
        Reply::json(
            200,
            &AuthResponse {
                message: "User registered successfully".to_string(),
                user: Some(user),
                admin: None,
                success: true,
            },
        )
    }

    fn admin_login(&mut self, body: &str) -> Reply {
        let Ok(creds) = serde_json::from_str::<Credentials>(body) else {
            return auth_failure(400, "Malformed login request");
        };
        let Some((admin, _)) = self
            .admins
            .iter_mut()
            .find(|(a, p)| a.username == creds.username && *p == creds.password)
        else {
            return auth_failure(401, "Invalid username or password");
        };
        if !admin.active {
            return auth_failure(401, "Account is disabled");
        }
        admin.last_login = Some(now());
        Reply::json(
            200,
            &AuthResponse {
                message: "Login successful".to_string(),
                user: None,
                admin: Some(admin.clone()),
                success: true,
            },
        )
    }

    fn admin_register(&mut self, body: &str) -> Reply {
        let Ok(reg) = serde_json::from_str::<AdminRegistration>(body) else {
            return auth_failure(400, "Malformed registration request");
        };
        if self.admins.iter().any(|(a, _)| a.username == reg.username) {
            return auth_failure(400, "Username already exists");
        }
        let admin = self.insert_admin(reg, now());
        Reply::json(
            200,
            &AuthResponse {
                message: "Admin registered successfully".to_string(),
                user: None,
                admin: Some(admin),
                success: true,
            },
        )
    }

    fn update_admin(&mut self, id: &str, body: &str) -> Reply {
        let Ok(update) = serde_json::from_str::<AdminProfileUpdate>(body) else {
            return Reply::empty(400);
        };
        let id: i64 = id.parse().unwrap_or_default();
        let Some((admin, _)) = self.admins.iter_mut().find(|(a, _)| a.id == id) else {
            return Reply::empty(404);
        };
        if let Some(email) = update.email {
            admin.email = email;
        }
        if let Some(first) = update.first_name {
            admin.first_name = first;
        }
        if let Some(last) = update.last_name {
            admin.last_name = last;
        }
        admin.updated_at = now();
        Reply::json(200, &admin.clone())
    }

    fn change_password(&mut self, id: &str, body: &str) -> Reply {
        let Ok(change) = serde_json::from_str::<ChangePassword>(body) else {
            return Reply::text(400, "Invalid current password");
        };
        let id: i64 = id.parse().unwrap_or_default();
        match self
            .admins
            .iter_mut()
            .find(|(a, p)| a.id == id && *p == change.current_password)
        {
            Some((_, password)) => {
                *password = change.new_password;
                Reply::text(200, "Password changed successfully")
            }
            None => Reply::text(400, "Invalid current password"),
        }
    }

    fn create_wallet(&mut self, owner: &str, body: &str) -> Reply {
        let Ok(owner) = owner.parse::<i64>() else {
            return Reply::message(400, "Invalid user id");
        };
        if !self.users.iter().any(|(u, _)| u.id == owner) {
            return Reply::message(404, "User not found");
        }
        let Ok(creation) = serde_json::from_str::<WalletCreation>(body) else {
            return Reply::message(400, "Unsupported currency");
        };
        let id = self.insert_wallet(owner, creation.currency, Decimal::ZERO, now());
        match self.wallet(id) {
            Some(wallet) => Reply::json(201, wallet),
            None => Reply::message(500, "Wallet creation failed"),
        }
    }

    fn send_transaction(&mut self, body: &str) -> Reply {
        let Ok(request) = serde_json::from_str::<SendTransaction>(body) else {
            return Reply::message(400, "Malformed transaction request");
        };
        let Some(wallet) = self.wallet(request.wallet_id).cloned() else {
            return Reply::message(404, "Wallet not found");
        };
        if !wallet.active {
            return Reply::message(400, "Wallet is not active");
        }
        if request.amount <= Decimal::ZERO {
            return Reply::message(400, "Amount must be positive");
        }
        if request.amount > wallet.balance {
            return Reply::message(400, "Insufficient balance");
        }
        if let Some(w) = self.wallet_mut(wallet.id) {
            w.balance -= request.amount;
            w.updated_at = now();
        }
        match self.insert_transaction(
            wallet.id,
            TransactionType::Send,
            &request.to_address,
            request.amount,
            TransactionStatus::Pending,
            request.memo,
            now(),
        ) {
            Some(tx) => Reply::json(201, &tx),
            None => Reply::message(500, "Transaction failed"),
        }
    }

    fn toggle_status(&mut self, resource: &str, id: &str) -> Reply {
        let Ok(id) = id.parse::<i64>() else {
            return Reply::empty(400);
        };
        match resource {
            "users" => match self.users.iter_mut().find(|(u, _)| u.id == id) {
                Some((user, _)) => {
                    user.active = !user.active;
                    user.updated_at = now();
                    Reply::json(200, &user.clone())
                }
                None => Reply::empty(404),
            },
            "wallets" => match self.wallet_mut(id) {
                Some(wallet) => {
                    wallet.active = !wallet.active;
                    wallet.updated_at = now();
                    Reply::empty(200)
                }
                None => Reply::empty(404),
            },
            _ => Reply::not_found(),
        }
    }

    fn analytics(&self, metric: &str, req: &RecordedRequest) -> Reply {
        let parse = |key: &str| {
            req.param(key)
                .and_then(|v| NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S").ok())
        };
        let (Some(start), Some(end)) = (parse("start"), parse("end")) else {
            return Reply::empty(400);
        };
        let in_range = |t: &NaiveDateTime| *t >= start && *t <= end;
        match metric {
            "users-registered" => {
                let count = self.users.iter().filter(|(u, _)| in_range(&u.created_at)).count();
                Reply::json(200, &count)
            }
            "transactions" => {
                let count = self
                    .transactions
                    .iter()
                    .filter(|(_, t)| in_range(&t.created_at))
                    .count();
                Reply::json(200, &count)
            }
            "volume" => {
                let Some(currency) = req
                    .param("currency")
                    .and_then(|c| CryptoCurrency::from_str(c).ok())
                else {
                    return Reply::empty(400);
                };
                // BigDecimal goes out as a bare JSON number
                Reply::raw_json(200, self.volume(currency, Some((start, end))).to_string())
            }
            _ => Reply::not_found(),
        }
    }

    fn list_resource(&self, resource: &str, search: Option<String>, req: &RecordedRequest) -> Reply {
        let (rows, search_fields): (Vec<Value>, &[&str]) = match resource {
            "users" => (
                self.users.iter().map(|(u, _)| json!(u)).collect(),
                &["username", "email", "firstName", "lastName"],
            ),
            "wallets" => (
                self.wallets.iter().map(|(_, w)| json!(w)).collect(),
                &["address"],
            ),
            "transactions" => (
                self.transactions.iter().map(|(_, t)| json!(t)).collect(),
                &["txHash", "fromAddress", "toAddress"],
            ),
            _ => return Reply::not_found(),
        };

        let mut rows: Vec<Value> = match &search {
            Some(query) => {
                let needle = query.to_lowercase();
                rows.into_iter()
                    .filter(|row| {
                        search_fields.iter().any(|f| {
                            row[*f]
                                .as_str()
                                .is_some_and(|s| s.to_lowercase().contains(&needle))
                        })
                    })
                    .collect()
            }
            None => rows
                .into_iter()
                .filter(|row| {
                    ["active", "currency", "status", "type"].iter().all(|key| {
                        match req.param(key) {
                            None => true,
                            Some(wanted) => match &row[*key] {
                                Value::Bool(b) => b.to_string() == wanted,
                                Value::String(s) => s == wanted,
                                _ => false,
                            },
                        }
                    })
                })
                .collect(),
        };

        let sort_by = req.param("sortBy").unwrap_or("createdAt").to_string();
        let descending = req.param("sortDir").unwrap_or("desc") == "desc";
        rows.sort_by(|a, b| {
            let ord = compare_values(&a[&sort_by], &b[&sort_by]);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });

        let page: usize = req.param("page").and_then(|p| p.parse().ok()).unwrap_or(0);
        let size: usize = req
            .param("size")
            .and_then(|s| s.parse().ok())
            .filter(|s| *s > 0)
            .unwrap_or(10);
        let total = rows.len();
        let total_pages = total.div_ceil(size);
        let content: Vec<Value> = rows.into_iter().skip(page * size).take(size).collect();

        Reply::json(
            200,
            &json!({
                "content": content,
                "totalElements": total,
                "totalPages": total_pages,
                "size": size,
                "number": page,
                "first": page == 0,
                "last": page + 1 >= total_pages,
                "numberOfElements": content.len(),
                "empty": content.is_empty(),
            }),
        )
    }
}

/// Order JSON scalars the way the database would
fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    let numeric = |v: &Value| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Decimal::from_str(s).ok().and_then(|d| d.to_string().parse().ok()),
        _ => None,
    };
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
            _ => a.as_str().unwrap_or_default().cmp(b.as_str().unwrap_or_default()),
        },
    }
}
