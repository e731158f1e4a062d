use alloy_primitives::{address, keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use smart_wallet_sdk::advanced::calls;
use smart_wallet_sdk::core::connection::{CallRequest, FeeEstimate};
use smart_wallet_sdk::{
    ChainConnection, Log, ProviderError, SdkConfig, SmartWalletClient, TransactionReceipt,
    TxNotification, UnsignedTransaction, WalletExtension,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Notify};

pub const FACTORY: Address = address!("00000000000000000000000000000000000000fa");
pub const OWNER: Address = address!("000000000000000000000000000000000000a11c");
pub const OTHER_ACCOUNT: Address = address!("0000000000000000000000000000000000000b0b");
pub const WALLET: Address = address!("00000000000000000000000000000000000000c1");
pub const RECREATED_WALLET: Address = address!("00000000000000000000000000000000000000c2");
pub const RECIPIENT: Address = address!("00000000000000000000000000000000000000d1");

pub const GAS_PRICE: u128 = 1_000_000_000;
pub const ESTIMATED_GAS: u64 = 90_000;

/// What the mock chain does with the next submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MineMode {
    Success,
    SuccessWithoutLogs,
    Revert(String),
    Drop,
    Never,
}

struct ChainState {
    mode: MineMode,
    block_number: u64,
    auto_advance_blocks: bool,
    close_subscriptions: bool,
    receipts: HashMap<B256, TransactionReceipt>,
    dropped: HashSet<B256>,
    subscribers: Vec<mpsc::Sender<TxNotification>>,
    factory_wallet: Option<Address>,
    wallet_lookup_fails: bool,
    receipt_lookup_failures: usize,
    block_lookup_failures: usize,
    balance: U256,
    gas_price_calls: usize,
    fee_calls: usize,
    estimate_calls: usize,
}

/// In-memory chain that mines on submission according to [`MineMode`].
pub struct MockChain {
    state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ChainState {
                mode: MineMode::Success,
                block_number: 100,
                auto_advance_blocks: false,
                close_subscriptions: false,
                receipts: HashMap::new(),
                dropped: HashSet::new(),
                subscribers: Vec::new(),
                factory_wallet: None,
                wallet_lookup_fails: false,
                receipt_lookup_failures: 0,
                block_lookup_failures: 0,
                balance: U256::from(5_000_000_000_000_000_000u128),
                gas_price_calls: 0,
                fee_calls: 0,
                estimate_calls: 0,
            }),
        })
    }

    pub fn set_mode(&self, mode: MineMode) {
        self.state.lock().mode = mode;
    }

    pub fn set_auto_advance_blocks(&self, enabled: bool) {
        self.state.lock().auto_advance_blocks = enabled;
    }

    /// Subscriptions are closed right away, leaving the tracker to poll.
    pub fn set_close_subscriptions(&self, enabled: bool) {
        self.state.lock().close_subscriptions = enabled;
    }

    pub fn set_factory_wallet(&self, wallet: Option<Address>) {
        self.state.lock().factory_wallet = wallet;
    }

    pub fn set_wallet_lookup_fails(&self, fails: bool) {
        self.state.lock().wallet_lookup_fails = fails;
    }

    /// The next `count` receipt lookups fail with an internal RPC error.
    pub fn fail_receipt_lookups(&self, count: usize) {
        self.state.lock().receipt_lookup_failures = count;
    }

    /// The next `count` block number lookups fail with an internal RPC error.
    pub fn fail_block_lookups(&self, count: usize) {
        self.state.lock().block_lookup_failures = count;
    }

    pub fn gas_price_calls(&self) -> usize {
        self.state.lock().gas_price_calls
    }

    pub fn fee_calls(&self) -> usize {
        self.state.lock().fee_calls
    }

    pub fn estimate_calls(&self) -> usize {
        self.state.lock().estimate_calls
    }

    pub fn network_calls(&self) -> usize {
        let state = self.state.lock();
        state.gas_price_calls + state.fee_calls + state.estimate_calls
    }

    pub fn active_subscriptions(&self) -> usize {
        self.state
            .lock()
            .subscribers
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    /// Store a receipt after the fact, e.g. for a transaction that was still pending.
    pub fn insert_receipt(&self, receipt: TransactionReceipt) {
        self.state
            .lock()
            .receipts
            .insert(receipt.transaction_hash, receipt);
    }

    pub fn block_number(&self) -> u64 {
        self.state.lock().block_number
    }

    fn mine(&self, hash: B256, tx: &UnsignedTransaction) {
        let mut state = self.state.lock();
        match state.mode.clone() {
            MineMode::Success => {
                let logs = if tx.data == calls::create_smart_wallet() {
                    state.factory_wallet = Some(WALLET);
                    vec![wallet_log("WalletCreated(address,address)", WALLET)]
                } else if tx.data == calls::destroy_and_recreate_smart_wallet() {
                    let previous = state.factory_wallet.unwrap_or(WALLET);
                    state.factory_wallet = Some(RECREATED_WALLET);
                    vec![
                        wallet_log("WalletDestroyed(address,address)", previous),
                        wallet_log("WalletCreated(address,address)", RECREATED_WALLET),
                    ]
                } else if tx.data == calls::destroy_smart_wallet() {
                    let previous = state.factory_wallet.take().unwrap_or(WALLET);
                    vec![wallet_log("WalletDestroyed(address,address)", previous)]
                } else {
                    Vec::new()
                };
                state.block_number += 1;
                let receipt = receipt(hash, state.block_number, true, logs, None);
                state.receipts.insert(hash, receipt);
            },
            MineMode::SuccessWithoutLogs => {
                state.block_number += 1;
                let receipt = receipt(hash, state.block_number, true, Vec::new(), None);
                state.receipts.insert(hash, receipt);
            },
            MineMode::Revert(reason) => {
                state.block_number += 1;
                let receipt = receipt(hash, state.block_number, false, Vec::new(), Some(reason));
                state.receipts.insert(hash, receipt);
            },
            MineMode::Drop => {
                state.dropped.insert(hash);
            },
            MineMode::Never => {},
        }
    }
}

pub fn receipt(
    hash: B256,
    block_number: u64,
    status: bool,
    logs: Vec<Log>,
    revert_reason: Option<String>,
) -> TransactionReceipt {
    TransactionReceipt {
        transaction_hash: hash,
        block_number,
        status,
        gas_used: 60_000,
        logs,
        revert_reason,
        confirmations: 0,
    }
}

/// Factory event with the owner in topic 1 and the wallet in topic 2.
pub fn wallet_log(event: &str, wallet: Address) -> Log {
    Log {
        address: FACTORY,
        topics: vec![keccak256(event.as_bytes()), OWNER.into_word(), wallet.into_word()],
        data: Bytes::new(),
    }
}

#[async_trait]
impl ChainConnection for MockChain {
    async fn get_gas_price(&self) -> Result<u128, ProviderError> {
        self.state.lock().gas_price_calls += 1;
        Ok(GAS_PRICE)
    }

    async fn estimate_eip1559_fees(&self) -> Result<FeeEstimate, ProviderError> {
        self.state.lock().fee_calls += 1;
        Ok(FeeEstimate {
            max_fee_per_gas: 2 * GAS_PRICE,
            max_priority_fee_per_gas: GAS_PRICE / 10,
        })
    }

    async fn estimate_gas(&self, _request: &CallRequest) -> Result<u64, ProviderError> {
        self.state.lock().estimate_calls += 1;
        Ok(ESTIMATED_GAS)
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, ProviderError> {
        let state = self.state.lock();
        if request.to != FACTORY || request.data != calls::get_wallet_address() {
            return Err(ProviderError::new(-32601, "unexpected call"));
        }
        if state.wallet_lookup_fails {
            return Err(ProviderError::new(3, "execution reverted"));
        }
        let wallet = state.factory_wallet.unwrap_or(Address::ZERO);
        Ok(Bytes::from(wallet.into_word().to_vec()))
    }

    async fn get_balance(&self, _address: Address) -> Result<U256, ProviderError> {
        Ok(self.state.lock().balance)
    }

    async fn get_block_number(&self) -> Result<u64, ProviderError> {
        let mut state = self.state.lock();
        if state.block_lookup_failures > 0 {
            state.block_lookup_failures -= 1;
            return Err(ProviderError::new(-32603, "internal error"));
        }
        if state.auto_advance_blocks {
            state.block_number += 1;
        }
        Ok(state.block_number)
    }

    async fn get_transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let mut state = self.state.lock();
        if state.receipt_lookup_failures > 0 {
            state.receipt_lookup_failures -= 1;
            return Err(ProviderError::new(-32603, "internal error"));
        }
        Ok(state.receipts.get(&hash).cloned())
    }

    async fn subscribe_transaction(
        &self,
        hash: B256,
    ) -> Result<mpsc::Receiver<TxNotification>, ProviderError> {
        let (tx, rx) = mpsc::channel(8);
        let mut state = self.state.lock();
        if state.close_subscriptions {
            return Ok(rx);
        }
        if let Some(receipt) = state.receipts.get(&hash) {
            let _ = tx.try_send(TxNotification::Mined(receipt.clone()));
        } else if state.dropped.contains(&hash) {
            let _ = tx.try_send(TxNotification::Dropped);
        }
        state.subscribers.push(tx);
        Ok(rx)
    }
}

struct ExtensionState {
    accounts: Vec<Address>,
    reject_access: bool,
    send_errors: VecDeque<ProviderError>,
    sent: Vec<UnsignedTransaction>,
    next_nonce: u64,
    send_gate: Option<Arc<Notify>>,
}

/// Browser wallet stand-in: signs whatever it is handed and forwards it to the [`MockChain`].
pub struct MockExtension {
    chain: Arc<MockChain>,
    state: Mutex<ExtensionState>,
    changes: broadcast::Sender<Vec<Address>>,
}

impl MockExtension {
    pub fn new(chain: Arc<MockChain>, account: Address) -> Arc<Self> {
        let (changes, _) = broadcast::channel(8);
        Arc::new(Self {
            chain,
            state: Mutex::new(ExtensionState {
                accounts: vec![account],
                reject_access: false,
                send_errors: VecDeque::new(),
                sent: Vec::new(),
                next_nonce: 0,
                send_gate: None,
            }),
            changes,
        })
    }

    pub fn set_reject_access(&self, reject: bool) {
        self.state.lock().reject_access = reject;
    }

    pub fn fail_next_send(&self, error: ProviderError) {
        self.state.lock().send_errors.push_back(error);
    }

    /// Hold every signature request until the returned handle is notified.
    pub fn gate_sends(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().send_gate = Some(gate.clone());
        gate
    }

    pub fn sent(&self) -> Vec<UnsignedTransaction> {
        self.state.lock().sent.clone()
    }

    /// Switch the active account the way a user would in the extension UI.
    pub fn switch_account(&self, account: Address) {
        self.state.lock().accounts = vec![account];
        let _ = self.changes.send(vec![account]);
    }
}

#[async_trait]
impl WalletExtension for MockExtension {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let state = self.state.lock();
        if state.reject_access {
            return Err(ProviderError::new(4001, "User rejected the request."));
        }
        Ok(state.accounts.clone())
    }

    async fn signer_address(&self) -> Result<Address, ProviderError> {
        self.state
            .lock()
            .accounts
            .first()
            .copied()
            .ok_or_else(|| ProviderError::new(4100, "Unauthorized"))
    }

    async fn sign_and_send(&self, tx: &UnsignedTransaction) -> Result<B256, ProviderError> {
        let gate = {
            let mut state = self.state.lock();
            state.sent.push(tx.clone());
            if let Some(error) = state.send_errors.pop_front() {
                return Err(error);
            }
            state.send_gate.clone()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let hash = {
            let mut state = self.state.lock();
            state.next_nonce += 1;
            keccak256(state.next_nonce.to_be_bytes())
        };
        self.chain.mine(hash, tx);
        Ok(hash)
    }

    fn account_changes(&self) -> broadcast::Receiver<Vec<Address>> {
        self.changes.subscribe()
    }
}

pub fn test_config() -> SdkConfig {
    SdkConfig::new(FACTORY)
}

pub type TestClient = SmartWalletClient<MockChain, MockExtension>;

/// A client with a connected session for [`OWNER`].
pub async fn connected_client(
    config: SdkConfig,
) -> anyhow::Result<(TestClient, Arc<MockChain>, Arc<MockExtension>)> {
    let chain = MockChain::new();
    let extension = MockExtension::new(chain.clone(), OWNER);
    let client = SmartWalletClient::new(chain.clone(), Some(extension.clone()), config)?;
    client.connect().await?;
    Ok((client, chain, extension))
}
