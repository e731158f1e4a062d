use crate::advanced::calls;
use crate::core::config::SdkConfig;
use crate::core::connection::{CallRequest, ChainConnection};
use crate::core::constants::USER_REJECTED_CODE;
use crate::core::signer::WalletExtension;
use crate::error::{ConnectError, SessionError};
use crate::types::{IntentKind, LifecycleState, Session, SmartWalletRef, TransactionOutcome};
use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct SessionState {
    session: Option<Session>,
    wallet_ref: Option<SmartWalletRef>,
    in_flight: Option<InFlight>,
    epoch: u64,
    next_guard_id: u64,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    guard_id: u64,
    kind: IntentKind,
}

impl SessionState {
    /// Drop the session together with its in-flight marker. A guard left over from the old
    /// session finds a different id on drop and leaves the new state alone.
    fn invalidate(&mut self) {
        self.session = None;
        self.wallet_ref = None;
        self.in_flight = None;
        self.epoch += 1;
    }
}

/// Owner of the connected account and the smart-wallet reference derived from it.
///
/// Callers get snapshots; the live state only changes through `connect`, `disconnect`,
/// account-change reconciliation, `refresh_wallet_ref` and confirmed outcomes passed to
/// `apply_outcome`.
pub struct WalletSessionManager<C, E> {
    connection: Arc<C>,
    extension: Option<Arc<E>>,
    config: Arc<SdkConfig>,
    state: Arc<Mutex<SessionState>>,
}

impl<C, E> Clone for WalletSessionManager<C, E> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            extension: self.extension.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
        }
    }
}

impl<C, E> WalletSessionManager<C, E>
where
    C: ChainConnection,
    E: WalletExtension,
{
    /// `extension` is `None` when no wallet extension is installed.
    pub fn new(connection: Arc<C>, extension: Option<Arc<E>>, config: Arc<SdkConfig>) -> Self {
        Self {
            connection,
            extension,
            config,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub async fn connect(&self) -> Result<Session, ConnectError> {
        let extension = self
            .extension
            .as_ref()
            .ok_or(ConnectError::ExtensionNotFound)?;

        let accounts = extension.request_accounts().await.map_err(|e| {
            if e.code == USER_REJECTED_CODE {
                ConnectError::UserRejected
            } else {
                ConnectError::Provider(e)
            }
        })?;
        let account_address = *accounts.first().ok_or(ConnectError::NoAccounts)?;

        let chain_balance = self
            .connection
            .get_balance(account_address)
            .await
            .map_err(ConnectError::Provider)?;

        let mut state = self.state.lock();
        state.invalidate();
        let session = Session {
            account_address,
            chain_balance,
            connected_at: SystemTime::now(),
            epoch: state.epoch,
        };
        state.session = Some(session.clone());
        state.wallet_ref = Some(SmartWalletRef::unknown(self.config.factory_address));

        info!(account = %account_address, balance = %chain_balance, "wallet connected");
        Ok(session)
    }

    pub fn disconnect(&self) {
        let mut state = self.state.lock();
        if let Some(session) = state.session.as_ref() {
            info!(account = %session.account_address, "wallet disconnected");
        }
        state.invalidate();
    }

    pub fn session(&self) -> Option<Session> {
        self.state.lock().session.clone()
    }

    /// Wallet reference as presented to the user: while a create, destroy or recreate is in
    /// flight the lifecycle reads `Creating`/`Destroying`, without touching the stored value.
    pub fn wallet_ref(&self) -> Option<SmartWalletRef> {
        let state = self.state.lock();
        let mut wallet_ref = state.wallet_ref.clone()?;
        match state.in_flight.map(|in_flight| in_flight.kind) {
            Some(IntentKind::CreateWallet | IntentKind::RecreateWallet) => {
                wallet_ref.lifecycle_state = LifecycleState::Creating;
            },
            Some(IntentKind::DestroyWallet) => {
                wallet_ref.lifecycle_state = LifecycleState::Destroying;
            },
            _ => {},
        }
        Some(wallet_ref)
    }

    /// Session and stored wallet reference, read under one lock.
    pub fn snapshot(&self) -> Option<(Session, SmartWalletRef)> {
        let state = self.state.lock();
        Some((state.session.clone()?, state.wallet_ref.clone()?))
    }

    /// Kind of the intent currently in flight, if any.
    pub fn current_action(&self) -> Option<IntentKind> {
        self.state.lock().in_flight.map(|in_flight| in_flight.kind)
    }

    /// Mark an intent as in flight. A second intent on the same session is rejected until the
    /// returned guard is dropped.
    pub fn begin_intent(&self, kind: IntentKind) -> Result<IntentGuard, SessionError> {
        let mut state = self.state.lock();
        if state.session.is_none() {
            return Err(SessionError::NotConnected);
        }
        if state.in_flight.is_some() {
            return Err(SessionError::Busy);
        }

        state.next_guard_id += 1;
        let guard_id = state.next_guard_id;
        state.in_flight = Some(InFlight { guard_id, kind });
        debug!(%kind, epoch = state.epoch, "intent started");

        Ok(IntentGuard {
            state: self.state.clone(),
            guard_id,
            epoch: state.epoch,
            kind,
        })
    }

    /// Record the terminal outcome of the guarded intent.
    ///
    /// Only a confirmed create, recreate or destroy changes the wallet reference. If the
    /// session changed since the intent started nothing is recorded.
    pub fn apply_outcome(
        &self,
        guard: &IntentGuard,
        outcome: &TransactionOutcome,
    ) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.epoch != guard.epoch || state.session.is_none() {
            warn!(kind = %guard.kind, "session changed before the outcome arrived");
            return Err(SessionError::SessionChanged);
        }

        let TransactionOutcome::Confirmed { wallet_address, .. } = outcome else {
            return Ok(());
        };

        let factory_address = self.config.factory_address;
        match (guard.kind, wallet_address) {
            (IntentKind::CreateWallet | IntentKind::RecreateWallet, Some(wallet_address)) => {
                info!(kind = %guard.kind, wallet = %wallet_address, "smart wallet active");
                state.wallet_ref = Some(SmartWalletRef::active(factory_address, *wallet_address));
            },
            (IntentKind::DestroyWallet, _) => {
                info!("smart wallet destroyed");
                state.wallet_ref = Some(SmartWalletRef {
                    factory_address,
                    wallet_address: None,
                    lifecycle_state: LifecycleState::Destroyed,
                });
            },
            _ => {},
        }
        Ok(())
    }

    /// Ask the factory which wallet belongs to the session's account.
    ///
    /// A non-zero address yields `Active`; a zero address, undecodable return data or a failed
    /// call yields `Unknown`. The result is stored if the session is still current.
    pub async fn refresh_wallet_ref(&self, session: &Session) -> SmartWalletRef {
        let factory_address = self.config.factory_address;
        let request = CallRequest {
            from: Some(session.account_address),
            to: factory_address,
            value: U256::ZERO,
            data: calls::get_wallet_address(),
        };

        let wallet_ref = match self.connection.call(&request).await {
            Ok(data) => match calls::decode_wallet_address(&data) {
                Some(address) if !address.is_zero() => {
                    SmartWalletRef::active(factory_address, address)
                },
                _ => SmartWalletRef::unknown(factory_address),
            },
            Err(e) => {
                warn!(account = %session.account_address, error = %e, "wallet lookup failed");
                SmartWalletRef::unknown(factory_address)
            },
        };

        let mut state = self.state.lock();
        if state.epoch == session.epoch && state.session.is_some() {
            debug!(
                state = ?wallet_ref.lifecycle_state,
                wallet = ?wallet_ref.wallet_address,
                "wallet reference refreshed"
            );
            state.wallet_ref = Some(wallet_ref.clone());
        }
        wallet_ref
    }

    /// Reconcile with an account list reported by the extension.
    ///
    /// Returns `true` if the session was invalidated because the active account changed.
    pub fn handle_accounts_changed(&self, accounts: &[Address]) -> bool {
        let mut state = self.state.lock();
        let Some(session) = state.session.as_ref() else {
            return false;
        };
        if accounts.first() == Some(&session.account_address) {
            return false;
        }

        warn!(
            previous = %session.account_address,
            current = ?accounts.first(),
            "active account changed, invalidating session"
        );
        state.invalidate();
        true
    }

    /// Compare the extension's signing account against the session and invalidate on mismatch.
    pub async fn reconcile_signer(&self) -> Result<bool, ConnectError> {
        let Some(extension) = self.extension.as_ref() else {
            return Ok(false);
        };
        if self.state.lock().session.is_none() {
            return Ok(false);
        }
        let signer = extension
            .signer_address()
            .await
            .map_err(ConnectError::Provider)?;
        Ok(self.handle_accounts_changed(&[signer]))
    }
}

impl<C, E> WalletSessionManager<C, E>
where
    C: ChainConnection + 'static,
    E: WalletExtension + 'static,
{
    /// Follow the extension's account-change stream in a background task.
    ///
    /// Returns `None` without an extension. The task ends when the stream closes.
    pub fn watch_account_changes(&self) -> Option<JoinHandle<()>> {
        let extension = self.extension.clone()?;
        let mut changes = extension.account_changes();
        let manager = self.clone();

        Some(tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(accounts) => {
                        manager.handle_accounts_changed(&accounts);
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "account change stream lagged");
                        if let Err(e) = manager.reconcile_signer().await {
                            warn!(error = %e, "failed to reconcile signer");
                        }
                    },
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    }
}

/// Busy marker for the intent in flight; released on drop.
#[derive(Debug)]
pub struct IntentGuard {
    state: Arc<Mutex<SessionState>>,
    guard_id: u64,
    epoch: u64,
    kind: IntentKind,
}

impl IntentGuard {
    pub fn kind(&self) -> IntentKind {
        self.kind
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for IntentGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state
            .in_flight
            .is_some_and(|in_flight| in_flight.guard_id == self.guard_id)
        {
            state.in_flight = None;
        }
    }
}
