use crate::basic::builder::TransactionBuilder;
use crate::basic::session::WalletSessionManager;
use crate::basic::submitter::TransactionSubmitter;
use crate::basic::tracker::ConfirmationTracker;
use crate::core::config::SdkConfig;
use crate::core::connection::ChainConnection;
use crate::core::signer::WalletExtension;
use crate::error::{ConnectError, Result, SessionError};
use crate::types::{Intent, IntentKind, LifecycleState, Session, SmartWalletRef, TransactionOutcome};
use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info_span, Instrument};

/// Request/response surface for a UI: one call per user action, each resolving to a
/// terminal [`TransactionOutcome`] or a typed error.
pub struct SmartWalletClient<C, E> {
    session: WalletSessionManager<C, E>,
    builder: TransactionBuilder<C>,
    submitter: Option<TransactionSubmitter<E>>,
    tracker: ConfirmationTracker<C>,
    account_watcher: Mutex<Option<JoinHandle<()>>>,
}

impl<C, E> SmartWalletClient<C, E>
where
    C: ChainConnection + 'static,
    E: WalletExtension + 'static,
{
    pub fn new(connection: Arc<C>, extension: Option<Arc<E>>, config: SdkConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        Ok(Self {
            session: WalletSessionManager::new(
                connection.clone(),
                extension.clone(),
                config.clone(),
            ),
            builder: TransactionBuilder::new(connection.clone(), config.clone()),
            submitter: extension.map(TransactionSubmitter::new),
            tracker: ConfirmationTracker::new(connection, config),
            account_watcher: Mutex::new(None),
        })
    }

    pub fn session_manager(&self) -> &WalletSessionManager<C, E> {
        &self.session
    }

    pub fn tracker(&self) -> &ConfirmationTracker<C> {
        &self.tracker
    }

    /// Connect and follow the extension's account changes until `disconnect`.
    pub async fn connect(&self) -> Result<Session> {
        let session = self.session.connect().await?;
        let watcher = self.session.watch_account_changes();
        if let Some(previous) = std::mem::replace(&mut *self.account_watcher.lock(), watcher) {
            previous.abort();
        }
        Ok(session)
    }

    pub fn disconnect(&self) {
        if let Some(watcher) = self.account_watcher.lock().take() {
            watcher.abort();
        }
        self.session.disconnect();
    }

    pub fn wallet_ref(&self) -> Option<SmartWalletRef> {
        self.session.wallet_ref()
    }

    pub fn current_action(&self) -> Option<IntentKind> {
        self.session.current_action()
    }

    pub async fn create_wallet(&self) -> Result<TransactionOutcome> {
        self.execute(Intent::CreateWallet).await
    }

    pub async fn destroy_wallet(&self) -> Result<TransactionOutcome> {
        self.execute(Intent::DestroyWallet).await
    }

    pub async fn recreate_wallet(&self) -> Result<TransactionOutcome> {
        self.execute(Intent::RecreateWallet).await
    }

    pub async fn fund_wallet(&self, amount_wei: U256) -> Result<TransactionOutcome> {
        self.execute(Intent::FundWallet { amount: amount_wei }).await
    }

    pub async fn transfer_funds(&self, to: Address, amount_wei: U256) -> Result<TransactionOutcome> {
        self.execute(Intent::TransferFunds {
            to,
            amount: amount_wei,
        })
        .await
    }

    pub async fn delegate_call(
        &self,
        target: Address,
        signature: &str,
        params: Vec<String>,
    ) -> Result<TransactionOutcome> {
        self.execute(Intent::DelegateCall {
            target,
            signature: signature.to_string(),
            params,
        })
        .await
    }

    pub async fn execute(&self, intent: Intent) -> Result<TransactionOutcome> {
        self.execute_until(intent, std::future::pending()).await
    }

    /// Run `intent` through build, submit and confirmation tracking.
    ///
    /// `cancel` abandons the confirmation watch; the session is left untouched in that case.
    pub async fn execute_until<F>(&self, intent: Intent, cancel: F) -> Result<TransactionOutcome>
    where
        F: Future<Output = ()>,
    {
        let span = info_span!("intent", kind = %intent.kind());
        self.run(intent, cancel).instrument(span).await
    }

    async fn run<F>(&self, intent: Intent, cancel: F) -> Result<TransactionOutcome>
    where
        F: Future<Output = ()>,
    {
        let kind = intent.kind();
        self.session.reconcile_signer().await?;
        let guard = self.session.begin_intent(kind)?;
        let (session, mut wallet_ref) = self.session.snapshot().ok_or(SessionError::NotConnected)?;

        if kind.requires_active_wallet() && wallet_ref.lifecycle_state == LifecycleState::Unknown {
            debug!("wallet state unknown, asking the factory");
            wallet_ref = self.session.refresh_wallet_ref(&session).await;
        }

        let tx = self.builder.build(intent, &session, &wallet_ref).await?;
        let submitter = self
            .submitter
            .as_ref()
            .ok_or(ConnectError::ExtensionNotFound)?;
        let pending = submitter.submit(&tx).await?;
        let outcome = self.tracker.track_until(&pending, cancel).await?;

        // The account may have changed while the transaction was out.
        self.session.reconcile_signer().await?;
        self.session.apply_outcome(&guard, &outcome)?;
        Ok(outcome)
    }
}

impl<C, E> Drop for SmartWalletClient<C, E> {
    fn drop(&mut self) {
        if let Some(watcher) = self.account_watcher.get_mut().take() {
            watcher.abort();
        }
    }
}
