//! Pool service: the lottery engine's operations, with events and
//! notifications.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    Amount, EventBus, InFlightGate, Notification, ParticipantId, Pool, PoolEvent, PoolId,
    PoolRegistry, PoolStatus, PoolSummary, RandomSource,
};
use crate::error::LotteryError;
use crate::payment::{PaymentGateway, collect_payment};

/// Seat taken by a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReceipt {
    /// Pool joined.
    pub pool_id: PoolId,
    /// Paying wallet.
    pub participant: ParticipantId,
    /// Round the seat belongs to.
    pub round: u64,
    /// 1-based seat number.
    pub seat: usize,
    /// Occupied seats after the join.
    pub entries: usize,
    /// Seats per round.
    pub capacity: usize,
    /// Status after the join.
    pub status: PoolStatus,
    /// Stake paid.
    pub stake: Amount,
    /// Hash of the stake payment.
    pub transaction_hash: Option<String>,
}

/// Outcome of [`PoolService::join_pool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The participant paid and was seated.
    Joined(JoinReceipt),
    /// The caller already had an operation in flight; nothing happened.
    Skipped,
}

/// Result of a winner draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerReceipt {
    /// Pool drawn.
    pub pool_id: PoolId,
    /// Round decided.
    pub round: u64,
    /// Drawn participant.
    pub winner: ParticipantId,
}

/// Orchestration layer for all pool operations.
///
/// Owns references to [`PoolRegistry`] for state, [`EventBus`] for event
/// emission, the [`PaymentGateway`] for stakes and a [`RandomSource`] for
/// draws. Every join follows the pattern: enter gate → reserve seat →
/// collect stake → admit → emit events → notify.
#[derive(Debug, Clone)]
pub struct PoolService {
    registry: Arc<PoolRegistry>,
    event_bus: EventBus,
    gateway: Arc<dyn PaymentGateway>,
    rng: Arc<dyn RandomSource>,
    gate: Arc<InFlightGate>,
    stake: Amount,
}

impl PoolService {
    /// Creates a new `PoolService`.
    #[must_use]
    pub fn new(
        registry: Arc<PoolRegistry>,
        event_bus: EventBus,
        gateway: Arc<dyn PaymentGateway>,
        rng: Arc<dyn RandomSource>,
        gate: Arc<InFlightGate>,
        stake: Amount,
    ) -> Self {
        Self {
            registry,
            event_bus,
            gateway,
            rng,
            gate,
            stake,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`PoolRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    /// Stake required to join any pool.
    #[must_use]
    pub const fn stake(&self) -> Amount {
        self.stake
    }

    /// Registers a pool and announces it.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::InvalidRequest`] if the ID is taken.
    pub async fn create_pool(&self, pool: Pool) -> Result<PoolId, LotteryError> {
        let name = pool.name().to_string();
        let capacity = pool.capacity();
        let pool_id = self.registry.insert(pool).await?;

        let _ = self.event_bus.publish(PoolEvent::PoolCreated {
            pool_id: pool_id.clone(),
            name,
            capacity,
            timestamp: Utc::now(),
        });

        tracing::info!(%pool_id, capacity, "pool created");
        Ok(pool_id)
    }

    /// Asks the payment gateway which wallet is attached.
    ///
    /// # Errors
    ///
    /// Returns a [`LotteryError`] if the gateway fails or reports a blank
    /// address.
    pub async fn discover_wallet(&self) -> Result<ParticipantId, LotteryError> {
        let address = self.gateway.wallet_address().await?;
        ParticipantId::new(address)
    }

    /// Pays the stake for `participant` and seats them in `pool_id`.
    ///
    /// Returns [`JoinOutcome::Skipped`] without touching anything if the
    /// participant already has an operation in flight.
    ///
    /// # Errors
    ///
    /// - [`LotteryError::PoolNotFound`] for an unknown pool.
    /// - [`LotteryError::PoolFull`] when no seat is open; the gateway is
    ///   not called.
    /// - [`LotteryError::InsufficientFunds`],
    ///   [`LotteryError::GatewayFailure`], [`LotteryError::Unexpected`]
    ///   from the payment; the pool is left unchanged.
    pub async fn join_pool(
        &self,
        pool_id: &PoolId,
        participant: ParticipantId,
    ) -> Result<JoinOutcome, LotteryError> {
        let Some(_guard) = self.gate.try_enter(participant.as_str()) else {
            tracing::debug!(%pool_id, %participant, "join skipped: operation in flight");
            return Ok(JoinOutcome::Skipped);
        };

        let result = self.seat_participant(pool_id, participant).await;
        match &result {
            Ok(receipt) => {
                self.event_bus.notify(Notification::success(
                    Some(pool_id.clone()),
                    "Payment successful! You secured a seat in the pool!",
                ));
                tracing::info!(
                    %pool_id,
                    participant = %receipt.participant,
                    seat = receipt.seat,
                    entries = receipt.entries,
                    status = receipt.status.label(),
                    "participant joined"
                );
            }
            Err(err) => {
                if let LotteryError::Unexpected(detail) = err {
                    tracing::error!(%pool_id, %detail, "join failed unexpectedly");
                }
                self.event_bus
                    .notify(Notification::failure(Some(pool_id.clone()), err.to_string()));
            }
        }
        result.map(JoinOutcome::Joined)
    }

    async fn seat_participant(
        &self,
        pool_id: &PoolId,
        participant: ParticipantId,
    ) -> Result<JoinReceipt, LotteryError> {
        let pool_lock = self.registry.get(pool_id).await?;

        let recipient = {
            let mut pool = pool_lock.write().await;
            pool.reserve_seat()?;
            pool.recipient().to_string()
        };

        let payment = collect_payment(
            self.gateway.as_ref(),
            &participant,
            &recipient,
            self.stake,
            "join",
        )
        .await;

        let mut pool = pool_lock.write().await;
        pool.release_seat();
        let receipt = payment?;
        let admission = pool.admit(participant.clone())?;
        let entries = pool.entries();
        let capacity = pool.capacity();
        let status = pool.status();
        drop(pool);

        let now = Utc::now();
        if let Some(previous_winner) = admission.rearmed_from {
            let _ = self.event_bus.publish(PoolEvent::RoundRearmed {
                pool_id: pool_id.clone(),
                round: admission.round,
                previous_winner,
                timestamp: now,
            });
            tracing::info!(%pool_id, round = admission.round, "pool re-armed");
        }
        let _ = self.event_bus.publish(PoolEvent::ParticipantJoined {
            pool_id: pool_id.clone(),
            round: admission.round,
            participant: participant.clone(),
            seat: admission.seat,
            entries,
            status,
            transaction_hash: receipt.transaction_hash.clone(),
            timestamp: now,
        });

        Ok(JoinReceipt {
            pool_id: pool_id.clone(),
            participant,
            round: admission.round,
            seat: admission.seat,
            entries,
            capacity,
            status,
            stake: receipt.amount,
            transaction_hash: receipt.transaction_hash,
        })
    }

    /// Draws the winner of a full pool.
    ///
    /// # Errors
    ///
    /// - [`LotteryError::PoolNotFound`] for an unknown pool.
    /// - [`LotteryError::PoolNotFull`] before capacity is reached.
    /// - [`LotteryError::RoundAlreadyDecided`] if the round has a winner.
    pub async fn select_winner(&self, pool_id: &PoolId) -> Result<WinnerReceipt, LotteryError> {
        let result = self.draw(pool_id).await;
        match &result {
            Ok(receipt) => {
                self.event_bus.notify(Notification::success(
                    Some(pool_id.clone()),
                    format!(
                        "Winner selected: {}. Time to brew!",
                        receipt.winner.shortened()
                    ),
                ));
            }
            Err(err) => {
                if let LotteryError::Unexpected(detail) = err {
                    tracing::error!(%pool_id, %detail, "draw failed unexpectedly");
                }
                self.event_bus
                    .notify(Notification::failure(Some(pool_id.clone()), err.to_string()));
            }
        }
        result
    }

    async fn draw(&self, pool_id: &PoolId) -> Result<WinnerReceipt, LotteryError> {
        let pool_lock = self.registry.get(pool_id).await?;
        let mut pool = pool_lock.write().await;
        let winner = pool.draw_winner(self.rng.as_ref())?;
        let round = pool.round();
        drop(pool);

        let _ = self.event_bus.publish(PoolEvent::WinnerSelected {
            pool_id: pool_id.clone(),
            round,
            winner: winner.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(%pool_id, round, winner = %winner, "winner selected");

        Ok(WinnerReceipt {
            pool_id: pool_id.clone(),
            round,
            winner,
        })
    }

    /// Returns a snapshot of one pool.
    ///
    /// # Errors
    ///
    /// Returns [`LotteryError::PoolNotFound`] for an unknown pool.
    pub async fn get_pool(&self, pool_id: &PoolId) -> Result<Pool, LotteryError> {
        let pool_lock = self.registry.get(pool_id).await?;
        let pool = pool_lock.read().await;
        Ok(pool.clone())
    }

    /// Returns snapshots of all pools, optionally filtered by status.
    pub async fn list_pools(&self, status_filter: Option<PoolStatus>) -> Vec<Pool> {
        self.registry.list(status_filter).await
    }

    /// Computes the cross-pool summary.
    pub async fn summary(&self) -> PoolSummary {
        self.registry.summary(self.stake).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::randomness::{ScriptedRandom, SeededRandom};
    use crate::payment::{
        BroadcastResult, PaymentError, PaymentRequest, SignedTransaction, SimulatedPaymentGateway,
    };
    use futures_util::FutureExt;
    use futures_util::future::BoxFuture;
    use tokio::sync::{Notify, Semaphore};

    const RECIPIENT: &str = "0x64cBdcCfa295a0dB0187E5Ef7fAC28205908B4e4";

    fn pool_id() -> PoolId {
        let Ok(id) = PoolId::new("monsoon") else {
            panic!("valid id");
        };
        id
    }

    fn wallet(n: usize) -> ParticipantId {
        let Ok(id) = ParticipantId::new(format!("0x{n:040x}")) else {
            panic!("valid wallet");
        };
        id
    }

    async fn make_service_with(
        gateway: Arc<dyn PaymentGateway>,
        rng: Arc<dyn RandomSource>,
    ) -> PoolService {
        let service = PoolService::new(
            Arc::new(PoolRegistry::new()),
            EventBus::new(1000),
            gateway,
            rng,
            Arc::new(InFlightGate::new()),
            Amount::from_whole(1),
        );
        let Ok(pool) = Pool::new(pool_id(), "Monsoon Malabar", "", RECIPIENT, 6) else {
            panic!("valid pool");
        };
        if service.create_pool(pool).await.is_err() {
            panic!("pool creation failed");
        }
        service
    }

    async fn make_service() -> (PoolService, Arc<SimulatedPaymentGateway>) {
        let gateway = Arc::new(SimulatedPaymentGateway::new(
            "0xattached",
            Amount::from_whole(10),
        ));
        let service = make_service_with(
            Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            Arc::new(ScriptedRandom::new(vec![2])),
        )
        .await;
        (service, gateway)
    }

    async fn join_ok(service: &PoolService, participant: ParticipantId) -> JoinReceipt {
        match service.join_pool(&pool_id(), participant).await {
            Ok(JoinOutcome::Joined(receipt)) => receipt,
            other => panic!("expected join, got {other:?}"),
        }
    }

    async fn participants(service: &PoolService) -> Vec<ParticipantId> {
        let Ok(pool) = service.get_pool(&pool_id()).await else {
            panic!("pool missing");
        };
        pool.participants().to_vec()
    }

    #[tokio::test]
    async fn create_pool_emits_event() {
        let gateway = Arc::new(SimulatedPaymentGateway::new("0xa", Amount::ZERO));
        let service = PoolService::new(
            Arc::new(PoolRegistry::new()),
            EventBus::new(10),
            gateway,
            Arc::new(SeededRandom::new(1)),
            Arc::new(InFlightGate::new()),
            Amount::from_whole(1),
        );
        let mut rx = service.event_bus().subscribe();
        let Ok(pool) = Pool::new(pool_id(), "Monsoon Malabar", "", RECIPIENT, 6) else {
            panic!("valid pool");
        };
        assert!(service.create_pool(pool).await.is_ok());

        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "pool_created");
    }

    #[tokio::test]
    async fn six_joins_fill_the_pool() {
        let (service, gateway) = make_service().await;

        for n in 0..6 {
            let draw = service.select_winner(&pool_id()).await;
            assert!(matches!(draw, Err(LotteryError::PoolNotFull { .. })));

            let receipt = join_ok(&service, wallet(n)).await;
            assert_eq!(receipt.seat, n + 1);
            assert_eq!(receipt.entries, n + 1);
            assert!(receipt.transaction_hash.is_some());
        }

        let Ok(pool) = service.get_pool(&pool_id()).await else {
            panic!("pool missing");
        };
        assert_eq!(pool.status(), PoolStatus::ReadyToSpin);
        assert_eq!(pool.entries(), 6);
        assert_eq!(gateway.broadcast_count(), 6);
        assert_eq!(gateway.balance(RECIPIENT), Amount::from_whole(6));
    }

    #[tokio::test]
    async fn join_emits_event_and_notification() {
        let (service, _) = make_service().await;
        let mut rx = service.event_bus().subscribe();

        let _ = join_ok(&service, wallet(1)).await;

        let Ok(first) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(first.event_type_str(), "participant_joined");
        let Ok(PoolEvent::Notification(notice)) = rx.recv().await else {
            panic!("expected notification");
        };
        assert_eq!(
            notice.message,
            "Payment successful! You secured a seat in the pool!"
        );
    }

    #[tokio::test]
    async fn full_pool_rejects_without_calling_gateway() {
        let (service, gateway) = make_service().await;
        for n in 0..6 {
            let _ = join_ok(&service, wallet(n)).await;
        }
        let queries_before = gateway.balance_query_count();

        let result = service.join_pool(&pool_id(), wallet(99)).await;
        assert!(matches!(result, Err(LotteryError::PoolFull(_))));
        assert_eq!(gateway.balance_query_count(), queries_before);
        assert_eq!(gateway.broadcast_count(), 6);
        assert_eq!(participants(&service).await.len(), 6);
    }

    #[tokio::test]
    async fn zero_balance_is_insufficient_funds() {
        let (service, gateway) = make_service().await;
        gateway.set_balance(wallet(1).as_str(), Amount::ZERO);
        let mut rx = service.event_bus().subscribe();

        let result = service.join_pool(&pool_id(), wallet(1)).await;
        assert!(matches!(result, Err(LotteryError::InsufficientFunds { .. })));
        assert!(participants(&service).await.is_empty());
        assert_eq!(gateway.pay_count(), 0);
        assert_eq!(gateway.broadcast_count(), 0);

        let Ok(PoolEvent::Notification(notice)) = rx.recv().await else {
            panic!("expected failure notification");
        };
        assert_eq!(
            notice.message,
            "Insufficient PYUSD balance. You need at least 1 PYUSD to join."
        );
    }

    #[tokio::test]
    async fn gateway_rejection_leaves_pool_untouched() {
        let (service, gateway) = make_service().await;
        gateway.reject_payments_with(Some("User rejected the request".to_string()));

        let result = service.join_pool(&pool_id(), wallet(1)).await;
        let Err(LotteryError::GatewayFailure(message)) = result else {
            panic!("expected gateway failure, got {result:?}");
        };
        assert_eq!(message, "User rejected the request");
        assert!(participants(&service).await.is_empty());

        let Ok(pool) = service.get_pool(&pool_id()).await else {
            panic!("pool missing");
        };
        assert_eq!(pool.reserved_seats(), 0);
        assert_eq!(pool.open_seats(), 6);
    }

    #[tokio::test]
    async fn failed_broadcast_leaves_pool_untouched() {
        let (service, gateway) = make_service().await;
        gateway.fail_broadcasts_with(Some("replacement transaction underpriced".to_string()));

        let result = service.join_pool(&pool_id(), wallet(1)).await;
        assert!(matches!(result, Err(LotteryError::GatewayFailure(_))));
        assert!(participants(&service).await.is_empty());
    }

    #[tokio::test]
    async fn offline_gateway_is_unexpected_error() {
        let (service, gateway) = make_service().await;
        gateway.set_unreachable(true);

        let result = service.join_pool(&pool_id(), wallet(1)).await;
        assert!(matches!(result, Err(LotteryError::Unexpected(_))));
        assert!(participants(&service).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_pool_is_not_found() {
        let (service, _) = make_service().await;
        let Ok(missing) = PoolId::new("espresso") else {
            panic!("valid id");
        };
        let result = service.join_pool(&missing, wallet(1)).await;
        assert!(matches!(result, Err(LotteryError::PoolNotFound(_))));
        let result = service.select_winner(&missing).await;
        assert!(matches!(result, Err(LotteryError::PoolNotFound(_))));
    }

    #[tokio::test]
    async fn winner_comes_from_participants_and_is_one_shot() {
        let (service, _) = make_service().await;
        for n in 0..6 {
            let _ = join_ok(&service, wallet(n)).await;
        }

        let Ok(receipt) = service.select_winner(&pool_id()).await else {
            panic!("draw failed");
        };
        assert_eq!(receipt.winner, wallet(2));
        assert_eq!(receipt.round, 1);

        let again = service.select_winner(&pool_id()).await;
        assert!(matches!(again, Err(LotteryError::RoundAlreadyDecided(_))));

        let summary = service.summary().await;
        assert_eq!(summary.completed_rounds, 1);
        assert_eq!(summary.active_pools, 0);
        assert_eq!(summary.total_staked, Amount::from_whole(6));
    }

    /// Source that answers one past the end of the range.
    #[derive(Debug)]
    struct OverflowingRandom;

    impl RandomSource for OverflowingRandom {
        fn next_below(&self, upper: usize) -> usize {
            upper
        }
    }

    #[tokio::test]
    async fn out_of_range_draw_is_unexpected_and_leaves_round_open() {
        let gateway = Arc::new(SimulatedPaymentGateway::new(
            "0xattached",
            Amount::from_whole(10),
        ));
        let service = make_service_with(gateway, Arc::new(OverflowingRandom)).await;
        for n in 0..6 {
            let _ = join_ok(&service, wallet(n)).await;
        }
        let mut rx = service.event_bus().subscribe();

        let result = service.select_winner(&pool_id()).await;
        assert!(matches!(result, Err(LotteryError::Unexpected(_))));

        let Ok(PoolEvent::Notification(notice)) = rx.recv().await else {
            panic!("expected notification");
        };
        assert_eq!(notice.level, crate::domain::NoticeLevel::Failure);

        let Ok(pool) = service.get_pool(&pool_id()).await else {
            panic!("pool missing");
        };
        assert_eq!(pool.status(), PoolStatus::ReadyToSpin);
        assert!(pool.last_winner().is_none());
    }

    #[tokio::test]
    async fn join_after_win_starts_new_round() {
        let (service, _) = make_service().await;
        for n in 0..6 {
            let _ = join_ok(&service, wallet(n)).await;
        }
        assert!(service.select_winner(&pool_id()).await.is_ok());
        let mut rx = service.event_bus().subscribe();

        let receipt = join_ok(&service, wallet(7)).await;
        assert_eq!(receipt.round, 2);
        assert_eq!(receipt.seat, 1);
        assert_eq!(receipt.status, PoolStatus::Filling);

        let Ok(pool) = service.get_pool(&pool_id()).await else {
            panic!("pool missing");
        };
        assert!(pool.last_winner().is_none());
        assert_eq!(pool.entries(), 1);

        let Ok(first) = rx.recv().await else {
            panic!("expected event");
        };
        let PoolEvent::RoundRearmed {
            previous_winner, ..
        } = first
        else {
            panic!("expected round_rearmed, got {first:?}");
        };
        assert_eq!(previous_winner, wallet(2));
    }

    /// Gateway whose `pay` parks until the test releases it.
    #[derive(Debug)]
    struct ParkedGateway {
        inner: SimulatedPaymentGateway,
        entered: Notify,
        release: Semaphore,
    }

    impl PaymentGateway for ParkedGateway {
        fn wallet_address(&self) -> BoxFuture<'_, Result<String, PaymentError>> {
            self.inner.wallet_address()
        }

        fn balance_of<'a>(
            &'a self,
            address: &'a str,
        ) -> BoxFuture<'a, Result<Amount, PaymentError>> {
            self.inner.balance_of(address)
        }

        fn pay<'a>(
            &'a self,
            request: &'a PaymentRequest,
        ) -> BoxFuture<'a, Result<SignedTransaction, PaymentError>> {
            async move {
                self.entered.notify_one();
                if let Ok(permit) = self.release.acquire().await {
                    permit.forget();
                }
                self.inner.pay(request).await
            }
            .boxed()
        }

        fn broadcast<'a>(
            &'a self,
            transaction: &'a SignedTransaction,
        ) -> BoxFuture<'a, Result<BroadcastResult, PaymentError>> {
            self.inner.broadcast(transaction)
        }
    }

    fn parked_gateway() -> Arc<ParkedGateway> {
        Arc::new(ParkedGateway {
            inner: SimulatedPaymentGateway::new("0xattached", Amount::from_whole(10)),
            entered: Notify::new(),
            release: Semaphore::new(0),
        })
    }

    #[tokio::test]
    async fn second_join_while_in_flight_is_skipped() {
        let gateway = parked_gateway();
        let service = make_service_with(
            Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            Arc::new(SeededRandom::new(3)),
        )
        .await;

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.join_pool(&pool_id(), wallet(1)).await })
        };
        gateway.entered.notified().await;

        let second = service.join_pool(&pool_id(), wallet(1)).await;
        assert!(matches!(second, Ok(JoinOutcome::Skipped)));

        gateway.release.add_permits(1);
        let Ok(first) = first.await else {
            panic!("join task panicked");
        };
        assert!(matches!(first, Ok(JoinOutcome::Joined(_))));
        assert_eq!(participants(&service).await, vec![wallet(1)]);
        assert_eq!(gateway.inner.broadcast_count(), 1);
    }

    #[tokio::test]
    async fn reserved_last_seat_blocks_other_callers() {
        let gateway = parked_gateway();
        let service = make_service_with(
            Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            Arc::new(SeededRandom::new(3)),
        )
        .await;
        gateway.release.add_permits(5);
        for n in 0..5 {
            let _ = join_ok(&service, wallet(n)).await;
        }

        let last = {
            let service = service.clone();
            tokio::spawn(async move { service.join_pool(&pool_id(), wallet(10)).await })
        };
        // Wait until the last seat is reserved.
        loop {
            gateway.entered.notified().await;
            let Ok(pool) = service.get_pool(&pool_id()).await else {
                panic!("pool missing");
            };
            if pool.reserved_seats() == 1 {
                break;
            }
        }

        let rival = service.join_pool(&pool_id(), wallet(11)).await;
        assert!(matches!(rival, Err(LotteryError::PoolFull(_))));

        gateway.release.add_permits(1);
        let Ok(last) = last.await else {
            panic!("join task panicked");
        };
        assert!(matches!(last, Ok(JoinOutcome::Joined(ref r)) if r.seat == 6));
        assert_eq!(participants(&service).await.len(), 6);
    }
}
