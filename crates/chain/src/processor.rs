//! # Transaction Processor
//!
//! Applies transactions to a `LedgerStore`. For every operation, in list
//! order:
//!
//! ```text
//! bandwidth.consume_operation -> actuator.validate -> actuator.execute
//! ```
//!
//! Each transaction runs inside a store session. The session is committed
//! only when every operation succeeded; otherwise it is rolled back, so a
//! rejected transaction leaves no trace, bandwidth charges included.
//! Validation runs right before each execute, so a later operation always
//! sees the effects of the earlier ones.

use tracing::{info, warn};

use crate::actuator::{create_actuator, ExecutionReceipt};
use crate::bandwidth::BandwidthProcessor;
use crate::error::{ProcessError, StateError};
use crate::state::LedgerStore;
use crate::tx::Transaction;
use trellis_common::ChainConfig;

/// Outcome of one transaction inside a block.
pub type TxOutcome = Result<Vec<ExecutionReceipt>, ProcessError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionProcessor {
    bandwidth: BandwidthProcessor,
}

impl TransactionProcessor {
    pub fn new(bandwidth: BandwidthProcessor) -> Self {
        Self { bandwidth }
    }

    pub fn from_config(cfg: &ChainConfig) -> Self {
        Self::new(BandwidthProcessor::from_config(cfg))
    }

    pub fn bandwidth(&self) -> &BandwidthProcessor {
        &self.bandwidth
    }

    /// Apply `tx` atomically, returning one receipt per operation.
    pub fn process(&self, state: &mut LedgerStore, tx: &Transaction) -> TxOutcome {
        if tx.operations.is_empty() {
            return Err(ProcessError::EmptyTransaction);
        }

        let tx_id = tx.id_hex();
        state.begin_session();
        match self.apply_operations(state, tx, &tx_id) {
            Ok(receipts) => {
                state.commit_session();
                info!(
                    tx = %tx_id,
                    operations = receipts.len(),
                    slot = state.head_slot(),
                    "transaction applied"
                );
                Ok(receipts)
            }
            Err(e) => {
                state.rollback_session();
                Err(e)
            }
        }
    }

    fn apply_operations(
        &self,
        state: &mut LedgerStore,
        tx: &Transaction,
        tx_id: &str,
    ) -> TxOutcome {
        let mut receipts = Vec::with_capacity(tx.operations.len());

        for (index, op) in tx.operations.iter().enumerate() {
            if let Err(source) = self.bandwidth.consume_operation(state, op) {
                warn!(tx = %tx_id, index, error = %source, "bandwidth rejected");
                return Err(ProcessError::Bandwidth { index, source });
            }

            let actuator = create_actuator(op);
            if let Err(source) = actuator.validate(state) {
                warn!(tx = %tx_id, index, error = %source, "validation failed");
                return Err(ProcessError::Validation { index, source });
            }

            match actuator.execute(state) {
                Ok(receipt) => receipts.push(receipt),
                Err(source) => {
                    warn!(tx = %tx_id, index, error = %source, "execution failed");
                    return Err(ProcessError::Execution {
                        index,
                        receipt: ExecutionReceipt::failed(actuator.calc_fee()),
                        source,
                    });
                }
            }
        }
        Ok(receipts)
    }

    /// Move the head to `slot` and apply `txs` in order. One rejected
    /// transaction does not affect the others.
    pub fn process_block(
        &self,
        state: &mut LedgerStore,
        slot: u64,
        timestamp: u64,
        txs: &[Transaction],
    ) -> Result<Vec<TxOutcome>, StateError> {
        state.advance_head(slot, timestamp)?;
        let outcomes: Vec<TxOutcome> = txs.iter().map(|tx| self.process(state, tx)).collect();

        let applied = outcomes.iter().filter(|o| o.is_ok()).count();
        info!(slot, applied, rejected = outcomes.len() - applied, "block processed");
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Account, GlobalParameters, KvStore};
    use crate::tx::{Operation, OperationPayload, TransferContract};
    use crate::types::Address;

    fn addr(b: u8) -> Address {
        Address::from_account_bytes([b; 20])
    }

    fn transfer(from: Address, to: Address, amount: i64) -> Operation {
        Operation::new(&OperationPayload::Transfer(TransferContract {
            owner_address: from.to_vec(),
            to_address: to.to_vec(),
            amount,
        }))
    }

    fn store() -> LedgerStore {
        let mut state = LedgerStore::new(GlobalParameters {
            free_net_limit: 5_000,
            public_net_limit: 1_000_000,
            ..GlobalParameters::default()
        });
        state.accounts.put(addr(1), Account::new(addr(1), 100));
        state
    }

    #[test]
    fn empty_transaction_is_rejected() {
        let mut state = store();
        let tx = Transaction::new(Vec::new(), 0);
        assert_eq!(
            TransactionProcessor::default().process(&mut state, &tx),
            Err(ProcessError::EmptyTransaction)
        );
    }

    #[test]
    fn failing_second_operation_rolls_back_first() {
        let mut state = store();
        let before = state.clone();
        let tx = Transaction::new(
            vec![transfer(addr(1), addr(2), 60), transfer(addr(1), addr(3), 60)],
            1,
        );

        let err = TransactionProcessor::default()
            .process(&mut state, &tx)
            .unwrap_err();

        assert_eq!(err.operation_index(), Some(1));
        assert!(matches!(err, ProcessError::Validation { .. }));
        assert_eq!(state, before);
        assert!(!state.in_session());
        assert_eq!(state.accounts.journal_len(), 0);
    }

    #[test]
    fn block_moves_head_and_isolates_failures() {
        let mut state = store();
        let good = Transaction::single(
            &OperationPayload::Transfer(TransferContract {
                owner_address: addr(1).to_vec(),
                to_address: addr(2).to_vec(),
                amount: 10,
            }),
            1,
        );
        let bad = Transaction::single(
            &OperationPayload::Transfer(TransferContract {
                owner_address: addr(9).to_vec(),
                to_address: addr(2).to_vec(),
                amount: 10,
            }),
            2,
        );

        let outcomes = TransactionProcessor::default()
            .process_block(&mut state, 4, 12_000, &[bad, good])
            .unwrap();

        assert!(matches!(outcomes[0], Err(ProcessError::Bandwidth { index: 0, .. })));
        assert_eq!(outcomes[1].as_ref().unwrap().len(), 1);
        assert_eq!(state.head_slot(), 4);
        assert_eq!(state.accounts.get(&addr(2)).unwrap().balance, 10);

        assert!(matches!(
            TransactionProcessor::default().process_block(&mut state, 3, 9_000, &[]),
            Err(StateError::HeadRegression { .. })
        ));
    }
}
