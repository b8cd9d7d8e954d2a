use tokio::time::sleep;

use crate::config::PollConfig;
use crate::error::ClientError;
use crate::session::{ChainSession, TxHash, TxReceipt, TxStatus};

/// Poll for a transaction receipt until it is mined or the attempts run
/// out. A receipt with failure status is terminal
/// [`ClientError::TransactionReverted`], not "still pending". Transient
/// lookup errors consume an attempt and are retried.
pub async fn await_confirmation<S: ChainSession>(
    session: &S,
    poll: &PollConfig,
    hash: &TxHash,
) -> Result<TxReceipt, ClientError> {
    for attempt in 1..=poll.max_attempts {
        match session.receipt(hash).await {
            Ok(Some(receipt)) => match receipt.status {
                TxStatus::Success => return Ok(receipt),
                TxStatus::Reverted { ref reason } => {
                    return Err(ClientError::TransactionReverted {
                        tx_hash: hash.clone(),
                        reason: reason.clone(),
                    });
                }
            },
            Ok(None) => {}
            // Receipt endpoints flap while a tx propagates; keep polling.
            Err(_) => {}
        }
        if attempt < poll.max_attempts {
            sleep(poll.interval).await;
        }
    }

    Err(ClientError::ConfirmationTimeout {
        tx_hash: hash.clone(),
        attempts: poll.max_attempts,
    })
}
