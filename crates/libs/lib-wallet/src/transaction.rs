//! # Supported Transactions
//!
//! Tagged variant over the two Solana transaction wire shapes. Wallets accept
//! both; the variant a caller hands in is the variant they get back from every
//! sign round trip.

use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, VersionedTransaction};

use crate::error::WalletError;

/// A transaction in either the legacy or the versioned encoding.
#[derive(Debug, Clone)]
pub enum SupportedTransaction {
    Legacy(Transaction),
    Versioned(VersionedTransaction),
}

impl SupportedTransaction {
    pub fn is_versioned(&self) -> bool {
        matches!(self, Self::Versioned(_))
    }

    /// Stamp the recent blockhash into the message.
    pub fn set_recent_blockhash(&mut self, blockhash: Hash) {
        match self {
            Self::Legacy(tx) => tx.message.recent_blockhash = blockhash,
            Self::Versioned(tx) => tx.message.set_recent_blockhash(blockhash),
        }
    }

    /// The blockhash currently compiled into the message.
    pub fn recent_blockhash(&self) -> Hash {
        match self {
            Self::Legacy(tx) => tx.message.recent_blockhash,
            Self::Versioned(tx) => *tx.message.recent_blockhash(),
        }
    }

    /// Install the fee payer on a legacy message that does not carry one yet.
    ///
    /// The fee payer occupies the first required-signer slot. A legacy message
    /// that already has account keys keeps them; a versioned message carries
    /// its payer from construction and is left untouched.
    pub fn ensure_fee_payer(&mut self, payer: &Pubkey) {
        if let Self::Legacy(tx) = self {
            if tx.message.account_keys.is_empty() {
                tx.message.account_keys.push(*payer);
                tx.message.header.num_required_signatures = 1;
                tx.signatures = vec![Signature::default()];
            }
        }
    }

    /// Serialize to the Solana wire format.
    pub fn serialize(&self) -> Result<Vec<u8>, WalletError> {
        let bytes = match self {
            Self::Legacy(tx) => bincode::serialize(tx),
            Self::Versioned(tx) => bincode::serialize(tx),
        };
        bytes.map_err(|e| WalletError::InvalidTransaction(format!("serialization failed: {}", e)))
    }

    /// Signatures currently attached to the transaction.
    pub fn signatures(&self) -> &[Signature] {
        match self {
            Self::Legacy(tx) => &tx.signatures,
            Self::Versioned(tx) => &tx.signatures,
        }
    }
}

impl From<Transaction> for SupportedTransaction {
    fn from(tx: Transaction) -> Self {
        Self::Legacy(tx)
    }
}

impl From<VersionedTransaction> for SupportedTransaction {
    fn from(tx: VersionedTransaction) -> Self {
        Self::Versioned(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::message::{Message, VersionedMessage};

    fn legacy_with_payer(payer: &Pubkey) -> SupportedTransaction {
        SupportedTransaction::Legacy(Transaction::new_unsigned(Message::new(&[], Some(payer))))
    }

    #[test]
    fn test_stamp_blockhash_legacy() {
        let payer = Pubkey::new_unique();
        let mut tx = legacy_with_payer(&payer);
        let blockhash = Hash::new_unique();

        tx.set_recent_blockhash(blockhash);

        assert_eq!(tx.recent_blockhash(), blockhash);
        assert!(!tx.is_versioned());
    }

    #[test]
    fn test_stamp_blockhash_versioned() {
        let payer = Pubkey::new_unique();
        let mut tx = SupportedTransaction::Versioned(VersionedTransaction {
            signatures: vec![],
            message: VersionedMessage::Legacy(Message::new(&[], Some(&payer))),
        });
        let blockhash = Hash::new_unique();

        tx.set_recent_blockhash(blockhash);

        assert_eq!(tx.recent_blockhash(), blockhash);
        assert!(tx.is_versioned());
    }

    #[test]
    fn test_ensure_fee_payer_installs_on_empty_shell() {
        let payer = Pubkey::new_unique();
        let mut tx = SupportedTransaction::Legacy(Transaction::default());

        tx.ensure_fee_payer(&payer);

        match &tx {
            SupportedTransaction::Legacy(inner) => {
                assert_eq!(inner.message.account_keys.first(), Some(&payer));
                assert_eq!(inner.message.header.num_required_signatures, 1);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_ensure_fee_payer_keeps_existing_payer() {
        let payer = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let mut tx = legacy_with_payer(&payer);

        tx.ensure_fee_payer(&other);

        match &tx {
            SupportedTransaction::Legacy(inner) => {
                assert_eq!(inner.message.account_keys.first(), Some(&payer));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_legacy_wire_bytes_decode_as_versioned() {
        // The node accepts both encodings through the same endpoint; the
        // legacy wire bytes must parse as a (legacy-flavored) versioned
        // transaction on the submission side.
        let payer = Pubkey::new_unique();
        let mut tx = legacy_with_payer(&payer);
        tx.set_recent_blockhash(Hash::new_unique());

        let wire = tx.serialize().unwrap();
        let decoded: VersionedTransaction = bincode::deserialize(&wire).unwrap();

        assert_eq!(*decoded.message.recent_blockhash(), tx.recent_blockhash());
    }
}
