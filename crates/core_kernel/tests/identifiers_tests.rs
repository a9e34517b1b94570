//! Tests for strongly-typed identifiers

use core_kernel::{ActorId, TransactionId, WalletId};
use std::collections::HashSet;
use uuid::Uuid;

mod display {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert!(ActorId::new().to_string().starts_with("ACT-"));
        assert!(WalletId::new().to_string().starts_with("WAL-"));
        assert!(TransactionId::new().to_string().starts_with("TXN-"));
    }

    #[test]
    fn test_prefix_accessor() {
        assert_eq!(ActorId::prefix(), "ACT");
        assert_eq!(WalletId::prefix(), "WAL");
        assert_eq!(TransactionId::prefix(), "TXN");
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_parse_prefixed() {
        let id = WalletId::new();
        let parsed: WalletId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: TransactionId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("WAL-not-a-uuid".parse::<WalletId>().is_err());
        assert!("".parse::<ActorId>().is_err());
    }
}

mod generation {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let ids: HashSet<WalletId> = (0..1000).map(|_| WalletId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let first = TransactionId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = TransactionId::new_v7();
        assert!(first < second);
    }
}

mod serde_tests {
    use super::*;

    #[test]
    fn test_serializes_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = ActorId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));

        let back: ActorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
