//! OrderBook contract event decoding.
//!
//! Dispatch is by the pinned topic0 constants; payloads are decoded through
//! the `sol!`-generated ABI types. A log that carries a known topic but a
//! malformed payload yields a `DecodeError` — callers log and skip it so a
//! single bad log never poisons a batch.

use alloy_primitives::{b256, hex, Address, B256, U256};
use alloy_sol_types::{sol, SolEvent};

use crate::domain::orders::{SaleKind, Side};

/// LogMake(bytes32,uint8,uint8,address,(uint256,address,uint96),uint128,uint64,uint64)
pub const LOG_MAKE_TOPIC: B256 =
    b256!("fc37f2ff950f95913eb7182357ba3c14df60ef354bc7d6ab1ba2815f249fffe6");
/// LogCancel(bytes32,address)
pub const LOG_CANCEL_TOPIC: B256 =
    b256!("0ac8bb53fac566d7afc05d8b4df11d7690a7b27bdc40b54e4060f9b21fb849bd");
/// LogMatch(bytes32,bytes32,Order,Order,uint128)
pub const LOG_MATCH_TOPIC: B256 =
    b256!("f629aecab94607bc43ce4aebd564bf6e61c7327226a797b002de724b9944b20e");
/// ERC-721 Approval(address,address,uint256)
pub const ERC721_APPROVAL_TOPIC: B256 =
    b256!("8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925");

sol! {
    struct Asset {
        uint256 tokenId;
        address collection;
        uint96 amount;
    }

    struct OrderDetail {
        uint8 side;
        uint8 saleKind;
        address maker;
        Asset nft;
        uint128 price;
        uint64 expiry;
        uint64 salt;
    }

    event LogMake(
        bytes32 orderKey,
        uint8 indexed side,
        uint8 indexed saleKind,
        address indexed maker,
        Asset nft,
        uint128 price,
        uint64 expiry,
        uint64 salt
    );

    event LogCancel(bytes32 indexed orderKey, address indexed maker);

    event LogMatch(
        bytes32 indexed makeOrderKey,
        bytes32 indexed takeOrderKey,
        OrderDetail makeOrder,
        OrderDetail takeOrder,
        uint128 fillPrice
    );

    event Approval(address indexed owner, address indexed approved, uint256 indexed tokenId);

    function tokenURI(uint256 tokenId) external view returns (string memory);

    function getApproved(uint256 tokenId) external view returns (address);
}

/// A log as returned by `eth_getLogs`, detached from any transport type.
#[derive(Debug, Clone)]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
    pub block_number: u64,
    pub tx_hash: B256,
    pub log_index: u64,
}

/// One side of a matched trade as carried in LogMatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub side: Side,
    pub sale_kind: SaleKind,
    pub maker: Address,
    pub token_id: U256,
    pub collection: Address,
    pub amount: i64,
    pub price: u128,
    pub expiry: u64,
    pub salt: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeEvent {
    pub order_key: B256,
    pub side: Side,
    pub sale_kind: SaleKind,
    pub maker: Address,
    pub token_id: U256,
    pub collection: Address,
    pub amount: i64,
    pub price: u128,
    pub expiry: u64,
    pub salt: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelEvent {
    pub order_key: B256,
    pub maker: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    pub make_order_key: B256,
    pub take_order_key: B256,
    pub make_order: OrderView,
    pub take_order: OrderView,
    pub fill_price: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalEvent {
    /// The emitting NFT contract.
    pub collection: Address,
    pub owner: Address,
    pub approved: Address,
    pub token_id: U256,
}

/// The closed set of events the indexer reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBookEvent {
    Make(MakeEvent),
    Cancel(CancelEvent),
    Match(MatchEvent),
    Approval(ApprovalEvent),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("log has no topics")]
    MissingTopics,
    #[error("abi decode failed for {event}: {source}")]
    Abi {
        event: &'static str,
        source: alloy_sol_types::Error,
    },
    #[error("invalid side value {0}")]
    InvalidSide(u8),
    #[error("invalid sale kind value {0}")]
    InvalidSaleKind(u8),
    #[error("nft amount {0} exceeds i64 range")]
    AmountOverflow(u128),
}

/// Decode a raw log into an [`OrderBookEvent`].
///
/// Returns `Ok(None)` for topics the indexer does not track.
pub fn decode_log(log: &RawLog) -> Result<Option<OrderBookEvent>, DecodeError> {
    let topic0 = log.topics.first().ok_or(DecodeError::MissingTopics)?;

    match *topic0 {
        LOG_MAKE_TOPIC => decode_make(log).map(|e| Some(OrderBookEvent::Make(e))),
        LOG_CANCEL_TOPIC => decode_cancel(log).map(|e| Some(OrderBookEvent::Cancel(e))),
        LOG_MATCH_TOPIC => decode_match(log).map(|e| Some(OrderBookEvent::Match(e))),
        ERC721_APPROVAL_TOPIC => decode_approval(log).map(|e| Some(OrderBookEvent::Approval(e))),
        _ => Ok(None),
    }
}

fn decode_make(log: &RawLog) -> Result<MakeEvent, DecodeError> {
    let decoded = LogMake::decode_raw_log(log.topics.iter().copied(), &log.data, false)
        .map_err(|source| DecodeError::Abi {
            event: "LogMake",
            source,
        })?;

    Ok(MakeEvent {
        order_key: decoded.orderKey,
        side: Side::try_from(decoded.side)?,
        sale_kind: SaleKind::try_from(decoded.saleKind)?,
        maker: decoded.maker,
        token_id: decoded.nft.tokenId,
        collection: decoded.nft.collection,
        amount: asset_amount(decoded.nft.amount.to::<u128>())?,
        price: decoded.price,
        expiry: decoded.expiry,
        salt: decoded.salt,
    })
}

fn decode_cancel(log: &RawLog) -> Result<CancelEvent, DecodeError> {
    let decoded = LogCancel::decode_raw_log(log.topics.iter().copied(), &log.data, false)
        .map_err(|source| DecodeError::Abi {
            event: "LogCancel",
            source,
        })?;

    Ok(CancelEvent {
        order_key: decoded.orderKey,
        maker: decoded.maker,
    })
}

fn decode_match(log: &RawLog) -> Result<MatchEvent, DecodeError> {
    let decoded = LogMatch::decode_raw_log(log.topics.iter().copied(), &log.data, false)
        .map_err(|source| DecodeError::Abi {
            event: "LogMatch",
            source,
        })?;

    Ok(MatchEvent {
        make_order_key: decoded.makeOrderKey,
        take_order_key: decoded.takeOrderKey,
        make_order: order_view(&decoded.makeOrder)?,
        take_order: order_view(&decoded.takeOrder)?,
        fill_price: decoded.fillPrice,
    })
}

fn decode_approval(log: &RawLog) -> Result<ApprovalEvent, DecodeError> {
    let decoded = Approval::decode_raw_log(log.topics.iter().copied(), &log.data, false)
        .map_err(|source| DecodeError::Abi {
            event: "Approval",
            source,
        })?;

    Ok(ApprovalEvent {
        collection: log.address,
        owner: decoded.owner,
        approved: decoded.approved,
        token_id: decoded.tokenId,
    })
}

fn order_view(order: &OrderDetail) -> Result<OrderView, DecodeError> {
    Ok(OrderView {
        side: Side::try_from(order.side)?,
        sale_kind: SaleKind::try_from(order.saleKind)?,
        maker: order.maker,
        token_id: order.nft.tokenId,
        collection: order.nft.collection,
        amount: asset_amount(order.nft.amount.to::<u128>())?,
        price: order.price,
        expiry: order.expiry,
        salt: order.salt,
    })
}

fn asset_amount(amount: u128) -> Result<i64, DecodeError> {
    i64::try_from(amount).map_err(|_| DecodeError::AmountOverflow(amount))
}

/// Render a 32-byte OrderKey the way it is stored: `"0x" + lowercase hex`.
pub fn format_order_id(key: &B256) -> String {
    format!("0x{}", hex::encode(key))
}

/// Lowercased `0x…` address rendering used on every DB boundary.
pub fn format_address(address: &Address) -> String {
    format!("{address:#x}")
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, U256};

    use super::*;
    use crate::domain::orders::{SaleKind, Side};

    // Captured from a live sepolia LogMake transaction.
    const MAKE_DATA: &str = "c773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d2650000000000000000000000000000000000000000000000000000000000000000000000000000000000000000e7f1725e7734ce288f8367e1bb143e90bb3f05120000000000000000000000000000000000000000000000000000000000000001000000000000000000000000000000000000000000000000002386f26fc10000000000000000000000000000000000000000000000000000000000006558875d0000000000000000000000000000000000000000000000000000000000000001";

    fn make_log() -> RawLog {
        RawLog {
            address: address!("7d29d1860bd4d3a74bbd9a03c9b043d375311dcb"),
            topics: vec![
                LOG_MAKE_TOPIC,
                b256!("0000000000000000000000000000000000000000000000000000000000000000"),
                b256!("0000000000000000000000000000000000000000000000000000000000000001"),
                b256!("000000000000000000000000f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            ],
            data: hex::decode(MAKE_DATA).unwrap(),
            block_number: 111_482_956,
            tx_hash: b256!("000000000000000000000000f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            log_index: 3,
        }
    }

    #[test]
    fn decodes_live_make_log() {
        let event = match decode_log(&make_log()).unwrap().unwrap() {
            OrderBookEvent::Make(event) => event,
            other => panic!("expected Make, got {other:?}"),
        };

        assert_eq!(
            format_order_id(&event.order_key),
            "0xc773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d265"
        );
        assert_eq!(event.side, Side::List);
        assert_eq!(event.sale_kind, SaleKind::FixForItem);
        assert_eq!(
            event.maker,
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
        assert_eq!(event.token_id, U256::ZERO);
        assert_eq!(
            event.collection,
            address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512")
        );
        assert_eq!(event.amount, 1);
        assert_eq!(event.price, 10_000_000_000_000_000);
        assert_eq!(event.expiry, 0x6558_875d);
        assert_eq!(event.salt, 1);
    }

    #[test]
    fn decodes_cancel_log() {
        let log = RawLog {
            address: address!("7d29d1860bd4d3a74bbd9a03c9b043d375311dcb"),
            topics: vec![
                LOG_CANCEL_TOPIC,
                b256!("c773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d265"),
                b256!("000000000000000000000000f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            ],
            data: Vec::new(),
            block_number: 111_482_960,
            tx_hash: B256::repeat_byte(0xab),
            log_index: 0,
        };

        let event = match decode_log(&log).unwrap().unwrap() {
            OrderBookEvent::Cancel(event) => event,
            other => panic!("expected Cancel, got {other:?}"),
        };
        assert_eq!(
            format_order_id(&event.order_key),
            "0xc773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d265"
        );
        assert_eq!(
            event.maker,
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
    }

    #[test]
    fn match_event_round_trips_through_abi() {
        let make_order = OrderDetail {
            side: 0,
            saleKind: 1,
            maker: address!("aaa0000000000000000000000000000000000aaa"),
            nft: Asset {
                tokenId: U256::from(7u64),
                collection: address!("cccc000000000000000000000000000000000ccc"),
                amount: alloy_primitives::aliases::U96::from(1u64),
            },
            price: 1_000_000_000_000_000_000,
            expiry: 2_000_000_000,
            salt: 42,
        };
        let take_order = OrderDetail {
            side: 1,
            saleKind: 1,
            maker: address!("bbb0000000000000000000000000000000000bbb"),
            nft: make_order.nft.clone(),
            price: 1_000_000_000_000_000_000,
            expiry: 2_000_000_000,
            salt: 43,
        };
        let event = LogMatch {
            makeOrderKey: B256::repeat_byte(0x01),
            takeOrderKey: B256::repeat_byte(0x02),
            makeOrder: make_order,
            takeOrder: take_order,
            fillPrice: 1_000_000_000_000_000_000,
        };

        let log = RawLog {
            address: address!("7d29d1860bd4d3a74bbd9a03c9b043d375311dcb"),
            topics: vec![
                LOG_MATCH_TOPIC,
                B256::repeat_byte(0x01),
                B256::repeat_byte(0x02),
            ],
            data: event.encode_data(),
            block_number: 110,
            tx_hash: B256::repeat_byte(0x0b),
            log_index: 1,
        };

        let decoded = match decode_log(&log).unwrap().unwrap() {
            OrderBookEvent::Match(event) => event,
            other => panic!("expected Match, got {other:?}"),
        };
        assert_eq!(decoded.make_order_key, B256::repeat_byte(0x01));
        assert_eq!(decoded.take_order_key, B256::repeat_byte(0x02));
        assert_eq!(decoded.make_order.side, Side::List);
        assert_eq!(decoded.take_order.side, Side::Bid);
        assert_eq!(decoded.make_order.token_id, U256::from(7u64));
        assert_eq!(decoded.fill_price, 1_000_000_000_000_000_000);
    }

    #[test]
    fn decodes_approval_log() {
        let log = RawLog {
            address: address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512"),
            topics: vec![
                ERC721_APPROVAL_TOPIC,
                b256!("000000000000000000000000f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
                b256!("0000000000000000000000007d29d1860bd4d3a74bbd9a03c9b043d375311dcb"),
                b256!("0000000000000000000000000000000000000000000000000000000000000001"),
            ],
            data: Vec::new(),
            block_number: 111_482_957,
            tx_hash: B256::repeat_byte(0x11),
            log_index: 0,
        };

        let event = match decode_log(&log).unwrap().unwrap() {
            OrderBookEvent::Approval(event) => event,
            other => panic!("expected Approval, got {other:?}"),
        };
        assert_eq!(
            event.collection,
            address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512")
        );
        assert_eq!(
            event.approved,
            address!("7d29d1860bd4d3a74bbd9a03c9b043d375311dcb")
        );
        assert_eq!(event.token_id, U256::from(1u64));
    }

    #[test]
    fn unknown_topic_is_skipped() {
        let log = RawLog {
            address: Address::ZERO,
            topics: vec![B256::repeat_byte(0xff)],
            data: Vec::new(),
            block_number: 1,
            tx_hash: B256::ZERO,
            log_index: 0,
        };
        assert!(decode_log(&log).unwrap().is_none());
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_panic() {
        let mut log = make_log();
        log.data.truncate(12);
        assert!(decode_log(&log).is_err());
    }

    #[test]
    fn order_id_rendering_is_lossless() {
        let key = b256!("c773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d265");
        let rendered = format_order_id(&key);
        assert_eq!(rendered.len(), 66);
        let bytes = hex::decode(&rendered).unwrap();
        assert_eq!(B256::from_slice(&bytes), key);
    }

    #[test]
    fn addresses_render_lowercase() {
        let addr = address!("7d29d1860bd4d3a74bbd9a03c9b043d375311dcb");
        assert_eq!(
            format_address(&addr),
            "0x7d29d1860bd4d3a74bbd9a03c9b043d375311dcb"
        );
    }
}
